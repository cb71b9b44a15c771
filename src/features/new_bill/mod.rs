/// 請求書作成機能モジュール
///
/// 従業員が新しい請求書を作成する画面のロジックを提供します：
/// - 添付ファイルの拡張子検証とアップロード
/// - フォーム入力からの請求書の組み立てと保存
/// - 保存後の一覧画面への遷移
pub mod models;
pub mod service;

pub use models::{
    validate_file_extension, FileChangeOutcome, NewBillForm, SelectedFile, SubmissionState,
    SubmitOutcome, UploadDraft,
};
pub use service::{assemble_bill, synthesize_file_url, NewBillSubmission};
