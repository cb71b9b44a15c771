use crate::shared::utils::file_name_from_path;
use once_cell::sync::Lazy;
use regex::Regex;

/// 受け付ける添付ファイルの拡張子
static ALLOWED_EXTENSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png)$").expect("hardcoded regex should be valid"));

/// 拡張子が不正な場合の通知
pub const INVALID_EXTENSION_MESSAGE: &str = "Seuls les fichiers JPG, JPEG, ou PNG sont acceptés";

/// アップロードに失敗した場合の通知
pub const UPLOAD_FAILED_MESSAGE: &str =
    "Une erreur est survenue lors de l'envoi du fichier. Veuillez réessayer.";

/// ファイル未アップロードで送信した場合の通知
pub const MISSING_FILE_MESSAGE: &str =
    "Veuillez télécharger un fichier valide avant de soumettre la note de frais.";

/// 請求書の保存に失敗した場合の通知
pub const SUBMIT_FAILED_MESSAGE: &str =
    "Une erreur est survenue lors de l'enregistrement de la note de frais. Veuillez réessayer.";

/// ファイル名の拡張子が jpg / jpeg / png のいずれかかを判定する（大文字小文字は区別しない）
pub fn validate_file_extension(file_name: &str) -> bool {
    ALLOWED_EXTENSIONS.is_match(file_name)
}

/// ファイル選択欄で選ばれたファイル
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    /// 選択欄が報告するパス（例: `C:\fakepath\receipt.png`）
    pub path: String,
    pub content: Vec<u8>,
    pub media_type: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        let path = path.into();
        let media_type = media_type_for(file_name_from_path(&path)).to_string();
        Self {
            path,
            content,
            media_type,
        }
    }

    /// パスの最後の要素
    pub fn file_name(&self) -> &str {
        file_name_from_path(&self.path)
    }
}

/// ファイル名からMIMEタイプを推定する
pub fn media_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// 新しい請求書フォームの入力値（未加工の文字列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

/// アップロード成功時に確定する下書き情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadDraft {
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub bill_id: Option<String>,
}

impl UploadDraft {
    /// 送信に必要なファイル情報が揃っているか
    pub fn is_ready(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.file_url) && present(&self.file_name)
    }
}

/// 作成画面の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    FileSelected,
    Uploaded,
    Submitted,
}

/// ファイル選択の結果
#[derive(Debug, Clone, PartialEq)]
pub enum FileChangeOutcome {
    /// アップロードして下書きを作成した
    Uploaded,
    /// 拡張子が不正で送信しなかった
    Rejected,
    /// アップロードに失敗した
    UploadFailed { reason: String },
    /// ストアが設定されていない
    NoStore,
    /// 画面が破棄されたため結果を捨てた
    Cancelled,
}

/// フォーム送信の結果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 保存して一覧画面に移動した
    Submitted,
    /// ファイルが未アップロード
    MissingFile,
    /// 保存に失敗した
    Failed { reason: String },
    /// 送信済みのため無視した
    AlreadySubmitted,
    NoStore,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_accepted_extensions() {
        assert!(validate_file_extension("photo.jpg"));
        assert!(validate_file_extension("photo.jpeg"));
        assert!(validate_file_extension("photo.png"));
        assert!(validate_file_extension("PHOTO.JPG"));
        assert!(validate_file_extension("scan.Png"));
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(!validate_file_extension("document.pdf"));
        assert!(!validate_file_extension("file.txt"));
        assert!(!validate_file_extension("photo.jpg.exe"));
        assert!(!validate_file_extension("jpg"));
        assert!(!validate_file_extension(""));
    }

    #[quickcheck]
    fn prop_extension_decides_validity(stem: String) -> bool {
        let stem: String = stem.chars().filter(|c| *c != '\n').collect();
        validate_file_extension(&format!("{stem}.png"))
            && !validate_file_extension(&format!("{stem}.gif"))
    }

    #[test]
    fn test_selected_file_from_browser_path() {
        let file = SelectedFile::new("C:\\fakepath\\receipt.PNG", vec![1, 2, 3]);
        assert_eq!(file.file_name(), "receipt.PNG");
        assert_eq!(file.media_type, "image/png");

        let file = SelectedFile::new("/home/user/ticket.jpeg", vec![]);
        assert_eq!(file.file_name(), "ticket.jpeg");
        assert_eq!(file.media_type, "image/jpeg");
    }

    #[test]
    fn test_upload_draft_readiness() {
        assert!(!UploadDraft::default().is_ready());
        let draft = UploadDraft {
            file_url: Some("https://localhost:3456/images/test.jpg".to_string()),
            file_name: Some("test.jpg".to_string()),
            bill_id: Some("1234".to_string()),
        };
        assert!(draft.is_ready());
        assert!(!UploadDraft {
            file_name: Some(String::new()),
            ..draft
        }
        .is_ready());
    }
}
