/// 管理画面機能モジュール
///
/// 管理者が従業員の請求書を仕分けるための機能を提供します：
/// - ステータス別の一覧の開閉と絞り込み
/// - 請求書カードの選択と詳細表示
/// - 請求書の承認・却下
pub mod models;
pub mod service;

pub use models::{
    filter_bills, BillCard, BucketState, BucketView, DetailPanel, PersistOutcome, TicketState,
    TriageConfig,
};
pub use service::AdminTriage;
