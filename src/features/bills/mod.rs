/// 請求書一覧機能モジュール
///
/// 従業員向けの請求書一覧に関連する機能を提供します：
/// - ストアから取得したレコードの検証と表示用への変換
/// - 日付・ステータスのフォーマット
/// - 日付の新しい順での並び替え
pub mod format;
pub mod models;
pub mod service;

pub use format::{format_date, format_status};
pub use models::{Bill, BillStatus, DisplayBill, RawBill};
pub use service::{normalize_bill, BillListPolicy, BillListService};
