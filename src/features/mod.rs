/// 機能別モジュール
///
/// 各機能モジュールは、その画面に関連するモデルとサービスを含む自己完結型のユニットです。
// 機能モジュールの宣言
pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod new_bill;
pub mod store;
