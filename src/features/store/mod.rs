/// コレクションストア機能モジュール
///
/// 請求書とユーザーを保持する外部ストアとの境界を定義します：
/// - `Store` トレイト（bills / users / login）
/// - APIサーバー経由の実装（`HttpStore`）
/// - メモリ上の実装（`MemoryStore`、開発・テスト用）
pub mod http;
pub mod memory;
pub mod models;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::features::bills::models::RawBill;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use models::{CreatedBill, Credentials, LoginResponse, NewUser, UploadPayload};

/// 請求書コレクションの操作
#[async_trait]
pub trait BillsCollection: Send + Sync {
    /// すべての請求書を取得する
    async fn list(&self) -> AppResult<Vec<RawBill>>;

    /// ファイルをアップロードして下書きの請求書を作成する
    async fn create(&self, payload: UploadPayload) -> AppResult<CreatedBill>;

    /// `selector` で指定した請求書をJSON文字列の内容で更新する
    async fn update(&self, selector: &str, data: &str) -> AppResult<RawBill>;
}

/// ユーザーコレクションの操作
#[async_trait]
pub trait UsersCollection: Send + Sync {
    /// JSON文字列の内容でユーザーを作成する
    async fn create(&self, data: &str) -> AppResult<()>;
}

/// コレクションストア
#[async_trait]
pub trait Store: Send + Sync {
    fn bills(&self) -> &dyn BillsCollection;

    fn users(&self) -> &dyn UsersCollection;

    /// JSON文字列の認証情報でログインし、JWTを受け取る
    async fn login(&self, credentials: &str) -> AppResult<LoginResponse>;
}
