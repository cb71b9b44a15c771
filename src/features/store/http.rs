/// APIサーバー経由のコレクションストア
///
/// エンドポイント:
/// - `GET /bills` 請求書一覧
/// - `POST /bills` ファイルアップロード（マルチパート: file, email）
/// - `PATCH /bills/{selector}` 請求書更新
/// - `POST /auth/login` ログイン
/// - `POST /users` ユーザー作成
use super::models::{CreatedBill, LoginResponse, UploadPayload};
use super::{BillsCollection, Store, UsersCollection};
use crate::features::auth::session::SessionManager;
use crate::features::bills::models::RawBill;
use crate::shared::api_client::{ApiClient, MultipartFile};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use log::info;

pub struct HttpStore {
    api_client: ApiClient,
    sessions: SessionManager,
}

impl HttpStore {
    /// 新しいHttpStoreを作成する
    ///
    /// # 引数
    /// * `api_client` - APIクライアント
    /// * `sessions` - JWTを読み出すためのセッション
    pub fn new(api_client: ApiClient, sessions: SessionManager) -> Self {
        Self {
            api_client,
            sessions,
        }
    }

    fn token(&self) -> AppResult<Option<String>> {
        self.sessions.jwt()
    }
}

/// 更新対象の請求書IDからエンドポイントを組み立てる
pub fn bill_endpoint(selector: &str) -> String {
    format!("/bills/{}", urlencoding::encode(selector))
}

#[async_trait]
impl BillsCollection for HttpStore {
    async fn list(&self) -> AppResult<Vec<RawBill>> {
        let token = self.token()?;
        let bills: Vec<RawBill> = self.api_client.get("/bills", token.as_deref()).await?;
        info!("請求書一覧を取得しました: {}件", bills.len());
        Ok(bills)
    }

    async fn create(&self, payload: UploadPayload) -> AppResult<CreatedBill> {
        let token = self.token()?;
        let file = MultipartFile {
            field: "file".to_string(),
            file_name: payload.file_name,
            media_type: payload.media_type,
            content: payload.content,
        };

        self.api_client
            .post_multipart(
                "/bills",
                &file,
                &[("email", payload.email.as_str())],
                token.as_deref(),
            )
            .await
    }

    async fn update(&self, selector: &str, data: &str) -> AppResult<RawBill> {
        let token = self.token()?;
        self.api_client
            .patch_json_text(&bill_endpoint(selector), data, token.as_deref())
            .await
    }
}

#[async_trait]
impl UsersCollection for HttpStore {
    async fn create(&self, data: &str) -> AppResult<()> {
        let _: serde_json::Value = self.api_client.post_json_text("/users", data, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for HttpStore {
    fn bills(&self) -> &dyn BillsCollection {
        self
    }

    fn users(&self) -> &dyn UsersCollection {
        self
    }

    async fn login(&self, credentials: &str) -> AppResult<LoginResponse> {
        self.api_client
            .post_json_text("/auth/login", credentials, None)
            .await
    }
}
