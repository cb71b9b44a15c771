use crate::shared::config::environment::ApiConfig;
/// 汎用APIクライアント
///
/// Billed APIサーバーとの通信を行う汎用的なクライアント。
/// 請求書コレクション、ユーザー、認証の各エンドポイントで使用する。
use crate::shared::errors::AppError;
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let api_config = ApiConfig::default();
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

impl From<ApiConfig> for ApiClientConfig {
    fn from(api_config: ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

/// マルチパートで送信するファイル
#[derive(Debug, Clone)]
pub struct MultipartFile {
    pub field: String,
    pub file_name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// エンドポイントの完全なURLを組み立てる
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = with_auth(self.client.get(self.url(endpoint)), auth_token);
        self.send_request_with_retry(request, "GET", endpoint).await
    }

    /// シリアライズ済みのJSON文字列をPOSTで送信
    pub async fn post_json_text<T>(
        &self,
        endpoint: &str,
        body: &str,
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let request = self
            .client
            .post(self.url(endpoint))
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.send_request_with_retry(with_auth(request, auth_token), "POST", endpoint)
            .await
    }

    /// シリアライズ済みのJSON文字列をPATCHで送信
    pub async fn patch_json_text<T>(
        &self,
        endpoint: &str,
        body: &str,
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request = self
            .client
            .patch(self.url(endpoint))
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.send_request_with_retry(with_auth(request, auth_token), "PATCH", endpoint)
            .await
    }

    /// ファイルとテキスト項目をマルチパートで送信
    ///
    /// 作成リクエストは冪等ではないため、接続に失敗してもリトライしない
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        file: &MultipartFile,
        fields: &[(&str, &str)],
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!(
            "マルチパートPOSTリクエスト送信: endpoint={endpoint}, filename={}",
            file.file_name
        );

        let part = multipart::Part::bytes(file.content.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| AppError::Validation(format!("MIMEタイプ設定エラー: {e}")))?;

        let mut form = multipart::Form::new().part(file.field.clone(), part);
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }

        let request = with_auth(self.client.post(self.url(endpoint)).multipart(form), auth_token);
        let response = request.send().await.map_err(|e| {
            AppError::ExternalService(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;
        self.read_response(response, "POST", endpoint).await
    }

    /// リトライ機能付きでリクエストを送信
    async fn send_request_with_retry<T>(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::ExternalService("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => return self.read_response(response, method, endpoint).await,
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        self.backoff(attempts).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    async fn backoff(&self, attempts: u32) {
        let delay = Duration::from_secs(2_u64.pow(attempts));
        warn!(
            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
            self.config.max_retries
        );
        tokio::time::sleep(delay).await;
    }

    /// レスポンスを解析する
    ///
    /// 本文が空の成功レスポンスは `null` として解釈する
    async fn read_response<T>(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("レスポンス読み取りエラー: {e}")))?;
        let payload = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };

        let result: T = serde_json::from_str(payload)
            .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(result)
    }

    /// エラーレスポンスをストアエラーに変換する
    ///
    /// 構造化されたエラーはサーバーのメッセージを、それ以外は `Erreur <status>` を使う
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status_code = response.status().as_u16();
        let response_text = response.text().await.unwrap_or_default();

        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            debug!(
                "APIサーバーから構造化エラーレスポンスを受信: code={}, message={}",
                error_response.error.code, error_response.error.message
            );
            return AppError::Store(error_response.error.message);
        }

        warn!("APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}");
        AppError::Store(format!("Erreur {status_code}"))
    }
}

/// 認証トークンがある場合はAuthorizationヘッダーを付与する
fn with_auth(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
    match auth_token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new_with_config(ApiClientConfig {
            base_url: "http://localhost:5678/".to_string(),
            ..ApiClientConfig::default()
        })
        .unwrap();

        assert_eq!(client.url("/bills"), "http://localhost:5678/bills");
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{"error":{"code":"NOT_FOUND","message":"Erreur 404"}}"#;
        let response: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "Erreur 404");

        let without_code = r#"{"error":{"message":"Erreur 500"}}"#;
        let response: ErrorResponse = serde_json::from_str(without_code).unwrap();
        assert!(response.error.code.is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_is_external_service_error() {
        // 存在しないポートに接続し、リトライなしで失敗することを確認
        let client = ApiClient::new_with_config(ApiClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            max_retries: 0,
        })
        .unwrap();

        let result: Result<serde_json::Value, AppError> = client.get("/bills", None).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_multipart_create_is_not_retried() {
        // リトライするとバックオフで2秒以上待つ
        let client = ApiClient::new_with_config(ApiClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
            max_retries: 3,
        })
        .unwrap();
        let file = MultipartFile {
            field: "file".to_string(),
            file_name: "receipt.png".to_string(),
            media_type: "image/png".to_string(),
            content: vec![1, 2, 3],
        };

        let started = std::time::Instant::now();
        let result: Result<serde_json::Value, AppError> = client
            .post_multipart("/bills", &file, &[("email", "a@a")], None)
            .await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
