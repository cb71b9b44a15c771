use crate::features::auth::secure_storage::{KeyValueStorage, StorageKeys};
use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// ユーザー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Employee => "Employee",
            UserType::Admin => "Admin",
        }
    }
}

/// ストレージの "user" キーに保存されるセッション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "connected")]
    pub status: String,
}

fn connected() -> String {
    "connected".to_string()
}

impl Session {
    /// ログイン直後のセッションを作成する
    pub fn connected(user_type: UserType, email: &str, password: &str) -> Self {
        Self {
            user_type,
            email: email.to_string(),
            password: password.to_string(),
            status: connected(),
        }
    }
}

/// セッションの読み書きを行う
///
/// 書き込みはログイン・ログアウト処理だけが行い、他の機能は読み取りのみ行う
#[derive(Clone)]
pub struct SessionManager {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// 現在のセッションを取得する
    ///
    /// JSON文字列がさらに文字列として保存されている場合（二重エンコード）も読み取る
    pub fn current(&self) -> AppResult<Option<Session>> {
        let Some(raw) = self.storage.get_item(StorageKeys::USER)? else {
            return Ok(None);
        };

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::session(format!("セッションの解析に失敗しました: {e}")))?;
        let value = match value {
            serde_json::Value::String(inner) => serde_json::from_str(&inner)
                .map_err(|e| AppError::session(format!("セッションの解析に失敗しました: {e}")))?,
            other => other,
        };

        let session = serde_json::from_value(value)
            .map_err(|e| AppError::session(format!("セッションの形式が不正です: {e}")))?;
        Ok(Some(session))
    }

    /// ログイン中のユーザーのメールアドレスを取得する
    pub fn current_email(&self) -> AppResult<String> {
        self.current()?
            .map(|session| session.email)
            .ok_or_else(|| AppError::session("ログインしていません"))
    }

    /// 保存済みのJWTを取得する
    pub fn jwt(&self) -> AppResult<Option<String>> {
        self.storage.get_item(StorageKeys::JWT)
    }

    pub(crate) fn save(&self, session: &Session) -> AppResult<()> {
        self.storage
            .set_item(StorageKeys::USER, &serde_json::to_string(session)?)
    }

    pub(crate) fn save_jwt(&self, jwt: &str) -> AppResult<()> {
        self.storage.set_item(StorageKeys::JWT, jwt)
    }

    pub(crate) fn clear(&self) -> AppResult<()> {
        self.storage.clear()
    }
}
