/// メモリ上のコレクションストア
///
/// APIサーバーなしで画面の流れを確認するための実装。
/// 各操作の呼び出し回数を記録し、任意の操作を失敗させることができる。
use super::models::{CreatedBill, Credentials, LoginResponse, NewUser, UploadPayload};
use super::{BillsCollection, Store, UsersCollection};
use crate::features::bills::models::RawBill;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::generate_bill_key;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::{Mutex, MutexGuard};

/// 操作ごとの呼び出し回数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub login: usize,
    pub create_user: usize,
}

/// 操作ごとに注入する失敗メッセージ
#[derive(Debug, Clone, Default)]
struct Failures {
    list: Option<String>,
    create: Option<String>,
    update: Option<String>,
    login: Option<String>,
    create_user: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    bills: Vec<RawBill>,
    users: Vec<NewUser>,
    failures: Failures,
    calls: CallCounts,
}

/// メモリ上のコレクションストア
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    /// アップロードしたファイルの配信元。Noneの場合はfileUrlを返さずfilePathのみ返す
    file_base_url: Option<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// 空のストアを作成する
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            file_base_url: Some("https://localhost:3456/images".to_string()),
        }
    }

    /// 請求書を登録した状態で作成する
    pub fn with_bills(self, bills: Vec<RawBill>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.bills = bills;
        }
        self
    }

    /// ユーザーを登録した状態で作成する
    pub fn with_user(self, user: NewUser) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.users.push(user);
        }
        self
    }

    /// アップロード時にfileUrlを返さないバックエンドを再現する
    pub fn without_file_urls(mut self) -> Self {
        self.file_base_url = None;
        self
    }

    pub fn fail_list(&self, message: &str) {
        self.with_state(|state| state.failures.list = Some(message.to_string()));
    }

    pub fn fail_create(&self, message: &str) {
        self.with_state(|state| state.failures.create = Some(message.to_string()));
    }

    pub fn fail_update(&self, message: &str) {
        self.with_state(|state| state.failures.update = Some(message.to_string()));
    }

    pub fn fail_login(&self, message: &str) {
        self.with_state(|state| state.failures.login = Some(message.to_string()));
    }

    pub fn fail_create_user(&self, message: &str) {
        self.with_state(|state| state.failures.create_user = Some(message.to_string()));
    }

    /// 注入した失敗をすべて解除する
    pub fn clear_failures(&self) {
        self.with_state(|state| state.failures = Failures::default());
    }

    /// 呼び出し回数を取得する
    pub fn calls(&self) -> CallCounts {
        self.lock().map(|state| state.calls).unwrap_or_default()
    }

    /// 保持している請求書の複製を取得する
    pub fn bills_snapshot(&self) -> Vec<RawBill> {
        self.lock()
            .map(|state| state.bills.clone())
            .unwrap_or_default()
    }

    /// 登録済みユーザーの複製を取得する
    pub fn users_snapshot(&self) -> Vec<NewUser> {
        self.lock()
            .map(|state| state.users.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| AppError::ExternalService(format!("ストアのロック取得エラー: {e}")))
    }

    fn with_state(&self, f: impl FnOnce(&mut MemoryState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

#[async_trait]
impl BillsCollection for MemoryStore {
    async fn list(&self) -> AppResult<Vec<RawBill>> {
        let mut state = self.lock()?;
        state.calls.list += 1;
        if let Some(message) = &state.failures.list {
            return Err(AppError::store(message.clone()));
        }

        debug!("メモリストアから請求書一覧を返します: {}件", state.bills.len());
        Ok(state.bills.clone())
    }

    async fn create(&self, payload: UploadPayload) -> AppResult<CreatedBill> {
        let mut state = self.lock()?;
        state.calls.create += 1;
        if let Some(message) = &state.failures.create {
            return Err(AppError::store(message.clone()));
        }

        let key = generate_bill_key();
        state.bills.push(RawBill {
            id: Some(key.clone()),
            email: Some(payload.email),
            file_name: Some(payload.file_name.clone()),
            ..RawBill::default()
        });

        info!("メモリストアに下書きの請求書を作成しました: key={key}");

        let (file_url, file_path) = match &self.file_base_url {
            Some(base) => (Some(format!("{base}/{}", payload.file_name)), None),
            None => (None, Some(format!("public\\{key}"))),
        };

        Ok(CreatedBill {
            key,
            file_url,
            file_name: Some(payload.file_name),
            file_path,
        })
    }

    async fn update(&self, selector: &str, data: &str) -> AppResult<RawBill> {
        let mut state = self.lock()?;
        state.calls.update += 1;
        if let Some(message) = &state.failures.update {
            return Err(AppError::store(message.clone()));
        }

        let mut updated: RawBill = serde_json::from_str(data)?;
        updated.id = Some(selector.to_string());

        let existing = state
            .bills
            .iter_mut()
            .find(|bill| bill.id.as_deref() == Some(selector))
            .ok_or_else(|| AppError::store("Erreur 404"))?;
        *existing = updated.clone();

        info!("メモリストアの請求書を更新しました: id={selector}");
        Ok(updated)
    }
}

#[async_trait]
impl UsersCollection for MemoryStore {
    async fn create(&self, data: &str) -> AppResult<()> {
        let mut state = self.lock()?;
        state.calls.create_user += 1;
        if let Some(message) = &state.failures.create_user {
            return Err(AppError::store(message.clone()));
        }

        let user: NewUser = serde_json::from_str(data)?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::store("Erreur 409"));
        }

        info!("メモリストアにユーザーを作成しました: email={}", user.email);
        state.users.push(user);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn bills(&self) -> &dyn BillsCollection {
        self
    }

    fn users(&self) -> &dyn UsersCollection {
        self
    }

    async fn login(&self, credentials: &str) -> AppResult<LoginResponse> {
        let mut state = self.lock()?;
        state.calls.login += 1;
        if let Some(message) = &state.failures.login {
            return Err(AppError::store(message.clone()));
        }

        let credentials: Credentials = serde_json::from_str(credentials)?;
        let known = state
            .users
            .iter()
            .any(|u| u.email == credentials.email && u.password == credentials.password);
        if !known {
            return Err(AppError::store("Erreur 401"));
        }

        Ok(LoginResponse {
            jwt: format!("jwt-{}", generate_bill_key()),
        })
    }
}
