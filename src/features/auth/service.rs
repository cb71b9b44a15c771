/// ログイン・ログアウト処理
///
/// セッション（ストレージの "user" と "jwt"）を書き込むのはこのモジュールだけです。
use crate::features::auth::session::{Session, SessionManager, UserType};
use crate::features::store::{Credentials, NewUser, Store};
use crate::shared::errors::AppResult;
use crate::shared::navigation::{NavigationContext, Route};
use crate::shared::utils::email_local_part;
use log::{error, info, warn};
use std::sync::Arc;

/// ログイン画面のサービス
pub struct LoginService {
    store: Option<Arc<dyn Store>>,
    sessions: SessionManager,
    navigation: NavigationContext,
}

impl LoginService {
    pub fn new(
        store: Option<Arc<dyn Store>>,
        sessions: SessionManager,
        navigation: NavigationContext,
    ) -> Self {
        Self {
            store,
            sessions,
            navigation,
        }
    }

    /// 従業員としてログインし、請求書一覧へ移動する
    pub async fn login_employee(&self, email: &str, password: &str) -> AppResult<Route> {
        self.login(UserType::Employee, email, password).await
    }

    /// 管理者としてログインし、管理画面へ移動する
    pub async fn login_admin(&self, email: &str, password: &str) -> AppResult<Route> {
        self.login(UserType::Admin, email, password).await
    }

    /// ログイン処理
    ///
    /// # 処理内容
    /// 1. セッションを保存する
    /// 2. ストアでログインしてJWTを保存する
    /// 3. ログインに失敗した場合はユーザーを作成して再度ログインする
    /// 4. ユーザー種別に応じた画面へ移動する
    ///
    /// # エラー
    /// ログインとユーザー作成の両方に失敗した場合は画面遷移せずにエラーを返す
    async fn login(&self, user_type: UserType, email: &str, password: &str) -> AppResult<Route> {
        let session = Session::connected(user_type, email, password);
        self.sessions.save(&session)?;

        match &self.store {
            Some(store) => {
                if let Err(e) = self.authenticate(store.as_ref(), &session).await {
                    info!("ログインに失敗したためユーザーを作成します: email={email}, error={e}");
                    self.create_user(store.as_ref(), &session)
                        .await
                        .inspect_err(|e| error!("ユーザーの作成またはログインに失敗しました: {e}"))?;
                }
            }
            None => warn!("ストアが設定されていないため認証を行いません"),
        }

        let route = match user_type {
            UserType::Employee => Route::Bills,
            UserType::Admin => Route::Dashboard,
        };
        self.navigation.navigate(route);

        info!("ログインしました: type={}, email={email}", user_type.as_str());
        Ok(route)
    }

    async fn authenticate(&self, store: &dyn Store, session: &Session) -> AppResult<()> {
        let credentials = serde_json::to_string(&Credentials {
            email: session.email.clone(),
            password: session.password.clone(),
        })?;

        let response = store.login(&credentials).await?;
        self.sessions.save_jwt(&response.jwt)
    }

    async fn create_user(&self, store: &dyn Store, session: &Session) -> AppResult<()> {
        let user = serde_json::to_string(&NewUser {
            user_type: session.user_type.as_str().to_string(),
            name: email_local_part(&session.email).to_string(),
            email: session.email.clone(),
            password: session.password.clone(),
        })?;

        store.users().create(&user).await?;
        info!("ユーザーを作成しました: email={}", session.email);

        self.authenticate(store, session).await
    }
}

/// ログアウト処理
pub struct LogoutService {
    sessions: SessionManager,
    navigation: NavigationContext,
}

impl LogoutService {
    pub fn new(sessions: SessionManager, navigation: NavigationContext) -> Self {
        Self {
            sessions,
            navigation,
        }
    }

    /// セッションを削除してログイン画面へ移動する
    pub fn logout(&self) -> AppResult<()> {
        self.sessions.clear()?;
        self.navigation.navigate(Route::Login);
        info!("ログアウトしました");
        Ok(())
    }
}
