use crate::features::auth::secure_storage::{FileStorage, KeyValueStorage};
use crate::features::auth::service::{LoginService, LogoutService};
use crate::features::auth::session::SessionManager;
use crate::features::bills::service::BillListService;
use crate::features::dashboard::models::TriageConfig;
use crate::features::dashboard::service::AdminTriage;
use crate::features::new_bill::service::NewBillSubmission;
use crate::features::store::{HttpStore, Store};
use crate::shared::api_client::ApiClient;
use crate::shared::config::environment::{get_environment, ApiConfig, BilledConfig, Environment};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::navigation::{NavigationContext, Navigator};
use crate::shared::presentation::Presenter;
use std::sync::Arc;

/// 各画面のサービスが共有する依存関係
pub struct AppContext {
    /// 実行環境
    pub environment: Environment,
    /// 請求書機能の設定
    pub config: BilledConfig,
    /// セッション
    pub sessions: SessionManager,
    /// コレクションストア（未設定の場合は各画面が何もしない）
    pub store: Option<Arc<dyn Store>>,
    pub presenter: Arc<dyn Presenter>,
    pub navigation: NavigationContext,
}

impl AppContext {
    /// 依存関係を指定して作成する
    pub fn new(
        config: BilledConfig,
        storage: Arc<dyn KeyValueStorage>,
        store: Option<Arc<dyn Store>>,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            environment: get_environment(),
            config,
            sessions: SessionManager::new(storage),
            store,
            presenter,
            navigation: NavigationContext::new(navigator),
        }
    }

    /// ログイン画面
    pub fn login(&self) -> LoginService {
        LoginService::new(
            self.store.clone(),
            self.sessions.clone(),
            self.navigation.clone(),
        )
    }

    /// ログアウト
    pub fn logout(&self) -> LogoutService {
        LogoutService::new(self.sessions.clone(), self.navigation.clone())
    }

    /// 従業員の請求書一覧画面
    pub fn bills(&self) -> BillListService {
        BillListService::new(
            self.store.clone(),
            self.presenter.clone(),
            self.navigation.clone(),
        )
    }

    /// 請求書作成画面（呼び出しごとに新しい状態で作成する）
    pub fn new_bill(&self) -> NewBillSubmission {
        NewBillSubmission::new(
            self.store.clone(),
            self.sessions.clone(),
            self.presenter.clone(),
            self.navigation.clone(),
            self.config.file_base_url.clone(),
        )
    }

    /// 管理者の仕分け画面（呼び出しごとに開閉状態を初期化する）
    pub fn dashboard(&self) -> AdminTriage {
        AdminTriage::new(
            self.store.clone(),
            self.sessions.clone(),
            self.presenter.clone(),
            self.navigation.clone(),
            TriageConfig::from(&self.config),
        )
    }
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `navigator` - 画面遷移を行うコールバック
/// * `presenter` - 表示層
///
/// # 処理内容
/// 1. 環境変数からAPI設定と請求書設定を読み込み、検証する
/// 2. セッションファイルを開く
/// 3. APIサーバー経由のストアを作成する
pub fn initialize_application(
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn Presenter>,
) -> AppResult<AppContext> {
    initialize_with(
        ApiConfig::from_env(),
        BilledConfig::from_env(),
        navigator,
        presenter,
    )
}

/// 設定を指定してアプリケーションを初期化する
pub fn initialize_with(
    api_config: ApiConfig,
    config: BilledConfig,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn Presenter>,
) -> AppResult<AppContext> {
    api_config.validate().map_err(AppError::configuration)?;
    config.validate().map_err(AppError::configuration)?;

    let storage = Arc::new(FileStorage::open(&config.session_path)?);
    let sessions = SessionManager::new(storage.clone());
    let api_client = ApiClient::new_with_config(api_config.clone().into())?;
    let store: Arc<dyn Store> = Arc::new(HttpStore::new(api_client, sessions));

    let context = AppContext::new(config, storage, Some(store), navigator, presenter);
    log_initialization_complete(&context, &api_config);
    Ok(context)
}

/// 初期化完了ログを出力する
fn log_initialization_complete(context: &AppContext, api_config: &ApiConfig) {
    log::info!("=== 初期化完了 ===");
    log::info!("環境: {:?}", context.environment);
    log::info!("APIサーバー: {}", api_config.base_url);
    log::info!("セッションファイル: {:?}", context.config.session_path);
    if api_config.is_localhost() {
        log::debug!("ローカルのAPIサーバーを使用します");
    }
}
