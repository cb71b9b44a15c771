/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// APIサーバーとの通信
pub mod api_client;

/// 画面遷移
pub mod navigation;

/// 表示層とのポート
pub mod presentation;

/// 共有ユーティリティ関数
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, AppContext, Environment, EnvironmentConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
pub use navigation::{NavigationContext, Navigator, Route};
pub use presentation::{ModalContent, PageState, Presenter};
