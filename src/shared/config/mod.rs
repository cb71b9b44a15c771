/// 環境設定
pub mod environment;

/// アプリケーションの初期化
pub mod initialization;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    BilledConfig, Environment, EnvironmentConfig,
};
pub use initialization::{initialize_application, initialize_with, AppContext};
