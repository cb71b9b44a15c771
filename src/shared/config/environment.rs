use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（オプション版）
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（デフォルト値付き）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境変数の読み込みを確認する
///
/// 開発環境（デバッグビルド）の場合のみ.envファイルを読み込む。
/// 本番環境では環境変数が実行時に設定されていることを前提とする。
pub fn load_environment_variables() {
    if cfg!(debug_assertions) {
        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                eprintln!("環境ファイルの読み込みに失敗: {e}");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// 二回目以降の呼び出しは何もしない（テストから複数回呼ばれるため）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let log_level = match env_config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if initialized.is_ok() {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        );
    }
}

/// APIサーバーのデフォルトURL
pub const DEFAULT_API_SERVER_URL: &str = "http://localhost:5678";

/// API設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// APIリクエストの最大リトライ回数
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_SERVER_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    pub fn from_env() -> Self {
        let base_url = crate::get_env_var_or_default!("API_SERVER_URL", DEFAULT_API_SERVER_URL);

        let timeout_seconds = crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!(
                    "API_TIMEOUT_SECONDSのパースに失敗しました。デフォルト値30秒を使用します"
                );
                30
            });

        let max_retries = crate::get_env_var_or_default!("API_MAX_RETRIES", "3")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("API_MAX_RETRIESのパースに失敗しました。デフォルト値3回を使用します");
                3
            });

        log::info!(
            "API設定: base_url={base_url}, timeout={timeout_seconds}s, max_retries={max_retries}"
        );

        Self {
            base_url,
            timeout_seconds,
            max_retries,
        }
    }

    /// 設定を検証する
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("APIサーバーのベースURLが設定されていません".to_string());
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| format!("APIサーバーのベースURLが不正です: {e}"))?;

        if self.timeout_seconds == 0 {
            return Err("APIタイムアウトは0より大きい値である必要があります".to_string());
        }

        Ok(())
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1")
    }
}

/// 管理画面の一覧から除外するテストアカウントの既定値
pub const DEFAULT_TEST_ACCOUNTS: &str = "employee@test.tld,admin@test.tld";

/// サーバーがfileUrlを返さない場合に使うファイル配信元の既定値
pub const DEFAULT_FILE_BASE_URL: &str = "http://localhost:5678/";

/// 請求書機能の設定
#[derive(Debug, Clone)]
pub struct BilledConfig {
    /// 管理画面から除外するテストアカウント
    pub test_accounts: Vec<String>,
    /// ログイン中の管理者自身の請求書を除外するかどうか
    pub exclude_current_user: bool,
    /// fileUrl合成時のベースURL
    pub file_base_url: String,
    /// セッションファイルの保存先
    pub session_path: PathBuf,
}

impl Default for BilledConfig {
    fn default() -> Self {
        Self {
            test_accounts: parse_test_accounts(DEFAULT_TEST_ACCOUNTS),
            exclude_current_user: true,
            file_base_url: DEFAULT_FILE_BASE_URL.to_string(),
            session_path: default_session_path(),
        }
    }
}

impl BilledConfig {
    /// 環境変数から請求書機能の設定を読み込む
    pub fn from_env() -> Self {
        let test_accounts = parse_test_accounts(&crate::get_env_var_or_default!(
            "BILLED_TEST_ACCOUNTS",
            DEFAULT_TEST_ACCOUNTS
        ));

        let exclude_current_user =
            parse_flag(&crate::get_env_var_or_default!("BILLED_EXCLUDE_CURRENT_USER", "true"))
                .unwrap_or_else(|| {
                    log::warn!(
                        "BILLED_EXCLUDE_CURRENT_USERのパースに失敗しました。trueを使用します"
                    );
                    true
                });

        let file_base_url =
            crate::get_env_var_or_default!("BILLED_FILE_BASE_URL", DEFAULT_FILE_BASE_URL);

        let session_path = crate::get_env_var_optional!("BILLED_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path);

        log::debug!(
            "請求書設定: test_accounts={}, exclude_current_user={exclude_current_user}, session_path={session_path:?}",
            test_accounts.len()
        );

        Self {
            test_accounts,
            exclude_current_user,
            file_base_url,
            session_path,
        }
    }

    /// 設定を検証する
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.file_base_url)
            .map_err(|e| format!("ファイル配信元URLが不正です: {e}"))?;
        Ok(())
    }
}

/// カンマ区切りのテストアカウント一覧を解析する
pub fn parse_test_accounts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 真偽値フラグを解析する
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("billed")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_equality() {
        assert_eq!(Environment::Development, Environment::Development);
        assert_ne!(Environment::Development, Environment::Production);
    }

    #[test]
    fn test_api_config_validate() {
        assert!(ApiConfig::default().validate().is_ok());
        assert!(ApiConfig::default().is_localhost());

        let empty = ApiConfig {
            base_url: String::new(),
            ..ApiConfig::default()
        };
        assert!(empty.validate().is_err());

        let malformed = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(malformed.validate().is_err());

        let zero_timeout = ApiConfig {
            timeout_seconds: 0,
            ..ApiConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_parse_test_accounts() {
        assert_eq!(
            parse_test_accounts(" a@a , b@b,,"),
            vec!["a@a".to_string(), "b@b".to_string()]
        );
        assert!(parse_test_accounts("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("peut-être"), None);
    }

    #[test]
    fn test_billed_config_default() {
        let config = BilledConfig::default();
        assert!(config.exclude_current_user);
        assert_eq!(config.test_accounts.len(), 2);
        assert!(config.session_path.ends_with("billed/session.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initialize_logging_twice() {
        // 二回目の初期化でパニックしないことを確認
        initialize_logging_system();
        initialize_logging_system();
    }
}
