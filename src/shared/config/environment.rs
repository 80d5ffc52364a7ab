use std::net::SocketAddr;
use std::time::Duration;

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
/// # 引数
/// * `var_name` - 環境変数名
///
/// # 戻り値
/// 環境変数の値、または見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        // 1. 起動時の環境変数を確認
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        }
        // 2. コンパイル時の環境変数を確認
        else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        }
        // 3. どちらも見つからない場合はエラー
        else {
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

/// 環境変数を取得する（デフォルト値付き）
///
/// # 引数
/// * `var_name` - 環境変数名
/// * `default_value` - デフォルト値
///
/// # 戻り値
/// 環境変数の値、または見つからない場合はデフォルト値
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
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == Environment::Development {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            log_level,
        }
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// ログレベル文字列をフィルターに変換する
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
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

    // フォールバック: ビルド設定に基づく判定
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

/// 環境変数の読み込みを行う
///
/// 開発環境（デバッグビルド）の場合のみ.envファイルを読み込む。
/// 本番環境では環境変数は実行時に設定されることを前提とする。
pub fn load_environment_variables() {
    if cfg!(debug_assertions) {
        eprintln!("開発環境: .envファイルを読み込みます");

        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                eprintln!("環境ファイルの読み込みに失敗: {e}");
                eprintln!("環境変数が設定されていることを確認してください");
            }
        }
    } else {
        eprintln!("本番環境: 環境変数は実行時に設定されます");
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    // 二重初期化はテストなどで起こりうるため try_init を使う
    let result = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("ログシステムは既に初期化されています: {e}");
        return;
    }

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}

/// API（RPCバックエンド）設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// RPCバックエンドのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// 読み取り系リクエストの最大リトライ回数
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    ///
    /// # エラー
    /// API_HOST が見つからない場合はエラー
    pub fn from_env() -> Result<Self, EnvVarError> {
        let base_url = crate::get_env_var!("API_HOST")?;

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

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            max_retries,
        })
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合はErr
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("APIサーバーのベースURLが設定されていません".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "APIサーバーのベースURLはhttp(s)で始まる必要があります: {}",
                self.base_url
            ));
        }

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

/// HTTPサーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 待ち受けアドレス
    pub bind_address: String,
    /// 待ち受けポート
    pub port: u16,
    /// 操作のないビューを破棄するまでの時間（秒）
    pub view_ttl_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            view_ttl_seconds: 1800,
        }
    }
}

impl ServerConfig {
    /// 環境変数からサーバー設定を読み込む
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_address = crate::get_env_var_or_default!("BIND_ADDRESS", defaults.bind_address);
        let port = crate::get_env_var_or_default!("PORT", defaults.port)
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("PORTのパースに失敗しました。デフォルト値{}を使用します", defaults.port);
                defaults.port
            });
        let view_ttl_seconds =
            crate::get_env_var_or_default!("VIEW_TTL_SECONDS", defaults.view_ttl_seconds)
                .parse()
                .unwrap_or(defaults.view_ttl_seconds);

        Self {
            bind_address,
            port,
            view_ttl_seconds,
        }
    }

    /// 待ち受けソケットアドレスを取得する
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| format!("待ち受けアドレスが不正です: {e}"))
    }

    /// ビューの保持期間
    pub fn view_ttl(&self) -> Duration {
        Duration::from_secs(self.view_ttl_seconds)
    }
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
    fn test_environment_config_methods() {
        let dev_config = EnvironmentConfig {
            environment: "development".to_string(),
            log_level: "DEBUG".to_string(),
        };

        assert!(!dev_config.is_production());
        assert_eq!(dev_config.level_filter(), log::LevelFilter::Debug);

        let unknown_level = EnvironmentConfig {
            log_level: "verbose".to_string(),
            ..dev_config
        };
        assert_eq!(unknown_level.level_filter(), log::LevelFilter::Info);
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

        let no_scheme = ApiConfig {
            base_url: "api.example.com".to_string(),
            ..ApiConfig::default()
        };
        assert!(no_scheme.validate().is_err());

        let zero_timeout = ApiConfig {
            timeout_seconds: 0,
            ..ApiConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_server_config_socket_addr() {
        let config = ServerConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert_eq!(config.view_ttl(), Duration::from_secs(1800));

        let broken = ServerConfig {
            bind_address: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(broken.socket_addr().is_err());
    }
}
