/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// Connect RPC クライアント
pub mod api_client;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use api_client::{ApiClient, EmptyResponse};
pub use config::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig, ServerConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
