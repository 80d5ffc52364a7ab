pub mod features;
pub mod server;
pub mod shared;

use features::auth::AuthService;
use log::{error, info};
use server::views::ViewRegistry;
use shared::config::{
    initialize_logging_system, load_environment_variables, ApiConfig, EnvironmentConfig,
    ServerConfig,
};
use shared::errors::{AppError, AppResult};
use shared::utils::money::CurrencyFormat;
use shared::ApiClient;
use std::sync::Arc;

/// アプリケーション状態（リクエスト間で共有する）
pub struct AppState {
    /// RPCバックエンドのクライアント
    pub api: Arc<ApiClient>,
    /// ログイン処理
    pub auth_service: AuthService,
    /// 表示中のビュー
    pub views: ViewRegistry,
    /// 金額の表示形式
    pub currency: CurrencyFormat,
}

impl AppState {
    /// アプリケーション状態を作成する
    ///
    /// # 引数
    /// * `api_config` - RPCバックエンドの設定
    /// * `views` - ビューレジストリ
    /// * `currency` - 金額の表示形式
    pub fn new(api_config: ApiConfig, views: ViewRegistry, currency: CurrencyFormat) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new(api_config)?);
        Ok(Self {
            auth_service: AuthService::new(Arc::clone(&api)),
            api,
            views,
            currency,
        })
    }
}

/// 設定を読み込んでHTTPサーバーを実行する
pub fn run() -> AppResult<()> {
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let env_config = EnvironmentConfig::from_env();
    let api_config = ApiConfig::from_env().map_err(|e| {
        error!("API設定の読み込みに失敗しました: {e}");
        AppError::configuration(e.to_string())
    })?;
    let server_config = ServerConfig::from_env();
    let addr = server_config.socket_addr().map_err(AppError::configuration)?;
    let currency = CurrencyFormat::from_env();

    info!(
        "設定を読み込みました: environment={}, api_host={}, currency={}",
        env_config.environment, api_config.base_url, currency.code
    );
    if env_config.is_production() && api_config.is_localhost() {
        log::warn!("本番環境でローカルホストのAPIを使用しています: {}", api_config.base_url);
    }

    let state = Arc::new(AppState::new(
        api_config,
        ViewRegistry::new(server_config.view_ttl()),
        currency,
    )?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    info!("アプリケーション初期化が完了しました");
    runtime.block_on(server::serve(state, addr))
}
