use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 外部サービス（RPCバックエンド）連携でのエラー
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// 認証・セキュリティ関連のエラー
    #[error("セキュリティエラー: {0}")]
    Security(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（セキュリティエラーなど）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::ExternalService(_) => "バックエンドとの通信でエラーが発生しました",
            AppError::Security(_) => "認証エラーが発生しました。再度ログインしてください",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Io(_) => "入出力でエラーが発生しました",
            AppError::Concurrency(_) => "並行処理でエラーが発生しました",
        }
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::ExternalService(_) => ErrorSeverity::Medium,
            AppError::Security(_) => ErrorSeverity::Critical,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Concurrency(_) => ErrorSeverity::High,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - バリデーションエラーメッセージ
    ///
    /// # 戻り値
    /// バリデーションエラー
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    ///
    /// # 戻り値
    /// 外部サービスエラー
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// セキュリティエラーを作成するヘルパー関数
    pub fn security<S: Into<String>>(message: S) -> Self {
        AppError::Security(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
