//! Connect RPC クライアント
//!
//! RPCバックエンドとの通信を行う汎用的なクライアント。
//! Connectプロトコルの単項呼び出し（JSONエンコーディング、POST）のみを扱う。
use crate::shared::config::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Connectプロトコルのバージョンヘッダー
const CONNECT_PROTOCOL_VERSION: &str = "1";

/// 本文を持たないレスポンス（UpdateReceiptResponse など）
#[derive(Debug, Default, Deserialize)]
pub struct EmptyResponse {}

/// Connectのエラーレスポンス本文
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectErrorBody {
    /// Connectのエラーコード（例: `invalid_argument`）
    pub code: String,
    /// エラーメッセージ
    #[serde(default)]
    pub message: Option<String>,
}

impl ConnectErrorBody {
    /// HTTPステータスからエラーコードを推定する
    ///
    /// # 引数
    /// * `status_code` - HTTPステータスコード
    /// * `raw_body` - 解析できなかったレスポンス本文
    pub fn from_status(status_code: u16, raw_body: &str) -> Self {
        let code = match status_code {
            400 => "invalid_argument",
            401 => "unauthenticated",
            403 => "permission_denied",
            404 => "unimplemented",
            408 => "deadline_exceeded",
            409 => "aborted",
            412 => "failed_precondition",
            413 => "resource_exhausted",
            429 | 502 | 503 => "unavailable",
            504 => "deadline_exceeded",
            _ => "unknown",
        };

        let message = if raw_body.is_empty() {
            None
        } else {
            Some(raw_body.chars().take(200).collect())
        };

        Self {
            code: code.to_string(),
            message,
        }
    }

    /// AppErrorに変換する
    ///
    /// # 引数
    /// * `procedure` - 呼び出したプロシージャ名
    pub fn into_app_error(self, procedure: &str) -> AppError {
        let message = self.message.unwrap_or_default();
        match self.code.as_str() {
            "unauthenticated" | "permission_denied" => {
                AppError::security(format!("{procedure}: {} {message}", self.code))
            }
            "not_found" => AppError::NotFound(format!("{procedure}: {message}")),
            _ => AppError::ExternalService(format!("{procedure}: {} {message}", self.code)),
        }
    }
}

/// Connect RPC クライアント
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    ///
    /// # 引数
    /// * `config` - API設定
    ///
    /// # 戻り値
    /// APIクライアント、または設定が不正な場合はエラー
    pub fn new(config: ApiConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// プロシージャのURLを組み立てる
    pub fn procedure_url(&self, procedure: &str) -> String {
        format!("{}{procedure}", self.config.base_url)
    }

    /// 単項RPCを1回だけ呼び出す（更新系で使用、リトライしない）
    ///
    /// # 引数
    /// * `procedure` - `/package.Service/Method` 形式のプロシージャ名
    /// * `body` - リクエストメッセージ
    /// * `auth_token` - Bearerトークン
    ///
    /// # 戻り値
    /// レスポンスメッセージ
    pub async fn call<B, T>(
        &self,
        procedure: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("RPC呼び出し: procedure={procedure}");

        let response = self
            .build_request(procedure, body, auth_token)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("{procedure}: 接続に失敗しました: {e}"))
            })?;

        self.read_response(response, procedure).await
    }

    /// 単項RPCを呼び出す（読み取り系で使用、接続失敗時はリトライする）
    pub async fn call_with_retry<B, T>(
        &self,
        procedure: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("RPC呼び出し（リトライあり）: procedure={procedure}");

        let request = self.build_request(procedure, body, auth_token);
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::ExternalService("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => return self.read_response(response, procedure).await,
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "RPC呼び出し失敗、リトライします: procedure={procedure}, attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "{procedure}: 接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    fn build_request<B: Serialize>(
        &self,
        procedure: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .post(self.procedure_url(procedure))
            .header("Connect-Protocol-Version", CONNECT_PROTOCOL_VERSION)
            .json(body);

        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        request
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: Response,
        procedure: &str,
    ) -> AppResult<T> {
        if response.status().is_success() {
            let result: T = response.json().await.map_err(|e| {
                AppError::ExternalService(format!("{procedure}: レスポンス解析エラー: {e}"))
            })?;
            debug!("RPC呼び出し成功: procedure={procedure}");
            return Ok(result);
        }

        let error = Self::handle_error_response(response).await;
        warn!(
            "RPCバックエンドがエラーを返しました: procedure={procedure}, code={}, message={:?}",
            error.code, error.message
        );
        Err(error.into_app_error(procedure))
    }

    /// エラーレスポンスを解析する
    async fn handle_error_response(response: Response) -> ConnectErrorBody {
        let status_code = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        match serde_json::from_str::<ConnectErrorBody>(&response_text) {
            Ok(body) => body,
            Err(_) => ConnectErrorBody::from_status(status_code, &response_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_url() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://localhost:8080".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.procedure_url("/receipts.v1.ReceiptsService/UpdateReceipt"),
            "http://localhost:8080/receipts.v1.ReceiptsService/UpdateReceipt"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = ApiClient::new(ApiConfig {
            base_url: String::new(),
            ..ApiConfig::default()
        });
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_error_body_from_status() {
        let body = ConnectErrorBody::from_status(401, "");
        assert_eq!(body.code, "unauthenticated");
        assert!(body.message.is_none());
        assert!(matches!(
            body.into_app_error("/auth.v1.AuthService/Login"),
            AppError::Security(_)
        ));

        let body = ConnectErrorBody::from_status(503, "upstream down");
        assert_eq!(body.code, "unavailable");
        assert_eq!(body.message.as_deref(), Some("upstream down"));
    }

    #[test]
    fn test_error_body_parsing() {
        let json = r#"{"code":"invalid_argument","message":"receipt with id 7 doesn't exist"}"#;
        let body: ConnectErrorBody = serde_json::from_str(json).unwrap();
        let error = body.into_app_error("/receipts.v1.ReceiptsService/UpdateReceipt");
        assert!(matches!(error, AppError::ExternalService(_)));
        assert!(error.to_string().contains("doesn't exist"));
    }

    #[test]
    fn test_empty_response_parses() {
        let _: EmptyResponse = serde_json::from_str("{}").unwrap();
    }
}
