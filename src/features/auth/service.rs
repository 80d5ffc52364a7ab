use crate::features::auth::models::{AuthError, LoginRequest, LoginResponse};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use std::sync::Arc;

/// `Login` プロシージャ
pub const LOGIN_PROCEDURE: &str = "/auth.v1.AuthService/Login";

/// AuthService との通信を行うサービス
#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// メールアドレスとパスワードでログインする
    ///
    /// # 引数
    /// * `email` - メールアドレス
    /// * `password` - パスワード
    ///
    /// # 戻り値
    /// セッショントークン
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let request = validate_login_input(email, password)?;

        log::info!("ログインを開始します: email={}", request.email);
        let response: LoginResponse = self.api.call(LOGIN_PROCEDURE, &request, None).await?;

        if response.token.is_empty() {
            return Err(AuthError::LoginFailed("トークンが返されませんでした".to_string()).into());
        }

        log::info!("ログインに成功しました: email={}", request.email);
        Ok(response.token)
    }
}

/// ログインフォームの入力を検証する
fn validate_login_input(email: &str, password: &str) -> Result<LoginRequest, AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidInput(
            "メールアドレスを入力してください".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput(
            "パスワードを入力してください".to_string(),
        ));
    }

    Ok(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}
