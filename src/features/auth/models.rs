use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};

/// リクエストごとの認証状態
///
/// トークンは署名を検証せずにデコードするだけなので、`user_email` は
/// 表示とビューの所有者判定にのみ使う。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// ログイン済みフラグ
    pub logged_in: bool,
    /// セッショントークン（RPCのBearerトークン）
    pub auth_token: Option<String>,
    /// トークンの `sub` クレーム
    pub user_email: Option<String>,
}

impl AuthState {
    /// 未ログイン状態
    pub fn logged_out() -> Self {
        Self::default()
    }

    /// ログイン済み状態
    pub fn logged_in(auth_token: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            auth_token: Some(auth_token.into()),
            user_email: Some(user_email.into()),
        }
    }
}

/// ログイン済みであることが確認されたユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub auth_token: String,
}

/// トークンのペイロードから読み取るクレーム
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// ユーザーのメールアドレス
    #[serde(default)]
    pub sub: Option<String>,
    /// 有効期限（UNIX秒）
    #[serde(default)]
    pub exp: Option<i64>,
}

/// `auth.v1.LoginRequest`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `auth.v1.LoginResponse`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
}

/// 認証エラーの種類
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// トークンの形式が不正
    #[error("無効なトークン: {0}")]
    InvalidToken(String),

    /// トークンに `sub` クレームがない
    #[error("トークンにユーザー情報が含まれていません")]
    MissingSubject,

    /// 入力値エラー
    #[error("入力エラー: {0}")]
    InvalidInput(String),

    /// ログインに失敗した
    #[error("ログインに失敗しました: {0}")]
    LoginFailed(String),

    /// 認証が必要エラー
    #[error("認証が必要です")]
    AuthenticationRequired,
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput(msg) => AppError::Validation(msg),
            other => AppError::Security(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_state_constructors() {
        let state = AuthState::logged_out();
        assert!(!state.logged_in);
        assert!(state.auth_token.is_none());

        let state = AuthState::logged_in("token", "user@example.com");
        assert!(state.logged_in);
        assert_eq!(state.user_email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_auth_error_conversion() {
        assert!(matches!(
            AppError::from(AuthError::InvalidInput("email".to_string())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::AuthenticationRequired),
            AppError::Security(_)
        ));
    }
}
