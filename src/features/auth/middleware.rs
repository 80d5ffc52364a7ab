use crate::features::auth::models::{AuthError, AuthState, AuthenticatedUser};
use crate::features::auth::session::{find_cookie, read_session, AUTH_COOKIE_NAME};
use hyper::header::{HeaderMap, COOKIE};

/// リクエストヘッダーから認証状態を取得する
///
/// `Cookie` ヘッダーが複数ある場合は先に見つかったセッション Cookie を使う。
///
/// # 引数
/// * `headers` - リクエストヘッダー
/// * `request_path` - ログ用のリクエストパス
pub fn session_from_headers(headers: &HeaderMap, request_path: &str) -> AuthState {
    let token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| find_cookie(header, AUTH_COOKIE_NAME));

    let state = read_session(token.as_deref());
    log::debug!(
        "認証ミドルウェア: path={request_path}, logged_in={}",
        state.logged_in
    );
    state
}

/// ログイン済みのユーザーを取り出す
///
/// # 引数
/// * `state` - 認証状態
///
/// # 戻り値
/// ログイン済みであればユーザー情報
pub fn require_user(state: &AuthState) -> Result<AuthenticatedUser, AuthError> {
    match (state.logged_in, &state.auth_token, &state.user_email) {
        (true, Some(auth_token), Some(email)) => Ok(AuthenticatedUser {
            email: email.clone(),
            auth_token: auth_token.clone(),
        }),
        _ => Err(AuthError::AuthenticationRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::session::tests::token_with_payload;
    use hyper::header::HeaderValue;

    #[test]
    fn test_session_from_headers() {
        let token = token_with_payload(r#"{"sub":"user@example.com"}"#);
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_str(&format!("{AUTH_COOKIE_NAME}={token}")).unwrap(),
        );

        let state = session_from_headers(&headers, "/receipts");
        assert!(state.logged_in);

        let user = require_user(&state).unwrap();
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.auth_token, token);
    }

    #[test]
    fn test_missing_cookie_requires_login() {
        let state = session_from_headers(&HeaderMap::new(), "/receipts");
        assert!(!state.logged_in);
        assert!(matches!(
            require_user(&state),
            Err(AuthError::AuthenticationRequired)
        ));
    }
}
