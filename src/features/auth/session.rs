//! Cookie に保存されたセッショントークンの読み取り
//!
//! トークンはJWT形式で、署名は検証せずペイロードの `sub` だけを読む。

use crate::features::auth::models::{AuthError, AuthState, TokenClaims};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};

/// セッショントークンを保存する Cookie 名
pub const AUTH_COOKIE_NAME: &str = "_mcduck_fresh_key";

/// トークンのペイロードをデコードする
///
/// # 引数
/// * `token` - JWT形式のトークン
///
/// # 戻り値
/// デコードしたクレーム
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(AuthError::InvalidToken(
                "セグメント数が不正です".to_string(),
            ))
        }
    };

    // パディング付きで発行されたトークンも受け付ける
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("base64デコードに失敗しました: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidToken(format!("ペイロードの解析に失敗しました: {e}")))
}

/// Cookie の値から認証状態を導出する
///
/// デコードに失敗した場合や `sub` が空の場合は未ログインとして扱い、エラーにはしない。
///
/// # 引数
/// * `raw` - Cookie の値（存在しない場合はNone）
pub fn read_session(raw: Option<&str>) -> AuthState {
    let token = match raw {
        Some(token) if !token.is_empty() => token,
        _ => return AuthState::logged_out(),
    };

    let subject = decode_claims(token).and_then(|claims| {
        claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingSubject)
    });

    match subject {
        Ok(email) => AuthState::logged_in(token, email),
        Err(e) => {
            log::warn!("セッショントークンを読み取れないため未ログインとして扱います: {e}");
            AuthState::logged_out()
        }
    }
}

/// Cookie ヘッダーから指定の Cookie を取り出す（パーセントデコード済み）
///
/// # 引数
/// * `header` - `Cookie` ヘッダーの値
/// * `name` - Cookie 名
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            let value = value.trim_matches('"');
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

/// ログイン時に設定する Cookie
///
/// トークンに `exp` がある場合は残り秒数を `Max-Age` に設定する。
///
/// # 引数
/// * `token` - セッショントークン
/// * `now` - 現在時刻
pub fn login_cookie(token: &str, now: DateTime<Utc>) -> String {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        urlencoding::encode(token)
    );

    if let Ok(TokenClaims { exp: Some(exp), .. }) = decode_claims(token) {
        let max_age = exp.saturating_sub(now.timestamp()).max(0);
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }

    cookie
}

/// サインアウト時に Cookie を失効させる
pub fn signout_cookie() -> String {
    format!(
        "{AUTH_COOKIE_NAME}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax"
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// テスト用の署名なしトークンを作成する
    pub(crate) fn token_with_payload(payload: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_read_session_without_cookie() {
        assert_eq!(read_session(None), AuthState::logged_out());
        assert_eq!(read_session(Some("")), AuthState::logged_out());
    }

    #[test]
    fn test_read_session_with_valid_token() {
        let token = token_with_payload(r#"{"sub":"user@example.com","exp":1700000000}"#);
        let state = read_session(Some(&token));

        assert!(state.logged_in);
        assert_eq!(state.auth_token.as_deref(), Some(token.as_str()));
        assert_eq!(state.user_email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_read_session_tolerates_padding() {
        let header = general_purpose::URL_SAFE.encode("{}");
        let body = general_purpose::URL_SAFE.encode(r#"{"sub":"a@b.c"}"#);
        let token = format!("{header}.{body}.sig");

        assert_eq!(read_session(Some(&token)).user_email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_malformed_tokens_are_logged_out() {
        let cases = [
            "not-a-token".to_string(),
            "a.b".to_string(),
            "a.!!!.c".to_string(),
            token_with_payload("not json"),
            token_with_payload(r#"{"exp":1}"#),
            token_with_payload(r#"{"sub":""}"#),
            token_with_payload(r#"{"sub":42}"#),
        ];

        for token in &cases {
            assert_eq!(read_session(Some(token)), AuthState::logged_out(), "{token}");
        }
    }

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; _mcduck_fresh_key=abc%2Edef; other=1";
        assert_eq!(find_cookie(header, AUTH_COOKIE_NAME).as_deref(), Some("abc.def"));
        assert_eq!(find_cookie(header, "theme").as_deref(), Some("dark"));
        assert_eq!(find_cookie(header, "missing"), None);
        assert_eq!(find_cookie("_mcduck_fresh_key=\"\"", AUTH_COOKIE_NAME).as_deref(), Some(""));
    }

    #[test]
    fn test_login_cookie_sets_max_age_from_exp() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = token_with_payload(r#"{"sub":"a@b.c","exp":1700003600}"#);

        let cookie = login_cookie(&token, now);
        assert!(cookie.starts_with("_mcduck_fresh_key="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("; Max-Age=3600"));

        let without_exp = login_cookie(&token_with_payload(r#"{"sub":"a@b.c"}"#), now);
        assert!(!without_exp.contains("Max-Age"));
    }

    #[test]
    fn test_login_cookie_with_extreme_exp() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let past = login_cookie(
            &token_with_payload(r#"{"sub":"a@b.c","exp":-9223372036854775808}"#),
            now,
        );
        assert!(past.ends_with("; Max-Age=0"));

        let far_future = login_cookie(
            &token_with_payload(r#"{"sub":"a@b.c","exp":9223372036854775807}"#),
            now,
        );
        assert!(far_future.ends_with(&format!("; Max-Age={}", i64::MAX - 1_700_000_000)));
    }

    #[test]
    fn test_signout_cookie_expires() {
        let cookie = signout_cookie();
        assert!(cookie.starts_with("_mcduck_fresh_key=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
