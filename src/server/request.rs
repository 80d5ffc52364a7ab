use crate::shared::errors::{AppError, AppResult};
use http_body_util::{BodyExt, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::{Method, Request};
use std::collections::HashMap;

/// フォーム本文の最大サイズ
const MAX_BODY_BYTES: usize = 64 * 1024;

/// ルーティングに必要なリクエストの要素
///
/// 本文は読み取り済みで保持するので、ハンドラーは接続に依存しない。
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RequestParts {
    /// 本文なしのリクエストを作成する
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// hyper のリクエストから本文を読み取る
    pub async fn from_hyper(req: Request<Incoming>) -> AppResult<Self> {
        let (parts, body) = req.into_parts();
        let body = Limited::new(body, MAX_BODY_BYTES)
            .collect()
            .await
            .map_err(|e| AppError::validation(format!("リクエスト本文を読み取れません: {e}")))?
            .to_bytes();

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            body,
        })
    }

    /// `application/x-www-form-urlencoded` の本文を解析する
    ///
    /// 同じキーが複数ある場合は最後の値を使う。
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// パスをセグメントに分割する
    pub fn segments(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}
