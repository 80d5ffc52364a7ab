/// ページ全体の枠と固定ページ
pub mod layout;
/// リクエストの読み取り
pub mod request;
/// ルーティングとハンドラー
pub mod routes;
/// ページごとのビューモデルの保持
pub mod views;

use crate::shared::errors::AppResult;
use crate::AppState;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use request::RequestParts;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// HTTPサーバーを起動し、Ctrl+C を受けるまで接続を受け付ける
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `addr` - 待ち受けアドレス
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> AppResult<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("HTTPサーバーを開始しました: http://{addr}");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    log::debug!("接続を受け付けました: {peer}");
                    let state = Arc::clone(&state);
                    tokio::spawn(handle_connection(stream, state));
                }
                Err(e) => log::error!("接続受け入れエラー: {e}"),
            },
            _ = &mut shutdown => {
                log::info!("シャットダウンシグナルを受信しました");
                break;
            }
        }
    }

    Ok(())
}

/// TCP接続を処理する
async fn handle_connection(stream: TcpStream, state: Arc<AppState>) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| dispatch(Arc::clone(&state), req));

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        log::error!("HTTP接続処理エラー: {err}");
    }
}

async fn dispatch(state: Arc<AppState>, req: Request<Incoming>) -> Result<Response<String>, Infallible> {
    let path = req.uri().path().to_string();
    let response = match RequestParts::from_hyper(req).await {
        Ok(parts) => routes::handle_request(&state, parts).await,
        Err(e) => routes::error_response(&Default::default(), &path, e),
    };
    Ok(response)
}
