use super::layout::{error_message, landing, login_form, page};
use super::request::RequestParts;
use super::views::{lock_view, PendingUpdate, View};
use crate::features::auth::{
    login_cookie, require_user, session_from_headers, signout_cookie, AuthState, AuthenticatedUser,
};
use crate::features::expenses::{persist_expense_update, ExpensesClient};
use crate::features::receipts::pages::{render_receipt_detail, render_receipts_table};
use crate::features::receipts::{
    persist_receipt_update, ListReceiptsSince, ReceiptForm, ReceiptStatus, ReceiptsClient, ReceiptsTable,
};
use crate::features::table::{IgnoreReason, RecordId};
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use crate::AppState;
use chrono::Utc;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION, SET_COOKIE};
use hyper::{Method, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// リクエストを振り分けて応答を作成する
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `req` - 本文を読み取り済みのリクエスト
pub async fn handle_request(state: &Arc<AppState>, req: RequestParts) -> Response<String> {
    let auth = session_from_headers(&req.headers, &req.path);
    log::info!("{} {}", req.method, req.path);

    let result = match (&req.method, req.segments().as_slice()) {
        (&Method::GET, []) => Ok(index(&auth)),
        (&Method::GET, ["login"]) => Ok(login_page(&auth)),
        (&Method::POST, ["login"]) => Ok(login(state, &req).await),
        (&Method::GET, ["signout"]) => Ok(signout()),
        (&Method::GET, ["receipts"]) => match require_user(&auth) {
            Ok(user) => list_receipts(state, &auth, &user).await,
            Err(_) => Ok(redirect("/login")),
        },
        (&Method::GET, ["receipts", id]) => match require_user(&auth) {
            Ok(user) => show_receipt(state, &auth, &user, id).await,
            Err(_) => Ok(redirect("/login")),
        },
        (&Method::GET, ["views", view_id]) => match require_user(&auth) {
            Ok(user) => show_view(state, &auth, &user, view_id),
            Err(_) => Ok(redirect("/login")),
        },
        (&Method::POST, ["views", view_id, action @ ..]) => match require_user(&auth) {
            Ok(user) => view_action(state, &user, view_id, action, &req.form()),
            Err(_) => Ok(redirect("/login")),
        },
        _ => Err(AppError::not_found(format!("ページ {}", req.path))),
    };

    result.unwrap_or_else(|e| error_response(&auth, &req.path, e))
}

fn html(status: StatusCode, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
}

fn redirect(location: &str) -> Response<String> {
    let mut response = Response::new(String::new());
    *response.status_mut() = StatusCode::SEE_OTHER;
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    response.headers_mut().insert(LOCATION, location);
    response
}

fn with_cookie(mut response: Response<String>, cookie: &str) -> Response<String> {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => log::error!("Cookieヘッダーを作成できません: {e}"),
    }
    response
}

/// エラーを応答に変換する
///
/// バックエンドが認証エラーを返した場合はセッションを破棄してログイン画面へ戻す。
pub fn error_response(auth: &AuthState, path: &str, error: AppError) -> Response<String> {
    match error.severity() {
        ErrorSeverity::Low => log::warn!("リクエスト処理エラー: path={path}, error={error}"),
        _ => log::error!("リクエスト処理エラー: path={path}, error={error}"),
    }

    let status = match &error {
        AppError::Security(_) => {
            return with_cookie(redirect("/login"), &signout_cookie());
        }
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    html(
        status,
        page("Error", auth, path, &error_message(error.user_message())),
    )
}

fn index(auth: &AuthState) -> Response<String> {
    if auth.logged_in {
        return redirect("/receipts");
    }
    html(StatusCode::OK, page("McDuck", auth, "/", &landing()))
}

fn login_page(auth: &AuthState) -> Response<String> {
    if auth.logged_in {
        return redirect("/");
    }
    html(StatusCode::OK, page("Sign in", auth, "/login", &login_form(None)))
}

async fn login(state: &Arc<AppState>, req: &RequestParts) -> Response<String> {
    let form = req.form();
    let email = form.get("email").map(String::as_str).unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();

    match state.auth_service.login(email, password).await {
        Ok(token) => with_cookie(redirect("/"), &login_cookie(&token, Utc::now())),
        Err(e) => {
            log::warn!("ログインに失敗しました: {e}");
            let status = match e {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::Security(_) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            let auth = AuthState::logged_out();
            html(status, page("Sign in", &auth, "/login", &login_form(Some(e.user_message()))))
        }
    }
}

fn signout() -> Response<String> {
    log::info!("サインアウトしました");
    with_cookie(redirect("/"), &signout_cookie())
}

fn render_view(state: &AppState, auth: &AuthState, view_id: Uuid, view: &View) -> String {
    let view_path = format!("/views/{view_id}");
    match view {
        View::ReceiptList(table) => page(
            "Receipts",
            auth,
            "/receipts",
            &render_receipts_table(&view_path, table, &state.currency),
        ),
        View::ReceiptDetail(detail) => page(
            &format!("Receipt #{}", detail.form.receipt().id),
            auth,
            "/receipts",
            &render_receipt_detail(&view_path, &detail.form, &detail.expenses, &state.currency),
        ),
    }
}

fn open_view(state: &AppState, auth: &AuthState, user: &AuthenticatedUser, view: View) -> AppResult<Response<String>> {
    let view_id = state.views.insert(&user.email, view.clone())?;
    Ok(html(StatusCode::OK, render_view(state, auth, view_id, &view)))
}

async fn list_receipts(
    state: &Arc<AppState>,
    auth: &AuthState,
    user: &AuthenticatedUser,
) -> AppResult<Response<String>> {
    let client = ReceiptsClient::new(Arc::clone(&state.api), &user.auth_token);
    let receipts = client.list_receipts(ListReceiptsSince::AllTime).await?;
    open_view(state, auth, user, View::ReceiptList(ReceiptsTable::new(receipts)))
}

async fn show_receipt(
    state: &Arc<AppState>,
    auth: &AuthState,
    user: &AuthenticatedUser,
    id: &str,
) -> AppResult<Response<String>> {
    let id: RecordId = id
        .parse()
        .map_err(|_| AppError::not_found(format!("領収書 {id}")))?;

    let client = ReceiptsClient::new(Arc::clone(&state.api), &user.auth_token);
    let receipt = client.get_receipt(id).await?;
    open_view(state, auth, user, View::receipt_detail(ReceiptForm::new(receipt)))
}

fn show_view(
    state: &Arc<AppState>,
    auth: &AuthState,
    user: &AuthenticatedUser,
    view_id: &str,
) -> AppResult<Response<String>> {
    let Some((view_id, view)) = find_view(state, user, view_id)? else {
        return Ok(redirect("/receipts"));
    };

    let body = {
        let view = lock_view(&view)?;
        render_view(state, auth, view_id, &view)
    };
    Ok(html(StatusCode::OK, body))
}

/// 期限切れ・他ユーザーのビューは見つからなかったものとして扱う
fn find_view(
    state: &AppState,
    user: &AuthenticatedUser,
    view_id: &str,
) -> AppResult<Option<(Uuid, Arc<std::sync::Mutex<View>>)>> {
    let Ok(view_id) = Uuid::parse_str(view_id) else {
        log::debug!("不正なビューIDです: {view_id}");
        return Ok(None);
    };
    Ok(state.views.get(view_id, &user.email)?.map(|view| (view_id, view)))
}

fn parse_row_id(raw: &str) -> AppResult<RecordId> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("不正な行IDです: {raw}")))
}

/// ビューへの操作を適用して、ビューの表示へリダイレクトする
fn view_action(
    state: &Arc<AppState>,
    user: &AuthenticatedUser,
    view_id: &str,
    action: &[&str],
    form: &HashMap<String, String>,
) -> AppResult<Response<String>> {
    let Some((view_id, view)) = find_view(state, user, view_id)? else {
        return Ok(redirect("/receipts"));
    };
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();

    let staged: Option<Result<PendingUpdate, IgnoreReason>> = {
        let mut view = lock_view(&view)?;
        match action {
            ["search"] => {
                view.set_search_text(field("q"));
                None
            }
            ["toggle-all"] => {
                view.toggle_global_selection();
                None
            }
            ["rows", id, "toggle"] => {
                view.toggle_row_checked(parse_row_id(id)?);
                None
            }
            ["rows", id, "status-selector"] => {
                view.toggle_status_selector(parse_row_id(id)?);
                None
            }
            ["rows", id, "edit"] => Some(view.stage_edit(parse_row_id(id)?, field("field"), field("value"))),
            ["rows", id, "status"] => {
                let id = parse_row_id(id)?;
                Some(
                    field("status")
                        .parse::<ReceiptStatus>()
                        .map_err(IgnoreReason::InvalidValue)
                        .and_then(|status| view.stage_status(id, status)),
                )
            }
            _ => return Err(AppError::not_found(format!("ビュー操作 {}", action.join("/")))),
        }
    };

    match staged {
        Some(Ok(update)) => spawn_persist(state, &user.auth_token, update),
        Some(Err(reason)) => log::debug!("編集を適用しませんでした: view={view_id}, reason={reason:?}"),
        None => {}
    }

    Ok(redirect(&format!("/views/{view_id}")))
}

/// ローカルに反映済みの更新をバックグラウンドで保存する
///
/// ビューのロックは保持しない。保存の失敗はログに残すだけで画面には反映しない。
fn spawn_persist(state: &AppState, auth_token: &str, update: PendingUpdate) {
    match update {
        PendingUpdate::Receipt(request) => {
            let client = ReceiptsClient::new(Arc::clone(&state.api), auth_token);
            tokio::spawn(async move {
                persist_receipt_update(&client, request).await;
            });
        }
        PendingUpdate::Expense(request) => {
            let client = ExpensesClient::new(Arc::clone(&state.api), auth_token);
            tokio::spawn(async move {
                persist_expense_update(&client, request).await;
            });
        }
    }
}
