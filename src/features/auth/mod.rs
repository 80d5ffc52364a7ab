/// 認証機能のモジュール
pub mod middleware;
pub mod models;
pub mod service;
pub mod session;

pub use middleware::{require_user, session_from_headers};
pub use models::{AuthError, AuthState, AuthenticatedUser};
pub use service::AuthService;
pub use session::{login_cookie, read_session, signout_cookie, AUTH_COOKIE_NAME};
