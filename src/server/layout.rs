//! ページ全体の枠とログイン画面などの固定ページ

use crate::features::auth::AuthState;
use crate::shared::utils::escape;

/// ナビゲーションバーを描画する
///
/// # 引数
/// * `auth` - 認証状態
/// * `current_route` - 現在のパス（選択中のリンクを強調する）
pub fn navbar(auth: &AuthState, current_route: &str) -> String {
    if !auth.logged_in {
        return r#"<nav class="bg-gray-800"><div class="mx-auto max-w-7xl px-6 py-4"><a href="/login" class="text-white text-sm font-medium">Sign in</a></div></nav>"#.to_string();
    }

    let link = |href: &str, label: &str| {
        let class = if current_route.starts_with(href) {
            "bg-gray-900 text-white"
        } else {
            "text-gray-300 hover:bg-gray-700 hover:text-white"
        };
        format!(r#"<a href="{href}" class="{class} rounded-md px-3 py-2 text-sm font-medium">{label}</a>"#)
    };

    format!(
        r#"<nav class="bg-gray-800"><div class="mx-auto max-w-7xl px-6"><div class="relative flex h-16 items-center justify-between"><div class="flex space-x-4">{receipts}</div><div class="flex items-center space-x-4"><span class="text-sm text-gray-300">{email}</span>{signout}</div></div></div></nav>"#,
        receipts = link("/receipts", "Receipts"),
        email = escape(auth.user_email.as_deref().unwrap_or_default()),
        signout = link("/signout", "Sign out"),
    )
}

/// HTMLページ全体を組み立てる
///
/// # 引数
/// * `title` - ページタイトル
/// * `auth` - 認証状態
/// * `current_route` - 現在のパス
/// * `body` - 本文のHTML
pub fn page(title: &str, auth: &AuthState, current_route: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"><title>{title}</title><script src="https://cdn.tailwindcss.com"></script></head><body class="min-h-full">{nav}<main class="mx-auto max-w-7xl p-6">{body}</main></body></html>"#,
        title = escape(title),
        nav = navbar(auth, current_route),
    )
}

/// 未ログイン時のトップページ
pub fn landing() -> String {
    r#"<div class="py-12 text-center"><h1 class="text-3xl font-bold text-gray-900">McDuck</h1><p class="mt-4 text-gray-600">Keep track of your receipts and expenses.</p><a href="/login" class="mt-6 inline-block rounded-md bg-gray-800 px-3 py-1.5 text-sm font-semibold text-white">Sign in</a></div>"#.to_string()
}

/// ログインフォーム
///
/// # 引数
/// * `error` - 直前のログイン失敗時のメッセージ
pub fn login_form(error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<p class="text-sm text-red-600">{}</p>"#, escape(message)))
        .unwrap_or_default();

    format!(
        r#"<div class="flex min-h-full flex-col justify-center px-6 py-12"><div class="sm:mx-auto sm:w-full sm:max-w-sm"><h2 class="mt-10 text-center text-2xl font-bold leading-9 tracking-tight text-gray-900">Sign in to your account</h2></div><div class="mt-10 sm:mx-auto sm:w-full sm:max-w-sm"><form class="space-y-6" action="/login" method="POST">{error}<div><label for="email" class="block text-sm font-medium leading-6 text-gray-900">Email address</label><input id="email" name="email" type="email" autocomplete="email" required class="block w-full rounded-md border-0 py-1.5 ring-1 ring-inset ring-gray-300"></div><div><label for="password" class="block text-sm font-medium leading-6 text-gray-900">Password</label><input id="password" name="password" type="password" autocomplete="current-password" required class="block w-full rounded-md border-0 py-1.5 ring-1 ring-inset ring-gray-300"></div><div><button type="submit" class="flex w-full justify-center rounded-md bg-gray-800 px-3 py-1.5 text-sm font-semibold text-white">Sign in</button></div></form></div></div>"#
    )
}

/// エラー表示
pub fn error_message(message: &str) -> String {
    format!(
        r#"<div class="rounded-md bg-red-50 p-4"><p class="text-sm text-red-700">{}</p></div>"#,
        escape(message)
    )
}
