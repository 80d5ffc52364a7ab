//! テーブルで共通に使う入力部品のHTML
//!
//! JavaScriptなしで動くように、各部品は操作ごとに POST する小さなフォームとして描画する。

use crate::shared::utils::escape;

/// 選択チェックボックス（変更時に `action` へ POST する）
///
/// # 引数
/// * `action` - 送信先のパス
/// * `checked` - 現在の選択状態
pub fn checkbox_form(action: &str, checked: bool) -> String {
    format!(
        r#"<form method="post" action="{action}"><input type="checkbox" class="w-4 h-4 rounded" onchange="this.form.submit()"{checked}><noscript><button type="submit">✓</button></noscript></form>"#,
        action = escape(action),
        checked = if checked { " checked" } else { "" },
    )
}

/// インライン編集用の入力欄（確定時に `field` と `value` を POST する）
///
/// # 引数
/// * `action` - 送信先のパス
/// * `field` - 編集対象の項目名
/// * `value` - 現在の値
/// * `input_type` - `text` または `date`
pub fn inline_input_form(action: &str, field: &str, value: &str, input_type: &str) -> String {
    format!(
        r#"<form method="post" action="{action}"><input type="hidden" name="field" value="{field}"><input type="{input_type}" name="value" value="{value}" class="block w-full rounded-md border-0 py-1.5 text-gray-900 ring-1 ring-inset ring-gray-300 sm:text-sm" onchange="this.form.submit()"></form>"#,
        action = escape(action),
        field = escape(field),
        value = escape(value),
        input_type = escape(input_type),
    )
}

/// 表の外枠
///
/// # 引数
/// * `headers` - 見出しセルのHTML
/// * `rows` - 行（`<tr>`）のHTML
pub fn table(headers: &[String], rows: &[String]) -> String {
    let head: String = headers
        .iter()
        .map(|header| format!(r#"<th scope="col" class="px-6 py-3">{header}</th>"#))
        .collect();

    format!(
        r#"<table class="w-full text-sm text-left text-gray-500"><thead class="text-xs text-gray-700 uppercase bg-gray-50"><tr>{head}</tr></thead><tbody>{body}</tbody></table>"#,
        body = rows.concat(),
    )
}

/// 表の1行
pub fn table_row(cells: &[String]) -> String {
    let cells: String = cells
        .iter()
        .map(|cell| format!(r#"<td class="px-6 py-4">{cell}</td>"#))
        .collect();
    format!(r#"<tr class="bg-white border-b">{cells}</tr>"#)
}
