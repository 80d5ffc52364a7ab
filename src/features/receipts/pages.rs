use super::models::{Receipt, ReceiptStatus};
use super::status_selector::SelectorState;
use super::view_model::{ReceiptField, ReceiptForm, ReceiptsTable};
use crate::features::expenses::pages::render_expenses_table;
use crate::features::expenses::view_model::ExpensesTable;
use crate::features::table::widgets::{checkbox_form, inline_input_form, table, table_row};
use crate::shared::utils::escape;
use crate::shared::utils::money::CurrencyFormat;

fn status_badge(status: ReceiptStatus, selected: bool) -> String {
    let font = if selected { "font-semibold" } else { "font-normal" };
    format!(
        r#"<div class="flex items-center"><div class="h-2.5 w-2.5 rounded-full {color} me-2"></div><span class="ml-3 block truncate {font}">{label}</span></div>"#,
        color = status.color_class(),
        label = status.label(),
    )
}

/// ステータスのドロップダウンを描画する
///
/// 閉じているときは現在のステータスだけを表示し、開いているときは選択肢を並べる。
///
/// # 引数
/// * `row_path` - 行のパス（`/views/{id}/rows/{row}`）
/// * `current` - 現在のステータス
/// * `state` - ドロップダウンの開閉状態
pub fn render_status_selector(row_path: &str, current: ReceiptStatus, state: SelectorState) -> String {
    let button = format!(
        r#"<form method="post" action="{path}/status-selector"><button type="submit" aria-haspopup="listbox" aria-expanded="{expanded}" class="relative w-full rounded-md bg-white py-1.5 pl-3 pr-10 text-left ring-1 ring-inset ring-gray-300">{badge}</button></form>"#,
        path = escape(row_path),
        expanded = state.is_open(),
        badge = status_badge(current, false),
    );

    if !state.is_open() {
        return format!(r#"<div class="relative mt-2">{button}</div>"#);
    }

    let options: String = ReceiptStatus::SELECTABLE
        .iter()
        .map(|&status| {
            format!(
                r#"<li role="option"><form method="post" action="{path}/status"><input type="hidden" name="status" value="{value}"><button type="submit" class="w-full py-2 pl-3 pr-9 text-left hover:bg-gray-100">{badge}</button></form></li>"#,
                path = escape(row_path),
                value = status.as_str(),
                badge = status_badge(status, status == current),
            )
        })
        .collect();

    format!(
        r#"<div class="relative mt-2">{button}<ul role="listbox" class="absolute z-10 mt-1 w-full rounded-md bg-white py-1 shadow-lg">{options}</ul></div>"#
    )
}

fn date_value(receipt: &Receipt) -> String {
    receipt
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// 領収書一覧テーブルを描画する
///
/// # 引数
/// * `view_path` - ビューのパス（`/views/{id}`）
/// * `receipts` - 領収書テーブルのビューモデル
/// * `currency` - 金額の表示形式
pub fn render_receipts_table(view_path: &str, receipts: &ReceiptsTable, currency: &CurrencyFormat) -> String {
    let state = receipts.state();

    let search = format!(
        r#"<form method="post" action="{path}/search" class="pb-4"><input type="search" name="q" value="{q}" placeholder="Search for receipts" class="block w-80 rounded-lg border border-gray-300 p-2 text-sm"></form>"#,
        path = escape(view_path),
        q = escape(state.search_text()),
    );

    let headers = [
        checkbox_form(&format!("{view_path}/toggle-all"), state.globally_selected()),
        "Date".to_string(),
        "Vendor".to_string(),
        "Amount".to_string(),
        "Status".to_string(),
        "Action".to_string(),
    ];

    let rows: Vec<String> = state
        .displayed_rows()
        .map(|row| {
            let receipt = row.record();
            let row_path = format!("{view_path}/rows/{}", receipt.id);
            let edit_path = format!("{row_path}/edit");

            table_row(&[
                checkbox_form(&format!("{row_path}/toggle"), row.checked()),
                inline_input_form(&edit_path, ReceiptField::Date.as_str(), &date_value(receipt), "date"),
                inline_input_form(&edit_path, ReceiptField::Vendor.as_str(), &receipt.vendor, "text"),
                currency.format(receipt.total_minor_units()),
                render_status_selector(&row_path, receipt.status, receipts.selector_state(receipt.id)),
                format!(
                    r#"<a href="/receipts/{}" class="font-medium text-blue-600 hover:underline">View</a>"#,
                    receipt.id
                ),
            ])
        })
        .collect();

    let summary = format!(
        r#"<p class="mt-2 text-sm text-gray-500">{} / {} receipts, {} selected</p>"#,
        state.displayed_count(),
        state.len(),
        state.checked_count(),
    );

    format!(
        r#"<div class="sm:rounded-lg">{search}{}{summary}</div>"#,
        table(&headers, &rows)
    )
}

/// 領収書詳細のフォームを描画する
///
/// # 引数
/// * `form_path` - フォームの操作先（`/views/{id}/rows/{receipt}`）
/// * `form` - フォームのビューモデル
pub fn render_receipt_form(form_path: &str, form: &ReceiptForm) -> String {
    let receipt = form.receipt();
    let edit_path = format!("{form_path}/edit");

    format!(
        r#"<div><h2 class="text-base font-semibold leading-7 text-gray-900">Receipt Information</h2><p class="mt-1 text-sm leading-6 text-gray-600">Updating the date of the receipt will update the date of all the expenses.</p><div class="mt-10 grid grid-cols-1 gap-x-6 gap-y-8 sm:grid-cols-3"><div class="mt-2 col-span-1"><label class="block text-sm font-medium">Vendor</label>{vendor}</div><div class="mt-2 col-span-1"><label class="block text-sm font-medium">Status</label>{status}</div><div class="mt-2 col-start-1"><label class="block text-sm font-medium">Date</label>{date}</div></div></div>"#,
        vendor = inline_input_form(&edit_path, ReceiptField::Vendor.as_str(), &receipt.vendor, "text"),
        status = render_status_selector(form_path, receipt.status, form.selector_state()),
        date = inline_input_form(&edit_path, ReceiptField::Date.as_str(), &date_value(receipt), "date"),
    )
}

/// 領収書詳細ページの本文を描画する
///
/// # 引数
/// * `view_path` - ビューのパス（`/views/{id}`）
/// * `form` - 領収書フォーム
/// * `expenses` - 領収書に含まれる経費のテーブル
/// * `currency` - 金額の表示形式
pub fn render_receipt_detail(
    view_path: &str,
    form: &ReceiptForm,
    expenses: &ExpensesTable,
    currency: &CurrencyFormat,
) -> String {
    let receipt = form.receipt();
    let image = receipt
        .image
        .as_deref()
        .map(|data| {
            format!(
                r#"<img class="object-contain" src="data:image/png;base64,{}" alt="Receipt image">"#,
                escape(data)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="m-6"><h2 class="text-2xl font-bold leading-7 text-gray-900">Receipt #{id}</h2><div class="mt-10 grid grid-cols-3 gap-4 items-center"><div class="col-span-1">{image}</div><div class="col-span-2 p-5">{form}<div class="mt-10"><h2 class="text-base font-semibold leading-7 text-gray-900">Expenses</h2><p class="text-sm text-gray-600">Total: {total}</p><div class="mt-2">{expenses}</div></div></div></div></div>"#,
        id = receipt.id,
        form = render_receipt_form(&format!("{view_path}/rows/{}", receipt.id), form),
        total = currency.format(receipt.total_minor_units()),
        expenses = render_expenses_table(view_path, expenses, currency),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expenses::models::Expense;
    use chrono::NaiveDate;

    fn receipt(id: u64, vendor: &str, status: ReceiptStatus, amounts: &[u64]) -> Receipt {
        Receipt {
            id,
            status,
            vendor: vendor.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            expenses: amounts
                .iter()
                .enumerate()
                .map(|(i, &amount)| Expense {
                    id: id * 100 + i as u64,
                    date: None,
                    category: String::new(),
                    subcategory: String::new(),
                    description: format!("item {i}"),
                    amount,
                })
                .collect(),
            image: None,
        }
    }

    #[test]
    fn test_closed_selector_shows_only_current_status() {
        let html = render_status_selector("/views/v/rows/1", ReceiptStatus::PendingReview, SelectorState::Closed);
        assert!(html.contains("Pending Review"));
        assert!(!html.contains("role=\"listbox\""));
    }

    #[test]
    fn test_open_selector_lists_selectable_statuses() {
        let html = render_status_selector("/views/v/rows/1", ReceiptStatus::Unknown, SelectorState::Open);
        assert!(html.contains("N/a"));
        assert!(html.contains(r#"value="pending_review""#));
        assert!(html.contains(r#"value="reviewed""#));
        assert!(!html.contains(r#"value="unknown""#));
    }

    #[test]
    fn test_render_receipts_table_hides_filtered_rows() {
        let mut table = ReceiptsTable::new(vec![
            receipt(1, "Acme", ReceiptStatus::PendingReview, &[1050, 250]),
            receipt(2, "Other", ReceiptStatus::Reviewed, &[]),
        ]);
        table.set_search_text("acme");

        let html = render_receipts_table("/views/v", &table, &CurrencyFormat::euro_de());
        assert!(html.contains(r#"value="Acme""#));
        assert!(!html.contains(r#"value="Other""#));
        assert!(html.contains("13,00\u{a0}€"));
        assert!(html.contains(r#"value="2024-03-01""#));
        assert!(html.contains(r#"name="q" value="acme""#));
        assert!(html.contains("1 / 2 receipts, 0 selected"));
    }

    #[test]
    fn test_render_receipt_detail() {
        let mut receipt = receipt(7, "Acme", ReceiptStatus::Reviewed, &[1050, 250]);
        receipt.image = Some("aGVsbG8=".to_string());
        let expenses = ExpensesTable::new(receipt.expenses.clone());
        let form = ReceiptForm::new(receipt);

        let html = render_receipt_detail("/views/v", &form, &expenses, &CurrencyFormat::usd_en());
        assert!(html.contains("Receipt #7"));
        assert!(html.contains("data:image/png;base64,aGVsbG8="));
        assert!(html.contains(r#"action="/views/v/rows/7/edit""#));
        assert!(html.contains(r#"action="/views/v/rows/700/edit""#));
        assert!(html.contains("Total: $13.00"));
    }
}
