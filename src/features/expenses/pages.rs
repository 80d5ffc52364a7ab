use super::view_model::{ExpenseField, ExpensesTable};
use crate::features::table::widgets::{checkbox_form, inline_input_form, table, table_row};
use crate::shared::utils::money::CurrencyFormat;

/// 経費テーブルを描画する
///
/// # 引数
/// * `view_path` - ビューのパス（`/views/{id}`）
/// * `expenses` - 経費テーブルのビューモデル
/// * `currency` - 金額の表示形式
pub fn render_expenses_table(view_path: &str, expenses: &ExpensesTable, currency: &CurrencyFormat) -> String {
    let state = expenses.state();

    let headers = [
        checkbox_form(&format!("{view_path}/toggle-all"), state.globally_selected()),
        "Category".to_string(),
        "Subcategory".to_string(),
        "Description".to_string(),
        "Amount".to_string(),
    ];

    let rows: Vec<String> = state
        .displayed_rows()
        .map(|row| {
            let expense = row.record();
            let row_path = format!("{view_path}/rows/{}", expense.id);
            let edit_path = format!("{row_path}/edit");
            let text_cell = |field: ExpenseField, value: &str| {
                inline_input_form(&edit_path, field.as_str(), value, "text")
            };

            table_row(&[
                checkbox_form(&format!("{row_path}/toggle"), row.checked()),
                text_cell(ExpenseField::Category, &expense.category),
                text_cell(ExpenseField::Subcategory, &expense.subcategory),
                text_cell(ExpenseField::Description, &expense.description),
                currency.format(u128::from(expense.amount)),
            ])
        })
        .collect();

    format!(r#"<div class="sm:rounded-lg">{}</div>"#, table(&headers, &rows))
}
