/// 経費機能モジュール
///
/// 領収書に含まれる経費の表示と編集を扱う：
/// - 経費テーブルのビューモデル（選択・インライン編集）
/// - ExpensesService への部分更新
/// - 経費テーブルの描画
pub mod api_client;
pub mod models;
pub mod pages;
pub mod view_model;

pub use api_client::{ExpenseUpdater, ExpensesClient};
pub use models::{Expense, UpdateExpenseRequest};
pub use view_model::{persist_expense_update, ExpenseField, ExpensesTable};
