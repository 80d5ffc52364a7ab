use super::api_client::ExpenseUpdater;
use super::models::{Expense, UpdateExpenseRequest};
use crate::features::table::edit::{check_text_edit, finish_persist};
use crate::features::table::{EditOutcome, IgnoreReason, RecordId, TableState};
use std::fmt;
use std::str::FromStr;

/// 経費テーブルでインライン編集できる列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Category,
    Subcategory,
    Description,
}

impl ExpenseField {
    /// フォームで使う列名
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseField::Category => "category",
            ExpenseField::Subcategory => "subcategory",
            ExpenseField::Description => "description",
        }
    }

    fn current_value<'a>(&self, expense: &'a Expense) -> &'a str {
        match self {
            ExpenseField::Category => &expense.category,
            ExpenseField::Subcategory => &expense.subcategory,
            ExpenseField::Description => &expense.description,
        }
    }

    fn apply(&self, expense: &mut Expense, value: &str) {
        let slot = match self {
            ExpenseField::Category => &mut expense.category,
            ExpenseField::Subcategory => &mut expense.subcategory,
            ExpenseField::Description => &mut expense.description,
        };
        *slot = value.to_string();
    }
}

impl fmt::Display for ExpenseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(ExpenseField::Category),
            "subcategory" => Ok(ExpenseField::Subcategory),
            "description" => Ok(ExpenseField::Description),
            other => Err(format!("未知の経費フィールドです: {other}")),
        }
    }
}

/// 経費テーブルのビューモデル
#[derive(Debug, Clone)]
pub struct ExpensesTable {
    state: TableState<Expense>,
}

impl ExpensesTable {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            state: TableState::new(expenses),
        }
    }

    /// テーブル状態（描画用）
    pub fn state(&self) -> &TableState<Expense> {
        &self.state
    }

    pub fn toggle_global_selection(&mut self) {
        self.state.toggle_global_selection();
    }

    pub fn toggle_row_checked(&mut self, id: RecordId) -> bool {
        self.state.toggle_row_checked(id)
    }

    /// 編集を検証し、ローカルの行に反映する
    ///
    /// # 引数
    /// * `id` - 対象の経費ID
    /// * `field` - 編集された列
    /// * `value` - 入力値
    ///
    /// # 戻り値
    /// バックエンドへ送る部分更新リクエスト、または無視した理由
    pub fn stage_field_edit(
        &mut self,
        id: RecordId,
        field: ExpenseField,
        value: &str,
    ) -> Result<UpdateExpenseRequest, IgnoreReason> {
        let row = self.state.row(id).ok_or(IgnoreReason::UnknownRow)?;
        check_text_edit(value, field.current_value(row.record()))?;

        self.state
            .update_record(id, |expense| field.apply(expense, value))
            .ok_or(IgnoreReason::UnknownRow)?;

        let mut request = UpdateExpenseRequest::for_id(id);
        let changed = Some(value.to_string());
        match field {
            ExpenseField::Category => request.category = changed,
            ExpenseField::Subcategory => request.subcategory = changed,
            ExpenseField::Description => request.description = changed,
        }
        Ok(request)
    }

    /// 編集を確定する（ローカル反映後にバックエンドへ保存）
    pub async fn commit_field_edit<U: ExpenseUpdater>(
        &mut self,
        updater: &U,
        id: RecordId,
        field: ExpenseField,
        value: &str,
    ) -> EditOutcome {
        match self.stage_field_edit(id, field, value) {
            Ok(request) => persist_expense_update(updater, request).await,
            Err(reason) => {
                log::debug!("経費の編集を無視しました: id={id}, field={field}, reason={reason:?}");
                EditOutcome::Ignored(reason)
            }
        }
    }
}

/// 部分更新リクエストをバックエンドへ送る
///
/// 失敗してもリトライ・巻き戻しはしない。
pub async fn persist_expense_update<U: ExpenseUpdater>(
    updater: &U,
    request: UpdateExpenseRequest,
) -> EditOutcome {
    let id = request.id;
    finish_persist(updater.update_expense(request).await, "経費", id)
}
