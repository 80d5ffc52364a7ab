//! 表示中のページごとのビューモデルを保持するレジストリ
//!
//! ページを開くたびにランダムなビューIDを払い出し、以降のフォーム送信は
//! そのIDでビューモデルを引き当てる。一定時間操作のないビューは破棄する。

use crate::features::expenses::{ExpenseField, ExpensesTable, UpdateExpenseRequest};
use crate::features::receipts::{
    ReceiptField, ReceiptForm, ReceiptStatus, ReceiptsTable, UpdateReceiptRequest,
};
use crate::features::table::{IgnoreReason, RecordId};
use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// 領収書詳細ページのビューモデル
#[derive(Debug, Clone)]
pub struct ReceiptDetail {
    pub form: ReceiptForm,
    pub expenses: ExpensesTable,
}

/// 1ページ分のビューモデル
#[derive(Debug, Clone)]
pub enum View {
    ReceiptList(ReceiptsTable),
    ReceiptDetail(ReceiptDetail),
}

/// ローカルに反映済みで、バックエンドへの保存を待つ更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingUpdate {
    Receipt(UpdateReceiptRequest),
    Expense(UpdateExpenseRequest),
}

impl View {
    /// 領収書詳細のビューを作成する
    pub fn receipt_detail(form: ReceiptForm) -> Self {
        let expenses = ExpensesTable::new(form.receipt().expenses.clone());
        View::ReceiptDetail(ReceiptDetail { form, expenses })
    }

    pub fn set_search_text(&mut self, text: &str) {
        match self {
            View::ReceiptList(table) => table.set_search_text(text),
            View::ReceiptDetail(detail) => {
                // 経費テーブルには検索ボックスがない
                detail.form.close_status_selector();
                log::debug!("領収書詳細では検索を受け付けません");
            }
        }
    }

    pub fn toggle_global_selection(&mut self) {
        match self {
            View::ReceiptList(table) => table.toggle_global_selection(),
            View::ReceiptDetail(detail) => {
                detail.form.close_status_selector();
                detail.expenses.toggle_global_selection();
            }
        }
    }

    pub fn toggle_row_checked(&mut self, id: RecordId) -> bool {
        match self {
            View::ReceiptList(table) => table.toggle_row_checked(id),
            View::ReceiptDetail(detail) => {
                detail.form.close_status_selector();
                detail.expenses.toggle_row_checked(id)
            }
        }
    }

    pub fn toggle_status_selector(&mut self, id: RecordId) -> bool {
        match self {
            View::ReceiptList(table) => table.toggle_status_selector(id),
            View::ReceiptDetail(detail) if detail.form.receipt().id == id => {
                detail.form.toggle_status_selector();
                true
            }
            View::ReceiptDetail(detail) => {
                detail.form.close_status_selector();
                false
            }
        }
    }

    /// インライン編集を検証してローカルに反映する
    ///
    /// 領収書詳細では、領収書の項目名ならフォーム、それ以外は経費テーブルへの編集として扱う。
    ///
    /// # 引数
    /// * `id` - 対象のレコードID
    /// * `field` - フォームから送られた項目名
    /// * `value` - 入力値
    pub fn stage_edit(&mut self, id: RecordId, field: &str, value: &str) -> Result<PendingUpdate, IgnoreReason> {
        match self {
            View::ReceiptList(table) => {
                let field = parse_field::<ReceiptField>(field)?;
                table.stage_field_edit(id, field, value).map(PendingUpdate::Receipt)
            }
            View::ReceiptDetail(detail) => {
                if let Ok(receipt_field) = field.parse::<ReceiptField>() {
                    if detail.form.receipt().id != id {
                        return Err(IgnoreReason::UnknownRow);
                    }
                    return detail
                        .form
                        .stage_field_edit(receipt_field, value)
                        .map(PendingUpdate::Receipt);
                }

                detail.form.close_status_selector();
                let field = parse_field::<ExpenseField>(field)?;
                detail
                    .expenses
                    .stage_field_edit(id, field, value)
                    .map(PendingUpdate::Expense)
            }
        }
    }

    /// ステータスの変更を検証してローカルに反映する
    pub fn stage_status(&mut self, id: RecordId, status: ReceiptStatus) -> Result<PendingUpdate, IgnoreReason> {
        match self {
            View::ReceiptList(table) => table.stage_status_edit(id, status).map(PendingUpdate::Receipt),
            View::ReceiptDetail(detail) if detail.form.receipt().id == id => detail
                .form
                .stage_status_edit(status)
                .map(PendingUpdate::Receipt),
            View::ReceiptDetail(detail) => {
                detail.form.close_status_selector();
                Err(IgnoreReason::UnknownRow)
            }
        }
    }
}

fn parse_field<F: std::str::FromStr<Err = String>>(field: &str) -> Result<F, IgnoreReason> {
    field.parse().map_err(IgnoreReason::InvalidValue)
}

struct ViewEntry {
    owner: String,
    view: Arc<Mutex<View>>,
    last_access: Instant,
}

/// ビューIDとビューモデルの対応表
pub struct ViewRegistry {
    entries: Mutex<HashMap<Uuid, ViewEntry>>,
    ttl: Duration,
}

impl ViewRegistry {
    /// 新しいレジストリを作成する
    ///
    /// # 引数
    /// * `ttl` - 操作がないビューを保持する時間
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock_entries(&self) -> AppResult<MutexGuard<'_, HashMap<Uuid, ViewEntry>>> {
        self.entries
            .lock()
            .map_err(|e| AppError::concurrency(format!("ビューレジストリのロック取得に失敗: {e}")))
    }

    /// ビューを登録する
    ///
    /// 登録のたびに期限切れのビューを破棄する。
    ///
    /// # 引数
    /// * `owner` - ビューを開いたユーザーのメールアドレス
    /// * `view` - ビューモデル
    ///
    /// # 戻り値
    /// 払い出したビューID
    pub fn insert(&self, owner: &str, view: View) -> AppResult<Uuid> {
        let now = Instant::now();
        let mut entries = self.lock_entries()?;

        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_access) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            log::info!("期限切れのビューを破棄しました: count={evicted}");
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            ViewEntry {
                owner: owner.to_string(),
                view: Arc::new(Mutex::new(view)),
                last_access: now,
            },
        );
        log::debug!("ビューを登録しました: view={id}, owner={owner}, total={}", entries.len());
        Ok(id)
    }

    /// ビューを取得する
    ///
    /// 他のユーザーのビューや期限切れのビューは存在しないものとして扱う。
    ///
    /// # 引数
    /// * `id` - ビューID
    /// * `owner` - 要求したユーザーのメールアドレス
    pub fn get(&self, id: Uuid, owner: &str) -> AppResult<Option<Arc<Mutex<View>>>> {
        let now = Instant::now();
        let mut entries = self.lock_entries()?;

        let Some(entry) = entries.get_mut(&id) else {
            return Ok(None);
        };
        if entry.owner != owner {
            log::warn!("他のユーザーのビューへのアクセスを拒否しました: view={id}");
            return Ok(None);
        }
        if now.duration_since(entry.last_access) >= self.ttl {
            entries.remove(&id);
            return Ok(None);
        }

        entry.last_access = now;
        Ok(Some(Arc::clone(&entry.view)))
    }
}

/// ビューのロックを取得する
pub fn lock_view(view: &Mutex<View>) -> AppResult<MutexGuard<'_, View>> {
    view.lock()
        .map_err(|e| AppError::concurrency(format!("ビューのロック取得に失敗: {e}")))
}
