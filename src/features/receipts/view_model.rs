use super::api_client::ReceiptUpdater;
use super::models::{Receipt, ReceiptStatus, UpdateReceiptRequest};
use super::status_selector::{SelectorState, StatusSelectors};
use crate::features::table::edit::{check_date_edit, check_text_edit, date_to_timestamp, finish_persist};
use crate::features::table::{EditOutcome, IgnoreReason, RecordId, TableState};
use std::fmt;
use std::str::FromStr;

/// 領収書でインライン編集できる項目（ステータスは別扱い）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptField {
    Vendor,
    Date,
}

impl ReceiptField {
    /// フォームで使う項目名
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptField::Vendor => "vendor",
            ReceiptField::Date => "date",
        }
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vendor" => Ok(ReceiptField::Vendor),
            "date" => Ok(ReceiptField::Date),
            other => Err(format!("未知の領収書フィールドです: {other}")),
        }
    }
}

/// 項目の編集を検証して領収書に反映する
///
/// # 戻り値
/// 変更した項目だけを持つ部分更新リクエスト
fn apply_field_edit(
    receipt: &mut Receipt,
    field: ReceiptField,
    value: &str,
) -> Result<UpdateReceiptRequest, IgnoreReason> {
    let mut request = UpdateReceiptRequest::for_id(receipt.id);
    match field {
        ReceiptField::Vendor => {
            check_text_edit(value, &receipt.vendor)?;
            receipt.vendor = value.to_string();
            request.vendor = Some(value.to_string());
        }
        ReceiptField::Date => {
            // 経費の日付はサーバー側で追従するため、ここでは領収書の日付だけを送る
            let date = check_date_edit(value, receipt.date)?;
            receipt.date = Some(date);
            request.date = Some(date_to_timestamp(date));
        }
    }
    Ok(request)
}

/// ステータスの変更を検証して領収書に反映する
fn apply_status_edit(
    receipt: &mut Receipt,
    status: ReceiptStatus,
) -> Result<UpdateReceiptRequest, IgnoreReason> {
    let pending_review = status
        .pending_review_flag()
        .ok_or_else(|| IgnoreReason::InvalidValue(format!("選択できないステータスです: {status}")))?;
    if status == receipt.status {
        return Err(IgnoreReason::Unchanged);
    }

    receipt.status = status;
    Ok(UpdateReceiptRequest {
        pending_review: Some(pending_review),
        ..UpdateReceiptRequest::for_id(receipt.id)
    })
}

fn log_ignored(id: RecordId, what: &str, reason: &IgnoreReason) {
    log::debug!("領収書の編集を無視しました: id={id}, field={what}, reason={reason:?}");
}

/// 領収書一覧テーブルのビューモデル
///
/// 検索は取引先名で行う。ステータスのドロップダウンは、選択肢を選んだときと
/// テーブル内で他の操作をしたときに閉じる。
#[derive(Debug, Clone)]
pub struct ReceiptsTable {
    state: TableState<Receipt>,
    selectors: StatusSelectors,
}

impl ReceiptsTable {
    pub fn new(receipts: Vec<Receipt>) -> Self {
        Self {
            state: TableState::new(receipts),
            selectors: StatusSelectors::default(),
        }
    }

    /// テーブル状態（描画用）
    pub fn state(&self) -> &TableState<Receipt> {
        &self.state
    }

    /// 指定行のステータス選択の状態
    pub fn selector_state(&self, id: RecordId) -> SelectorState {
        self.selectors.state(id)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.selectors.close_all();
        self.state.set_search_text(text);
    }

    pub fn toggle_global_selection(&mut self) {
        self.selectors.close_all();
        self.state.toggle_global_selection();
    }

    pub fn toggle_row_checked(&mut self, id: RecordId) -> bool {
        self.selectors.close_all();
        self.state.toggle_row_checked(id)
    }

    /// ステータスのドロップダウンを開閉する
    ///
    /// # 戻り値
    /// 行が存在した場合はtrue
    pub fn toggle_status_selector(&mut self, id: RecordId) -> bool {
        if self.state.row(id).is_none() {
            self.selectors.close_all();
            return false;
        }
        self.selectors.toggle(id);
        true
    }

    /// 取引先名・日付の編集を検証し、ローカルの行に反映する
    ///
    /// # 引数
    /// * `id` - 対象の領収書ID
    /// * `field` - 編集された項目
    /// * `value` - 入力値（日付は `YYYY-MM-DD`）
    ///
    /// # 戻り値
    /// バックエンドへ送る部分更新リクエスト、または無視した理由
    pub fn stage_field_edit(
        &mut self,
        id: RecordId,
        field: ReceiptField,
        value: &str,
    ) -> Result<UpdateReceiptRequest, IgnoreReason> {
        self.selectors.close_all();
        self.state
            .update_record(id, |receipt| apply_field_edit(receipt, field, value))
            .unwrap_or(Err(IgnoreReason::UnknownRow))
            .inspect_err(|reason| log_ignored(id, field.as_str(), reason))
    }

    /// ステータスの変更を検証し、ローカルの行に反映する
    ///
    /// ドロップダウンは検証の結果にかかわらず閉じる。
    pub fn stage_status_edit(
        &mut self,
        id: RecordId,
        status: ReceiptStatus,
    ) -> Result<UpdateReceiptRequest, IgnoreReason> {
        self.selectors.close_all();
        self.state
            .update_record(id, |receipt| apply_status_edit(receipt, status))
            .unwrap_or(Err(IgnoreReason::UnknownRow))
            .inspect_err(|reason| log_ignored(id, "status", reason))
    }

    /// 取引先名・日付の編集を確定する
    pub async fn commit_field_edit<U: ReceiptUpdater>(
        &mut self,
        updater: &U,
        id: RecordId,
        field: ReceiptField,
        value: &str,
    ) -> EditOutcome {
        match self.stage_field_edit(id, field, value) {
            Ok(request) => persist_receipt_update(updater, request).await,
            Err(reason) => EditOutcome::Ignored(reason),
        }
    }

    /// ステータスの変更を確定する
    pub async fn commit_status_edit<U: ReceiptUpdater>(
        &mut self,
        updater: &U,
        id: RecordId,
        status: ReceiptStatus,
    ) -> EditOutcome {
        match self.stage_status_edit(id, status) {
            Ok(request) => persist_receipt_update(updater, request).await,
            Err(reason) => EditOutcome::Ignored(reason),
        }
    }
}

/// 領収書詳細画面のフォーム
///
/// 一覧の行と同じ確定手順で、1件の領収書を編集する。
#[derive(Debug, Clone)]
pub struct ReceiptForm {
    receipt: Receipt,
    selector: SelectorState,
}

impl ReceiptForm {
    pub fn new(receipt: Receipt) -> Self {
        Self {
            receipt,
            selector: SelectorState::Closed,
        }
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn selector_state(&self) -> SelectorState {
        self.selector
    }

    pub fn toggle_status_selector(&mut self) {
        self.selector = self.selector.toggled();
    }

    /// フォーム外の操作でドロップダウンを閉じる
    pub fn close_status_selector(&mut self) {
        self.selector = SelectorState::Closed;
    }

    pub fn stage_field_edit(
        &mut self,
        field: ReceiptField,
        value: &str,
    ) -> Result<UpdateReceiptRequest, IgnoreReason> {
        self.selector = SelectorState::Closed;
        let id = self.receipt.id;
        apply_field_edit(&mut self.receipt, field, value)
            .inspect_err(|reason| log_ignored(id, field.as_str(), reason))
    }

    pub fn stage_status_edit(
        &mut self,
        status: ReceiptStatus,
    ) -> Result<UpdateReceiptRequest, IgnoreReason> {
        self.selector = SelectorState::Closed;
        let id = self.receipt.id;
        apply_status_edit(&mut self.receipt, status)
            .inspect_err(|reason| log_ignored(id, "status", reason))
    }
}

/// 部分更新リクエストをバックエンドへ送る
///
/// 失敗してもリトライ・巻き戻しはしない。
pub async fn persist_receipt_update<U: ReceiptUpdater>(
    updater: &U,
    request: UpdateReceiptRequest,
) -> EditOutcome {
    let id = request.id;
    finish_persist(updater.update_receipt(request).await, "領収書", id)
}
