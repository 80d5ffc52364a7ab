use crate::features::table::{Record, RecordId};
use crate::shared::utils::wire::u64_string;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 経費データモデル（画面で扱う形）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: RecordId,
    pub date: Option<NaiveDate>,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    /// 最小通貨単位（セント）の金額
    pub amount: u64,
}

impl Record for Expense {
    fn id(&self) -> RecordId {
        self.id
    }

    // 経費テーブルには検索ボックスがないため、説明文を照合対象とする
    fn search_key(&self) -> &str {
        &self.description
    }
}

/// RPCバックエンドから受け取る経費メッセージ（`expenses.v1.Expense`）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseMessage {
    #[serde(default, with = "u64_string")]
    pub id: u64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "u64_string")]
    pub amount: u64,
}

impl From<ExpenseMessage> for Expense {
    fn from(message: ExpenseMessage) -> Self {
        Self {
            id: message.id,
            date: message.date.map(|d| d.date_naive()),
            category: message.category,
            subcategory: message.subcategory,
            description: message.description,
            amount: message.amount,
        }
    }
}

/// 経費の部分更新リクエスト（`UpdateExpenseRequest`）
///
/// 変更したフィールドだけを設定する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    #[serde(with = "u64_string")]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateExpenseRequest {
    /// IDだけを持つ空の更新リクエストを作成する
    pub fn for_id(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
