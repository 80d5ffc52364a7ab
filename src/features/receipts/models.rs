// 領収書機能のデータモデル

use crate::features::expenses::models::{Expense, ExpenseMessage};
use crate::features::table::{Record, RecordId};
use crate::shared::utils::money::total_minor_units;
use crate::shared::utils::wire::u64_string;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 領収書のレビュー状態
///
/// 利用者が選べるのは `PendingReview` と `Reviewed` のみ。
/// `Unknown` はバックエンドが未設定・未知の値を返した場合の表示用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReceiptStatus {
    PendingReview,
    Reviewed,
    #[default]
    Unknown,
}

impl ReceiptStatus {
    /// 選択肢として表示する状態
    pub const SELECTABLE: [ReceiptStatus; 2] = [ReceiptStatus::PendingReview, ReceiptStatus::Reviewed];

    /// 画面表示用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            ReceiptStatus::PendingReview => "Pending Review",
            ReceiptStatus::Reviewed => "Reviewed",
            ReceiptStatus::Unknown => "N/a",
        }
    }

    /// フォームで送受信する値
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::PendingReview => "pending_review",
            ReceiptStatus::Reviewed => "reviewed",
            ReceiptStatus::Unknown => "unknown",
        }
    }

    /// 状態ドットの色（CSSクラス）
    pub fn color_class(&self) -> &'static str {
        match self {
            ReceiptStatus::PendingReview => "bg-red-500",
            ReceiptStatus::Reviewed => "bg-green-500",
            ReceiptStatus::Unknown => "bg-yellow-500",
        }
    }

    /// proto の enum 値から変換する
    pub fn from_wire(value: i64) -> Self {
        match value {
            1 => ReceiptStatus::PendingReview,
            2 => ReceiptStatus::Reviewed,
            _ => ReceiptStatus::Unknown,
        }
    }

    /// proto の enum 名から変換する
    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "RECEIPT_STATUS_PENDING_REVIEW" => ReceiptStatus::PendingReview,
            "RECEIPT_STATUS_REVIEWED" => ReceiptStatus::Reviewed,
            _ => ReceiptStatus::Unknown,
        }
    }

    /// 更新リクエストの `pendingReview` に対応する値
    ///
    /// `Unknown` はバックエンドへ送れないためNone。
    pub fn pending_review_flag(&self) -> Option<bool> {
        match self {
            ReceiptStatus::PendingReview => Some(true),
            ReceiptStatus::Reviewed => Some(false),
            ReceiptStatus::Unknown => None,
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReceiptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(ReceiptStatus::PendingReview),
            "reviewed" => Ok(ReceiptStatus::Reviewed),
            "unknown" => Ok(ReceiptStatus::Unknown),
            other => Err(format!("未知のステータスです: {other}")),
        }
    }
}

/// proto3 JSON の enum は数値・名前のどちらでも届く
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Number(i64),
    Name(String),
}

fn deserialize_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ReceiptStatus, D::Error> {
    let raw = Option::<RawStatus>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawStatus::Number(value)) => ReceiptStatus::from_wire(value),
        Some(RawStatus::Name(name)) => ReceiptStatus::from_wire_name(&name),
        None => ReceiptStatus::Unknown,
    })
}

/// 領収書データモデル（画面で扱う形）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub id: RecordId,
    pub status: ReceiptStatus,
    pub vendor: String,
    pub date: Option<NaiveDate>,
    pub expenses: Vec<Expense>,
    /// 領収書画像（base64）
    pub image: Option<String>,
}

impl Receipt {
    /// 経費金額の合計（最小通貨単位）
    pub fn total_minor_units(&self) -> u128 {
        total_minor_units(self.expenses.iter().map(|expense| expense.amount))
    }
}

impl Record for Receipt {
    fn id(&self) -> RecordId {
        self.id
    }

    fn search_key(&self) -> &str {
        &self.vendor
    }
}

/// RPCバックエンドから受け取る領収書メッセージ（`receipts.v1.Receipt`）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptMessage {
    #[serde(default, with = "u64_string")]
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: ReceiptStatus,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expenses: Vec<ExpenseMessage>,
    #[serde(default)]
    pub file: Option<String>,
}

impl From<ReceiptMessage> for Receipt {
    fn from(message: ReceiptMessage) -> Self {
        Self {
            id: message.id,
            status: message.status,
            vendor: message.vendor,
            date: message.date.map(|d| d.date_naive()),
            expenses: message.expenses.into_iter().map(Expense::from).collect(),
            image: message.file.filter(|file| !file.is_empty()),
        }
    }
}

/// 一覧取得の対象期間（`ListReceiptsSince`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListReceiptsSince {
    CurrentMonth,
    PreviousMonth,
    AllTime,
}

impl ListReceiptsSince {
    fn wire_value(&self) -> i32 {
        match self {
            ListReceiptsSince::CurrentMonth => 1,
            ListReceiptsSince::PreviousMonth => 2,
            ListReceiptsSince::AllTime => 3,
        }
    }
}

impl Serialize for ListReceiptsSince {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.wire_value())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListReceiptsRequest {
    pub since: ListReceiptsSince,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReceiptsResponse {
    #[serde(default)]
    pub receipts: Vec<ReceiptMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetReceiptRequest {
    #[serde(with = "u64_string")]
    pub id: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetReceiptResponse {
    #[serde(default)]
    pub receipt: Option<ReceiptMessage>,
}

/// 領収書の部分更新リクエスト（`UpdateReceiptRequest`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReceiptRequest {
    #[serde(with = "u64_string")]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl UpdateReceiptRequest {
    /// IDだけを持つ空の更新リクエストを作成する
    pub fn for_id(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_receipt_message_deserialization() {
        let json = r#"{
            "id": "18446744073709551615",
            "status": 1,
            "vendor": "Acme",
            "date": "2024-02-29T00:00:00Z",
            "expenses": [
                {"id": "1", "amount": "1050"},
                {"id": "2", "amount": 250}
            ],
            "file": "aGVsbG8="
        }"#;

        let receipt: Receipt = serde_json::from_str::<ReceiptMessage>(json).unwrap().into();
        assert_eq!(receipt.id, u64::MAX);
        assert_eq!(receipt.status, ReceiptStatus::PendingReview);
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(receipt.expenses.len(), 2);
        assert_eq!(receipt.total_minor_units(), 1300);
        assert_eq!(receipt.image.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn test_status_from_wire() {
        let parse = |json: &str| {
            serde_json::from_str::<ReceiptMessage>(json).unwrap().status
        };

        assert_eq!(parse(r#"{"status": 2}"#), ReceiptStatus::Reviewed);
        assert_eq!(
            parse(r#"{"status": "RECEIPT_STATUS_PENDING_REVIEW"}"#),
            ReceiptStatus::PendingReview
        );
        assert_eq!(parse(r#"{"status": 0}"#), ReceiptStatus::Unknown);
        assert_eq!(parse(r#"{"status": 42}"#), ReceiptStatus::Unknown);
        assert_eq!(parse(r#"{}"#), ReceiptStatus::Unknown);
    }

    #[test]
    fn test_status_form_values() {
        for status in [
            ReceiptStatus::PendingReview,
            ReceiptStatus::Reviewed,
            ReceiptStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<ReceiptStatus>(), Ok(status));
        }
        assert!("REVIEWED".parse::<ReceiptStatus>().is_err());
        assert_eq!(ReceiptStatus::Unknown.pending_review_flag(), None);
        assert_eq!(ReceiptStatus::Reviewed.pending_review_flag(), Some(false));
    }

    #[test]
    fn test_total_of_receipt_without_expenses_is_zero() {
        let receipt: Receipt = serde_json::from_str::<ReceiptMessage>(r#"{"id":"5"}"#)
            .unwrap()
            .into();
        assert_eq!(receipt.total_minor_units(), 0);
        assert!(receipt.image.is_none());
    }

    #[test]
    fn test_update_request_serialization() {
        let request = UpdateReceiptRequest {
            date: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            ..UpdateReceiptRequest::for_id(9_007_199_254_740_993)
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "9007199254740993", "date": "2024-03-02T00:00:00Z" })
        );
    }

    #[test]
    fn test_list_request_uses_all_time_value() {
        let request = ListReceiptsRequest {
            since: ListReceiptsSince::AllTime,
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"since":3}"#);
    }
}
