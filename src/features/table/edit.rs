//! インライン編集の確定処理で共有する型
//!
//! 編集の確定は「検証と楽観的更新（同期）」と「バックエンドへの永続化（非同期）」の
//! 2段階に分かれる。永続化に失敗してもローカルの値は巻き戻さない。

use super::models::RecordId;
use crate::shared::errors::AppResult;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// 編集が無視された理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 新しい値が空
    Blank,
    /// 現在の値と同じ
    Unchanged,
    /// 対象の行が存在しない
    UnknownRow,
    /// 値を解釈できない（日付の形式不正など）
    InvalidValue(String),
}

/// 編集の確定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// 検証で弾かれ、ローカル状態もバックエンドも変更していない
    Ignored(IgnoreReason),
    /// ローカルに反映し、バックエンドへの保存も成功した
    Persisted,
    /// ローカルには反映したが、バックエンドへの保存に失敗した
    PersistFailed(String),
}

/// 入力値が確定可能か検証する
///
/// # 引数
/// * `new_value` - 入力コントロールから受け取った値
/// * `current_value` - 行の現在の値
pub fn check_text_edit(new_value: &str, current_value: &str) -> Result<(), IgnoreReason> {
    if new_value.is_empty() {
        return Err(IgnoreReason::Blank);
    }
    if new_value == current_value {
        return Err(IgnoreReason::Unchanged);
    }
    Ok(())
}

/// 日付入力（`YYYY-MM-DD`）が確定可能か検証する
///
/// # 引数
/// * `new_value` - 日付入力コントロールの値
/// * `current_value` - 行の現在の日付
///
/// # 戻り値
/// 解釈済みの新しい日付
pub fn check_date_edit(
    new_value: &str,
    current_value: Option<NaiveDate>,
) -> Result<NaiveDate, IgnoreReason> {
    if new_value.is_empty() {
        return Err(IgnoreReason::Blank);
    }
    let date = NaiveDate::parse_from_str(new_value, "%Y-%m-%d")
        .map_err(|e| IgnoreReason::InvalidValue(format!("日付の形式が不正です: {new_value} ({e})")))?;
    if Some(date) == current_value {
        return Err(IgnoreReason::Unchanged);
    }
    Ok(date)
}

/// 日付をバックエンドに送るタイムスタンプ（UTCの0時）に変換する
pub fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// 永続化の結果をログに記録して確定結果に変換する
///
/// # 引数
/// * `result` - バックエンド呼び出しの結果
/// * `kind` - ログ用のレコード種別
/// * `id` - レコードID
pub fn finish_persist(result: AppResult<()>, kind: &str, id: RecordId) -> EditOutcome {
    match result {
        Ok(()) => {
            log::info!("{kind}を更新しました: id={id}");
            EditOutcome::Persisted
        }
        Err(e) => {
            // 楽観的に反映したローカルの値はそのまま残す
            log::error!("{kind}の更新に失敗しました（ローカルの値は保持）: id={id}, error={e}");
            EditOutcome::PersistFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::AppError;

    #[test]
    fn test_check_text_edit() {
        assert_eq!(check_text_edit("", "Acme"), Err(IgnoreReason::Blank));
        assert_eq!(check_text_edit("Acme", "Acme"), Err(IgnoreReason::Unchanged));
        assert_eq!(check_text_edit("Acme Co", "Acme"), Ok(()));
        // 空白のみは空とはみなさない
        assert_eq!(check_text_edit(" ", "Acme"), Ok(()));
    }

    #[test]
    fn test_check_date_edit() {
        let current = NaiveDate::from_ymd_opt(2024, 3, 1);

        assert_eq!(check_date_edit("", current), Err(IgnoreReason::Blank));
        assert_eq!(
            check_date_edit("2024-03-01", current),
            Err(IgnoreReason::Unchanged)
        );
        assert!(matches!(
            check_date_edit("01/03/2024", current),
            Err(IgnoreReason::InvalidValue(_))
        ));
        assert_eq!(
            check_date_edit("2024-03-02", current),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );
        // 日付が未設定の行にはどの日付も変更として扱う
        assert!(check_date_edit("2024-03-01", None).is_ok());
    }

    #[test]
    fn test_date_to_timestamp_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(date_to_timestamp(date).to_rfc3339(), "2024-03-02T00:00:00+00:00");
    }

    #[test]
    fn test_finish_persist() {
        assert_eq!(finish_persist(Ok(()), "領収書", 1), EditOutcome::Persisted);

        let outcome = finish_persist(
            Err(AppError::external_service("ReceiptsService", "unavailable: upstream down")),
            "領収書",
            1,
        );
        // Connectのエラーコードとメッセージが結果に残る
        let EditOutcome::PersistFailed(message) = &outcome else {
            panic!("保存失敗になるはず: {outcome:?}");
        };
        assert!(message.contains("ReceiptsService"));
        assert!(message.contains("unavailable: upstream down"));
    }
}
