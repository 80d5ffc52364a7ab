/// レコードの識別子（2^53 を超えうるため必ず u64 で扱う）
pub type RecordId = u64;

/// テーブルに表示できるレコード
pub trait Record {
    /// 不変の識別子
    fn id(&self) -> RecordId;

    /// 検索ボックスの照合対象となる文字列
    fn search_key(&self) -> &str;
}

/// レコードと画面ローカルの状態の組
///
/// `checked` と `displayed` はこのビューの中だけの状態で、
/// バックエンドへ送信されることはない。
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow<R> {
    pub(super) record: R,
    pub(super) checked: bool,
    pub(super) displayed: bool,
}

impl<R: Record> ViewRow<R> {
    pub(super) fn new(record: R) -> Self {
        Self {
            record,
            checked: false,
            displayed: true,
        }
    }

    /// 行のレコード
    pub fn record(&self) -> &R {
        &self.record
    }

    /// レコードID
    pub fn id(&self) -> RecordId {
        self.record.id()
    }

    /// 行が選択されているか
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// 現在の検索条件で表示されているか
    pub fn displayed(&self) -> bool {
        self.displayed
    }
}

/// 検索キーが検索文字列を含むか（大文字小文字を区別しない部分一致）
///
/// # 引数
/// * `search_key` - レコード側の文字列
/// * `lowered_needle` - 小文字化済みの検索文字列
pub fn matches_search(search_key: &str, lowered_needle: &str) -> bool {
    lowered_needle.is_empty() || search_key.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Acme Co", "acme"));
        assert!(matches_search("ACME", "cm"));
        assert!(matches_search("anything", ""));
        assert!(!matches_search("Other", "acme"));
        // 前後の空白も検索文字列の一部として扱う
        assert!(!matches_search("Acme", " acme"));
    }
}
