//! 行ごとのステータス選択ドロップダウンの開閉状態
//!
//! 同時に開けるのは1行だけ。選択肢を選んだとき、または
//! ビュー内の他の操作が行われたときに閉じる。

use crate::features::table::RecordId;

/// 1つのドロップダウンの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectorState {
    #[default]
    Closed,
    Open,
}

impl SelectorState {
    pub fn is_open(&self) -> bool {
        matches!(self, SelectorState::Open)
    }

    /// 開閉を反転した状態
    pub fn toggled(self) -> Self {
        match self {
            SelectorState::Closed => SelectorState::Open,
            SelectorState::Open => SelectorState::Closed,
        }
    }
}

/// テーブル全体のドロップダウン状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSelectors {
    open: Option<RecordId>,
}

impl StatusSelectors {
    /// 指定行のドロップダウン状態
    pub fn state(&self, id: RecordId) -> SelectorState {
        if self.open == Some(id) {
            SelectorState::Open
        } else {
            SelectorState::Closed
        }
    }

    /// 指定行のドロップダウンを開閉する
    ///
    /// 他の行で開いているドロップダウンは閉じる。
    pub fn toggle(&mut self, id: RecordId) {
        self.open = match self.state(id).toggled() {
            SelectorState::Open => Some(id),
            SelectorState::Closed => None,
        };
    }

    /// すべて閉じる
    pub fn close_all(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_closed() {
        let selectors = StatusSelectors::default();
        assert_eq!(selectors.state(1), SelectorState::Closed);
        assert!(!selectors.state(2).is_open());
    }

    #[test]
    fn test_toggle_opens_and_closes() {
        let mut selectors = StatusSelectors::default();

        selectors.toggle(1);
        assert!(selectors.state(1).is_open());

        selectors.toggle(1);
        assert_eq!(selectors.state(1), SelectorState::Closed);
    }

    #[test]
    fn test_only_one_selector_open() {
        let mut selectors = StatusSelectors::default();

        selectors.toggle(1);
        selectors.toggle(2);
        assert_eq!(selectors.state(1), SelectorState::Closed);
        assert_eq!(selectors.state(2), SelectorState::Open);

        selectors.close_all();
        assert_eq!(selectors, StatusSelectors::default());
    }
}
