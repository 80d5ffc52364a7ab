use super::models::{matches_search, Record, RecordId, ViewRow};

/// 検索・複数選択が可能なテーブルのビューモデル
///
/// 行の順序は取得時の順序のまま変わらない。表示対象（`displayed`）と
/// 全選択チェックボックス（`globally_selected`）はどちらも派生値で、
/// 状態を変更する操作のたびに `refresh` で同期的に再計算される。
#[derive(Debug, Clone)]
pub struct TableState<R> {
    rows: Vec<ViewRow<R>>,
    search_text: String,
    globally_selected: bool,
}

impl<R: Record> TableState<R> {
    /// レコード列からテーブル状態を作成する
    ///
    /// # 引数
    /// * `records` - 取得順のレコード
    ///
    /// # 戻り値
    /// 全行が未選択・表示中で、検索文字列が空のテーブル状態
    pub fn new(records: Vec<R>) -> Self {
        let rows = records.into_iter().map(ViewRow::new).collect();
        let mut state = Self {
            rows,
            search_text: String::new(),
            globally_selected: false,
        };
        state.refresh();
        state
    }

    /// 全行（表示されていない行も含む）
    pub fn rows(&self) -> &[ViewRow<R>] {
        &self.rows
    }

    /// IDで行を取得する
    pub fn row(&self, id: RecordId) -> Option<&ViewRow<R>> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// 検索条件に一致する行（取得順）
    pub fn displayed_rows(&self) -> impl Iterator<Item = &ViewRow<R>> {
        self.rows.iter().filter(|row| row.displayed)
    }

    /// 表示中の行のID
    pub fn displayed_ids(&self) -> Vec<RecordId> {
        self.displayed_rows().map(ViewRow::id).collect()
    }

    /// 選択中の行のID（表示されていない行も含む）
    pub fn checked_ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|row| row.checked)
            .map(ViewRow::id)
            .collect()
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed_rows().count()
    }

    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|row| row.checked).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 現在の検索文字列
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// 全選択チェックボックスの状態
    pub fn globally_selected(&self) -> bool {
        self.globally_selected
    }

    /// 検索文字列を更新する（トリムしない）
    ///
    /// # 引数
    /// * `text` - 新しい検索文字列
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.refresh();
        log::debug!(
            "検索文字列を更新しました: text={:?}, displayed={}/{}",
            self.search_text,
            self.displayed_count(),
            self.rows.len()
        );
    }

    /// 全選択チェックボックスを切り替える
    ///
    /// 表示中の行だけが新しい値に揃えられ、検索で隠れている行は変更しない。
    pub fn toggle_global_selection(&mut self) {
        let selected = !self.globally_selected;
        for row in self.rows.iter_mut().filter(|row| row.displayed) {
            row.checked = selected;
        }
        self.refresh();
    }

    /// 1行の選択状態を切り替える
    ///
    /// # 引数
    /// * `id` - 対象行のID
    ///
    /// # 戻り値
    /// 行が存在した場合はtrue
    pub fn toggle_row_checked(&mut self, id: RecordId) -> bool {
        let Some(row) = self.rows.iter_mut().find(|row| row.id() == id) else {
            log::debug!("選択切り替え対象の行が見つかりません: id={id}");
            return false;
        };
        row.checked = !row.checked;
        self.refresh();
        true
    }

    /// 行のレコードを変更する
    ///
    /// 変更後に検索結果と全選択状態を再計算する。
    ///
    /// # 引数
    /// * `id` - 対象行のID
    /// * `update` - レコードを変更するクロージャ
    ///
    /// # 戻り値
    /// 行が存在した場合はクロージャの戻り値
    pub fn update_record<T>(&mut self, id: RecordId, update: impl FnOnce(&mut R) -> T) -> Option<T> {
        let row = self.rows.iter_mut().find(|row| row.id() == id)?;
        let result = update(&mut row.record);
        self.refresh();
        Some(result)
    }

    /// 派生値を再計算する
    ///
    /// 表示行が0件のときは全選択をfalseとする。
    fn refresh(&mut self) {
        let needle = self.search_text.to_lowercase();
        for row in &mut self.rows {
            row.displayed = matches_search(row.record.search_key(), &needle);
        }

        let mut displayed = self.rows.iter().filter(|row| row.displayed).peekable();
        self.globally_selected = displayed.peek().is_some() && displayed.all(|row| row.checked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        vendor: String,
    }

    impl Record for Row {
        fn id(&self) -> RecordId {
            self.id
        }

        fn search_key(&self) -> &str {
            &self.vendor
        }
    }

    const VENDORS: [&str; 6] = ["Acme", "Acme Co", "Other", "ACME Hardware", "Bäckerei", "zeta"];
    const NEEDLES: [&str; 7] = ["", "acme", "ME", "o", "xyz", "äck", " "];

    fn table(vendors: &[&str]) -> TableState<Row> {
        TableState::new(
            vendors
                .iter()
                .enumerate()
                .map(|(i, vendor)| Row {
                    id: i as RecordId + 1,
                    vendor: vendor.to_string(),
                })
                .collect(),
        )
    }

    fn arbitrary_table(spec: &[(u8, bool)]) -> TableState<Row> {
        let vendors: Vec<&str> = spec
            .iter()
            .map(|(v, _)| VENDORS[*v as usize % VENDORS.len()])
            .collect();
        let mut state = table(&vendors);
        for (i, (_, checked)) in spec.iter().enumerate() {
            if *checked {
                state.toggle_row_checked(i as RecordId + 1);
            }
        }
        state
    }

    fn needle(n: u8) -> &'static str {
        NEEDLES[n as usize % NEEDLES.len()]
    }

    fn checked_flags(state: &TableState<Row>) -> Vec<bool> {
        state.rows().iter().map(|row| row.checked()).collect()
    }

    #[test]
    fn test_new_table_defaults() {
        let state = table(&["Acme", "Other"]);

        assert_eq!(state.len(), 2);
        assert_eq!(state.search_text(), "");
        assert!(!state.globally_selected());
        assert!(state.rows().iter().all(|row| row.displayed() && !row.checked()));
    }

    #[test]
    fn test_search_then_toggle_all_scenario() {
        let mut state = table(&["Acme", "Acme Co", "Other"]);
        state.toggle_row_checked(2);

        state.set_search_text("acme");
        assert_eq!(state.displayed_ids(), vec![1, 2]);
        assert!(!state.globally_selected());

        state.toggle_global_selection();
        assert!(state.row(1).unwrap().checked());
        assert!(state.row(2).unwrap().checked());
        assert!(!state.row(3).unwrap().checked());
        assert!(state.globally_selected());
    }

    #[test]
    fn test_clearing_search_restores_all_rows_in_order() {
        let mut state = table(&["Acme", "Other", "Acme Co"]);

        state.set_search_text("other");
        assert_eq!(state.displayed_ids(), vec![2]);

        state.set_search_text("");
        assert_eq!(state.displayed_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let mut state = table(&["Acme", "Acme Co"]);

        state.set_search_text("acme ");
        assert_eq!(state.search_text(), "acme ");
        assert_eq!(state.displayed_ids(), vec![2]);
    }

    #[test]
    fn test_empty_displayed_set_is_not_globally_selected() {
        let mut state = table(&["Acme", "Other"]);
        state.toggle_global_selection();
        assert!(state.globally_selected());

        state.set_search_text("nothing matches");
        assert_eq!(state.displayed_count(), 0);
        assert!(!state.globally_selected());

        // 表示行がない状態で全選択しても、どの行も変わらない
        state.toggle_global_selection();
        assert!(!state.globally_selected());
        assert_eq!(state.checked_count(), 2);
    }

    #[test]
    fn test_empty_table_is_not_globally_selected() {
        let mut state = table(&[]);
        assert!(state.is_empty());
        assert!(!state.globally_selected());

        state.toggle_global_selection();
        assert!(!state.globally_selected());
    }

    #[test]
    fn test_row_toggle_recomputes_global_selection() {
        let mut state = table(&["Acme", "Acme Co"]);

        state.toggle_row_checked(1);
        assert!(!state.globally_selected());

        state.toggle_row_checked(2);
        assert!(state.globally_selected());

        state.toggle_row_checked(1);
        assert!(!state.globally_selected());
    }

    #[test]
    fn test_toggle_unknown_row_is_noop() {
        let mut state = table(&["Acme"]);
        assert!(!state.toggle_row_checked(99));
        assert_eq!(state.checked_count(), 0);
    }

    #[test]
    fn test_update_record_refreshes_filter() {
        let mut state = table(&["Acme", "Other"]);
        state.set_search_text("acme");
        assert_eq!(state.displayed_ids(), vec![1]);

        let updated = state.update_record(2, |row| row.vendor = "Acme Again".to_string());
        assert_eq!(updated, Some(()));
        assert_eq!(state.displayed_ids(), vec![1, 2]);

        assert_eq!(state.update_record(42, |_| ()), None);
    }

    #[test]
    fn test_checked_ids_include_hidden_rows() {
        let mut state = table(&["Acme", "Other"]);
        state.toggle_global_selection();
        state.set_search_text("acme");

        assert_eq!(state.checked_ids(), vec![1, 2]);
        assert_eq!(state.displayed_ids(), vec![1]);
    }

    #[quickcheck]
    fn prop_displayed_rows_match_filter(spec: Vec<(u8, bool)>, n: u8) -> bool {
        let mut state = arbitrary_table(&spec);
        let text = needle(n);
        state.set_search_text(text);

        let expected: Vec<RecordId> = state
            .rows()
            .iter()
            .filter(|row| {
                row.record()
                    .vendor
                    .to_lowercase()
                    .contains(&text.to_lowercase())
            })
            .map(|row| row.id())
            .collect();

        state.displayed_ids() == expected
    }

    #[quickcheck]
    fn prop_global_flag_tracks_displayed_rows(spec: Vec<(u8, bool)>, n: u8, toggles: Vec<u8>) -> bool {
        let mut state = arbitrary_table(&spec);
        state.set_search_text(needle(n));
        for t in toggles {
            if t % 3 == 0 {
                state.toggle_global_selection();
            } else {
                state.toggle_row_checked(RecordId::from(t) % (spec.len() as RecordId + 1));
            }
        }

        let mut displayed = state.displayed_rows().peekable();
        let expected = displayed.peek().is_some() && displayed.all(|row| row.checked());
        state.globally_selected() == expected
    }

    #[quickcheck]
    fn prop_global_toggle_leaves_hidden_rows_alone(spec: Vec<(u8, bool)>, n: u8) -> bool {
        let mut state = arbitrary_table(&spec);
        state.set_search_text(needle(n));
        let before = checked_flags(&state);

        state.toggle_global_selection();

        state
            .rows()
            .iter()
            .zip(before)
            .all(|(row, was_checked)| row.displayed() || row.checked() == was_checked)
    }

    #[quickcheck]
    fn prop_double_toggle_restores_uniform_selection(vendors: Vec<u8>, n: u8, checked: bool) -> bool {
        let spec: Vec<(u8, bool)> = vendors.into_iter().map(|v| (v, false)).collect();
        let mut state = arbitrary_table(&spec);
        state.set_search_text(needle(n));
        if checked {
            // 表示行をすべて選択済みに揃える
            state.toggle_global_selection();
        }
        let before = checked_flags(&state);

        state.toggle_global_selection();
        state.toggle_global_selection();

        checked_flags(&state) == before
    }
}
