//! 金額（最小通貨単位の整数）の集計と表示用フォーマット
//!
//! 金額は常にセント等の最小単位の整数で保持し、浮動小数点には変換しない。

/// 通貨の表示形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    /// ISO 4217 通貨コード
    pub code: String,
    /// 通貨記号
    pub symbol: String,
    /// 小数点の区切り文字
    pub decimal_separator: char,
    /// 桁区切り文字
    pub group_separator: char,
    /// 記号を金額の前に置くかどうか
    pub symbol_first: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::euro_de()
    }
}

impl CurrencyFormat {
    /// ユーロ（de-DE形式）: `1.234,56 €`
    pub fn euro_de() -> Self {
        Self {
            code: "EUR".to_string(),
            symbol: "€".to_string(),
            decimal_separator: ',',
            group_separator: '.',
            symbol_first: false,
        }
    }

    /// 米ドル（en-US形式）: `$1,234.56`
    pub fn usd_en() -> Self {
        Self {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            decimal_separator: '.',
            group_separator: ',',
            symbol_first: true,
        }
    }

    /// 通貨コードから表示形式を取得する
    ///
    /// # 引数
    /// * `code` - 通貨コード（大文字小文字は区別しない）
    ///
    /// # 戻り値
    /// 対応している通貨の場合はSome
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "EUR" => Some(Self::euro_de()),
            "USD" => Some(Self::usd_en()),
            _ => None,
        }
    }

    /// 環境変数 CURRENCY から表示形式を読み込む
    pub fn from_env() -> Self {
        let code = crate::get_env_var_or_default!("CURRENCY", "EUR");
        Self::from_code(&code).unwrap_or_else(|| {
            log::warn!("未対応の通貨コードです。EURを使用します: {code}");
            Self::euro_de()
        })
    }

    /// 最小通貨単位の金額を表示用文字列に変換する
    ///
    /// # 引数
    /// * `minor_units` - 最小通貨単位（セント）の金額
    ///
    /// # 戻り値
    /// 表示用の金額文字列
    pub fn format(&self, minor_units: u128) -> String {
        let major = minor_units / 100;
        let minor = minor_units % 100;

        let number = format!(
            "{}{}{minor:02}",
            group_digits(major, self.group_separator),
            self.decimal_separator
        );

        if self.symbol_first {
            format!("{}{number}", self.symbol)
        } else {
            // Intl.NumberFormat と同じくノーブレークスペースで区切る
            format!("{number}\u{a0}{}", self.symbol)
        }
    }
}

/// 金額の合計を整数加算で求める
pub fn total_minor_units<I>(amounts: I) -> u128
where
    I: IntoIterator<Item = u64>,
{
    amounts.into_iter().map(u128::from).sum()
}

fn group_digits(value: u128, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }

    grouped
}
