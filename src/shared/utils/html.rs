/// HTMLの特殊文字をエスケープする
///
/// # 引数
/// * `input` - エスケープ対象の文字列
///
/// # 戻り値
/// 属性値・本文のどちらにも埋め込めるエスケープ済み文字列
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
