/// HTMLエスケープ
pub mod html;
/// 金額の集計とフォーマット
pub mod money;
/// RPCワイヤ形式のserdeヘルパー
pub mod wire;

pub use html::escape;
pub use money::{total_minor_units, CurrencyFormat};
