/// 機能別モジュール
///
/// 各機能モジュールは、その機能のモデル・RPCクライアント・ビューモデル・描画をまとめて持つ。
pub mod auth;
pub mod expenses;
pub mod receipts;
pub mod table;
