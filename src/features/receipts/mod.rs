/// 領収書機能モジュール
///
/// - 領収書一覧テーブルと詳細フォームのビューモデル
/// - ステータス選択ドロップダウンの状態
/// - ReceiptsService からの取得と部分更新
/// - 一覧・詳細画面の描画
pub mod api_client;
pub mod models;
pub mod pages;
pub mod status_selector;
pub mod view_model;

pub use api_client::{ReceiptUpdater, ReceiptsClient};
pub use models::{ListReceiptsSince, Receipt, ReceiptStatus, UpdateReceiptRequest};
pub use status_selector::{SelectorState, StatusSelectors};
pub use view_model::{persist_receipt_update, ReceiptField, ReceiptForm, ReceiptsTable};
