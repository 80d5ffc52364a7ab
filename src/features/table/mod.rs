/// 検索・選択・インライン編集ができるテーブルの共通部品
pub mod edit;
pub mod models;
pub mod view_model;
pub mod widgets;

pub use edit::{EditOutcome, IgnoreReason};
pub use models::{Record, RecordId, ViewRow};
pub use view_model::TableState;
