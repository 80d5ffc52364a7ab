// ExpensesService との通信を行うクライアント

use crate::features::expenses::models::UpdateExpenseRequest;
use crate::shared::api_client::{ApiClient, EmptyResponse};
use crate::shared::errors::AppResult;
use std::future::Future;
use std::sync::Arc;

/// `UpdateExpense` プロシージャ
pub const UPDATE_EXPENSE_PROCEDURE: &str = "/expenses.v1.ExpensesService/UpdateExpense";

/// 経費の部分更新をバックエンドへ送る
pub trait ExpenseUpdater: Send + Sync {
    /// 経費を部分更新する（リトライしない）
    fn update_expense(
        &self,
        request: UpdateExpenseRequest,
    ) -> impl Future<Output = AppResult<()>> + Send;
}

/// ログイン中ユーザーのトークンを持つ ExpensesService クライアント
#[derive(Clone)]
pub struct ExpensesClient {
    api: Arc<ApiClient>,
    auth_token: String,
}

impl ExpensesClient {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    /// * `api` - 共有のRPCクライアント
    /// * `auth_token` - Bearerトークンとして付与するセッショントークン
    pub fn new(api: Arc<ApiClient>, auth_token: impl Into<String>) -> Self {
        Self {
            api,
            auth_token: auth_token.into(),
        }
    }
}

impl ExpenseUpdater for ExpensesClient {
    async fn update_expense(&self, request: UpdateExpenseRequest) -> AppResult<()> {
        log::debug!("経費更新を送信します: id={}", request.id);
        let _: EmptyResponse = self
            .api
            .call(UPDATE_EXPENSE_PROCEDURE, &request, Some(&self.auth_token))
            .await?;
        Ok(())
    }
}
