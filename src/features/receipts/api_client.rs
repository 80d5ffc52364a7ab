// ReceiptsService との通信を行うクライアント

use super::models::{
    GetReceiptRequest, GetReceiptResponse, ListReceiptsRequest, ListReceiptsResponse,
    ListReceiptsSince, Receipt, UpdateReceiptRequest,
};
use crate::features::table::RecordId;
use crate::shared::api_client::{ApiClient, EmptyResponse};
use crate::shared::errors::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;

pub const LIST_RECEIPTS_PROCEDURE: &str = "/receipts.v1.ReceiptsService/ListReceipts";
pub const GET_RECEIPT_PROCEDURE: &str = "/receipts.v1.ReceiptsService/GetReceipt";
pub const UPDATE_RECEIPT_PROCEDURE: &str = "/receipts.v1.ReceiptsService/UpdateReceipt";

/// 領収書の部分更新をバックエンドへ送る
pub trait ReceiptUpdater: Send + Sync {
    /// 領収書を部分更新する（リトライしない）
    fn update_receipt(
        &self,
        request: UpdateReceiptRequest,
    ) -> impl Future<Output = AppResult<()>> + Send;
}

/// ログイン中ユーザーのトークンを持つ ReceiptsService クライアント
#[derive(Clone)]
pub struct ReceiptsClient {
    api: Arc<ApiClient>,
    auth_token: String,
}

impl ReceiptsClient {
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

    /// 領収書の一覧を取得する
    ///
    /// # 引数
    /// * `since` - 取得対象期間
    ///
    /// # 戻り値
    /// バックエンドが返した順序の領収書
    pub async fn list_receipts(&self, since: ListReceiptsSince) -> AppResult<Vec<Receipt>> {
        let response: ListReceiptsResponse = self
            .api
            .call_with_retry(
                LIST_RECEIPTS_PROCEDURE,
                &ListReceiptsRequest { since },
                Some(&self.auth_token),
            )
            .await?;

        log::info!("領収書一覧を取得しました: count={}", response.receipts.len());
        Ok(response.receipts.into_iter().map(Receipt::from).collect())
    }

    /// 領収書を1件取得する
    ///
    /// # 引数
    /// * `id` - 領収書ID
    pub async fn get_receipt(&self, id: RecordId) -> AppResult<Receipt> {
        let response: GetReceiptResponse = self
            .api
            .call_with_retry(
                GET_RECEIPT_PROCEDURE,
                &GetReceiptRequest { id },
                Some(&self.auth_token),
            )
            .await?;

        response
            .receipt
            .map(Receipt::from)
            .ok_or_else(|| AppError::not_found("領収書"))
    }
}

impl ReceiptUpdater for ReceiptsClient {
    async fn update_receipt(&self, request: UpdateReceiptRequest) -> AppResult<()> {
        log::debug!("領収書更新を送信します: id={}", request.id);
        let _: EmptyResponse = self
            .api
            .call(UPDATE_RECEIPT_PROCEDURE, &request, Some(&self.auth_token))
            .await?;
        Ok(())
    }
}
