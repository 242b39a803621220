use async_trait::async_trait;
use mockall::mock;
use order_porter_engine::OrderSource;
use vivid_tools::{OrderRecord, OrderStatus, TransferRequest, TransferResult, VividApiError};

mock! {
    pub Vendor {}
    #[async_trait]
    impl OrderSource for Vendor {
        async fn fetch_orders(&self, status: OrderStatus) -> Result<Vec<OrderRecord>, VividApiError>;
        async fn fetch_retransfer_pending(&self) -> Result<Vec<OrderRecord>, VividApiError>;
        async fn fetch_order_detail(&self, order_id: &str) -> Result<OrderRecord, VividApiError>;
        async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferResult, VividApiError>;
    }
}
