//! Coin redemption store endpoints.

use crate::infrastructure::dto::http::{OrderRequest, OrderResponse, RedeemItemDto};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /redeem/items`
    pub async fn redeem_items(&self) -> Result<Vec<RedeemItemDto>, ApiError> {
        self.get_json("/redeem/items").await
    }

    /// `POST /redeem/order`
    pub async fn place_order(
        &self,
        item_id: &str,
        quantity: u32,
        delivery_address: &str,
    ) -> Result<OrderResponse, ApiError> {
        self.post_json(
            "/redeem/order",
            &OrderRequest {
                item_id: item_id.to_string(),
                quantity,
                delivery_address: delivery_address.to_string(),
            },
        )
        .await
    }
}
