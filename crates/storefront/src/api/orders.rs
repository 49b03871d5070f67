//! Order endpoints.

use nyraa_core::OrderStatus;
use reqwest::Method;
use tracing::instrument;

use crate::models::{Order, OrderPage, OrderStats};

use super::client::{Auth, CacheValue};
use super::types::{CreateOrderRequest, OrderEnvelope, OrdersEnvelope, StatsEnvelope, UpdateOrderStatusRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Submit a new order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend answers 2xx but flags
    /// the order as not created.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        let envelope: OrderEnvelope = self
            .send_json(Method::POST, "api/orders", request, Auth::Bearer)
            .await?;

        self.invalidate_cache();
        unwrap_order(envelope)
    }

    /// Fetch one page of order history, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(
        &self,
        page: u32,
        limit: u32,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, ApiError> {
        let key = status.map_or_else(
            || format!("orders:{page}:{limit}"),
            |s| format!("orders:{page}:{limit}:{s}"),
        );

        if let Some(CacheValue::Orders(cached)) = self.cache_get(&key).await {
            return Ok(cached);
        }

        let path = status.map_or_else(
            || format!("api/orders?page={page}&limit={limit}"),
            |s| format!("api/orders?page={page}&limit={limit}&status={s}"),
        );

        let envelope: OrdersEnvelope = self.get_json(&path, Auth::Bearer).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "failed to fetch orders".to_string()),
            ));
        }

        let result = OrderPage {
            orders: envelope.orders,
            pagination: envelope.pagination,
        };
        self.cache_put(key, CacheValue::Orders(result.clone())).await;
        Ok(result)
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn order(&self, id: &str) -> Result<Order, ApiError> {
        let key = format!("order:{id}");
        if let Some(CacheValue::Order(cached)) = self.cache_get(&key).await {
            return Ok(*cached);
        }

        let envelope: OrderEnvelope = self
            .get_json(&format!("api/orders/{id}"), Auth::Bearer)
            .await?;
        let order = unwrap_order(envelope)?;
        self.cache_put(key, CacheValue::Order(Box::new(order.clone())))
            .await;
        Ok(order)
    }

    /// Update an order's status (the customer-facing use is cancellation).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the transition is rejected.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        notes: &str,
    ) -> Result<Order, ApiError> {
        let envelope: OrderEnvelope = self
            .send_json(
                Method::PATCH,
                &format!("api/orders/{id}/status"),
                &UpdateOrderStatusRequest { status, notes },
                Auth::Bearer,
            )
            .await?;

        self.invalidate_cache();
        unwrap_order(envelope)
    }

    /// Aggregate order statistics for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn order_stats(&self) -> Result<OrderStats, ApiError> {
        let key = "orders:stats".to_string();
        if let Some(CacheValue::Stats(cached)) = self.cache_get(&key).await {
            return Ok(cached);
        }

        let envelope: StatsEnvelope = self.get_json("api/orders/stats", Auth::Bearer).await?;
        self.cache_put(key, CacheValue::Stats(envelope.stats.clone()))
            .await;
        Ok(envelope.stats)
    }
}

/// Unwrap the `{ success, order }` envelope into an order.
fn unwrap_order(envelope: OrderEnvelope) -> Result<Order, ApiError> {
    if !envelope.success {
        return Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "order request failed".to_string()),
        ));
    }
    envelope
        .order
        .ok_or_else(|| ApiError::Rejected("response carried no order".to_string()))
}
