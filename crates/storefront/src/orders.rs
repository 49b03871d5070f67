//! Order history service.

use nyraa_core::OrderStatus;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::{Order, OrderPage, OrderStats};

/// Errors from order history operations.
#[derive(Debug, Error)]
pub enum OrderHistoryError {
    /// The order has progressed past the point of cancellation.
    #[error("order {id} can no longer be cancelled (status: {status})")]
    NotCancellable { id: String, status: OrderStatus },

    /// Backend API error.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Typed access to the account's order history.
pub struct OrderService<'a> {
    api: &'a ApiClient,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// One page of order history, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Api`] if the request fails.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, OrderHistoryError> {
        Ok(self.api.orders(page, limit, status).await?)
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Api`] if the request fails.
    pub async fn get(&self, id: &str) -> Result<Order, OrderHistoryError> {
        Ok(self.api.order(id).await?)
    }

    /// Cancel an order.
    ///
    /// Guarded client-side: only pending and processing orders may be
    /// cancelled. The server applies the same rule; this avoids a doomed
    /// round-trip and gives a precise error.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::NotCancellable`] if the order has
    /// shipped, been delivered, or is already cancelled.
    pub async fn cancel(&self, id: &str, notes: &str) -> Result<Order, OrderHistoryError> {
        let order = self.api.order(id).await?;
        if !order.status.is_cancellable() {
            return Err(OrderHistoryError::NotCancellable {
                id: order.id,
                status: order.status,
            });
        }

        Ok(self
            .api
            .update_order_status(id, OrderStatus::Cancelled, notes)
            .await?)
    }

    /// Aggregate statistics for the account.
    ///
    /// # Errors
    ///
    /// Returns [`OrderHistoryError::Api`] if the request fails.
    pub async fn stats(&self) -> Result<OrderStats, OrderHistoryError> {
        Ok(self.api.order_stats().await?)
    }
}
