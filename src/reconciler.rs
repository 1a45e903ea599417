use std::sync::Arc;

use thiserror::Error;

use crate::coingate::error::CoinGateError;
use crate::coingate::types::CoinGateOrder;
use crate::coingate::OrderApi;
use crate::models::OrderState;
use crate::store::{OrderStore, PaymentStore, StoreError};

/// What a reconciliation run did to the local order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Confirmed payment: the order moved `pending` → `processing`.
    MarkedProcessing,
    /// Terminal-negative status: the order moved `pending` → `canceled`.
    Canceled,
    /// Valid callback, nothing to apply: non-terminal status, or the order
    /// had already settled (duplicate or out-of-order delivery).
    NoChange,
    /// The callback could not be processed. The local order is untouched;
    /// details are in the log.
    Failed,
}

/// Why a reconciliation run failed. Logged at the boundary, never returned
/// from [`CallbackReconciler::reconcile`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no payment record for order {0}")]
    PaymentNotFound(String),

    #[error("callback token does not match the stored token for order {0}")]
    TokenMismatch(String),

    #[error("gateway order {0} does not exist")]
    RemoteOrderNotFound(i64),

    #[error(transparent)]
    Gateway(#[from] CoinGateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies gateway payment-status notifications to local orders.
///
/// The gateway is the source of truth for payment status; the local order
/// state is a projection of it. A callback only ever moves an order one way:
/// `pending` orders become `processing` (paid) or `canceled`
/// (invalid/expired/canceled/refunded), settled orders stay put. Transitions
/// go through the order store's compare-and-set, so duplicate and concurrent
/// deliveries of the same notification apply at most once.
pub struct CallbackReconciler {
    gateway: Arc<dyn OrderApi>,
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentStore>,
}

impl CallbackReconciler {
    pub fn new(
        gateway: Arc<dyn OrderApi>,
        orders: Arc<dyn OrderStore>,
        payments: Arc<dyn PaymentStore>,
    ) -> Self {
        CallbackReconciler {
            gateway,
            orders,
            payments,
        }
    }

    /// Reconcile one callback: check the token, then fetch the gateway order
    /// named by `remote_id` and apply whatever transition its status calls
    /// for.
    ///
    /// Never panics and never returns an error. The notification endpoint
    /// must always be able to acknowledge, or the gateway would keep
    /// retrying a callback that is already durably logged. Failures collapse
    /// to [`ReconcileOutcome::Failed`] after an error-level log.
    pub async fn reconcile(
        &self,
        increment_id: &str,
        remote_id: i64,
        token: &str,
    ) -> ReconcileOutcome {
        match self.try_reconcile(increment_id, remote_id, token).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    order_id = %increment_id,
                    remote_id,
                    error = %e,
                    "Callback reconciliation failed"
                );
                ReconcileOutcome::Failed
            }
        }
    }

    async fn try_reconcile(
        &self,
        increment_id: &str,
        remote_id: i64,
        token: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        // The token is the capability gating the callback. Fail closed before
        // touching the gateway or the order.
        self.verify_token(increment_id, token).await?;

        let remote = self
            .gateway
            .get_order(remote_id)
            .await?
            .ok_or(ReconcileError::RemoteOrderNotFound(remote_id))?;

        let status = remote.payment_status();
        if status.is_paid() {
            self.mark_processing(increment_id, remote_id).await
        } else if status.is_terminal_negative() {
            self.cancel(&remote).await
        } else {
            tracing::debug!(
                order_id = %increment_id,
                remote_id,
                status = %remote.status,
                "Non-terminal gateway status, order left untouched"
            );
            Ok(ReconcileOutcome::NoChange)
        }
    }

    async fn verify_token(&self, increment_id: &str, token: &str) -> Result<(), ReconcileError> {
        let payment = self
            .payments
            .get(increment_id)
            .await?
            .ok_or_else(|| ReconcileError::PaymentNotFound(increment_id.to_string()))?;

        match payment.gateway_token() {
            Some(stored) if stored == token => Ok(()),
            _ => Err(ReconcileError::TokenMismatch(increment_id.to_string())),
        }
    }

    async fn mark_processing(
        &self,
        increment_id: &str,
        remote_id: i64,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let applied = self
            .orders
            .transition(increment_id, OrderState::Pending, OrderState::Processing)
            .await?;

        if applied {
            tracing::info!(
                order_id = %increment_id,
                remote_id,
                "Order marked processing on confirmed payment"
            );
            Ok(ReconcileOutcome::MarkedProcessing)
        } else {
            tracing::info!(
                order_id = %increment_id,
                remote_id,
                "Duplicate paid callback ignored (order already settled)"
            );
            Ok(ReconcileOutcome::NoChange)
        }
    }

    async fn cancel(&self, remote: &CoinGateOrder) -> Result<ReconcileOutcome, ReconcileError> {
        // The gateway's echoed order id decides which local order to cancel,
        // not the order the callback URL happened to resolve.
        let increment_id = remote.order_id.as_str();

        let applied = self
            .orders
            .transition(increment_id, OrderState::Pending, OrderState::Canceled)
            .await?;

        if applied {
            tracing::info!(
                order_id = %increment_id,
                remote_id = remote.id,
                status = %remote.status,
                "Order canceled on terminal gateway status"
            );
            Ok(ReconcileOutcome::Canceled)
        } else {
            tracing::info!(
                order_id = %increment_id,
                remote_id = remote.id,
                "Cancel callback ignored (order already settled)"
            );
            Ok(ReconcileOutcome::NoChange)
        }
    }
}
