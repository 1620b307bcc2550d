//! External payment collaborator.
//!
//! Card authorization and refunds happen in an external processor; this
//! module only defines the seam the order services call through, keyed by
//! an opaque charge reference stored on the order.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub order_id: Uuid,
    pub order_number: String,
    /// Minor currency units.
    pub amount: i64,
    pub customer_email: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a charge for a card order; returns the processor's reference.
    async fn create_charge(&self, request: ChargeRequest) -> AppResult<String>;

    /// Reverse a settled charge. A failure here must abort the refund.
    async fn refund_charge(&self, payment_ref: &str) -> AppResult<()>;
}

/// Gateway used when no processor is configured: charges succeed with a
/// locally generated reference and refunds are recorded without a reversal.
/// Suitable for development and for cash-only deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn create_charge(&self, request: ChargeRequest) -> AppResult<String> {
        let reference = format!("offline_{}", Uuid::new_v4().simple());
        tracing::info!(
            order_number = %request.order_number,
            amount = request.amount,
            %reference,
            "offline charge recorded"
        );
        Ok(reference)
    }

    async fn refund_charge(&self, payment_ref: &str) -> AppResult<()> {
        tracing::info!(%payment_ref, "offline refund recorded");
        Ok(())
    }
}

/// Gateway whose refunds always fail. Lets tests assert that a reversal
/// failure leaves the order's payment state untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingGateway;

#[async_trait]
impl PaymentGateway for RejectingGateway {
    async fn create_charge(&self, _request: ChargeRequest) -> AppResult<String> {
        Err(AppError::ExternalPayment("charge rejected".into()))
    }

    async fn refund_charge(&self, _payment_ref: &str) -> AppResult<()> {
        Err(AppError::ExternalPayment("refund rejected".into()))
    }
}
