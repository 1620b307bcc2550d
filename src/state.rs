use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::notify::{BroadcastNotifier, Notifier};
use crate::payments::PaymentGateway;

/// Shared application context. The notification hub and payment gateway are
/// injected here so services never reach into globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub hub: BroadcastNotifier,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Emitter seam handed to the lifecycle services.
    pub fn notifier(&self) -> &dyn Notifier {
        &self.hub
    }
}
