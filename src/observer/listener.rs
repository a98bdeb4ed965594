use super::MutationObserver;
use crate::transaction::{MutationNotification, TransactionContext};
use log::debug;
use std::sync::Arc;

/// Host-facing hooks of a transaction listener
///
/// None of the hooks can fail: a listener must never make the host's
/// transaction fail or roll back.
pub trait TransactionListener: Send + Sync {
    /// Name for debugging
    fn name(&self) -> &str;

    /// Listeners with a higher priority are notified first
    fn priority(&self) -> i32 {
        0
    }

    /// The host has begun a transaction
    fn before_transaction(&self, _ctx: &mut TransactionContext) {}

    /// A mutating operation is being applied
    fn data_store_change(&self, ctx: &mut TransactionContext, notification: &MutationNotification<'_>);

    /// The host is about to commit
    fn before_commit(&self, _ctx: &mut TransactionContext) {}

    /// The transaction finished, committed or rolled back
    fn after_transaction(&self, ctx: &mut TransactionContext, committed: bool);
}

impl TransactionListener for MutationObserver {
    fn name(&self) -> &str {
        self.namespace()
    }

    fn priority(&self) -> i32 {
        self.config().priority
    }

    fn data_store_change(&self, ctx: &mut TransactionContext, notification: &MutationNotification<'_>) {
        self.on_before_operation(ctx, notification);
    }

    fn after_transaction(&self, ctx: &mut TransactionContext, committed: bool) {
        self.on_transaction_end(ctx, committed);
    }
}

/// Ordered set of listeners installed into the host
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn TransactionListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Install a listener. Equal priorities keep registration order.
    pub fn register(&mut self, listener: Arc<dyn TransactionListener>) {
        debug!(
            "Registered transaction listener: {} (priority {})",
            listener.name(),
            listener.priority()
        );
        let position = self
            .listeners
            .iter()
            .position(|existing| existing.priority() < listener.priority())
            .unwrap_or(self.listeners.len());
        self.listeners.insert(position, listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener names in notification order
    pub fn names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn before_transaction(&self, ctx: &mut TransactionContext) {
        for listener in &self.listeners {
            listener.before_transaction(ctx);
        }
    }

    pub fn data_store_change(&self, ctx: &mut TransactionContext, notification: &MutationNotification<'_>) {
        for listener in &self.listeners {
            listener.data_store_change(ctx, notification);
        }
    }

    pub fn before_commit(&self, ctx: &mut TransactionContext) {
        for listener in &self.listeners {
            listener.before_commit(ctx);
        }
    }

    pub fn after_transaction(&self, ctx: &mut TransactionContext, committed: bool) {
        for listener in &self.listeners {
            listener.after_transaction(ctx, committed);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
