//! Account watcher port.

use async_trait::async_trait;

use crate::domain::foundation::PublicKey;

/// Told when a gift creates an account, so zaps to that account are
/// subscribed to from then on.
///
/// Delivery is best effort. Implementations log their own failures.
#[async_trait]
pub trait AccountWatcher: Send + Sync {
    async fn watch(&self, pubkey: &PublicKey);
}
