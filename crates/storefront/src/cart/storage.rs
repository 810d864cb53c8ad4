//! Persistence ports for the cart.
//!
//! The cart is stored as one record (a JSON array of line items) in one
//! slot. Writes always replace the whole record; there is no merge, so two
//! tabs sharing a session overwrite each other and the last write wins.

use std::future::Future;
use std::sync::Arc;

use fashionable_queen_core::Cart;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;

use crate::models::session_keys;

/// Errors reading or writing the cart slot.
#[derive(Debug, Error)]
pub enum CartStorageError {
    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The cart could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read/write access to the single cart slot.
pub trait CartStorage: Send + Sync {
    /// Raw contents of the slot, or `None` when nothing was stored yet.
    fn read(
        &self,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, CartStorageError>> + Send;

    /// Replace the slot with `cart`.
    fn write(&self, cart: &Cart) -> impl Future<Output = Result<(), CartStorageError>> + Send;
}

/// Cart slot kept in the visitor's session under [`session_keys::CART`].
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn read(&self) -> Result<Option<serde_json::Value>, CartStorageError> {
        Ok(self
            .session
            .get::<serde_json::Value>(session_keys::CART)
            .await?)
    }

    async fn write(&self, cart: &Cart) -> Result<(), CartStorageError> {
        let value = serde_json::to_value(cart)?;
        self.session.insert(session_keys::CART, value).await?;
        Ok(())
    }
}

/// In-memory slot. Clones share the same slot, like tabs sharing one
/// browser profile.
#[derive(Clone, Default)]
pub struct MemoryCartStorage {
    slot: Arc<Mutex<Option<serde_json::Value>>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the slot with raw contents.
    #[must_use]
    pub fn with_contents(value: serde_json::Value) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(value))),
        }
    }

    /// Current raw contents of the slot.
    pub async fn contents(&self) -> Option<serde_json::Value> {
        self.slot.lock().await.clone()
    }
}

impl CartStorage for MemoryCartStorage {
    async fn read(&self) -> Result<Option<serde_json::Value>, CartStorageError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn write(&self, cart: &Cart) -> Result<(), CartStorageError> {
        let value = serde_json::to_value(cart)?;
        *self.slot.lock().await = Some(value);
        Ok(())
    }
}
