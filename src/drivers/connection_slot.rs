use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;

/// Holds at most one live connection for a driver instance.
///
/// The lock is held while a connection is being opened, so concurrent callers
/// wait for the in-flight open and then share its connection.
pub struct ConnectionSlot<C> {
    inner: Mutex<Option<Arc<C>>>,
}

impl<C> ConnectionSlot<C> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Returns the live connection, opening it with `open` if there is none.
    /// A failed open leaves the slot empty.
    pub async fn get_or_open<F, Fut>(&self, open: F) -> Result<Arc<C>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        let mut slot = self.inner.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(Arc::clone(conn));
        }
        let conn = Arc::new(open().await?);
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }

    /// Removes and returns the live connection, if any.
    pub async fn take(&self) -> Option<Arc<C>> {
        self.inner.lock().await.take()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

impl<C> Default for ConnectionSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
