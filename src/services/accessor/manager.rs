use super::backend::{AccessorError, Entry, TreeAccessor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

type ListingResult = Result<Vec<Entry>, AccessorError>;

/// Type alias for pending listing requests map
type PendingListings = Arc<Mutex<HashMap<String, Vec<oneshot::Sender<ListingResult>>>>>;

/// Shares one accessor between every level of a browsing session
///
/// Sits in front of the real accessor and deduplicates listing requests: if
/// several levels ask for the same path while a request is in flight, only
/// one call reaches the accessor and every requester receives the same
/// result. Byte-range reads are passed straight through.
///
/// Listing calls are spawned onto the tokio runtime, so this type must be
/// used from within one.
pub struct AccessorManager {
    accessor: Arc<dyn TreeAccessor>,
    /// Map of path -> channels waiting for the in-flight listing
    pending_listings: PendingListings,
}

impl fmt::Debug for AccessorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorManager")
            .field("accessor", &"<dyn TreeAccessor>")
            .field("pending_listings", &"<mutex>")
            .finish()
    }
}

impl AccessorManager {
    pub fn new(accessor: Arc<dyn TreeAccessor>) -> Self {
        Self {
            accessor,
            pending_listings: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TreeAccessor for AccessorManager {
    async fn list_directory(&self, path: &str) -> ListingResult {
        let (rx, should_execute) = {
            let mut pending = self.pending_listings.lock().await;
            let (tx, rx) = oneshot::channel();

            if let Some(senders) = pending.get_mut(path) {
                senders.push(tx);
                (rx, false)
            } else {
                pending.insert(path.to_string(), vec![tx]);
                (rx, true)
            }
        };

        if should_execute {
            // Run the listing on its own task so it completes even if the
            // requester that started it is dropped; other waiters still
            // get their result.
            let accessor = Arc::clone(&self.accessor);
            let pending = Arc::clone(&self.pending_listings);
            let path = path.to_string();
            tokio::spawn(async move {
                // The backend call gets a task of its own so a panic in it
                // still clears the pending entry and reaches every waiter
                let call_path = path.clone();
                let call =
                    tokio::spawn(async move { accessor.list_directory(&call_path).await });
                let result = match call.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("Listing of {:?} did not complete: {}", path, e);
                        Err(AccessorError::new("Listing request failed").with_reason(e.to_string()))
                    }
                };

                let senders = pending.lock().await.remove(&path).unwrap_or_default();
                for sender in senders {
                    // A waiter that went away just doesn't get its copy
                    let _ = sender.send(result.clone());
                }
            });
        }

        rx.await
            .unwrap_or_else(|_| Err(AccessorError::new("Listing request cancelled")))
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, AccessorError> {
        self.accessor.read_range(path, offset, len).await
    }
}

impl Clone for AccessorManager {
    fn clone(&self) -> Self {
        Self {
            accessor: Arc::clone(&self.accessor),
            pending_listings: Arc::clone(&self.pending_listings),
        }
    }
}
