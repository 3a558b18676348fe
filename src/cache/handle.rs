// Fetch handles.
// A shared, subscribable view of one in-flight or completed request.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::watch;

use crate::error::{ErrorKind, FetchFailure};

use super::fingerprint::Fingerprint;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// How a fetch may use previously stored results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Serve a stored result immediately, then revalidate over the network.
    #[default]
    StoreAndNetwork,
    /// Serve a stored result if there is one, otherwise fetch.
    StoreOrNetwork,
    /// Always fetch.
    NetworkOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Fetching,
    Complete,
    Failed(FetchFailure),
}

impl FetchStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, FetchStatus::Fetching)
    }
}

/// Latest data plus request status.
#[derive(Debug, Clone)]
pub struct FetchState {
    pub data: Option<Arc<Value>>,
    pub status: FetchStatus,
}

impl FetchState {
    fn initial() -> Self {
        Self {
            data: None,
            status: FetchStatus::Fetching,
        }
    }
}

struct HandleInner {
    id: u64,
    fingerprint: Fingerprint,
    receiver: watch::Receiver<FetchState>,
}

/// Cloneable handle to a fetch. Clones compare equal with [`FetchHandle::ptr_eq`].
#[derive(Clone)]
pub struct FetchHandle {
    inner: Arc<HandleInner>,
}

/// Producer side of a handle, owned by the task doing the fetch.
pub struct HandleSender {
    sender: watch::Sender<FetchState>,
}

impl FetchHandle {
    pub(crate) fn channel(fingerprint: Fingerprint) -> (FetchHandle, HandleSender) {
        let (sender, receiver) = watch::channel(FetchState::initial());
        let handle = FetchHandle {
            inner: Arc::new(HandleInner {
                id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
                fingerprint,
                receiver,
            }),
        };
        (handle, HandleSender { sender })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.inner.fingerprint
    }

    /// Whether both handles refer to the same fetch.
    pub fn ptr_eq(a: &FetchHandle, b: &FetchHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn snapshot(&self) -> FetchState {
        self.inner.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.receiver.clone()
    }

    /// Wait until the fetch completes or fails.
    pub async fn completion(&self) -> Result<(), FetchFailure> {
        let state = self.settled().await?;
        match state.status {
            FetchStatus::Failed(failure) => Err(failure),
            _ => Ok(()),
        }
    }

    /// Wait for the final data of the fetch.
    #[cfg(test)]
    pub async fn data(&self) -> Result<Arc<Value>, FetchFailure> {
        let state = self.settled().await?;
        match (state.status, state.data) {
            (FetchStatus::Failed(failure), _) => Err(failure),
            (_, Some(data)) => Ok(data),
            (_, None) => Err(FetchFailure::new(ErrorKind::Generic, "No data")),
        }
    }

    async fn settled(&self) -> Result<FetchState, FetchFailure> {
        let mut receiver = self.subscribe();
        let state = receiver
            .wait_for(|state| state.status.is_settled())
            .await
            .map_err(|_| FetchFailure::new(ErrorKind::Generic, "Request was abandoned"))?;
        Ok(state.clone())
    }
}

impl fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("id", &self.inner.id)
            .field("fingerprint", &self.inner.fingerprint)
            .finish()
    }
}

impl HandleSender {
    /// Publish data without settling; later data replaces it.
    pub fn emit(&self, data: Arc<Value>) {
        self.sender.send_modify(|state| state.data = Some(data));
    }

    pub fn complete(&self) {
        self.sender
            .send_modify(|state| state.status = FetchStatus::Complete);
    }

    pub fn fail(&self, failure: FetchFailure) {
        self.sender
            .send_modify(|state| state.status = FetchStatus::Failed(failure));
    }
}
