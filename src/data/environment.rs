// Fetching environment.
// Binds a transport, the fixed request variables and a record store under one identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::{FetchHandle, FetchPolicy, Fingerprint};
use crate::error::{FetchFailure, Result};
use crate::github::{GraphQlRequest, Operation, ReactionGroup, Transport};

use super::records::RecordStore;

static NEXT_ENVIRONMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an environment; preload cache entries are scoped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(u64);

struct EnvironmentInner {
    id: EnvironmentId,
    transport: Arc<dyn Transport>,
    fixed_variables: Map<String, Value>,
    records: Mutex<RecordStore>,
}

/// Shared fetching context. Cloning yields the same environment.
#[derive(Clone)]
pub struct Environment {
    inner: Arc<EnvironmentInner>,
}

impl Environment {
    /// Create an environment. Fixed variables are merged into every request
    /// but never take part in fingerprints.
    pub fn new(transport: Arc<dyn Transport>, fixed_variables: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(EnvironmentInner {
                id: EnvironmentId(NEXT_ENVIRONMENT_ID.fetch_add(1, Ordering::Relaxed)),
                transport,
                fixed_variables,
                records: Mutex::new(RecordStore::new()),
            }),
        }
    }

    pub fn id(&self) -> EnvironmentId {
        self.inner.id
    }

    fn records(&self) -> MutexGuard<'_, RecordStore> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge fixed variables under the free ones; free variables win.
    pub fn request(&self, operation: &'static Operation, variables: &Value) -> GraphQlRequest {
        let mut merged = self.inner.fixed_variables.clone();
        if let Value::Object(free) = variables {
            for (key, value) in free {
                merged.insert(key.clone(), value.clone());
            }
        }
        GraphQlRequest {
            operation,
            variables: Value::Object(merged),
        }
    }

    /// Start a query and return its handle.
    ///
    /// Must be called inside a tokio runtime; the network call runs as a task.
    pub fn execute(
        &self,
        operation: &'static Operation,
        variables: &Value,
        policy: FetchPolicy,
    ) -> FetchHandle {
        let fingerprint = Fingerprint::new(operation, variables);
        let (handle, sender) = FetchHandle::channel(fingerprint.clone());

        if policy != FetchPolicy::NetworkOnly {
            if let Some(stored) = self.records().payload(&fingerprint) {
                debug!(%fingerprint, "serving stored payload");
                sender.emit(stored);
                if policy == FetchPolicy::StoreOrNetwork {
                    sender.complete();
                    return handle;
                }
            }
        }

        let request = self.request(operation, variables);
        let env = self.clone();
        tokio::spawn(async move {
            match env.inner.transport.execute(request).await {
                Ok(payload) => {
                    let payload = Arc::new(payload);
                    {
                        let mut records = env.records();
                        records.publish(&payload);
                        records.store_payload(fingerprint, payload.clone());
                    }
                    sender.emit(payload);
                    sender.complete();
                }
                Err(e) => {
                    warn!(%fingerprint, "query failed: {}", e);
                    sender.fail(FetchFailure::from(&e));
                }
            }
        });

        handle
    }

    /// Run a query outside the preload cache and wait for it.
    pub async fn fetch(&self, operation: &'static Operation, variables: &Value) -> Result<Value> {
        let payload = self
            .inner
            .transport
            .execute(self.request(operation, variables))
            .await?;
        self.records().publish(&payload);
        Ok(payload)
    }

    /// Send a mutation and publish its response into the record store.
    pub async fn mutate(&self, operation: &'static Operation, variables: &Value) -> Result<Value> {
        debug!(operation = operation.name, "committing mutation");
        self.fetch(operation, variables).await
    }

    /// Current reaction groups for a subject.
    pub fn reaction_groups(&self, subject_id: &str) -> Option<Vec<ReactionGroup>> {
        self.records().reaction_groups(subject_id).cloned()
    }

    /// Apply a local update to a subject's reaction groups and return the
    /// groups as they were before. Subjects never seen start out empty.
    pub fn update_reaction_groups<F>(&self, subject_id: &str, update: F) -> Vec<ReactionGroup>
    where
        F: FnOnce(&mut Vec<ReactionGroup>),
    {
        let mut records = self.records();
        let previous = records
            .reaction_groups(subject_id)
            .cloned()
            .unwrap_or_default();
        let mut next = previous.clone();
        update(&mut next);
        records.set_reaction_groups(subject_id, next);
        previous
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.inner.id)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use crate::error::BlogError;

    /// In-memory transport answering by operation name and counting requests.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<HashMap<&'static str, std::result::Result<Value, String>>>,
        pub calls: AtomicUsize,
        pub requests: Mutex<Vec<GraphQlRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, operation: &'static str, payload: Value) {
            self.responses
                .lock()
                .unwrap()
                .insert(operation, Ok(payload));
        }

        pub fn fail(&self, operation: &'static str, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(operation, Err(message.to_string()));
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = request.operation.name;
            self.requests.lock().unwrap().push(request);
            let response = self.responses.lock().unwrap().get(name).cloned();
            match response {
                Some(Ok(payload)) => Ok(payload),
                Some(Err(message)) if message == "cors" => Err(BlogError::MissingCorsOrigin),
                Some(Err(message)) => Err(BlogError::GraphQl(message)),
                None => Ok(Value::Object(Map::new())),
            }
        }
    }

    pub fn environment(transport: Arc<MockTransport>) -> Environment {
        let mut fixed = Map::new();
        fixed.insert("repoOwner".to_string(), Value::from("octo"));
        fixed.insert("repoName".to_string(), Value::from("blog"));
        Environment::new(transport, fixed)
    }
}
