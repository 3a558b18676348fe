// Preloaded-query cache.
// At most one fetch per fingerprint and environment between clears.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::data::{Environment, EnvironmentId};
use crate::github::Operation;

use super::fingerprint::Fingerprint;
use super::handle::{FetchHandle, FetchPolicy};

/// Options for [`PreloadCache::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub policy: FetchPolicy,
}

impl FetchOptions {
    pub fn with_policy(policy: FetchPolicy) -> Self {
        Self { policy }
    }
}

/// Fetch handles keyed by environment, then fingerprint.
#[derive(Debug, Default)]
pub struct PreloadCache {
    entries: Mutex<HashMap<EnvironmentId, HashMap<Fingerprint, FetchHandle>>>,
}

impl PreloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached handle for this query, or start a fetch and cache it.
    ///
    /// A hit returns the very same handle and issues no request, whatever
    /// the options say.
    pub fn get(
        &self,
        env: &Environment,
        operation: &'static Operation,
        variables: &Value,
        options: FetchOptions,
    ) -> FetchHandle {
        let fingerprint = Fingerprint::new(operation, variables);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let scoped = entries.entry(env.id()).or_default();

        if let Some(handle) = scoped.get(&fingerprint) {
            debug!(%fingerprint, handle = handle.id(), "preload cache hit");
            return handle.clone();
        }

        debug!(%fingerprint, policy = ?options.policy, "preload cache miss");
        let handle = env.execute(operation, variables, options.policy);
        scoped.insert(fingerprint, handle.clone());
        handle
    }

    /// Drop every entry of one environment.
    pub fn clear(&self, env: &Environment) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&env.id())
            .map_or(0, |scoped| scoped.len());
        debug!(removed, "preload cache cleared");
    }

    /// Number of entries held for an environment.
    pub fn len(&self, env: &Environment) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&env.id())
            .map_or(0, HashMap::len)
    }

    pub fn contains(&self, env: &Environment, operation: &Operation, variables: &Value) -> bool {
        let fingerprint = Fingerprint::new(operation, variables);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&env.id())
            .is_some_and(|scoped| scoped.contains_key(&fingerprint))
    }
}
