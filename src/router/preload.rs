// Route preloading.
// Starts a route's query through the preload cache and watches it for CORS failures.

use tokio::runtime::Handle;
use tracing::{debug, error};

use crate::cache::{FetchHandle, FetchOptions, FetchPolicy, PreloadCache};
use crate::data::Environment;
use crate::error::{ErrorKind, Result};
use crate::state::Notifications;

use super::RouteMatch;

/// Preload the data of a matched route.
///
/// With a notification context, a watcher task clears the CORS flag when
/// the fetch completes and sets it when it fails with a missing origin.
/// Problems setting up the watcher are logged and never returned.
pub fn preload(
    cache: &PreloadCache,
    env: &Environment,
    route: &RouteMatch,
    notifications: Option<&Notifications>,
) -> Result<FetchHandle> {
    let variables = route.variables()?;
    let handle = cache.get(
        env,
        route.route.operation,
        &variables,
        FetchOptions::with_policy(FetchPolicy::StoreAndNetwork),
    );
    debug!(path = %route.path, handle = handle.id(), "route preloaded");

    if let Some(notifications) = notifications {
        watch_cors(&handle, notifications.clone());
    }

    Ok(handle)
}

fn watch_cors(handle: &FetchHandle, notifications: Notifications) {
    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("error in cors check: {}", e);
            return;
        }
    };

    let handle = handle.clone();
    runtime.spawn(async move {
        match handle.completion().await {
            Ok(()) => notifications.clear_cors_violation(),
            Err(failure) if failure.kind == ErrorKind::MissingCors => {
                notifications.set_cors_violation()
            }
            Err(_) => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{MockTransport, environment};
    use crate::error::BlogError;
    use crate::router::resolve;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_preload_reuses_cached_handle() {
        let transport = Arc::new(MockTransport::new());
        let env = environment(transport.clone());
        let cache = PreloadCache::new();

        let with_slug = resolve("/", "/post/5/some-title").unwrap();
        let without_slug = resolve("/", "/post/5").unwrap();

        let a = preload(&cache, &env, &with_slug, None).unwrap();
        let b = preload(&cache, &env, &without_slug, None).unwrap();
        assert!(FetchHandle::ptr_eq(&a, &b));

        a.completion().await.unwrap();
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cors_failure_sets_flag_and_success_clears_it() {
        let transport = Arc::new(MockTransport::new());
        transport.fail("PostsQuery", "cors");
        let env = environment(transport.clone());
        let cache = PreloadCache::new();
        let notifications = Notifications::new();

        let route = resolve("/", "/").unwrap();
        let handle = preload(&cache, &env, &route, Some(&notifications)).unwrap();
        assert!(handle.completion().await.is_err());
        tokio::task::yield_now().await;
        assert!(notifications.cors_violation());

        transport.respond("PostQuery", serde_json::json!({}));
        let route = resolve("/", "/post/1").unwrap();
        let handle = preload(&cache, &env, &route, Some(&notifications)).unwrap();
        handle.completion().await.unwrap();
        tokio::task::yield_now().await;
        assert!(!notifications.cors_violation());
    }

    #[tokio::test]
    async fn test_generic_failure_leaves_flag_alone() {
        let transport = Arc::new(MockTransport::new());
        transport.fail("PostsQuery", "Something broke");
        let env = environment(transport);
        let cache = PreloadCache::new();
        let notifications = Notifications::new();

        let handle = preload(&cache, &env, &resolve("/", "/").unwrap(), Some(&notifications)).unwrap();
        assert!(handle.completion().await.is_err());
        tokio::task::yield_now().await;
        assert!(!notifications.cors_violation());
    }

    #[tokio::test]
    async fn test_invalid_variables_fail_before_fetch() {
        let transport = Arc::new(MockTransport::new());
        let env = environment(transport.clone());
        let cache = PreloadCache::new();

        let err = preload(&cache, &env, &resolve("/", "/post/x").unwrap(), None).unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_watcher_without_runtime_is_logged() {
        let notifications = Notifications::new();
        let (handle, _sender) = FetchHandle::channel(crate::cache::Fingerprint::new(
            &crate::github::operations::POSTS_QUERY,
            &serde_json::json!({}),
        ));

        watch_cors(&handle, notifications.clone());
        assert!(!notifications.cors_violation());
    }
}
