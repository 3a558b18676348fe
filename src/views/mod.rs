// View models.
// Turn fetch handles into renderable content, with failures caught by the error boundary.

pub mod boundary;
pub mod format;
pub mod post;
pub mod posts;

use serde_json::Value;

use crate::cache::{FetchHandle, FetchStatus};
use crate::error::Result;

pub use boundary::{ErrorBoundary, ErrorPanel, inside_boundary};
pub use post::{PostView, build_post};
pub use posts::{PostSummary, posts_connection, summaries};

/// What a route shows right now.
#[derive(Debug, Clone)]
pub enum Content<T> {
    /// No data yet; the fallback is shown.
    Loading,
    Ready(T),
    Failed(ErrorPanel),
}

/// Resolve a handle's current state through the boundary.
pub fn resolve<T, F>(boundary: &ErrorBoundary, handle: &FetchHandle, build: F) -> Content<T>
where
    F: FnOnce(&Value) -> Result<T>,
{
    let state = handle.snapshot();
    match (state.status, state.data) {
        (FetchStatus::Failed(failure), _) => Content::Failed(boundary.panel(&failure)),
        (_, Some(data)) => match boundary.render(|| build(&data)) {
            Ok(view) => Content::Ready(view),
            Err(panel) => Content::Failed(panel),
        },
        (FetchStatus::Fetching, None) | (FetchStatus::Complete, None) => Content::Loading,
    }
}
