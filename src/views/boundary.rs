// Error boundary.
// Runs a view builder and substitutes an error panel for any failure or panic.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::error::{ErrorKind, FetchFailure, Result};

const CORS_REMEDIATION: &str = "Allow the current URL in the CORS Origins form on the OneGraph Dashboard.";

thread_local! {
    static BOUNDARY_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Whether the current thread is rendering inside a boundary, where a
/// panic is recovered rather than fatal.
pub fn inside_boundary() -> bool {
    BOUNDARY_DEPTH.with(|depth| depth.get() > 0)
}

/// Steps the reader can take to fix a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    pub text: String,
    pub link: Option<String>,
}

/// What is shown in place of a view that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub kind: ErrorKind,
    pub message: String,
    pub remediation: Option<Remediation>,
}

/// Failure-intercepting render scope.
#[derive(Debug, Clone, Default)]
pub struct ErrorBoundary {
    app_id: Option<String>,
}

impl ErrorBoundary {
    pub fn new(app_id: Option<String>) -> Self {
        Self { app_id }
    }

    /// Build a view, turning an error or a panic into a panel.
    pub fn render<T, F>(&self, build: F) -> std::result::Result<T, ErrorPanel>
    where
        F: FnOnce() -> Result<T>,
    {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
        let outcome = panic::catch_unwind(AssertUnwindSafe(build));
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));

        match outcome {
            Ok(Ok(view)) => Ok(view),
            Ok(Err(e)) => Err(self.panel(&FetchFailure::from(&e))),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("view panicked: {}", message);
                Err(self.panel(&FetchFailure::new(ErrorKind::Generic, message)))
            }
        }
    }

    /// Panel for a failure; a missing CORS origin gets remediation steps.
    pub fn panel(&self, failure: &FetchFailure) -> ErrorPanel {
        let remediation = match failure.kind {
            ErrorKind::MissingCors => Some(Remediation {
                text: CORS_REMEDIATION.to_string(),
                link: self
                    .app_id
                    .as_ref()
                    .map(|app_id| format!("https://www.onegraph.com/dashboard/app/{}", app_id)),
            }),
            ErrorKind::NotFound | ErrorKind::Generic => None,
        };
        ErrorPanel {
            kind: failure.kind,
            message: failure.message.clone(),
            remediation,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unexpected error".to_string()
    }
}
