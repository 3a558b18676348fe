// State management module.
// Handles navigation, pagination, reactions, session and notification state.

pub mod connection;
pub mod navigation;
pub mod notifications;
pub mod pagination;
pub mod progress;
pub mod reactions;
pub mod session;
pub mod throttle;

pub use connection::Connection;
pub use navigation::{BreadcrumbNode, HistoryEntry, NavigationStack};
pub use notifications::{NoticeLevel, Notifications};
pub use pagination::{LoadRequest, Paginator, Viewport};
pub use progress::ReadingProgress;
pub use reactions::ReactionMutator;
pub use session::{LoginStatus, Session};
pub use throttle::{FRAME, Throttle};
