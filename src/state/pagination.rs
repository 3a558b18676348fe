// Scroll-driven pagination.
// Loads the next page of posts when the viewport nears the end of the list.

use crate::data::Environment;
use crate::error::{BlogError, Result};
use crate::github::operations::{PAGE_SIZE, POSTS_PAGINATION_QUERY, pagination_variables};
use crate::github::{IssueConnection, PostsQueryData};

use super::connection::Connection;
use super::throttle::FrameThrottle;

/// Distance from the bottom, in rows, at which the next page is requested.
pub const LOAD_MORE_THRESHOLD_ROWS: u16 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Visible window over the rendered list, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub inner_height: u16,
    pub scroll_top: u16,
    pub document_height: u16,
}

impl Viewport {
    pub fn near_bottom(&self, threshold: u16) -> bool {
        u32::from(self.inner_height) + u32::from(self.scroll_top)
            >= u32::from(self.document_height).saturating_sub(u32::from(threshold))
    }
}

/// A page request handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub count: u32,
    pub cursor: String,
}

/// Two-state loader guarding against overlapping page requests.
#[derive(Debug)]
pub struct Paginator {
    state: LoadState,
    frame: FrameThrottle,
    threshold: u16,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(LOAD_MORE_THRESHOLD_ROWS)
    }
}

impl Paginator {
    pub fn new(threshold: u16) -> Self {
        Self {
            state: LoadState::Idle,
            frame: FrameThrottle::new(),
            threshold,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Note a scroll or resize; the check runs on the next frame.
    pub fn on_scroll(&mut self) {
        self.frame.request();
    }

    /// Run the check scheduled for this frame, if any.
    pub fn on_frame(&mut self, viewport: Viewport, connection: &Connection) -> Option<LoadRequest> {
        if !self.frame.take() {
            return None;
        }
        self.check(viewport, connection)
    }

    fn check(&mut self, viewport: Viewport, connection: &Connection) -> Option<LoadRequest> {
        if !viewport.near_bottom(self.threshold) || self.is_loading() || !connection.has_more() {
            return None;
        }
        let cursor = connection.cursor()?.to_string();
        self.state = LoadState::Loading;
        Some(LoadRequest {
            count: PAGE_SIZE,
            cursor,
        })
    }

    /// Return to idle once a load settles, successful or not.
    pub fn finish(&mut self) {
        self.state = LoadState::Idle;
    }
}

/// Fetch one page of the listing.
pub async fn fetch_page(env: &Environment, request: &LoadRequest) -> Result<IssueConnection> {
    let variables = pagination_variables(request.count, Some(&request.cursor));
    let payload = env.fetch(&POSTS_PAGINATION_QUERY, &variables).await?;
    let data: PostsQueryData = serde_json::from_value(payload)?;
    data.issues()
        .cloned()
        .ok_or_else(|| BlogError::NotFound("Repository not found.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{MockTransport, environment};
    use serde_json::json;
    use std::sync::Arc;

    fn connection(has_next_page: bool) -> Connection {
        let page: IssueConnection = serde_json::from_value(json!({
            "edges": [],
            "pageInfo": { "hasNextPage": has_next_page, "endCursor": "c10" }
        }))
        .unwrap();
        Connection::from_page(&page)
    }

    fn at_bottom() -> Viewport {
        Viewport {
            inner_height: 20,
            scroll_top: 70,
            document_height: 100,
        }
    }

    #[test]
    fn test_near_bottom() {
        assert!(at_bottom().near_bottom(LOAD_MORE_THRESHOLD_ROWS));
        let top = Viewport {
            inner_height: 20,
            scroll_top: 0,
            document_height: 100,
        };
        assert!(!top.near_bottom(LOAD_MORE_THRESHOLD_ROWS));
        assert!(Viewport::default().near_bottom(LOAD_MORE_THRESHOLD_ROWS));
    }

    #[test]
    fn test_one_request_until_finished() {
        let mut paginator = Paginator::default();
        let connection = connection(true);

        paginator.on_scroll();
        paginator.on_scroll();
        let request = paginator.on_frame(at_bottom(), &connection).unwrap();
        assert_eq!(request.count, 10);
        assert_eq!(request.cursor, "c10");
        assert!(paginator.is_loading());

        paginator.on_scroll();
        assert!(paginator.on_frame(at_bottom(), &connection).is_none());

        paginator.finish();
        paginator.on_scroll();
        assert!(paginator.on_frame(at_bottom(), &connection).is_some());
    }

    #[test]
    fn test_no_check_without_scroll() {
        let mut paginator = Paginator::default();
        assert!(paginator.on_frame(at_bottom(), &connection(true)).is_none());
    }

    #[test]
    fn test_never_past_last_page() {
        let mut paginator = Paginator::default();
        paginator.on_scroll();
        assert!(paginator.on_frame(at_bottom(), &connection(false)).is_none());
        assert!(!paginator.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_page_sends_cursor() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "PostsPaginationQuery",
            json!({ "gitHub": { "repository": { "issues": {
                "edges": [],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            } } } }),
        );
        let env = environment(transport.clone());

        let request = LoadRequest {
            count: 10,
            cursor: "c10".to_string(),
        };
        let page = fetch_page(&env, &request).await.unwrap();
        assert!(!page.page_info.unwrap().has_next_page);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].variables["cursor"], "c10");
        assert_eq!(requests[0].variables["count"], 10);
        assert_eq!(requests[0].variables["repoOwner"], "octo");
    }

    #[tokio::test]
    async fn test_fetch_page_missing_repository() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("PostsPaginationQuery", json!({ "gitHub": { "repository": null } }));
        let env = environment(transport);

        let request = LoadRequest {
            count: 10,
            cursor: "c".to_string(),
        };
        let err = fetch_page(&env, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "Repository not found.");
    }
}
