// Paginated connection state.
// Accumulates issue edges across pages and tracks the cursor for the next one.

use crate::github::{Issue, IssueConnection, PageInfo};

/// Posts loaded so far plus the page info of the last page.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub items: Vec<Issue>,
    pub page_info: PageInfo,
    pub pages: u32,
}

impl Connection {
    /// Start from the first page of a listing query.
    pub fn from_page(page: &IssueConnection) -> Self {
        let mut connection = Self::default();
        connection.append(page);
        connection
    }

    /// Add the next page. Issues already present are skipped.
    pub fn append(&mut self, page: &IssueConnection) {
        for issue in page.issues() {
            if !self.items.iter().any(|existing| existing.id == issue.id) {
                self.items.push(issue.clone());
            }
        }
        self.page_info = page.page_info.clone().unwrap_or_default();
        self.pages += 1;
    }

    /// More pages exist and we know where they start.
    pub fn has_more(&self) -> bool {
        self.page_info.has_next_page && self.page_info.end_cursor.is_some()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.page_info.end_cursor.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(ids: &[u64], has_next_page: bool, cursor: Option<&str>) -> IssueConnection {
        let edges: Vec<_> = ids
            .iter()
            .map(|n| {
                json!({
                    "cursor": format!("c{}", n),
                    "node": {
                        "id": format!("I_{}", n),
                        "number": n,
                        "title": format!("Post {}", n),
                        "body": null,
                        "createdAt": "2020-01-01T00:00:00Z"
                    }
                })
            })
            .collect();
        serde_json::from_value(json!({
            "edges": edges,
            "pageInfo": { "hasNextPage": has_next_page, "endCursor": cursor }
        }))
        .unwrap()
    }

    #[test]
    fn test_append_pages() {
        let mut connection = Connection::from_page(&page(&[1, 2], true, Some("c2")));
        assert_eq!(connection.len(), 2);
        assert!(connection.has_more());
        assert_eq!(connection.cursor(), Some("c2"));

        connection.append(&page(&[2, 3], false, Some("c3")));
        assert_eq!(connection.len(), 3);
        assert_eq!(connection.pages, 2);
        assert!(!connection.has_more());
    }

    #[test]
    fn test_missing_page_info_means_no_more() {
        let empty: IssueConnection =
            serde_json::from_value(json!({ "edges": null, "pageInfo": null })).unwrap();
        let connection = Connection::from_page(&empty);
        assert!(connection.is_empty());
        assert!(!connection.has_more());
    }

    #[test]
    fn test_next_page_without_cursor_is_not_requested() {
        let connection = Connection::from_page(&page(&[1], true, None));
        assert!(!connection.has_more());
    }
}
