// Posts listing view model.

use serde_json::Value;

use crate::error::{BlogError, Result};
use crate::github::{Issue, PostsQueryData};
use crate::markdown::{self, ImageRef};
use crate::state::Connection;

use super::format::{compute_post_date, format_post_date, post_path};

/// One entry of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub path: String,
    pub date: String,
    pub authors: Vec<String>,
    pub excerpt: Option<String>,
    pub image: Option<ImageRef>,
    pub comments: u64,
}

impl PostSummary {
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            number: issue.number,
            title: issue.title.clone(),
            path: post_path(issue.number, &issue.title),
            date: format_post_date(&compute_post_date(issue)),
            authors: issue
                .authors()
                .into_iter()
                .map(|author| author.display_name().to_string())
                .collect(),
            excerpt: markdown::extract_first_text(issue.body()),
            image: markdown::extract_first_image(issue.body()),
            comments: issue.comment_count(),
        }
    }
}

/// First page of the listing from a `PostsQuery` payload.
pub fn posts_connection(data: &Value) -> Result<Connection> {
    let data: PostsQueryData = serde_json::from_value(data.clone())?;
    if !data.has_repository() {
        return Err(BlogError::NotFound("Repository not found.".to_string()));
    }
    Ok(data
        .issues()
        .map(Connection::from_page)
        .unwrap_or_default())
}

/// Summaries for everything loaded so far.
pub fn summaries(connection: &Connection) -> Vec<PostSummary> {
    connection.items.iter().map(PostSummary::from_issue).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({ "gitHub": { "repository": { "issues": {
            "edges": [
                { "cursor": "c1", "node": {
                    "id": "I_1",
                    "number": 1,
                    "title": "First post",
                    "body": "Hello world\n\n![cover](https://img.example/cover.png)",
                    "createdAt": "2020-02-03T00:00:00Z",
                    "assignees": { "nodes": [ { "login": "ann", "name": "Ann" }, null ] },
                    "comments": { "totalCount": 4 }
                } },
                null
            ],
            "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
        } } } })
    }

    #[test]
    fn test_posts_connection_and_summaries() {
        let connection = posts_connection(&payload()).unwrap();
        assert!(connection.has_more());

        let posts = summaries(&connection);
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.path, "/post/1/first-post");
        assert_eq!(post.date, "Feb 3rd, 2020");
        assert_eq!(post.authors, vec!["Ann".to_string()]);
        assert_eq!(post.excerpt.as_deref(), Some("Hello world"));
        assert_eq!(post.image.as_ref().unwrap().url, "https://img.example/cover.png");
        assert_eq!(post.comments, 4);
    }

    #[test]
    fn test_missing_repository() {
        for data in [json!({ "gitHub": { "repository": null } }), json!({ "gitHub": null })] {
            let err = posts_connection(&data).unwrap_err();
            assert_eq!(err.to_string(), "Repository not found.");
        }
    }

    #[test]
    fn test_repository_without_issues_is_empty() {
        let connection =
            posts_connection(&json!({ "gitHub": { "repository": { "issues": null } } })).unwrap();
        assert!(connection.is_empty());
        assert!(!connection.has_more());
    }
}
