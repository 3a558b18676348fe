// GitHub GraphQL response types.
// Every possibly-absent level of a response is an explicit Option, checked at the view boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reaction kinds supported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionContent {
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Hooray,
    Confused,
    Heart,
    Rocket,
    Eyes,
}

impl ReactionContent {
    /// All reactions in picker order.
    pub const ALL: [ReactionContent; 8] = [
        ReactionContent::ThumbsUp,
        ReactionContent::ThumbsDown,
        ReactionContent::Laugh,
        ReactionContent::Hooray,
        ReactionContent::Confused,
        ReactionContent::Heart,
        ReactionContent::Rocket,
        ReactionContent::Eyes,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionContent::ThumbsUp => "👍",
            ReactionContent::ThumbsDown => "👎",
            ReactionContent::Laugh => "😄",
            ReactionContent::Hooray => "🎉",
            ReactionContent::Confused => "😕",
            ReactionContent::Heart => "❤️",
            ReactionContent::Rocket => "🚀",
            ReactionContent::Eyes => "👀",
        }
    }

    /// Lower-case words, as used in "reacted with thumbs up emoji".
    pub fn label(&self) -> &'static str {
        match self {
            ReactionContent::ThumbsUp => "thumbs up",
            ReactionContent::ThumbsDown => "thumbs down",
            ReactionContent::Laugh => "laugh",
            ReactionContent::Hooray => "hooray",
            ReactionContent::Confused => "confused",
            ReactionContent::Heart => "heart",
            ReactionContent::Rocket => "rocket",
            ReactionContent::Eyes => "eyes",
        }
    }

    /// The GraphQL enum value.
    pub fn as_graphql(&self) -> &'static str {
        match self {
            ReactionContent::ThumbsUp => "THUMBS_UP",
            ReactionContent::ThumbsDown => "THUMBS_DOWN",
            ReactionContent::Laugh => "LAUGH",
            ReactionContent::Hooray => "HOORAY",
            ReactionContent::Confused => "CONFUSED",
            ReactionContent::Heart => "HEART",
            ReactionContent::Rocket => "ROCKET",
            ReactionContent::Eyes => "EYES",
        }
    }
}

/// A user who reacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactor {
    pub login: String,
    pub name: Option<String>,
}

impl Reactor {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.login)
    }
}

/// Bounded sample of reacting users plus the total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUsers {
    pub total_count: u64,
    #[serde(default)]
    pub nodes: Option<Vec<Option<Reactor>>>,
}

/// Per-content reaction aggregate on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionGroup {
    pub content: ReactionContent,
    pub viewer_has_reacted: bool,
    #[serde(default)]
    pub users: ReactionUsers,
}

impl ReactionGroup {
    pub fn empty(content: ReactionContent) -> Self {
        Self {
            content,
            viewer_has_reacted: false,
            users: ReactionUsers::default(),
        }
    }

    pub fn total(&self) -> u64 {
        self.users.total_count
    }

    pub fn reactors(&self) -> Vec<&Reactor> {
        self.users
            .nodes
            .iter()
            .flatten()
            .filter_map(Option::as_ref)
            .collect()
    }
}

/// GraphQL `{ nodes: [T] }` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Option<Vec<Option<T>>>,
}

impl<T> Nodes<T> {
    pub fn present(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().flatten().filter_map(Option::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Issue assignee, shown as the post's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Option<String>,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
    pub website_url: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
    pub owner: Option<OwnerRef>,
}

/// A GitHub issue, the remote form of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub labels: Option<Nodes<Label>>,
    pub assignees: Option<Nodes<Author>>,
    pub comments: Option<TotalCount>,
    pub repository: Option<RepositoryRef>,
    pub reaction_groups: Option<Vec<ReactionGroup>>,
}

impl Issue {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels
            .iter()
            .flat_map(|labels| labels.present())
            .map(|label| label.name.as_str())
            .collect()
    }

    pub fn authors(&self) -> Vec<&Author> {
        self.assignees
            .iter()
            .flat_map(|assignees| assignees.present())
            .collect()
    }

    pub fn comment_count(&self) -> u64 {
        self.comments.as_ref().map_or(0, |c| c.total_count)
    }
}

/// The logged-in reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEdge {
    pub cursor: Option<String>,
    pub node: Option<Issue>,
}

/// Cursor-paginated issue list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueConnection {
    pub edges: Option<Vec<Option<IssueEdge>>>,
    pub page_info: Option<PageInfo>,
}

impl IssueConnection {
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.edges
            .iter()
            .flatten()
            .filter_map(Option::as_ref)
            .filter_map(|edge| edge.node.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsRepository {
    pub issues: Option<IssueConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsGitHub {
    pub repository: Option<PostsRepository>,
}

/// Data of the listing and pagination queries.
#[derive(Debug, Clone, Deserialize)]
pub struct PostsQueryData {
    #[serde(rename = "gitHub")]
    pub git_hub: Option<PostsGitHub>,
}

impl PostsQueryData {
    pub fn issues(&self) -> Option<&IssueConnection> {
        self.git_hub
            .as_ref()?
            .repository
            .as_ref()?
            .issues
            .as_ref()
    }

    pub fn has_repository(&self) -> bool {
        self.git_hub
            .as_ref()
            .is_some_and(|gh| gh.repository.is_some())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRepository {
    pub issue: Option<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostGitHub {
    pub viewer: Option<Viewer>,
    pub repository: Option<PostRepository>,
}

/// Data of the single-post query.
#[derive(Debug, Clone, Deserialize)]
pub struct PostQueryData {
    #[serde(rename = "gitHub")]
    pub git_hub: Option<PostGitHub>,
}

impl PostQueryData {
    pub fn issue(&self) -> Option<&Issue> {
        self.git_hub
            .as_ref()?
            .repository
            .as_ref()?
            .issue
            .as_ref()
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.git_hub.as_ref()?.viewer.as_ref()
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_post_with_missing_fields() {
        let data: PostQueryData = serde_json::from_value(json!({
            "gitHub": {
                "viewer": null,
                "repository": {
                    "issue": {
                        "id": "I_1",
                        "number": 7,
                        "title": "Hello",
                        "body": null,
                        "createdAt": "2020-01-01T00:00:00Z",
                        "labels": { "nodes": [null, { "name": "Publish" }] },
                        "assignees": null,
                        "reactionGroups": [{
                            "content": "THUMBS_UP",
                            "viewerHasReacted": false,
                            "users": { "totalCount": 2, "nodes": [{ "login": "a", "name": null }] }
                        }]
                    }
                }
            }
        }))
        .unwrap_or_else(|err| panic!("decode failed: {err}"));

        let issue = data.issue().unwrap();
        assert_eq!(issue.number, 7);
        assert_eq!(issue.body(), "");
        assert_eq!(issue.label_names(), vec!["Publish"]);
        assert!(issue.authors().is_empty());
        assert!(data.viewer().is_none());

        let groups = issue.reaction_groups.as_ref().unwrap();
        assert_eq!(groups[0].content, ReactionContent::ThumbsUp);
        assert_eq!(groups[0].total(), 2);
        assert_eq!(groups[0].reactors()[0].display_name(), "a");
    }

    #[test]
    fn test_decode_nodes_without_list() {
        let issue: Issue = serde_json::from_value(json!({
            "id": "I_2",
            "number": 2,
            "title": "Bare",
            "createdAt": "2020-01-01T00:00:00Z",
            "labels": {},
            "assignees": { "nodes": [{ "login": "octo" }] }
        }))
        .unwrap_or_else(|err| panic!("decode failed: {err}"));

        assert_eq!(issue.labels, Some(Nodes { nodes: None }));
        assert!(issue.label_names().is_empty());
        assert_eq!(issue.authors()[0].display_name(), "octo");
    }

    #[test]
    fn test_missing_repository() {
        let data: PostsQueryData =
            serde_json::from_value(json!({ "gitHub": { "repository": null } })).unwrap();
        assert!(!data.has_repository());
        assert!(data.issues().is_none());
    }

    #[test]
    fn test_reaction_content_wire_names() {
        for content in ReactionContent::ALL {
            let wire = serde_json::to_value(content).unwrap();
            assert_eq!(wire, content.as_graphql());
        }
    }
}
