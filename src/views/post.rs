// Single post view model.

use serde_json::Value;

use crate::data::Environment;
use crate::error::{BlogError, Result};
use crate::github::{Author, PostQueryData, ReactionGroup};
use crate::labels::is_publishable;

use super::format::{compute_post_date, format_post_date, post_path, twitter_handle};

/// Author line under the title and in the "Written By" footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLine {
    pub name: String,
    pub url: Option<String>,
    pub twitter: Option<String>,
}

impl AuthorLine {
    fn from_author(author: &Author) -> Self {
        Self {
            name: author.display_name().to_string(),
            url: author.url.clone(),
            twitter: author
                .website_url
                .as_deref()
                .and_then(twitter_handle)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub path: String,
    pub date: String,
    pub authors: Vec<AuthorLine>,
    pub body: String,
    pub comments: u64,
    pub viewer: Option<String>,
    reaction_groups: Vec<ReactionGroup>,
}

impl PostView {
    /// Reaction groups, preferring the record store's copy so optimistic
    /// updates show up immediately.
    pub fn reactions(&self, env: &Environment) -> Vec<ReactionGroup> {
        env.reaction_groups(&self.id)
            .unwrap_or_else(|| self.reaction_groups.clone())
    }
}

/// Build the post view. A missing issue, or one without a publishing
/// label, is reported as a missing post.
pub fn build_post(data: &Value, allowed_labels: &[String]) -> Result<PostView> {
    let data: PostQueryData = serde_json::from_value(data.clone())?;
    let missing = || BlogError::NotFound("Missing post.".to_string());

    let issue = data.issue().ok_or_else(missing)?;
    if !is_publishable(&issue.label_names(), allowed_labels) {
        return Err(missing());
    }

    Ok(PostView {
        id: issue.id.clone(),
        number: issue.number,
        title: issue.title.clone(),
        path: post_path(issue.number, &issue.title),
        date: format_post_date(&compute_post_date(issue)),
        authors: issue
            .authors()
            .into_iter()
            .map(AuthorLine::from_author)
            .collect(),
        body: issue.body().to_string(),
        comments: issue.comment_count(),
        viewer: data.viewer().map(|viewer| viewer.login.clone()),
        reaction_groups: issue.reaction_groups.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{MockTransport, environment};
    use crate::github::ReactionContent;
    use crate::labels::allowed_labels;
    use serde_json::json;
    use std::sync::Arc;

    fn payload(labels: &[&str]) -> Value {
        let labels: Vec<_> = labels.iter().map(|name| json!({ "name": name })).collect();
        json!({ "gitHub": {
            "viewer": { "login": "reader" },
            "repository": { "issue": {
                "id": "I_5",
                "number": 5,
                "title": "Deep dive",
                "body": "# Intro\n\nBody text",
                "createdAt": "2021-07-01T10:00:00Z",
                "labels": { "nodes": labels },
                "assignees": { "nodes": [
                    { "login": "sgrove", "name": null, "websiteUrl": "https://twitter.com/sgrove" }
                ] },
                "reactionGroups": [
                    { "content": "HOORAY", "viewerHasReacted": false, "users": { "totalCount": 2 } }
                ]
            } }
        } })
    }

    #[test]
    fn test_build_post() {
        let post = build_post(&payload(&["Publish", "bug"]), &allowed_labels(None)).unwrap();
        assert_eq!(post.title, "Deep dive");
        assert_eq!(post.path, "/post/5/deep-dive");
        assert_eq!(post.date, "Jul 1st, 2021");
        assert_eq!(post.viewer.as_deref(), Some("reader"));
        assert_eq!(
            post.authors,
            vec![AuthorLine {
                name: "sgrove".to_string(),
                url: None,
                twitter: Some("sgrove".to_string()),
            }]
        );
    }

    #[test]
    fn test_unpublished_post_is_missing() {
        let err = build_post(&payload(&["draft"]), &allowed_labels(None)).unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
        assert_eq!(err.to_string(), "Missing post.");
    }

    #[test]
    fn test_missing_issue() {
        let data = json!({ "gitHub": { "viewer": null, "repository": { "issue": null } } });
        assert_eq!(
            build_post(&data, &allowed_labels(None)).unwrap_err().to_string(),
            "Missing post."
        );
    }

    #[test]
    fn test_reactions_prefer_record_store() {
        let post = build_post(&payload(&["publish"]), &allowed_labels(None)).unwrap();
        let env = environment(Arc::new(MockTransport::new()));
        assert_eq!(post.reactions(&env)[0].total(), 2);

        env.update_reaction_groups("I_5", |groups| {
            groups.push(ReactionGroup::empty(ReactionContent::Eyes));
        });
        assert_eq!(post.reactions(&env)[0].content, ReactionContent::Eyes);
    }
}
