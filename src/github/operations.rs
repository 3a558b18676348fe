// GraphQL operation documents and their variable builders.
// Repository owner, name and label filter are fixed variables merged in by the environment.

use serde_json::{Value, json};

use super::types::ReactionContent;

/// Number of posts requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Size of the reacting-users sample fetched per reaction group.
pub const REACTOR_SAMPLE: u64 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A named GraphQL document. The name is the operation's identity.
#[derive(Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub kind: OperationKind,
    pub text: &'static str,
}

macro_rules! post_fields {
    () => {
        r#"
fragment PostFields on GitHubIssue {
  id
  number
  title
  body
  createdAt
  updatedAt
  labels(first: 100) { nodes { name } }
  assignees(first: 10) {
    nodes { id name login avatarUrl(size: 96) url websiteUrl }
  }
  comments { totalCount }
  repository { name owner { login } }
  reactionGroups {
    content
    viewerHasReacted
    users(first: 11) { totalCount nodes { login name } }
  }
}
"#
    };
}

macro_rules! issues_connection {
    () => {
        r#"
fragment IssuesConnection on GitHubIssueConnection {
  edges { cursor node { ...PostFields } }
  pageInfo { hasNextPage endCursor }
}
"#
    };
}

pub static POSTS_QUERY: Operation = Operation {
    name: "PostsQuery",
    kind: OperationKind::Query,
    text: concat!(
        r#"
query PostsQuery($repoName: String!, $repoOwner: String!, $labels: [String!], $count: Int = 10) {
  gitHub {
    repository(name: $repoName, owner: $repoOwner) {
      issues(first: $count, orderBy: {direction: DESC, field: CREATED_AT}, labels: $labels) {
        ...IssuesConnection
      }
    }
  }
}
"#,
        issues_connection!(),
        post_fields!()
    ),
};

pub static POSTS_PAGINATION_QUERY: Operation = Operation {
    name: "PostsPaginationQuery",
    kind: OperationKind::Query,
    text: concat!(
        r#"
query PostsPaginationQuery($repoName: String!, $repoOwner: String!, $labels: [String!], $count: Int!, $cursor: String) {
  gitHub {
    repository(name: $repoName, owner: $repoOwner) {
      issues(first: $count, after: $cursor, orderBy: {direction: DESC, field: CREATED_AT}, labels: $labels) {
        ...IssuesConnection
      }
    }
  }
}
"#,
        issues_connection!(),
        post_fields!()
    ),
};

pub static POST_QUERY: Operation = Operation {
    name: "PostQuery",
    kind: OperationKind::Query,
    text: concat!(
        r#"
query PostQuery($issueNumber: Int!, $repoName: String!, $repoOwner: String!) {
  gitHub {
    viewer { login name avatarUrl(size: 96) url }
    repository(name: $repoName, owner: $repoOwner) {
      issue(number: $issueNumber) { ...PostFields }
    }
  }
}
"#,
        post_fields!()
    ),
};

pub static ADD_REACTION_MUTATION: Operation = Operation {
    name: "AddReactionMutation",
    kind: OperationKind::Mutation,
    text: concat!(
        r#"
mutation AddReactionMutation($input: GitHubAddReactionInput!) {
  gitHub {
    addReaction(input: $input) {
      reaction {
        content
        user { login name }
        reactable { ... on GitHubIssue { ...PostFields } }
      }
    }
  }
}
"#,
        post_fields!()
    ),
};

pub static REMOVE_REACTION_MUTATION: Operation = Operation {
    name: "RemoveReactionMutation",
    kind: OperationKind::Mutation,
    text: concat!(
        r#"
mutation RemoveReactionMutation($input: GitHubRemoveReactionInput!) {
  gitHub {
    removeReaction(input: $input) {
      reaction {
        content
        user { login name }
        reactable { ... on GitHubIssue { ...PostFields } }
      }
    }
  }
}
"#,
        post_fields!()
    ),
};

/// Variables for the next listing page.
pub fn pagination_variables(count: u32, cursor: Option<&str>) -> Value {
    json!({
        "count": count,
        "cursor": cursor,
    })
}

/// Mutation input shared by add and remove.
pub fn reaction_variables(subject_id: &str, content: ReactionContent) -> Value {
    json!({
        "input": {
            "content": content.as_graphql(),
            "subjectId": subject_id,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_fragments() {
        for operation in [&POSTS_QUERY, &POSTS_PAGINATION_QUERY, &POST_QUERY] {
            assert_eq!(operation.kind, OperationKind::Query);
            assert!(operation.text.contains("fragment PostFields"));
            assert!(operation.text.contains(operation.name));
        }
        assert_eq!(ADD_REACTION_MUTATION.kind, OperationKind::Mutation);
        assert!(REMOVE_REACTION_MUTATION.text.contains("removeReaction"));
    }

    #[test]
    fn test_reactor_sample_matches_documents() {
        let sample = format!("users(first: {})", REACTOR_SAMPLE);
        assert!(POST_QUERY.text.contains(&sample));
    }

    #[test]
    fn test_reaction_variables() {
        let vars = reaction_variables("I_1", ReactionContent::Heart);
        assert_eq!(vars["input"]["content"], "HEART");
        assert_eq!(vars["input"]["subjectId"], "I_1");
    }

    #[test]
    fn test_pagination_variables() {
        let vars = pagination_variables(PAGE_SIZE, Some("abc"));
        assert_eq!(vars["count"], 10);
        assert_eq!(vars["cursor"], "abc");

        let first = pagination_variables(PAGE_SIZE, None);
        assert!(first["cursor"].is_null());
    }
}
