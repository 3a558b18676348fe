// Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use serde_json::{Map, Value};

use crate::github::ClientSettings;
use crate::labels::allowed_labels;
use crate::paths;

pub const DEFAULT_ENDPOINT: &str = "https://serve.onegraph.com/graphql";

#[derive(Parser, Debug, Clone)]
#[command(name = "issuepress", version, about = "Read a blog published as GitHub issues", long_about = None)]
pub struct Config {
    /// GraphQL endpoint proxying the GitHub API
    #[arg(long, env = "GRAPHQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// OneGraph app id, sent as the `app_id` query parameter
    #[arg(long, env = "ONEGRAPH_APP_ID")]
    pub app_id: Option<String>,

    /// Owner of the repository holding the posts
    #[arg(long, env = "REPO_OWNER")]
    pub repo_owner: String,

    /// Repository holding the posts
    #[arg(long, env = "REPO_NAME")]
    pub repo_name: String,

    /// Comma-separated labels that publish an issue
    #[arg(long, env = "ALLOWED_LABELS")]
    pub allowed_labels: Option<String>,

    /// Environment variable holding the service access token
    #[arg(long, default_value = "OG_GITHUB_TOKEN")]
    pub token_env: String,

    /// Environment variable holding the reader's own token, used on login
    #[arg(long, default_value = "GITHUB_TOKEN")]
    pub viewer_token_env: String,

    /// Origin header sent with every request
    #[arg(long, env = "ISSUEPRESS_ORIGIN")]
    pub origin: Option<String>,

    /// Blog title shown in the header
    #[arg(long, env = "BLOG_TITLE", default_value = "Blog")]
    pub title: String,

    /// Prefix stripped from every location
    #[arg(long, default_value = "/")]
    pub basepath: String,

    /// Location to open on start
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file (defaults to the cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Labels that make an issue a post.
    pub fn labels(&self) -> Vec<String> {
        allowed_labels(self.allowed_labels.as_deref())
    }

    /// Variables merged into every request.
    pub fn fixed_variables(&self) -> Map<String, Value> {
        let mut fixed = Map::new();
        fixed.insert("repoOwner".to_string(), Value::from(self.repo_owner.clone()));
        fixed.insert("repoName".to_string(), Value::from(self.repo_name.clone()));
        fixed.insert("labels".to_string(), Value::from(self.labels()));
        fixed
    }

    /// Client settings, with the service token read from its variable.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            app_id: self.app_id.clone(),
            origin: self.origin.clone(),
            service_token: std::env::var(&self.token_env)
                .ok()
                .filter(|token| !token.trim().is_empty()),
            service_token_env: self.token_env.clone(),
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(paths::log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(extra: &[&str]) -> Config {
        let mut args = vec!["issuepress", "--repo-owner", "octo", "--repo-name", "blog"];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--token-env", "ISSUEPRESS_TEST_UNSET_TOKEN"]);
        assert_eq!(config.viewer_token_env, "GITHUB_TOKEN");
        assert_eq!(config.basepath, "/");
        assert_eq!(config.path, "/");

        let settings = config.client_settings();
        assert!(settings.service_token.is_none());
        assert_eq!(settings.service_token_env, "ISSUEPRESS_TEST_UNSET_TOKEN");
    }

    #[test]
    fn test_fixed_variables() {
        let config = parse(&["--allowed-labels", "Publish, blog"]);
        assert_eq!(
            Value::Object(config.fixed_variables()),
            json!({ "repoOwner": "octo", "repoName": "blog", "labels": ["Publish", "blog"] })
        );
    }

    #[test]
    fn test_explicit_log_file() {
        let config = parse(&["--log-file", "/tmp/issuepress-test.log", "--path", "/post/3"]);
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/issuepress-test.log")));
        assert_eq!(config.path, "/post/3");
    }
}
