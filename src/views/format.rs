// Presentation helpers shared by the post views.

use chrono::{DateTime, Datelike, Utc};

use crate::github::operations::REACTOR_SAMPLE;
use crate::github::{Issue, ReactionGroup};
use crate::markdown;

/// Canonical location of a post.
pub fn post_path(number: u64, title: &str) -> String {
    format!("/post/{}/{}", number, slug::slugify(title))
}

/// Backmatter `publishedDate` when present, otherwise the creation time.
pub fn compute_post_date(issue: &Issue) -> DateTime<Utc> {
    markdown::published_date(issue.body()).unwrap_or(issue.created_at)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// "Jan 1st, 2020".
pub fn format_post_date(date: &DateTime<Utc>) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%b"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// Twitter handle of an author whose website is a Twitter profile.
pub fn twitter_handle(website_url: &str) -> Option<&str> {
    if website_url.starts_with("https://twitter.com")
        || website_url.starts_with("https://www.twitter.com")
    {
        website_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|handle| !handle.is_empty() && !handle.contains("twitter.com"))
    } else {
        None
    }
}

/// Reaction groups anyone has used.
pub fn used_reactions(groups: &[ReactionGroup]) -> Vec<&ReactionGroup> {
    groups.iter().filter(|group| group.total() > 0).collect()
}

/// "a, b, and 3 more reacted with thumbs up emoji".
///
/// The viewer is named "You" when their reaction is not in the sample yet,
/// which is the case right after an optimistic add.
pub fn reactor_sentence(group: &ReactionGroup) -> String {
    let mut names: Vec<String> = group
        .reactors()
        .into_iter()
        .take(REACTOR_SAMPLE as usize)
        .map(|reactor| reactor.display_name().to_string())
        .collect();
    if names.is_empty() && group.viewer_has_reacted {
        names.push("You".to_string());
    }
    let more = group.total().saturating_sub(names.len() as u64);
    if more > 0 {
        names.push(format!("{} more", more));
    }

    let split = names.len().saturating_sub(2);
    let separator = if names.len() > 2 { ", and " } else { " and " };
    let mut parts: Vec<String> = names[..split].to_vec();
    parts.push(names[split..].join(separator));

    format!(
        "{} reacted with {} emoji",
        parts.join(", "),
        group.content.label()
    )
}
