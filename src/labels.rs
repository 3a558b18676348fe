// Label filter for published posts.
// An issue is a post only when one of its labels is in the allowed set.

/// Labels used when no allow-list is configured.
pub const DEFAULT_LABELS: [&str; 2] = ["Publish", "publish"];

/// Parse the comma-separated allow-list, falling back to the defaults.
///
/// Entries keep their case: the list is sent verbatim as the `labels`
/// filter of the listing query, which GitHub matches exactly.
pub fn allowed_labels(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
    } else {
        parsed
    }
}

/// Check whether an issue with these labels may be shown publicly.
pub fn is_publishable<S: AsRef<str>>(issue_labels: &[S], allowed: &[String]) -> bool {
    issue_labels.iter().any(|label| {
        allowed
            .iter()
            .any(|allowed| allowed.to_lowercase() == label.as_ref().to_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["publish".to_string(), "Publish".to_string()]
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(allowed_labels(None), vec!["Publish", "publish"]);
        assert_eq!(allowed_labels(Some("")), vec!["Publish", "publish"]);
        assert_eq!(allowed_labels(Some(" , ")), vec!["Publish", "publish"]);
    }

    #[test]
    fn test_configured_labels() {
        assert_eq!(
            allowed_labels(Some("blog, Release Notes")),
            vec!["blog", "Release Notes"]
        );
    }

    #[test]
    fn test_publishable_case_insensitive() {
        assert!(is_publishable(&["Publish", "bug"], &allowed()));
        assert!(is_publishable(&["PUBLISH"], &allowed()));
    }

    #[test]
    fn test_not_publishable() {
        assert!(!is_publishable(&["draft"], &allowed()));
        assert!(!is_publishable::<&str>(&[], &allowed()));
    }
}
