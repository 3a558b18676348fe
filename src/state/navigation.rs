// Navigation state management.
// Handles the location history and breadcrumb trail between the listing and posts.

/// A node in the navigation breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbNode {
    /// Display label for the breadcrumb.
    pub label: String,
    /// Location this node points at.
    pub path: String,
}

/// A visited location and where the reader was on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    pub title: String,
    /// First visible row.
    pub scroll: u16,
    /// Selected list index, for the listing.
    pub selected: usize,
}

impl HistoryEntry {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            scroll: 0,
            selected: 0,
        }
    }

    /// Create a breadcrumb node for this entry.
    pub fn to_breadcrumb(&self) -> BreadcrumbNode {
        BreadcrumbNode {
            label: self.title.clone(),
            path: self.path.clone(),
        }
    }
}

/// History stack. The root entry is always present.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    root: HistoryEntry,
    /// Entries above the root (last = current).
    stack: Vec<HistoryEntry>,
}

impl NavigationStack {
    /// Create a new navigation stack starting at the given location.
    pub fn new(root: HistoryEntry) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    /// Get the current location.
    pub fn current(&self) -> &HistoryEntry {
        self.stack.last().unwrap_or(&self.root)
    }

    pub fn current_mut(&mut self) -> &mut HistoryEntry {
        match self.stack.last_mut() {
            Some(entry) => entry,
            None => &mut self.root,
        }
    }

    /// Navigate to a location. Navigating to the current path scrolls to the top instead.
    pub fn push(&mut self, entry: HistoryEntry) {
        if entry.path == self.current().path {
            let current = self.current_mut();
            current.scroll = 0;
            current.title = entry.title;
            return;
        }
        self.stack.push(entry);
    }

    /// Go back, restoring the previous scroll position. Returns false if at root.
    pub fn pop(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    /// Return to the root entry, keeping its scroll position and selection.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Check if we can go back (not at root).
    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Get the breadcrumb trail.
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbNode> {
        std::iter::once(&self.root)
            .chain(self.stack.iter())
            .map(HistoryEntry::to_breadcrumb)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_stack() {
        let mut nav = NavigationStack::new(HistoryEntry::new("/", "Posts"));

        assert_eq!(nav.breadcrumbs().len(), 1);
        assert!(!nav.can_go_back());

        nav.current_mut().scroll = 14;
        nav.current_mut().selected = 3;
        nav.push(HistoryEntry::new("/post/3/hello", "Hello"));
        assert_eq!(nav.breadcrumbs().len(), 2);
        assert!(nav.can_go_back());
        assert_eq!(nav.current().scroll, 0);

        // Pop back restores where we were
        assert!(nav.pop());
        assert_eq!(nav.current().path, "/");
        assert_eq!(nav.current().scroll, 14);
        assert_eq!(nav.current().selected, 3);

        // Can't pop past root
        assert!(!nav.pop());
        assert_eq!(nav.breadcrumbs().len(), 1);
    }

    #[test]
    fn test_reset_to_root() {
        let mut nav = NavigationStack::new(HistoryEntry::new("/", "Posts"));
        nav.current_mut().selected = 2;
        nav.push(HistoryEntry::new("/post/1", "One"));
        nav.push(HistoryEntry::new("/post/2", "Two"));

        nav.reset();
        assert!(!nav.can_go_back());
        assert_eq!(nav.current().path, "/");
        assert_eq!(nav.current().selected, 2);
    }

    #[test]
    fn test_same_path_scrolls_to_top() {
        let mut nav = NavigationStack::new(HistoryEntry::new("/", "Posts"));
        nav.push(HistoryEntry::new("/post/1", "One"));
        nav.current_mut().scroll = 40;

        nav.push(HistoryEntry::new("/post/1", "One"));
        assert_eq!(nav.breadcrumbs().len(), 2);
        assert_eq!(nav.current().scroll, 0);
    }

    #[test]
    fn test_breadcrumbs() {
        let mut nav = NavigationStack::new(HistoryEntry::new("/", "Posts"));
        nav.push(HistoryEntry::new("/post/2/intro", "Intro"));

        let breadcrumbs = nav.breadcrumbs();
        assert_eq!(breadcrumbs.len(), 2);
        assert_eq!(breadcrumbs[0].label, "Posts");
        assert_eq!(breadcrumbs[1].label, "Intro");
        assert_eq!(breadcrumbs[1].path, "/post/2/intro");
    }
}
