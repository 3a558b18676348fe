// App state and main event loop.
// Owns the fetching context, the current route and its view, and keyboard input handling.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{FetchHandle, FetchStatus, PreloadCache};
use crate::config::Config;
use crate::data::Environment;
use crate::error::{ErrorKind, FetchFailure, Result};
use crate::github::{
    Credentials, GraphQlClient, IssueConnection, RateLimit, ReactionContent, ReactionGroup,
    Transport,
};
use crate::markdown;
use crate::router::{self, RouteMatch, ViewKind};
use crate::state::pagination::fetch_page;
use crate::state::{
    Connection, FRAME, HistoryEntry, LoadRequest, NavigationStack, Notifications, Paginator,
    ReactionMutator, ReadingProgress, Session, Throttle, Viewport,
};
use crate::ui;
use crate::views::{self, Content, ErrorBoundary, ErrorPanel, PostSummary, PostView};

/// Rows taken by one entry of the listing.
pub const ITEM_ROWS: u16 = 4;

/// Shared fetching context, created once at start.
pub struct AppContext {
    pub environment: Environment,
    pub cache: PreloadCache,
    pub notifications: Notifications,
    pub session: Session,
    pub credentials: Credentials,
    client: Option<Arc<GraphQlClient>>,
}

impl AppContext {
    /// Build the context around the GraphQL client described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = Credentials::new();
        let client = Arc::new(GraphQlClient::new(
            config.client_settings(),
            credentials.clone(),
        )?);
        let mut context = Self::with_transport(client.clone(), config, credentials);
        context.client = Some(client);
        Ok(context)
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        config: &Config,
        credentials: Credentials,
    ) -> Self {
        let mut session = Session::new(credentials.clone(), config.viewer_token_env.clone());
        session.check();
        Self {
            environment: Environment::new(transport, config.fixed_variables()),
            cache: PreloadCache::new(),
            notifications: Notifications::new(),
            session,
            credentials,
            client: None,
        }
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.client.as_ref().map(|client| client.rate_limit())
    }
}

/// Completions handed back to the UI loop by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    PageLoaded(Result<IssueConnection>),
}

/// Loaded listing, kept across navigation so appended pages survive.
#[derive(Debug)]
pub struct Listing {
    source: Arc<Value>,
    pub connection: Connection,
    pub posts: Vec<PostSummary>,
}

/// A post ready for display, with its document pre-rendered.
#[derive(Debug)]
pub struct PostPage {
    pub view: PostView,
    pub lines: Vec<Line<'static>>,
}

/// What the content area shows.
#[derive(Debug)]
pub enum Page {
    Loading,
    Posts,
    Post(PostPage),
    Failed(ErrorPanel),
}

/// The route being shown and the fetch backing it.
struct ActiveRoute {
    route: Option<RouteMatch>,
    handle: Option<FetchHandle>,
    login_key: &'static str,
    /// Data and status last turned into a page.
    seen: Option<Seen>,
}

struct Seen {
    data: Option<Arc<Value>>,
    status: FetchStatus,
}

impl Seen {
    /// Same payload allocation and same status.
    fn same(&self, data: Option<&Arc<Value>>, status: &FetchStatus) -> bool {
        let same_data = match (&self.data, data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_data && self.status == *status
    }
}

/// Main application state.
pub struct App {
    pub context: AppContext,
    pub title: String,
    basepath: String,
    labels: Vec<String>,
    boundary: ErrorBoundary,
    pub nav: NavigationStack,
    active: ActiveRoute,
    pub page: Page,
    pub listing: Option<Listing>,
    paginator: Paginator,
    pub progress: ReadingProgress,
    progress_throttle: Throttle,
    mutator: ReactionMutator,
    /// Rows and columns of the scrollable content area at the last draw.
    viewport: (u16, u16),
    pub show_help: bool,
    pub show_picker: bool,
    pub should_quit: bool,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(context: AppContext, config: &Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let root = location(&config.basepath, "/");
        let mut nav = NavigationStack::new(HistoryEntry::new(root, config.title.clone()));
        let start = if config.path.starts_with('/') {
            location(&config.basepath, &config.path)
        } else {
            config.path.clone()
        };
        nav.push(HistoryEntry::new(start, config.title.clone()));

        let mutator = ReactionMutator::new(
            context.environment.clone(),
            context.notifications.clone(),
        );

        Self {
            title: config.title.clone(),
            basepath: config.basepath.clone(),
            labels: config.labels(),
            boundary: ErrorBoundary::new(config.app_id.clone()),
            nav,
            active: ActiveRoute {
                route: None,
                handle: None,
                login_key: context.session.login_key(),
                seen: None,
            },
            page: Page::Loading,
            listing: None,
            paginator: Paginator::default(),
            progress: ReadingProgress::new(),
            progress_throttle: Throttle::default(),
            mutator,
            viewport: (0, 0),
            show_help: false,
            show_picker: false,
            should_quit: false,
            events_tx,
            events_rx,
            context,
        }
    }

    /// Main event loop. Runs one frame per iteration and yields to the
    /// runtime in between so fetch tasks make progress.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.load_route();
        while !self.should_quit {
            self.handle_events()?;
            self.drain_events();
            self.tick();
            terminal.draw(|frame| ui::draw(frame, self))?;
            tokio::time::sleep(FRAME).await;
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    fn handle_events(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Resize(_, _) => self.on_scroll(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Per-frame work: reload on login changes, pick up fetch results,
    /// run the scheduled pagination check and deferred progress updates.
    pub fn tick(&mut self) {
        if self.context.session.login_key() != self.active.login_key {
            info!(key = self.context.session.login_key(), "login changed, reloading route");
            self.load_route();
        }
        self.refresh();
        self.poll_pagination();
        if self.progress_throttle.flush(Instant::now()) {
            self.update_progress();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.show_picker {
            self.handle_picker_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('l') => self.login(),
            KeyCode::Char('L') => self.logout(),
            KeyCode::Esc if self.context.notifications.current().is_some() => {
                self.context.notifications.dismiss();
            }
            KeyCode::Esc => self.back(),
            KeyCode::Char('h') => self.home(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('r') => self.open_picker(),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::PageDown => self.move_by(self.page_step()),
            KeyCode::PageUp => self.move_by(-self.page_step()),
            KeyCode::Char('g') => self.move_by(i64::MIN / 2),
            KeyCode::Char('G') => self.move_by(i64::MAX / 2),
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                self.react(ReactionContent::ALL[index]);
                self.show_picker = false;
            }
            KeyCode::Esc | KeyCode::Char('r') | KeyCode::Char('q') => self.show_picker = false,
            _ => {}
        }
    }

    /// Resolve the current location and preload its data.
    pub fn load_route(&mut self) {
        let path = self.nav.current().path.clone();
        self.active.login_key = self.context.session.login_key();
        self.active.seen = None;
        let previous = self.active.handle.take();
        self.show_picker = false;

        let Some(route) = router::resolve(&self.basepath, &path) else {
            warn!(%path, "no route matches location");
            self.active.route = None;
            self.page = Page::Failed(
                self.boundary
                    .panel(&FetchFailure::new(ErrorKind::NotFound, "Page not found.")),
            );
            return;
        };

        info!(%path, view = ?route.view(), "navigating");
        match router::preload(
            &self.context.cache,
            &self.context.environment,
            &route,
            Some(&self.context.notifications),
        ) {
            Ok(handle) => {
                let reused = previous
                    .as_ref()
                    .is_some_and(|previous| FetchHandle::ptr_eq(previous, &handle));
                debug!(fingerprint = %handle.fingerprint(), reused, "route fetch attached");
                self.active.handle = Some(handle);
                self.page = Page::Loading;
            }
            Err(e) => self.page = Page::Failed(self.boundary.panel(&FetchFailure::from(&e))),
        }
        self.active.route = Some(route);
        self.refresh();
    }

    /// Turn the latest state of the route's fetch into a page.
    pub fn refresh(&mut self) {
        let (Some(route), Some(handle)) = (&self.active.route, &self.active.handle) else {
            return;
        };
        let state = handle.snapshot();
        if self
            .active
            .seen
            .as_ref()
            .is_some_and(|seen| seen.same(state.data.as_ref(), &state.status))
        {
            return;
        }
        self.active.seen = Some(Seen {
            data: state.data.clone(),
            status: state.status.clone(),
        });

        match route.view() {
            ViewKind::Posts => {
                match views::resolve(&self.boundary, handle, views::posts_connection) {
                    Content::Ready(connection) => {
                        if let Some(source) = state.data {
                            self.set_listing(source, connection);
                        }
                        self.page = Page::Posts;
                    }
                    Content::Loading => self.page = Page::Loading,
                    Content::Failed(panel) => self.page = Page::Failed(panel),
                }
            }
            ViewKind::Post => {
                let labels = &self.labels;
                let content = views::resolve(&self.boundary, handle, |data| {
                    let view = views::build_post(data, labels)?;
                    let lines = ui::post::document(&view, markdown::render_lines(&view.body));
                    Ok(PostPage { view, lines })
                });
                match content {
                    Content::Ready(page) => {
                        self.nav.current_mut().title = page.view.title.clone();
                        self.page = Page::Post(page);
                        self.on_scroll();
                    }
                    Content::Loading => self.page = Page::Loading,
                    Content::Failed(panel) => self.page = Page::Failed(panel),
                }
            }
        }
    }

    fn set_listing(&mut self, source: Arc<Value>, connection: Connection) {
        let unchanged = self
            .listing
            .as_ref()
            .is_some_and(|listing| Arc::ptr_eq(&listing.source, &source));
        if !unchanged {
            debug!(posts = connection.len(), "listing replaced");
            let posts = views::summaries(&connection);
            self.listing = Some(Listing {
                source,
                connection,
                posts,
            });
            self.preload_listed();
        }
        let len = self.listing.as_ref().map_or(0, |listing| listing.posts.len());
        let entry = self.nav.current_mut();
        entry.selected = entry.selected.min(len.saturating_sub(1));
        self.paginator.on_scroll();
    }

    /// Preload the detail route of every listed post.
    fn preload_listed(&self) {
        let Some(listing) = &self.listing else {
            return;
        };
        let cache = &self.context.cache;
        let env = &self.context.environment;
        for post in &listing.posts {
            let path = location(&self.basepath, &post.path);
            let Some(route) = router::resolve(&self.basepath, &path) else {
                continue;
            };
            let already = route
                .variables()
                .is_ok_and(|variables| cache.contains(env, route.route.operation, &variables));
            if already {
                continue;
            }
            if let Err(e) = router::preload(cache, env, &route, None) {
                debug!(%path, "skipping preload: {}", e);
            }
        }
        debug!(entries = cache.len(env), "listed posts preloaded");
    }

    pub fn navigate(&mut self, path: String, title: String) {
        self.nav.push(HistoryEntry::new(path, title));
        self.progress.reset();
        self.load_route();
    }

    /// Go back; the previous entry keeps its scroll position and selection.
    pub fn back(&mut self) {
        if self.nav.pop() {
            self.progress.reset();
            self.load_route();
        }
    }

    /// Return to the listing at the root of the history.
    pub fn home(&mut self) {
        if self.nav.can_go_back() {
            self.nav.reset();
            self.progress.reset();
            self.load_route();
        }
    }

    fn open_selected(&mut self) {
        if !matches!(self.page, Page::Posts) {
            return;
        }
        let selected = self.nav.current().selected;
        let Some(post) = self.listing.as_ref().and_then(|listing| listing.posts.get(selected))
        else {
            return;
        };
        let path = location(&self.basepath, &post.path);
        let title = post.title.clone();
        self.navigate(path, title);
    }

    fn page_step(&self) -> i64 {
        match self.page {
            Page::Posts => i64::from((self.viewport.0 / ITEM_ROWS).max(1)),
            _ => i64::from(self.viewport.0.max(1)),
        }
    }

    /// Move the selection in the listing or scroll the post body.
    fn move_by(&mut self, delta: i64) {
        match &self.page {
            Page::Posts => {
                let len = self.listing.as_ref().map_or(0, |listing| listing.posts.len());
                if len == 0 {
                    return;
                }
                let current = self.nav.current().selected as i64;
                let index = (current.saturating_add(delta)).clamp(0, len as i64 - 1) as usize;
                self.select(index);
                self.paginator.on_scroll();
            }
            Page::Post(_) => {
                let max = i64::from(self.max_scroll());
                let current = i64::from(self.nav.current().scroll);
                self.nav.current_mut().scroll = current.saturating_add(delta).clamp(0, max) as u16;
                self.on_scroll();
            }
            Page::Loading | Page::Failed(_) => {}
        }
    }

    /// Select a listing entry, keeping it inside the visible rows.
    fn select(&mut self, index: usize) {
        let visible = usize::from((self.viewport.0 / ITEM_ROWS).max(1));
        let entry = self.nav.current_mut();
        entry.selected = index;
        let first = usize::from(entry.scroll / ITEM_ROWS);
        let first = if index < first {
            index
        } else if index >= first + visible {
            index + 1 - visible
        } else {
            first
        };
        entry.scroll = u16::try_from(first * usize::from(ITEM_ROWS)).unwrap_or(u16::MAX);
    }

    /// First listing entry on screen.
    pub fn first_visible(&self) -> usize {
        usize::from(self.nav.current().scroll / ITEM_ROWS)
    }

    /// Rows the post document can scroll.
    pub fn max_scroll(&self) -> u16 {
        match &self.page {
            Page::Post(page) => {
                let height = markdown::wrapped_height(&page.lines, self.viewport.1);
                let height = u16::try_from(height).unwrap_or(u16::MAX);
                height.saturating_sub(self.viewport.0)
            }
            _ => 0,
        }
    }

    /// Record the size of the scrollable content area.
    pub fn set_viewport(&mut self, rows: u16, columns: u16) {
        if self.viewport != (rows, columns) {
            self.viewport = (rows, columns);
            self.on_scroll();
        }
    }

    fn on_scroll(&mut self) {
        match self.page {
            Page::Posts => self.paginator.on_scroll(),
            Page::Post(_) => {
                if self.progress_throttle.call(Instant::now()) {
                    self.update_progress();
                }
            }
            Page::Loading | Page::Failed(_) => {}
        }
    }

    fn update_progress(&mut self) {
        let max = self.max_scroll();
        let entry = self.nav.current_mut();
        entry.scroll = entry.scroll.min(max);
        let scroll = entry.scroll;
        self.progress.set_content_height(max);
        self.progress.update(f64::from(scroll));
    }

    fn listing_viewport(&self) -> Viewport {
        let len = self.listing.as_ref().map_or(0, |listing| listing.posts.len());
        Viewport {
            inner_height: self.viewport.0,
            scroll_top: self.nav.current().scroll,
            document_height: u16::try_from(len * usize::from(ITEM_ROWS)).unwrap_or(u16::MAX),
        }
    }

    /// Run the pagination check scheduled for this frame.
    pub fn poll_pagination(&mut self) {
        if !matches!(self.page, Page::Posts) {
            return;
        }
        let viewport = self.listing_viewport();
        let Some(listing) = &self.listing else {
            return;
        };
        if let Some(request) = self.paginator.on_frame(viewport, &listing.connection) {
            self.load_more(request);
        }
    }

    fn load_more(&self, request: LoadRequest) {
        debug!(cursor = %request.cursor, count = request.count, "loading more posts");
        let env = self.context.environment.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = fetch_page(&env, &request).await;
            let _ = events.send(AppEvent::PageLoaded(result));
        });
    }

    pub fn is_loading_more(&self) -> bool {
        self.paginator.is_loading()
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PageLoaded(Ok(page)) => {
                if let Some(listing) = &mut self.listing {
                    listing.connection.append(&page);
                    listing.posts = views::summaries(&listing.connection);
                    debug!(posts = listing.posts.len(), "page appended");
                }
                self.paginator.finish();
                self.preload_listed();
                self.paginator.on_scroll();
            }
            AppEvent::PageLoaded(Err(e)) => {
                warn!("failed to load more posts: {}", e);
                self.context
                    .notifications
                    .error(format!("Error loading more posts: {}", e));
                self.paginator.finish();
            }
        }
    }

    fn open_picker(&mut self) {
        if !matches!(self.page, Page::Post(_)) {
            return;
        }
        // Mutations are only sent with the reader's own token.
        if !self.context.credentials.is_set() {
            self.context.notifications.warn("Log in to react.");
            return;
        }
        self.show_picker = true;
    }

    fn react(&mut self, content: ReactionContent) {
        let Page::Post(page) = &self.page else {
            return;
        };
        if self.mutator.toggle(&page.view.id, content).is_none() {
            self.context
                .notifications
                .info(format!("{} is already being sent.", content.label()));
        }
    }

    /// Whether a reaction of the shown post is still being sent.
    pub fn reaction_pending(&self, content: ReactionContent) -> bool {
        match &self.page {
            Page::Post(page) => self.mutator.is_pending(&page.view.id, content),
            _ => false,
        }
    }

    /// Reactions of the shown post, including optimistic changes.
    pub fn reactions(&self) -> Vec<ReactionGroup> {
        match &self.page {
            Page::Post(page) => page.view.reactions(&self.context.environment),
            _ => Vec::new(),
        }
    }

    fn login(&mut self) {
        let context = &mut self.context;
        match context.session.login(&context.cache, &context.environment) {
            Ok(()) => context.notifications.info("Logged in."),
            Err(e) => context.notifications.error(e.to_string()),
        }
    }

    fn logout(&mut self) {
        let context = &mut self.context;
        if context.session.is_logged_in() {
            context.session.logout(&context.cache, &context.environment);
            context.notifications.info("Logged out.");
        }
    }
}

/// Join the basepath and a route path into a location.
pub fn location(basepath: &str, path: &str) -> String {
    format!("{}{}", basepath.trim_end_matches('/'), path)
}
