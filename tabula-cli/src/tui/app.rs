//! Main TUI application: dashboard state, search overlay state machine, and
//! the event loop.
//!
//! The search overlay is the input controller from the core pipeline's point
//! of view: it re-runs the resolver synchronously on every keystroke, spawns
//! suggestion fetches that report back over an mpsc channel, and performs the
//! navigation side effect on submit. A fetch result is rendered only if its
//! sequence token is still current *and* its originating query identity
//! matches a fresh resolution of the live input; anything else is stale and
//! dropped. New keystrokes are never blocked by an in-flight fetch.

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::nav::Navigator;
use crate::tui::event::{
    map_dashboard_key, map_search_key, DashboardAction, EventHandler, SearchAction,
};
use crate::tui::theme::Theme;
use tabula_core::{
    clock, greeting, tiles, CommandRegistry, OpenWeatherMap, QueryDescriptor, Resolver,
    SuggestionBatch, SuggestionEngine, SuggestionItem, TabulaConfig, WeatherProvider,
};

/// How many clock ticks between weather refreshes (20 * 30s = 10 minutes).
const WEATHER_REFRESH_TICKS: u32 = 20;

/// Events delivered back to the UI loop from spawned tasks.
pub enum AppEvent {
    Suggestions(SuggestionBatch),
    Weather(String),
}

/// The search overlay: closed, or open with live input and suggestions.
enum SearchState {
    Closed,
    Open {
        input: String,
        suggestions: Vec<SuggestionItem>,
        /// Focused suggestion index; `None` means the input field has focus.
        focused: Option<usize>,
    },
}

/// The main TUI application state.
pub struct App {
    config: Arc<TabulaConfig>,
    resolver: Resolver,
    engine: Arc<SuggestionEngine>,
    navigator: Navigator,
    theme: Theme,
    quick_links: HashMap<String, String>,

    search: SearchState,
    greeting_line: String,
    clock_line: String,
    weather_line: Option<String>,
    tick_count: u32,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Arc<TabulaConfig>,
        registry: Arc<CommandRegistry>,
        engine: Arc<SuggestionEngine>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let theme = Theme::from_style(&config.style);
        let resolver = Resolver::new(Arc::clone(&config), registry);
        let navigator = Navigator::new(config.open_links_in_new_tab);
        let quick_links = tiles::quick_links(&config.tiles);
        let greeting_line = greeting::now(&config.user, config.message.as_deref());
        let clock_line = clock::format_now(config.time_zone.as_deref(), config.disable_24_hour);

        Self {
            config,
            resolver,
            engine,
            navigator,
            theme,
            quick_links,
            search: SearchState::Closed,
            greeting_line,
            clock_line,
            weather_line: None,
            tick_count: 0,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    /// Replace the navigator, for callers that need a custom launch seam.
    pub fn with_navigator(mut self, navigator: Navigator) -> Self {
        self.navigator = navigator;
        self
    }

    /// Run the main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_handler = EventHandler::new();
        self.spawn_weather_fetch();

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                // Terminal events
                event = event_handler.next() => {
                    if let Some(Event::Key(key)) = event {
                        self.handle_key(key);
                    }
                }
                // Suggestion batches and weather reports from spawned tasks
                event = self.events_rx.recv() => {
                    if let Some(event) = event {
                        self.handle_app_event(event);
                    }
                }
                // Clock tick
                _ = tokio::time::sleep(clock::TICK) => {
                    self.tick();
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn tick(&mut self) {
        self.tick_count += 1;
        self.clock_line =
            clock::format_now(self.config.time_zone.as_deref(), self.config.disable_24_hour);
        self.greeting_line = greeting::now(&self.config.user, self.config.message.as_deref());
        if self.tick_count % WEATHER_REFRESH_TICKS == 0 {
            self.spawn_weather_fetch();
        }
    }

    fn spawn_weather_fetch(&self) {
        if self.config.disable_weather
            || self.config.weather.location.is_empty()
            || self.config.weather.api_key.is_empty()
        {
            return;
        }
        let provider = OpenWeatherMap::new(self.config.weather.api_key.clone());
        let location = self.config.weather.location.clone();
        let unit = self.config.weather_unit().to_string();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match provider.current(&location).await {
                Ok(report) => {
                    let _ = tx.send(AppEvent::Weather(report.format(&unit)));
                }
                Err(e) => {
                    // The weather line simply stays absent.
                    tracing::debug!(error = %e, "weather fetch failed");
                }
            }
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Suggestions(batch) => self.on_suggestions(batch),
            AppEvent::Weather(line) => self.weather_line = Some(line),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let search_open = matches!(self.search, SearchState::Open { .. });
        if !search_open {
            match map_dashboard_key(&key) {
                Some(DashboardAction::Quit) => self.should_quit = true,
                Some(DashboardAction::OpenSearch(c)) => {
                    if self.config.disable_search_bar {
                        return;
                    }
                    self.search = SearchState::Open {
                        input: c.to_string(),
                        suggestions: Vec::new(),
                        focused: None,
                    };
                    self.refresh_suggestions();
                }
                None => {}
            }
        } else {
            match map_search_key(&key) {
                Some(SearchAction::Quit) => self.should_quit = true,
                Some(SearchAction::Close) => self.close_search(),
                Some(SearchAction::Submit) => self.submit(),
                Some(SearchAction::FocusNext) => self.focus_next(),
                Some(SearchAction::FocusPrev) => self.focus_prev(),
                Some(SearchAction::Insert(c)) => self.edit_input(|input| input.push(c)),
                Some(SearchAction::Backspace) => self.edit_input(|input| {
                    input.pop();
                }),
                None => {}
            }
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        if let SearchState::Open {
            input, focused, ..
        } = &mut self.search
        {
            edit(input);
            // Editing always returns focus to the input field.
            *focused = None;
        }
        self.refresh_suggestions();
    }

    /// Re-resolve the live input and kick off an asynchronous suggestion
    /// fetch. The overlay closes when the input resolves to nothing, matching
    /// the page's behavior when the field empties out.
    fn refresh_suggestions(&mut self) {
        let descriptor = match &self.search {
            SearchState::Open { input, .. } => self.resolver.resolve(input),
            SearchState::Closed => return,
        };
        if matches!(descriptor, QueryDescriptor::Empty) {
            self.close_search();
            return;
        }

        let engine = Arc::clone(&self.engine);
        let limit = self.config.suggestion_limit;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let batch = engine.fetch(&descriptor, limit).await;
            let _ = tx.send(AppEvent::Suggestions(batch));
        });
    }

    /// Accept a completed suggestion batch if it is still fresh.
    fn on_suggestions(&mut self, batch: SuggestionBatch) {
        if !self.engine.is_current(batch.token) {
            return;
        }
        if let SearchState::Open {
            input,
            suggestions,
            focused,
        } = &mut self.search
        {
            if batch.identity != self.resolver.resolve(input).identity() {
                return;
            }
            *suggestions = batch.items;
            if focused.is_some_and(|i| i >= suggestions.len()) {
                *focused = None;
            }
        }
    }

    fn focus_next(&mut self) {
        if let SearchState::Open {
            suggestions,
            focused,
            ..
        } = &mut self.search
        {
            if suggestions.is_empty() {
                return;
            }
            *focused = match *focused {
                None => Some(0),
                Some(i) if i + 1 >= suggestions.len() => None,
                Some(i) => Some(i + 1),
            };
        }
    }

    fn focus_prev(&mut self) {
        if let SearchState::Open {
            suggestions,
            focused,
            ..
        } = &mut self.search
        {
            if suggestions.is_empty() {
                return;
            }
            *focused = match *focused {
                None => Some(suggestions.len() - 1),
                Some(0) => None,
                Some(i) => Some(i - 1),
            };
        }
    }

    fn close_search(&mut self) {
        self.search = SearchState::Closed;
    }

    /// Resolve the submitted text and navigate. Quick-link names take
    /// precedence over the default-search fallback, never over commands or
    /// URLs.
    fn submit(&mut self) {
        let text = match &self.search {
            SearchState::Open {
                input,
                suggestions,
                focused,
            } => match focused {
                Some(i) => suggestions
                    .get(*i)
                    .map(|s| s.text.clone())
                    .unwrap_or_else(|| input.clone()),
                None => input.clone(),
            },
            SearchState::Closed => return,
        };
        self.close_search();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let descriptor = self.resolver.resolve(trimmed);
        let url = if matches!(descriptor, QueryDescriptor::DefaultSearch { .. }) {
            match self.quick_links.get(trimmed) {
                Some(url) => url.clone(),
                None => match descriptor.url() {
                    Some(url) => url.to_string(),
                    None => return,
                },
            }
        } else {
            match descriptor.url() {
                Some(url) => url.to_string(),
                None => return,
            }
        };

        if !self.navigator.open(&url) {
            self.should_quit = true;
        }
    }

    /// Draw the full UI: dashboard underneath, search overlay on top.
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.bg)),
            area,
        );

        let [_, title_area, greeting_area, date_area, _, tiles_area, hint_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .areas(area);

        if let Some(title) = &self.config.title {
            frame.render_widget(
                Paragraph::new(title.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.dim)),
                title_area,
            );
        }

        if !self.config.disable_message {
            frame.render_widget(
                Paragraph::new(self.greeting_line.as_str())
                    .alignment(Alignment::Center)
                    .style(
                        Style::default()
                            .fg(self.theme.message_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                greeting_area,
            );
        }

        frame.render_widget(
            Paragraph::new(self.date_line()).alignment(Alignment::Center),
            date_area,
        );

        self.draw_tiles(frame, tiles_area);

        frame.render_widget(
            Paragraph::new("type to search · Esc close · Ctrl-C quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.dim)),
            hint_area,
        );

        if let SearchState::Open {
            input,
            suggestions,
            focused,
        } = &self.search
        {
            self.draw_search_overlay(frame, input, suggestions, *focused);
        }
    }

    /// Clock and weather joined on one centered line.
    fn date_line(&self) -> Line<'_> {
        let mut spans = Vec::new();
        if !self.config.disable_clock {
            spans.push(Span::styled(
                self.clock_line.clone(),
                Style::default().fg(self.theme.date_fg),
            ));
        }
        if let Some(weather) = &self.weather_line {
            if !spans.is_empty() {
                spans.push(Span::styled(
                    "  ·  ",
                    Style::default().fg(self.theme.dim),
                ));
            }
            spans.push(Span::styled(
                weather.clone(),
                Style::default().fg(self.theme.weather_fg),
            ));
        }
        Line::from(spans)
    }

    /// Registered commands and quick-link tiles, side by side.
    fn draw_tiles(&self, frame: &mut Frame, area: Rect) {
        let mut columns: Vec<Vec<Line>> = Vec::new();

        let command_lines: Vec<Line> = std::iter::once(Line::styled(
            "commands",
            Style::default()
                .fg(self.theme.fg)
                .add_modifier(Modifier::BOLD),
        ))
        .chain(self.resolver.registry().listed().map(|cmd| {
            Line::from(vec![
                Span::styled(
                    format!("{:>3}  ", cmd.key),
                    Style::default().fg(self.theme.tile_fg),
                ),
                Span::styled(
                    cmd.name.clone().unwrap_or_default(),
                    Style::default().fg(self.theme.dim),
                ),
            ])
        }))
        .collect();
        columns.push(command_lines);

        for tile in &self.config.tiles {
            let accent = tile
                .valid_color()
                .and_then(crate::tui::theme::parse_hex_color)
                .unwrap_or(self.theme.tile_fg);
            let mut lines = vec![Line::styled(
                tile.name.clone(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )];
            for link in &tile.links {
                lines.push(Line::styled(
                    format!("  {}", link.name),
                    Style::default().fg(self.theme.dim),
                ));
            }
            columns.push(lines);
        }

        let constraints =
            vec![Constraint::Ratio(1, columns.len().max(1) as u32); columns.len().max(1)];
        let chunks = Layout::horizontal(constraints).split(area);
        for (lines, chunk) in columns.into_iter().zip(chunks.iter()) {
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *chunk);
        }
    }

    fn draw_search_overlay(
        &self,
        frame: &mut Frame,
        input: &str,
        suggestions: &[SuggestionItem],
        focused: Option<usize>,
    ) {
        let height = (suggestions.len() as u16) + 4;
        let area = centered_rect(frame.area(), 60, height);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .title(" search ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::with_capacity(suggestions.len() + 2);
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.tile_fg)),
            Span::styled(
                input.to_string(),
                Style::default().fg(self.theme.search_fg),
            ),
            Span::styled(
                "█",
                if focused.is_none() {
                    Style::default().fg(self.theme.search_fg)
                } else {
                    Style::default().fg(self.theme.dim)
                },
            ),
        ]));

        let max_width = inner.width.saturating_sub(4) as usize;
        for (index, item) in suggestions.iter().enumerate() {
            let base = if focused == Some(index) {
                Style::default()
                    .fg(self.theme.search_fg)
                    .bg(self.theme.highlight_bg)
            } else {
                Style::default().fg(self.theme.dim)
            };
            lines.push(suggestion_line(item, base, self.theme.search_fg, max_width));
        }

        // Preview of where Enter would navigate right now.
        if let Some(url) = self.resolver.resolve(input).url() {
            lines.push(Line::styled(
                format!("→ {url}"),
                Style::default().fg(self.theme.dim),
            ));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    #[cfg(test)]
    fn search_input(&self) -> Option<&str> {
        match &self.search {
            SearchState::Open { input, .. } => Some(input),
            SearchState::Closed => None,
        }
    }

    #[cfg(test)]
    fn focused(&self) -> Option<usize> {
        match &self.search {
            SearchState::Open { focused, .. } => *focused,
            SearchState::Closed => None,
        }
    }

    #[cfg(test)]
    fn suggestion_texts(&self) -> Vec<&str> {
        match &self.search {
            SearchState::Open { suggestions, .. } => {
                suggestions.iter().map(|s| s.text.as_str()).collect()
            }
            SearchState::Closed => Vec::new(),
        }
    }
}

/// Render one suggestion with its match highlighted, truncated to fit.
fn suggestion_line<'a>(
    item: &'a SuggestionItem,
    base: Style,
    match_fg: ratatui::style::Color,
    max_width: usize,
) -> Line<'a> {
    let text: &str = &item.text;
    if text.width() > max_width {
        // Too long for the overlay; skip highlight rather than slicing
        // through a span boundary.
        let truncated: String = text.chars().take(max_width.saturating_sub(1)).collect();
        return Line::styled(format!("  {truncated}…"), base);
    }
    match item.matched {
        Some(span) => {
            let (pre, rest) = text.split_at(span.start);
            let (matched, post) = rest.split_at(span.len);
            Line::from(vec![
                Span::styled("  ", base),
                Span::styled(pre, base),
                Span::styled(
                    matched,
                    base.fg(match_fg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(post, base),
            ])
        }
        None => Line::from(vec![Span::styled("  ", base), Span::styled(text, base)]),
    }
}

/// A centered rectangle of the given percentage width and fixed height.
fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let height = height.min(area.height);
    let [_, vert, _] = Layout::vertical([
        Constraint::Length(area.height.saturating_sub(height) / 3),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .areas(area);
    let [_, horiz, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vert);
    horiz
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::RecordingOpener;
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use tabula_core::{StaticSource, Tile, TileLink};

    fn test_app(phrases: Vec<String>) -> App {
        let (app, _) = recording_app(TabulaConfig::default(), phrases, true);
        app
    }

    fn recording_app(
        config: TabulaConfig,
        phrases: Vec<String>,
        new_tab: bool,
    ) -> (App, Arc<RecordingOpener>) {
        let opener = Arc::new(RecordingOpener::new());
        let config = Arc::new(config);
        let registry =
            Arc::new(CommandRegistry::new(config.commands.clone()).expect("registry"));
        let engine = Arc::new(SuggestionEngine::new(
            Arc::new(StaticSource::new(phrases)),
            Arc::clone(&registry),
        ));
        let app = App::new(config, registry, engine)
            .with_navigator(Navigator::with_opener(opener.clone(), new_tab));
        (app, opener)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn link(name: &str, url: &str) -> TileLink {
        TileLink {
            name: name.to_string(),
            url: url.to_string(),
            new_tab: None,
        }
    }

    fn tiles_config(links: Vec<TileLink>) -> TabulaConfig {
        let mut config = TabulaConfig::default();
        config.tiles = vec![Tile {
            name: "shortcuts".to_string(),
            url: None,
            color: None,
            links,
        }];
        config
    }

    #[tokio::test]
    async fn test_printable_key_opens_search_with_seed() {
        let mut app = test_app(vec![]);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.search_input(), Some("g"));
    }

    #[tokio::test]
    async fn test_modifier_only_key_leaves_search_closed() {
        let mut app = test_app(vec![]);
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(app.search_input(), None);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.search_input(), None);
    }

    #[tokio::test]
    async fn test_escape_closes_and_clears() {
        let mut app = test_app(vec![]);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.search_input(), None);
        // Reopening starts from scratch.
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.search_input(), Some("x"));
    }

    #[tokio::test]
    async fn test_backspacing_to_empty_closes_search() {
        let mut app = test_app(vec![]);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_input(), None);
    }

    #[tokio::test]
    async fn test_fresh_batch_is_rendered() {
        let mut app = test_app(vec![]);
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('a'));

        let descriptor = app.resolver.resolve("y a");
        let batch = app.engine.fetch(&descriptor, 4).await;
        app.on_suggestions(batch);
        assert_eq!(app.suggestion_texts(), Vec::<&str>::new());

        let mut app = test_app(vec!["abc".into()]);
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('a'));
        let descriptor = app.resolver.resolve("y a");
        let batch = app.engine.fetch(&descriptor, 4).await;
        app.on_suggestions(batch);
        assert_eq!(app.suggestion_texts(), vec!["y abc"]);
    }

    #[tokio::test]
    async fn test_batch_for_older_input_is_dropped() {
        let mut app = test_app(vec!["old result".into()]);
        press(&mut app, KeyCode::Char('w'));

        // A fetch completes for "w", but the live input has moved on.
        let stale = app.engine.fetch(&app.resolver.resolve("w"), 4).await;
        press(&mut app, KeyCode::Char('k'));
        app.on_suggestions(stale);
        assert_eq!(app.suggestion_texts(), Vec::<&str>::new());
    }

    #[tokio::test]
    async fn test_batch_with_stale_token_is_dropped() {
        let mut app = test_app(vec!["result".into()]);
        press(&mut app, KeyCode::Char('q'));

        let first = app.engine.fetch(&app.resolver.resolve("q"), 4).await;
        // A newer fetch supersedes the first token.
        let _second = app.engine.fetch(&app.resolver.resolve("q"), 4).await;
        app.on_suggestions(first);
        assert_eq!(app.suggestion_texts(), Vec::<&str>::new());
    }

    #[tokio::test]
    async fn test_focus_wraps_through_list_and_input() {
        let mut app = test_app(vec!["aa".into(), "ab".into()]);
        press(&mut app, KeyCode::Char('a'));
        let batch = app.engine.fetch(&app.resolver.resolve("a"), 4).await;
        app.on_suggestions(batch);
        assert_eq!(app.suggestion_texts().len(), 2);

        assert_eq!(app.focused(), None);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused(), Some(0));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused(), Some(1));
        // Past the last item, focus wraps back to the input field.
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused(), None);
        // And backwards from the input to the last item.
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused(), Some(1));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused(), Some(0));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused(), None);
    }

    #[tokio::test]
    async fn test_typing_resets_focus_to_input() {
        let mut app = test_app(vec!["aa".into()]);
        press(&mut app, KeyCode::Char('a'));
        let batch = app.engine.fetch(&app.resolver.resolve("a"), 4).await;
        app.on_suggestions(batch);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused(), Some(0));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.focused(), None);
    }

    #[tokio::test]
    async fn test_submit_opens_resolved_command_url() {
        let (mut app, opener) = recording_app(TabulaConfig::default(), vec![], true);
        type_text(&mut app, "g");
        press(&mut app, KeyCode::Enter);
        assert_eq!(opener.urls(), vec!["https://github.com".to_string()]);
        assert!(!app.should_quit);
        // Submit always closes the overlay.
        assert_eq!(app.search_input(), None);
    }

    #[tokio::test]
    async fn test_submit_quick_link_name_beats_default_search() {
        let config = tiles_config(vec![link("mail", "https://mail.example")]);
        let (mut app, opener) = recording_app(config, vec![], true);
        type_text(&mut app, "mail");
        press(&mut app, KeyCode::Enter);
        assert_eq!(opener.urls(), vec!["https://mail.example".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_quick_link_does_not_shadow_command_or_url() {
        let config = tiles_config(vec![
            link("g", "https://gitlab.example"),
            link("github.com", "https://somewhere-else.example"),
        ]);
        let (mut app, opener) = recording_app(config, vec![], true);

        // A registered key resolves as a command, never through quick links.
        type_text(&mut app, "g");
        press(&mut app, KeyCode::Enter);
        // A URL-shaped input navigates directly, never through quick links.
        type_text(&mut app, "github.com");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            opener.urls(),
            vec![
                "https://github.com".to_string(),
                "https://github.com".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_unknown_text_falls_back_to_default_search() {
        let config = tiles_config(vec![link("mail", "https://mail.example")]);
        let (mut app, opener) = recording_app(config, vec![], true);
        type_text(&mut app, "mailbox rules");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            opener.urls(),
            vec!["https://duckduckgo.com/?q=mailbox%20rules".to_string()]
        );
    }

    #[tokio::test]
    async fn test_submit_focused_suggestion_navigates_to_its_resolution() {
        let (mut app, opener) = recording_app(TabulaConfig::default(), vec![], true);
        type_text(&mut app, "0 54");
        let batch = app.engine.fetch(&app.resolver.resolve("0 54"), 4).await;
        app.on_suggestions(batch);
        assert_eq!(app.suggestion_texts(), vec!["0 54323", "0 54324"]);

        // Focus the second static suggestion and activate it.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(opener.urls(), vec!["http://localhost:54324".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_without_focus_uses_input_text() {
        let (mut app, opener) = recording_app(TabulaConfig::default(), vec![], true);
        type_text(&mut app, "0 8080");
        press(&mut app, KeyCode::Enter);
        assert_eq!(opener.urls(), vec!["http://localhost:8080".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_in_same_tab_mode_quits_dashboard() {
        let mut config = TabulaConfig::default();
        config.open_links_in_new_tab = false;
        let (mut app, opener) = recording_app(config, vec![], false);
        type_text(&mut app, "g");
        press(&mut app, KeyCode::Enter);
        assert_eq!(opener.urls(), vec!["https://github.com".to_string()]);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_new_keystroke_is_not_blocked_by_inflight_fetch() {
        // Re-entrancy: a second keystroke issues a new fetch immediately;
        // tokens advance monotonically.
        let app = test_app(vec![]);
        let first = app.engine.fetch(&app.resolver.resolve("a"), 4).await;
        let second = app.engine.fetch(&app.resolver.resolve("ab"), 4).await;
        assert!(second.token > first.token);
        assert!(app.engine.is_current(second.token));
        assert!(!app.engine.is_current(first.token));
    }
}
