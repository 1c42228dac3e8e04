use crate::engine::{AnnounceLevel, Announcement, BrowserPage, MatchCoord, ViewSignal};
use crate::extensions::{ExtensionDescriptor, ExtensionRegistry};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lazyaz_core::{Domain, SourceError, UserProfile};
use lazyaz_runtime_config::UiSettings;
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// State of the signed-in identity lookup shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Connected(UserProfile),
    Failed(String),
}

/// Results from shell-level background work.
pub enum AppEvent {
    Identity(Result<UserProfile, SourceError>),
}

/// Modal input layered over the active page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Hotkeys,
    FilterPicker { index: usize },
    Search { input: String },
}

/// An announcement on screen, with its expiry (`None` is sticky).
#[derive(Debug, Clone)]
pub struct ActiveAnnouncement {
    pub announcement: Announcement,
    pub expires_at: Option<Instant>,
}

/// The last search highlight, scoped to the page that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub domain: Domain,
    pub coord: MatchCoord,
}

pub struct App {
    pub pages: Vec<Box<dyn BrowserPage>>,
    pub active: usize,
    pub registry: ExtensionRegistry,
    pub overlay: Overlay,
    pub announcement: Option<ActiveAnnouncement>,
    pub connection: ConnectionStatus,
    pub highlight: Option<Highlight>,
    pub highlight_mine: bool,
    announce_secs: u64,
    events: Option<Receiver<AppEvent>>,
}

impl App {
    pub fn new(pages: Vec<Box<dyn BrowserPage>>, registry: ExtensionRegistry, ui: &UiSettings) -> Self {
        let active = Domain::from_tag(&ui.start_page)
            .and_then(|domain| pages.iter().position(|p| p.domain() == domain))
            .unwrap_or(0);
        Self {
            pages,
            active,
            registry,
            overlay: Overlay::None,
            announcement: None,
            connection: ConnectionStatus::Connecting,
            highlight: None,
            highlight_mine: ui.highlight_mine,
            announce_secs: ui.announce_secs,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Receiver<AppEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Start every page. The active one goes first so its fetch is not
    /// queued behind the others.
    pub fn start(&mut self) {
        let active = self.active;
        if let Some(page) = self.pages.get_mut(active) {
            page.start();
        }
        for (idx, page) in self.pages.iter_mut().enumerate() {
            if idx != active {
                page.start();
            }
        }
    }

    pub fn page(&self) -> Option<&dyn BrowserPage> {
        self.pages.get(self.active).map(|p| p.as_ref())
    }

    fn page_mut(&mut self) -> Option<&mut Box<dyn BrowserPage>> {
        self.pages.get_mut(self.active)
    }

    /// Extensions that apply to the active page, in registry order.
    pub fn extensions(&self) -> Vec<&ExtensionDescriptor> {
        self.page()
            .map(|page| self.registry.for_domain(page.domain()))
            .unwrap_or_default()
    }

    /// Drain background results and controller signals. Call once per loop
    /// iteration before drawing.
    pub fn tick(&mut self, now: Instant) {
        if let Some(events) = &self.events {
            let drained: Vec<AppEvent> = events.try_iter().collect();
            for event in drained {
                self.apply_event(event);
            }
        }

        for idx in 0..self.pages.len() {
            let domain = self.pages[idx].domain();
            self.pages[idx].pump();
            let is_active = idx == self.active;
            for signal in self.pages[idx].take_signals() {
                self.apply_signal(domain, is_active, signal, now);
            }
        }

        let expired = self
            .announcement
            .as_ref()
            .and_then(|active| active.expires_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.announcement = None;
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Identity(Ok(profile)) => {
                tracing::info!(user = %profile.mail, "signed in");
                self.connection = ConnectionStatus::Connected(profile);
            }
            AppEvent::Identity(Err(err)) => {
                self.connection = ConnectionStatus::Failed(err.to_string());
            }
        }
    }

    fn apply_signal(&mut self, domain: Domain, is_active: bool, signal: ViewSignal, now: Instant) {
        match signal {
            ViewSignal::Announce(announcement) => {
                // Background pages only get to report errors.
                if is_active || announcement.level == AnnounceLevel::Error {
                    self.announce_at(announcement, now);
                }
            }
            ViewSignal::Highlight { row, col } => {
                self.highlight = Some(Highlight {
                    domain,
                    coord: (row, col),
                });
            }
            ViewSignal::RedrawTable | ViewSignal::RedrawDetail => {}
        }
    }

    pub fn announce_at(&mut self, announcement: Announcement, now: Instant) {
        let expires_at = announcement
            .duration
            .resolve(self.announce_secs)
            .map(|d| now + d);
        self.announcement = Some(ActiveAnnouncement {
            announcement,
            expires_at,
        });
    }

    fn announce(&mut self, announcement: Announcement) {
        self.announce_at(announcement, Instant::now());
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return true;
        }
        if ctrl && key.code == KeyCode::Char('k') {
            self.toggle_hotkeys();
            return false;
        }

        match self.overlay {
            Overlay::Hotkeys => {
                self.overlay = Overlay::None;
                false
            }
            Overlay::FilterPicker { .. } => {
                self.handle_filter_picker_key(key.code);
                false
            }
            Overlay::Search { .. } => {
                self.handle_search_key(key.code);
                false
            }
            Overlay::None => self.handle_page_key(key.code),
        }
    }

    fn toggle_hotkeys(&mut self) {
        self.overlay = match self.overlay {
            Overlay::Hotkeys => Overlay::None,
            _ => Overlay::Hotkeys,
        };
    }

    fn handle_page_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Char('?') => self.toggle_hotkeys(),
            KeyCode::Char(']') => self.switch_page(1),
            KeyCode::Char('[') => self.switch_page(-1),
            KeyCode::Char('\\') => self.open_filter_picker(),
            KeyCode::Char('/') => {
                self.overlay = Overlay::Search {
                    input: String::new(),
                };
            }
            KeyCode::Char(c @ '1'..='9') => {
                let details_visible = self.page().is_some_and(|p| p.details_visible());
                if details_visible {
                    let slot = c as usize - '1' as usize;
                    self.invoke_extension_slot(slot);
                }
            }
            code => {
                let Some(page) = self.page_mut() else {
                    return false;
                };
                match code {
                    KeyCode::Char('j') | KeyCode::Down => page.move_selection(1),
                    KeyCode::Char('k') | KeyCode::Up => page.move_selection(-1),
                    KeyCode::PageDown => page.move_selection(10),
                    KeyCode::PageUp => page.move_selection(-10),
                    KeyCode::Char('g') | KeyCode::Home => page.select_index(0),
                    KeyCode::Char('G') | KeyCode::End => page.select_last(),
                    KeyCode::Enter => page.toggle_details(),
                    KeyCode::Char('d') => page.toggle_expanded(),
                    KeyCode::Char('q') => page.close_details(),
                    KeyCode::Char('n') => page.repeat_search(),
                    KeyCode::Char('r') => {
                        page.refresh();
                    }
                    _ => {}
                }
            }
        }
        false
    }

    fn switch_page(&mut self, delta: isize) {
        let count = self.pages.len();
        if count == 0 {
            return;
        }
        let step = delta.rem_euclid(count as isize) as usize;
        self.active = (self.active + step) % count;
    }

    fn open_filter_picker(&mut self) {
        let Some(page) = self.page() else {
            return;
        };
        let options = page.filter_options();
        if options.is_empty() {
            self.announce(Announcement::info("Filters are still loading"));
            return;
        }
        let index = options
            .iter()
            .position(|o| o.key == page.filter())
            .unwrap_or(0);
        self.overlay = Overlay::FilterPicker { index };
    }

    fn handle_filter_picker_key(&mut self, code: KeyCode) {
        let Overlay::FilterPicker { index } = self.overlay else {
            return;
        };
        let count = self.page().map_or(0, |p| p.filter_options().len());
        match code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.overlay = Overlay::FilterPicker {
                    index: (index + 1) % count,
                };
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.overlay = Overlay::FilterPicker {
                    index: (index + count - 1) % count,
                };
            }
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                let key = self
                    .page()
                    .and_then(|p| p.filter_options().get(index))
                    .map(|o| o.key.clone());
                if let (Some(key), Some(page)) = (key, self.page_mut()) {
                    page.set_filter(&key);
                }
                self.highlight = None;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        let Overlay::Search { input } = &mut self.overlay else {
            return;
        };
        match code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Enter => {
                let query = std::mem::take(input);
                self.overlay = Overlay::None;
                if query.trim().is_empty() {
                    self.highlight = None;
                }
                if let Some(page) = self.page_mut() {
                    page.submit_search(&query);
                }
            }
            _ => {}
        }
    }

    fn invoke_extension_slot(&mut self, slot: usize) {
        let Some(descriptor) = self.extensions().get(slot).map(|d| (*d).clone()) else {
            return;
        };
        if let Some(page) = self.page_mut() {
            page.invoke_extension(&descriptor);
        }
    }

    /// Whether a row owner is the signed-in user.
    pub fn is_mine(&self, owner: Option<&str>) -> bool {
        match (&self.connection, owner) {
            (ConnectionStatus::Connected(profile), Some(owner)) if self.highlight_mine => {
                profile.is_same_as(owner)
            }
            _ => false,
        }
    }
}
