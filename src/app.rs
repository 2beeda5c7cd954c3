use std::time::Instant;

use ratatui::layout::Rect;
use tracing::warn;

use crate::conversation::{Conversation, TurnOutcome};
use crate::gallery::{gallery_items, GalleryItem};
use crate::input::InputSurface;
use crate::login::LoginForm;
use crate::strategy::Strategy;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Login,
    Gallery,
}

impl Screen {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chat" => Some(Screen::Chat),
            "login" => Some(Screen::Login),
            "gallery" => Some(Screen::Gallery),
            _ => None,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub strategy: Strategy,

    // Chat state
    pub conversation: Conversation,
    pub input: InputSurface,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub follow_bottom: bool,

    // Placeholder pages
    pub login: LoginForm,
    pub gallery: Vec<GalleryItem>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(conversation: Conversation, strategy: Strategy, screen: Screen) -> Self {
        Self {
            should_quit: false,
            screen,
            strategy,

            conversation,
            input: InputSurface::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_bottom: true,

            login: LoginForm::new(),
            gallery: gallery_items(),

            animation_frame: 0,

            chat_area: None,
        }
    }

    /// Hand a submitted draft to the conversation
    pub fn send_message(&mut self, message: &str) {
        match self.conversation.start_turn(message) {
            Ok(()) => {
                self.follow_bottom = true;
                self.scroll_chat_to_bottom();
            }
            Err(e) => warn!(error = %e, "message not sent"),
        }
    }

    /// Pick up a finished reply, if there is one
    pub async fn poll_conversation(&mut self) -> Option<TurnOutcome> {
        let outcome = self.conversation.poll_turn().await;
        if outcome.is_some() && self.follow_bottom {
            self.scroll_chat_to_bottom();
        }
        outcome
    }

    /// Called by Tick event
    pub fn tick(&mut self, now: Instant) {
        if self.conversation.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.login.poll_redirect(now) {
            self.screen = Screen::Chat;
        }
    }

    pub fn logout(&mut self) {
        self.login = LoginForm::new();
        self.screen = Screen::Login;
    }

    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        ui::chat_line_count(self, wrap_width).min(u16::MAX as usize) as u16
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    /// Scroll chat so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_bottom = self.chat_scroll >= max;
    }
}
