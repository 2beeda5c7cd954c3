//! Placeholder login form. Nothing is authenticated or stored; submitting
//! shows a notice and returns to the chat after a short pause.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

pub const SUBMITTED_NOTICE: &str = "Login submitted! Redirecting to homepage...";
pub const MISSING_FIELDS: &str = "Please fill in both email and password.";
pub const REDIRECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub notice: Option<String>,
    pub error: Option<String>,
    redirect_at: Option<Instant>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirect_at.is_some()
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Both fields are required. Returns whether the form was accepted.
    pub fn submit(&mut self, now: Instant) -> bool {
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_FIELDS.to_string());
            return false;
        }

        info!(email = %self.email.trim(), "login form submitted");
        self.error = None;
        self.notice = Some(SUBMITTED_NOTICE.to_string());
        self.redirect_at = Some(now + REDIRECT_DELAY);
        true
    }

    /// True once the redirect delay has passed. The form is reset so the
    /// next visit starts clean.
    pub fn poll_redirect(&mut self, now: Instant) -> bool {
        match self.redirect_at {
            Some(at) if now >= at => {
                *self = Self::default();
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        // Form is frozen while the redirect notice is showing
        if self.is_redirecting() {
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => {
                if self.focus == LoginField::Email && self.password.is_empty() {
                    self.focus = LoginField::Password;
                } else {
                    self.submit(now);
                }
            }
            KeyCode::Backspace => {
                self.focused_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused_mut().push(c);
            }
            _ => {}
        }
    }
}
