use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Screen};
use crate::input::InputAction;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {
            if app.follow_bottom {
                app.scroll_chat_to_bottom();
            }
        }
        AppEvent::Tick => app.tick(Instant::now()),
    }
    app.poll_conversation().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on every screen
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('l') => {
                app.logout();
                return;
            }
            KeyCode::Char('g') => {
                app.screen = Screen::Gallery;
                return;
            }
            _ => {}
        }
    }

    match app.screen {
        Screen::Chat => handle_chat_key(app, key),
        Screen::Login => handle_login_key(app, key),
        Screen::Gallery => handle_gallery_key(app, key),
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(2) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(2) / 2),
        _ => {
            let disabled = app.conversation.is_loading();
            if let InputAction::Submit(message) = app.input.handle_key(key, disabled) {
                app.send_message(&message);
            }
        }
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc && !app.login.is_redirecting() {
        app.screen = Screen::Chat;
        return;
    }
    app.login.handle_key(key, Instant::now());
}

fn handle_gallery_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.screen = Screen::Chat;
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Chat {
        return;
    }

    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}
