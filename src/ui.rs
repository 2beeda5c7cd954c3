use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, Screen};
use crate::login::LoginField;
use crate::message::Role;

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        Role::Assistant => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Login => render_login_screen(app, frame, body_area),
        Screen::Gallery => render_gallery_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" ChatGPT Style App ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.conversation.generator_label()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("Welcome back! ", Style::default().fg(Color::White)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.screen {
        Screen::Chat if app.conversation.is_loading() => {
            (" THINKING ", Style::default().bg(Color::Yellow).fg(Color::Black))
        }
        Screen::Chat => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        Screen::Login => (" LOGIN ", Style::default().bg(Color::Green).fg(Color::Black)),
        Screen::Gallery => (" GALLERY ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let muted_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let mut hints = match app.screen {
        Screen::Chat => {
            let send_style = if app.input.can_submit(app.conversation.is_loading()) {
                label_style
            } else {
                muted_style
            };
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" send ", send_style),
                Span::styled(" Shift+Enter ", key_style),
                Span::styled(" newline ", label_style),
                Span::styled(" PgUp/PgDn ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" ^G ", key_style),
                Span::styled(" gallery ", label_style),
                Span::styled(" ^L ", key_style),
                Span::styled(" logout ", label_style),
            ]
        }
        Screen::Login => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" next field ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" login ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" chat ", label_style),
        ],
        Screen::Gallery => vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" chat ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" logout ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" ^C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Message list as rendered in the chat pane. Content is shown verbatim.
fn chat_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines: Vec<Line> = Vec::new();
    for msg in app.conversation.messages() {
        lines.push(Line::from(vec![
            Span::styled(msg.role.display_name(), role_style(msg.role)),
            Span::styled(
                format!("  {}", msg.timestamp.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.extend(msg.content.split('\n').map(Line::raw));
        lines.push(Line::default());
    }

    if app.conversation.is_loading() {
        lines.push(Line::from(Span::styled(
            Role::Assistant.display_name(),
            role_style(Role::Assistant),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn chat_paragraph(app: &App) -> Paragraph<'_> {
    Paragraph::new(Text::from(chat_lines(app))).wrap(Wrap { trim: false })
}

/// Rows the chat pane needs at `width`, wrapped exactly as it is drawn
pub fn chat_line_count(app: &App, width: u16) -> usize {
    chat_paragraph(app).line_count(width)
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Input grows with the draft, up to five lines
    let input_lines = app.input.line_count().clamp(1, 5) as u16;
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(input_lines + 2),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);
    if app.follow_bottom {
        app.scroll_chat_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", app.strategy.display_name()));

    let chat = chat_paragraph(app)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let disabled = app.conversation.is_loading();
    let (border_color, title) = if disabled {
        (Color::DarkGray, " Waiting for reply... ")
    } else {
        (Color::Yellow, " Message ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = app.input.cursor_line_col();

    // Keep the cursor visible in both directions
    let line_offset = (cursor_line + 1).saturating_sub(inner_height.max(1));
    let col_offset = if inner_width == 0 {
        0
    } else {
        (cursor_col + 1).saturating_sub(inner_width)
    };

    let text = if app.input.draft().is_empty() {
        Text::from(Span::styled(
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let text_color = if disabled { Color::DarkGray } else { Color::Cyan };
        let visible: Vec<Line> = app
            .input
            .draft()
            .split('\n')
            .skip(line_offset)
            .take(inner_height)
            .map(|line| {
                let slice: String = line.chars().skip(col_offset).take(inner_width).collect();
                Line::from(Span::styled(slice, Style::default().fg(text_color)))
            })
            .collect();
        Text::from(visible)
    };

    frame.render_widget(Paragraph::new(text).block(input_block), area);

    if !disabled {
        frame.set_cursor_position((
            area.x + 1 + (cursor_col - col_offset) as u16,
            area.y + 1 + (cursor_line - line_offset) as u16,
        ));
    }
}

/// Centered rectangle of at most `width` x `height`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_login_screen(app: &App, frame: &mut Frame, area: Rect) {
    let form = &app.login;
    let popup_area = centered(area, 50, 13);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Login ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let field_style = |field: LoginField| {
        if form.focus == field && !form.is_redirecting() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::White)
        }
    };
    let masked = "*".repeat(form.password.chars().count());

    let mut lines = vec![
        Line::from(Span::styled("Email", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(format!("{:<40}", form.email), field_style(LoginField::Email))),
        Line::default(),
        Line::from(Span::styled("Password", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(format!("{:<40}", masked), field_style(LoginField::Password))),
        Line::default(),
        Line::from(Span::styled(
            "[ Login ]",
            Style::default().bg(Color::Green).fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];

    if let Some(notice) = &form.notice {
        lines.push(Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Green))));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    if !form.is_redirecting() && inner.height > 4 {
        let (row, len) = match form.focus {
            LoginField::Email => (1, form.email.chars().count()),
            LoginField::Password => (4, masked.chars().count()),
        };
        let x = inner.x + (len as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y + row));
    }
}

fn render_gallery_screen(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Gallery ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let count = app.gallery.len().max(1) as u32;
    let columns = Layout::horizontal(
        (0..count).map(|_| Constraint::Ratio(1, count)).collect::<Vec<_>>(),
    )
    .split(inner);

    for (item, column) in app.gallery.iter().zip(columns.iter()) {
        let card_area = Rect { height: column.height.min(10), ..*column };
        let card = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" {} ", item.alt));

        let body = Text::from(vec![
            Line::default(),
            Line::from(Span::styled("200 x 150", Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
            Line::default(),
            Line::from(Span::styled(item.url.as_str(), Style::default().fg(Color::Blue))),
        ]);

        frame.render_widget(
            Paragraph::new(body).block(card).wrap(Wrap { trim: true }),
            card_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, TurnOutcome};
    use crate::generator::MockGenerator;
    use crate::strategy::Strategy;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn test_app(screen: Screen) -> App {
        let generator = MockGenerator::new().with_delay(0, 0);
        App::new(Conversation::new(Arc::new(generator)), Strategy::Mock, screen)
    }

    #[test]
    fn test_chat_screen_shows_greeting_and_placeholder() {
        let mut app = test_app(Screen::Chat);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("ChatGPT Style App"));
        assert!(text.contains("Assistant"));
        assert!(text.contains("How can I help you today?"));
        assert!(text.contains("Type your message..."));
    }

    #[test]
    fn test_gallery_and_login_render() {
        let mut app = test_app(Screen::Gallery);
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Gallery image 1"));
        assert!(text.contains("Gallery image 3"));

        app.screen = Screen::Login;
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Email"));
        assert!(text.contains("Password"));
    }

    #[tokio::test]
    async fn test_message_content_is_shown_verbatim() {
        let mut app = test_app(Screen::Chat);
        app.send_message("keep **these** stars");
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        assert!(buffer_text(&terminal).contains("keep **these** stars"));
    }

    #[tokio::test]
    async fn test_auto_scroll_reaches_end_of_wrapped_reply() {
        let mut app = test_app(Screen::Chat);
        app.send_message(
            "aaaaaaaaaaa bbbbbbbbbbb ccccccccccc ddddddddddd \
             eeeeeeeeeee fffffffffff ggggggggggg hhhhhhhhhhh",
        );
        assert_eq!(app.conversation.wait_turn().await, Some(TurnOutcome::Replied));
        app.scroll_chat_to_bottom();

        let mut terminal = Terminal::new(TestBackend::new(24, 14)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("response!"), "end of newest reply is not visible");
        assert!(app.chat_scroll > 0);
    }
}
