use crate::api::models::Role;
use crate::state::controller::SearchController;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tui_input::Input;

/// Landing screen: title, query input, marketplace/mode selectors and the
/// conversation so far
pub fn render_search(f: &mut Frame, area: Rect, controller: &SearchController, input: &Input) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Selectors
            Constraint::Min(0),    // Conversation
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Shopper",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your AI Shopping Assistant",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    // Keep the cursor visible on long queries
    let inner_width = chunks[1].width.saturating_sub(2) as usize;
    let scroll = input.visual_scroll(inner_width.saturating_sub(1));
    let placeholder = input.value().is_empty();
    let text = if placeholder {
        Span::styled(
            "What are you looking for today?",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(input.value())
    };
    let input_widget = Paragraph::new(Line::from(text))
        .scroll((0, if placeholder { 0 } else { scroll as u16 }))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(input_widget, chunks[1]);

    let cursor_x = input.visual_cursor().saturating_sub(scroll) as u16;
    f.set_cursor_position((chunks[1].x + 1 + cursor_x, chunks[1].y + 1));

    let marketplace = controller
        .marketplace()
        .map(|m| m.as_str())
        .unwrap_or("any");
    let mode = controller.mode().map(|m| m.as_str()).unwrap_or("default");
    let selectors = Paragraph::new(Line::from(vec![
        Span::styled("Location: ", Style::default().fg(Color::DarkGray)),
        Span::styled(marketplace, Style::default().fg(Color::Green)),
        Span::raw("   "),
        Span::styled("Mode: ", Style::default().fg(Color::DarkGray)),
        Span::styled(mode, Style::default().fg(Color::Green)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(selectors, chunks[2]);

    let conversation = controller.conversation();
    if conversation.is_empty() || chunks[3].height == 0 {
        return;
    }

    let lines: Vec<Line> = conversation
        .messages()
        .iter()
        .map(|message| {
            let (who, color) = match message.role {
                Role::User => ("you", Color::Yellow),
                Role::Assistant => ("shopper", Color::Cyan),
                Role::System => ("system", Color::DarkGray),
            };
            let body_style = if message.placeholder {
                Style::default().add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{who}: "), Style::default().fg(color)),
                Span::styled(message.content.clone(), body_style),
            ])
        })
        .collect();

    // Show the tail of the conversation
    let visible = chunks[3].height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let transcript = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Conversation ({} turns)", conversation.turns())),
        );
    f.render_widget(transcript, chunks[3]);
}
