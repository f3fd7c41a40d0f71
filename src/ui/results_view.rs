use crate::api::models::Action;
use crate::state::controller::SearchController;
use crate::ui::format::{parse_quick_notes, product_cards};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

/// Results screen: analysis, quick notes, clarifying questions and one
/// card (table row) per product
pub fn render_results(f: &mut Frame, area: Rect, controller: &SearchController, selected: usize) {
    let Some(response) = controller.response() else {
        let empty = Paragraph::new("No results yet.").style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    };

    let mut extras: Vec<Line> = Vec::new();
    if let Some(notes) = response.quick_notes.as_deref() {
        for spans in parse_quick_notes(notes) {
            let mut line = vec![Span::raw("• ")];
            line.extend(spans.into_iter().map(|span| {
                if span.bold {
                    Span::styled(span.text, Style::default().add_modifier(Modifier::BOLD))
                } else {
                    Span::raw(span.text)
                }
            }));
            extras.push(Line::from(line));
        }
    }
    for (index, question) in response.clarifying_questions().iter().take(9).enumerate() {
        extras.push(Line::from(vec![
            Span::styled(format!("[{}] ", index + 1), Style::default().fg(Color::Yellow)),
            Span::raw(question.clone()),
        ]));
    }

    let extras_height = if extras.is_empty() {
        0
    } else {
        (extras.len() as u16 + 2).min(10)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Heading
            Constraint::Length(6),             // Analysis
            Constraint::Length(extras_height), // Notes and questions
            Constraint::Min(4),                // Products
            Constraint::Length(2),             // Selected product detail
        ])
        .split(area);

    let heading = Paragraph::new(Line::from(vec![
        Span::styled("Results for: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            controller.query().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(heading, chunks[0]);

    let analysis_title = match response.action {
        Action::Ask => "Assistant",
        Action::Search => "Agent Analysis",
    };
    let analysis = Paragraph::new(response.assistant_text().to_string())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(analysis_title));
    f.render_widget(analysis, chunks[1]);

    if !extras.is_empty() {
        let title = if response.clarifying_questions().is_empty() {
            "Quick Notes"
        } else {
            "Quick Notes / Follow-up questions"
        };
        let widget = Paragraph::new(extras)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(widget, chunks[2]);
    }

    let cards = product_cards(response, controller.marketplace());
    if cards.is_empty() {
        let empty = Paragraph::new("No products found.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Products (0)"));
        f.render_widget(empty, chunks[3]);
        return;
    }

    let header = Row::new(vec!["Source", "Title", "Price", "Rating"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = cards
        .iter()
        .map(|card| {
            Row::new(vec![
                Cell::from(card.source.clone()),
                Cell::from(card.title.clone()),
                Cell::from(card.price.clone()).style(Style::default().fg(Color::Green)),
                Cell::from(format!("★ {}", card.rating)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Products ({})", cards.len())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let selected = selected.min(cards.len() - 1);
    let mut state = TableState::default();
    state.select(Some(selected));
    f.render_stateful_widget(table, chunks[3], &mut state);

    let card = &cards[selected];
    let detail = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Link: ", Style::default().fg(Color::DarkGray)),
            Span::raw(card.url.clone()),
        ]),
        Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::DarkGray)),
            Span::raw(card.image_url.clone().unwrap_or_else(|| "No Image".to_string())),
        ]),
    ]);
    f.render_widget(detail, chunks[4]);
}
