use crate::config::config::DisplayConfig;
use crate::logging::LogEntry;
use crate::state::controller::SearchController;
use crate::state::task_steps::TaskStatus;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Icon for a step status; loading spins when glyphs are enabled
pub fn step_icon(status: TaskStatus, display: &DisplayConfig, tick: usize) -> String {
    let icons = &display.icons;
    match status {
        TaskStatus::Pending => icons.pending.clone(),
        TaskStatus::Loading if display.use_glyphs => {
            SPINNER_FRAMES[tick % SPINNER_FRAMES.len()].to_string()
        }
        TaskStatus::Loading => icons.loading.clone(),
        TaskStatus::Done => icons.done.clone(),
        TaskStatus::Error => icons.error.clone(),
    }
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(Color::DarkGray),
        TaskStatus::Loading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        TaskStatus::Done => Style::default().fg(Color::Green),
        TaskStatus::Error => Style::default().fg(Color::Red),
    }
}

/// Progress screen for the submitted query
pub fn render_task(
    f: &mut Frame,
    area: Rect,
    controller: &SearchController,
    display: &DisplayConfig,
    tick: usize,
    client_logs: &[LogEntry],
) {
    let panel_open = controller.log_panel().is_open();
    let error_height = if controller.error().is_some() { 3 } else { 0 };
    let steps_height = controller.steps().len() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Heading
            Constraint::Length(error_height),  // Error banner
            Constraint::Length(steps_height),  // Task list
            Constraint::Min(if panel_open { 6 } else { 0 }), // Detailed log
        ])
        .split(area);

    let heading = Paragraph::new(Line::from(vec![
        Span::styled("Shopping for: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            controller.query().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(heading, chunks[0]);

    if let Some(error) = controller.error() {
        let banner = Paragraph::new(format!("Error: {}", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(banner, chunks[1]);
    }

    let items: Vec<ListItem> = controller
        .steps()
        .steps()
        .iter()
        .map(|step| {
            let style = status_style(step.status);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", step_icon(step.status, display, tick)), style),
                Span::styled(step.label, style),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Tasks"));
    f.render_widget(list, chunks[2]);

    if panel_open {
        render_detailed_log(f, chunks[3], controller, client_logs);
    }
}

fn render_detailed_log(
    f: &mut Frame,
    area: Rect,
    controller: &SearchController,
    client_logs: &[LogEntry],
) {
    let panel = controller.log_panel();
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = panel.last_error() {
        lines.push(Line::from(Span::styled(
            format!("log fetch failed: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    if panel.lines().is_empty() {
        lines.push(Line::from(Span::styled(
            "Waiting for backend logs...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for line in panel.lines() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", line.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(line.message.clone()),
        ]));
    }

    if !client_logs.is_empty() {
        lines.push(Line::from(Span::styled(
            "-- client --",
            Style::default().fg(Color::DarkGray),
        )));
        lines.extend(
            client_logs
                .iter()
                .map(|entry| Line::from(entry.format_for_display())),
        );
    }

    // Newest lines stay visible
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let widget = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title("Detailed log"));
    f.render_widget(widget, area);
}
