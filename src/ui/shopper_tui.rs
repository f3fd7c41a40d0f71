use crate::config::config::DisplayConfig;
use crate::logging::LogRingBuffer;
use crate::services::search_orchestrator::SearchOrchestrator;
use crate::state::controller::View;
use crate::state::events::StateEvent;
use crate::ui::results_view::render_results;
use crate::ui::search_view::render_search;
use crate::ui::task_view::render_task;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Upper bound on how long the loop waits for a key before redrawing
const TICK: Duration = Duration::from_millis(100);

/// Client log lines shown under the backend logs in the detailed log panel
const CLIENT_LOG_LINES: usize = 8;

/// The interactive terminal client
pub struct ShopperTui {
    orchestrator: SearchOrchestrator,
    input: Input,
    display: DisplayConfig,
    log_buffer: Option<LogRingBuffer>,
    selected_product: usize,
    results_seq: Option<u64>,
    notice: Option<String>,
    started: Instant,
    should_quit: bool,
}

impl ShopperTui {
    pub fn new(
        orchestrator: SearchOrchestrator,
        display: DisplayConfig,
        log_buffer: Option<LogRingBuffer>,
    ) -> Self {
        Self {
            orchestrator,
            input: Input::default(),
            display,
            log_buffer,
            selected_product: 0,
            results_seq: None,
            notice: None,
            started: Instant::now(),
            should_quit: false,
        }
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    pub fn selected_product(&self) -> usize {
        self.selected_product
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Main run loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.orchestrator.pump();
            self.sync_selection();

            terminal.draw(|f| self.draw(f))?;

            let timeout = self
                .orchestrator
                .next_deadline()
                .map(|d| d.min(TICK))
                .unwrap_or(TICK);

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: StateEvent) {
        self.notice = None;
        self.orchestrator.dispatch(event);
    }

    /// Reset the product selection whenever a new submission's results arrive
    fn sync_selection(&mut self) {
        let seq = self.orchestrator.controller().active_seq();
        if seq != self.results_seq {
            self.results_seq = seq;
            self.selected_product = 0;
        }
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // Global quit keys
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.should_quit = true;
            return;
        }

        match self.orchestrator.controller().view() {
            View::Search => self.handle_search_key(key),
            View::Task => self.handle_task_key(key),
            View::Results => self.handle_results_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let text = self.input.value().to_string();
                if text.trim().is_empty() {
                    return;
                }
                self.dispatch(StateEvent::Submit(text));
                self.input.reset();
            }
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                let controller = self.orchestrator.controller_mut();
                let next = controller.marketplace().unwrap_or_default().next();
                controller.set_marketplace(Some(next));
                debug!(target: "input", "Marketplace -> {}", next);
            }
            KeyCode::BackTab => {
                let controller = self.orchestrator.controller_mut();
                let next = controller.mode().unwrap_or_default().next();
                controller.set_mode(Some(next));
                debug!(target: "input", "Mode -> {}", next);
            }
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(StateEvent::NewConversation);
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
    }

    fn handle_task_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.dispatch(StateEvent::Back);
            }
            KeyCode::Char('l') => {
                self.dispatch(StateEvent::ToggleDetailedLog);
            }
            KeyCode::Enter | KeyCode::Char('r') => {
                self.dispatch(StateEvent::ViewResults);
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let product_count = self.orchestrator.controller().products().len();

        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.dispatch(StateEvent::Back);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_product + 1 < product_count {
                    self.selected_product += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_product = self.selected_product.saturating_sub(1);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected_product = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected_product = product_count.saturating_sub(1);
            }
            KeyCode::Char('y') => self.yank_selected_url(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let question = self
                    .orchestrator
                    .controller()
                    .response()
                    .and_then(|r| r.clarifying_questions().get(index).cloned());
                if let Some(question) = question {
                    info!(target: "input", "Answering with follow-up question {}", index + 1);
                    self.dispatch(StateEvent::Submit(question));
                }
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn yank_selected_url(&mut self) {
        let Some(url) = self
            .orchestrator
            .controller()
            .products()
            .get(self.selected_product)
            .map(|p| p.url.clone())
        else {
            return;
        };

        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.clone()));
        self.notice = Some(match result {
            Ok(()) => format!("Copied {}", url),
            Err(e) => {
                warn!(target: "input", "Clipboard unavailable: {}", e);
                format!("Clipboard unavailable: {}", e)
            }
        });
    }

    /// Draw the UI
    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(5),    // Current view
                Constraint::Length(1), // Status
                Constraint::Length(1), // Help line
            ])
            .split(f.area());

        let controller = self.orchestrator.controller();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Shopper", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(
                    "  │ {}  │ {}",
                    self.orchestrator.client().base_url(),
                    self.orchestrator.client().credentials_name()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        f.render_widget(header, chunks[0]);

        match controller.view() {
            View::Search => render_search(f, chunks[1], controller, &self.input),
            View::Task => {
                let tick = (self.started.elapsed().as_millis() / 120) as usize;
                let client_logs = self
                    .log_buffer
                    .as_ref()
                    .filter(|_| controller.log_panel().is_open())
                    .map(|buffer| buffer.get_recent(CLIENT_LOG_LINES))
                    .unwrap_or_default();
                render_task(f, chunks[1], controller, &self.display, tick, &client_logs);
            }
            View::Results => render_results(f, chunks[1], controller, self.selected_product),
        }

        let status = self
            .notice
            .clone()
            .unwrap_or_else(|| controller.status_message().to_string());
        let status_style = if controller.error().is_some() && controller.view() == View::Task {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Gray)
        };
        f.render_widget(Paragraph::new(status).style(status_style), chunks[2]);

        let help = match controller.view() {
            View::Search => "Enter search · Tab location · Shift+Tab mode · Ctrl+N new chat · Esc quit",
            View::Task => "r view results · l detailed log · b back · q quit",
            View::Results => "↑↓ select · y copy link · 1-9 follow-up · b back · q quit",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}

/// Set up the terminal, run the client, and restore the terminal afterwards
pub fn run_tui(
    orchestrator: SearchOrchestrator,
    display: DisplayConfig,
    log_buffer: Option<LogRingBuffer>,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = ShopperTui::new(orchestrator, display, log_buffer);
    let result = app.run(&mut terminal);

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result.context("TUI execution failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::SearchClient;
    use crate::api::models::Marketplace;
    use crate::state::controller::SearchController;
    use crate::state::pacing::{LogPolling, Pacing};
    use ratatui::backend::TestBackend;

    fn new_app(runtime: &tokio::runtime::Runtime) -> ShopperTui {
        let controller = SearchController::new(Pacing::default(), LogPolling::default())
            .with_marketplace(Some(Marketplace::India));
        let orchestrator = SearchOrchestrator::new(
            controller,
            SearchClient::new("http://127.0.0.1:9"),
            runtime.handle().clone(),
        );
        ShopperTui::new(orchestrator, DisplayConfig::default(), None)
    }

    fn press(app: &mut ShopperTui, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut ShopperTui, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&runtime);

        type_text(&mut app, "laptop");
        assert_eq!(app.input_value(), "laptop");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.orchestrator().controller().view(), View::Task);
        assert_eq!(app.orchestrator().controller().query(), "laptop");
        assert_eq!(app.input_value(), "");
    }

    #[test]
    fn test_enter_on_blank_input_stays_on_search() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&runtime);

        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.orchestrator().controller().view(), View::Search);
    }

    #[test]
    fn test_tab_cycles_marketplace() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&runtime);

        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.orchestrator().controller().marketplace(),
            Some(Marketplace::Usa)
        );
        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.orchestrator().controller().marketplace(),
            Some(Marketplace::India)
        );
    }

    #[test]
    fn test_task_view_keys() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&runtime);
        type_text(&mut app, "laptop");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('l'));
        assert!(app.orchestrator().controller().log_panel().is_open());
        assert!(app.orchestrator().timers().is_pending());

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.orchestrator().controller().view(), View::Search);
        assert!(!app.orchestrator().controller().log_panel().is_open());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_quit_keys() {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let mut app = new_app(&runtime);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());

        let mut app = new_app(&runtime);
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_draw_shows_header_and_help() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let app = new_app(&runtime);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| app.draw(f)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("http://127.0.0.1:9"));
        assert!(rendered.contains("anonymous"));
        assert!(rendered.contains("Tab location"));
    }
}
