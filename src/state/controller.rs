//! View state controller
//!
//! Owns the screen state machine (search -> task -> results), the cosmetic
//! progress pacing of the task list, the detailed-log polling flag and the
//! conversation. All transitions are synchronous: the controller consumes a
//! [`StateEvent`] and answers with the [`Effect`]s it wants performed.
//!
//! Every search is tagged with a monotonically increasing sequence number.
//! Responses and timers carrying any other number than the current one are
//! dropped, so a late answer to a superseded submission can never touch the
//! state of the newer one.

use crate::api::client::ClientError;
use crate::api::models::{LogLine, Marketplace, Product, SearchMode, SearchRequest, SearchResponse};
use crate::state::conversation::{Conversation, FAILED_TURN_REPLY};
use crate::state::events::{Effect, StateEvent, Timer};
use crate::state::pacing::{LogPolling, Pacing};
use crate::state::task_steps::{StepAdvance, TaskList};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Search,
    Task,
    Results,
}

/// State of the detailed log panel on the task view
#[derive(Debug, Clone, Default)]
pub struct LogPanel {
    open: bool,
    generation: u64,
    lines: Vec<LogLine>,
    last_error: Option<String>,
}

impl LogPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

pub struct SearchController {
    view: View,
    query: String,
    steps: TaskList,
    error: Option<String>,
    response: Option<SearchResponse>,
    marketplace: Option<Marketplace>,
    mode: Option<SearchMode>,
    conversation: Conversation,
    pacing: Pacing,
    log_polling: LogPolling,
    next_seq: u64,
    active_seq: Option<u64>,
    results_viewed: bool,
    log_panel: LogPanel,
    status_message: String,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(Pacing::default(), LogPolling::default())
    }
}

impl SearchController {
    pub fn new(pacing: Pacing, log_polling: LogPolling) -> Self {
        Self {
            view: View::Search,
            query: String::new(),
            steps: TaskList::initial(),
            error: None,
            response: None,
            marketplace: None,
            mode: None,
            conversation: Conversation::new(),
            pacing,
            log_polling,
            next_seq: 1,
            active_seq: None,
            results_viewed: false,
            log_panel: LogPanel::default(),
            status_message: String::new(),
        }
    }

    pub fn with_marketplace(mut self, marketplace: Option<Marketplace>) -> Self {
        self.marketplace = marketplace;
        self
    }

    pub fn with_mode(mut self, mode: Option<SearchMode>) -> Self {
        self.mode = mode;
        self
    }

    // ---- accessors ----

    pub fn view(&self) -> View {
        self.view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn steps(&self) -> &TaskList {
        &self.steps
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn products(&self) -> &[Product] {
        self.response
            .as_ref()
            .map(|r| r.products.as_slice())
            .unwrap_or(&[])
    }

    pub fn marketplace(&self) -> Option<Marketplace> {
        self.marketplace
    }

    pub fn mode(&self) -> Option<SearchMode> {
        self.mode
    }

    pub fn set_marketplace(&mut self, marketplace: Option<Marketplace>) {
        self.marketplace = marketplace;
    }

    pub fn set_mode(&mut self, mode: Option<SearchMode>) {
        self.mode = mode;
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn log_panel(&self) -> &LogPanel {
        &self.log_panel
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn active_seq(&self) -> Option<u64> {
        self.active_seq
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// True while a search request is out and hasn't answered yet
    pub fn is_in_flight(&self) -> bool {
        self.active_seq.is_some() && self.response.is_none() && self.error.is_none()
    }

    /// Whether the current submission reached one of its terminal states:
    /// results shown, or failed on the task view. An idle search view is
    /// settled too.
    pub fn is_settled(&self) -> bool {
        match self.view {
            View::Search => self.active_seq.is_none(),
            View::Task => self.error.is_some(),
            View::Results => true,
        }
    }

    // ---- transitions ----

    pub fn handle(&mut self, event: StateEvent) -> Vec<Effect> {
        match event {
            StateEvent::Submit(text) => self.submit(&text),
            StateEvent::SearchFinished { seq, outcome } => self.on_search_finished(seq, outcome),
            StateEvent::TimerFired(timer) => self.on_timer(timer),
            StateEvent::Back => self.back(),
            StateEvent::ViewResults => self.view_results(),
            StateEvent::ToggleDetailedLog => self.toggle_detailed_log(),
            StateEvent::LogsFetched {
                generation,
                outcome,
            } => self.on_logs_fetched(generation, outcome),
            StateEvent::NewConversation => self.new_conversation(),
        }
    }

    fn submit(&mut self, text: &str) -> Vec<Effect> {
        let Some(request) = SearchRequest::new(text) else {
            debug!(target: "controller", "Ignoring blank submission");
            self.status_message = "Type what you're shopping for first".to_string();
            return Vec::new();
        };

        if self.is_in_flight() {
            info!(target: "controller", "Superseding in-flight search #{}",
                self.active_seq.unwrap_or_default());
            self.conversation.abandon_pending();
        }
        let history = self.conversation.history();

        let mut effects = Vec::new();
        effects.extend(self.close_log_panel());

        let seq = self.next_seq;
        self.next_seq += 1;
        self.active_seq = Some(seq);
        self.results_viewed = false;

        let request = request
            .with_history(history)
            .with_marketplace(self.marketplace)
            .with_mode(self.mode);

        self.query = request.query.clone();
        self.steps = TaskList::initial();
        self.error = None;
        self.response = None;
        self.view = View::Task;
        self.status_message = format!("Searching for \"{}\"", self.query);

        self.conversation.push_user(request.query.clone());
        self.conversation.push_placeholder();

        info!(target: "controller", "Submitting search #{}: {:?}", seq, request.query);
        effects.push(Effect::IssueSearch { seq, request });
        effects
    }

    fn on_search_finished(
        &mut self,
        seq: u64,
        outcome: Result<SearchResponse, ClientError>,
    ) -> Vec<Effect> {
        if self.active_seq != Some(seq) || !self.is_in_flight() {
            debug!(target: "controller", "Discarding stale response for search #{}", seq);
            return Vec::new();
        }

        self.conversation.clear_placeholders();

        match outcome {
            Ok(response) => {
                info!(target: "controller", "Search #{} succeeded with {} products",
                    seq, response.products.len());
                self.conversation.push_assistant(response.assistant_text());
                self.response = Some(response);
                let advance = self.steps.advance();
                self.after_advance(seq, advance)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(target: "controller", "Search #{} failed: {}", seq, e);
                self.steps.fail();
                self.conversation.push_assistant(FAILED_TURN_REPLY);
                self.status_message = format!("Search failed: {}", message);
                self.error = Some(message);
                Vec::new()
            }
        }
    }

    /// Schedule whatever comes after a step advance
    fn after_advance(&mut self, seq: u64, advance: StepAdvance) -> Vec<Effect> {
        match advance {
            StepAdvance::Started(id) => {
                debug!(target: "controller", "Search #{} now on step {}", seq, id);
                let after = if self.steps.loading_is_last() {
                    self.pacing.final_step_delay
                } else {
                    self.pacing.step_delay
                };
                vec![Effect::Schedule {
                    timer: Timer::AdvanceStep { seq },
                    after,
                }]
            }
            StepAdvance::Finished => vec![Effect::Schedule {
                timer: Timer::ShowResults { seq },
                after: self.pacing.results_delay,
            }],
            StepAdvance::Idle => Vec::new(),
        }
    }

    fn on_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match timer {
            Timer::AdvanceStep { seq } => {
                if self.active_seq != Some(seq) || self.error.is_some() {
                    debug!(target: "controller", "Ignoring stale step timer for search #{}", seq);
                    return Vec::new();
                }
                let advance = self.steps.advance();
                self.after_advance(seq, advance)
            }
            Timer::ShowResults { seq } => {
                if self.active_seq != Some(seq) || !self.steps.all_done() {
                    return Vec::new();
                }
                // The user already opened results early and stepped back
                if self.view != View::Task || self.results_viewed {
                    return Vec::new();
                }
                self.results_viewed = true;
                self.status_message = format!("{} products found", self.products().len());
                self.change_view(View::Results)
            }
            Timer::PollLogs { generation } => {
                if !self.log_panel.open
                    || self.log_panel.generation != generation
                    || self.view != View::Task
                {
                    return Vec::new();
                }
                vec![
                    Effect::FetchLogs {
                        generation,
                        limit: self.log_polling.limit,
                    },
                    Effect::Schedule {
                        timer: Timer::PollLogs { generation },
                        after: self.log_polling.interval,
                    },
                ]
            }
        }
    }

    fn back(&mut self) -> Vec<Effect> {
        match self.view {
            View::Search => Vec::new(),
            View::Task => {
                if self.is_in_flight() {
                    self.conversation.abandon_pending();
                }
                let effects = self.change_view(View::Search);
                self.steps = TaskList::initial();
                self.active_seq = None;
                self.query.clear();
                self.error = None;
                self.response = None;
                self.status_message.clear();
                effects
            }
            View::Results => self.change_view(View::Task),
        }
    }

    fn view_results(&mut self) -> Vec<Effect> {
        if self.view != View::Task {
            return Vec::new();
        }
        if self.response.is_none() {
            self.status_message = "Results are not ready yet".to_string();
            return Vec::new();
        }
        self.results_viewed = true;
        self.change_view(View::Results)
    }

    fn toggle_detailed_log(&mut self) -> Vec<Effect> {
        if self.view != View::Task {
            return Vec::new();
        }

        if self.log_panel.open {
            return self.close_log_panel().into_iter().collect();
        }

        self.log_panel.generation += 1;
        self.log_panel.open = true;
        self.log_panel.lines.clear();
        self.log_panel.last_error = None;

        let generation = self.log_panel.generation;
        debug!(target: "controller", "Detailed log opened (generation {})", generation);
        vec![
            Effect::FetchLogs {
                generation,
                limit: self.log_polling.limit,
            },
            Effect::Schedule {
                timer: Timer::PollLogs { generation },
                after: self.log_polling.interval,
            },
        ]
    }

    fn on_logs_fetched(
        &mut self,
        generation: u64,
        outcome: Result<Vec<LogLine>, ClientError>,
    ) -> Vec<Effect> {
        if !self.log_panel.open || self.log_panel.generation != generation {
            return Vec::new();
        }

        match outcome {
            Ok(lines) => {
                self.log_panel.lines = lines;
                self.log_panel.last_error = None;
            }
            Err(e) => {
                warn!(target: "controller", "Log poll failed: {}", e);
                self.log_panel.last_error = Some(e.to_string());
            }
        }
        Vec::new()
    }

    fn new_conversation(&mut self) -> Vec<Effect> {
        if self.is_in_flight() {
            self.status_message = "Wait for the current search to finish".to_string();
            return Vec::new();
        }
        self.conversation.clear();
        self.status_message = "Started a new conversation".to_string();
        Vec::new()
    }

    /// Switch views; leaving the task view always stops log polling
    fn change_view(&mut self, view: View) -> Vec<Effect> {
        debug!(target: "controller", "View {:?} -> {:?}", self.view, view);
        let effects = if view != self.view {
            self.close_log_panel().into_iter().collect()
        } else {
            Vec::new()
        };
        self.view = view;
        effects
    }

    fn close_log_panel(&mut self) -> Option<Effect> {
        if !self.log_panel.open {
            return None;
        }
        self.log_panel.open = false;
        self.log_panel.generation += 1;
        debug!(target: "controller", "Detailed log closed");
        Some(Effect::CancelLogPolling)
    }
}
