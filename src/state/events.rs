//! State events and effects

use crate::api::client::ClientError;
use crate::api::models::{LogLine, SearchRequest, SearchResponse};
use std::time::Duration;

/// Events that can trigger state changes
#[derive(Debug)]
pub enum StateEvent {
    /// User submitted a query (raw, untrimmed input)
    Submit(String),

    /// The search request tagged `seq` settled
    SearchFinished {
        seq: u64,
        outcome: Result<SearchResponse, ClientError>,
    },

    /// A previously scheduled timer expired
    TimerFired(Timer),

    /// Back navigation from the current view
    Back,

    /// "View results" from the task view
    ViewResults,

    /// Open or close the detailed log panel
    ToggleDetailedLog,

    /// A log poll tagged `generation` settled
    LogsFetched {
        generation: u64,
        outcome: Result<Vec<LogLine>, ClientError>,
    },

    /// Forget the conversation history
    NewConversation,
}

/// Timers the controller asks to be woken by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Advance the task list of submission `seq`
    AdvanceStep { seq: u64 },
    /// Switch submission `seq` to the results view
    ShowResults { seq: u64 },
    /// Poll backend logs for panel generation `generation`
    PollLogs { generation: u64 },
}

impl Timer {
    pub fn is_log_poll(&self) -> bool {
        matches!(self, Timer::PollLogs { .. })
    }
}

/// Side effects the controller wants performed. The controller itself
/// never does I/O or sleeps.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    IssueSearch { seq: u64, request: SearchRequest },
    Schedule { timer: Timer, after: Duration },
    FetchLogs { generation: u64, limit: usize },
    CancelLogPolling,
}
