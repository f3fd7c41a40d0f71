//! State management components
//!
//! The [`controller::SearchController`] owns all view state; the other
//! modules are the pieces it is built from.

pub mod controller;
pub mod conversation;
pub mod events;
pub mod pacing;
pub mod task_steps;

pub use controller::{LogPanel, SearchController, View};
pub use conversation::{ChatMessage, Conversation};
pub use events::{Effect, StateEvent, Timer};
pub use pacing::{LogPolling, Pacing};
pub use task_steps::{StepAdvance, TaskList, TaskStatus, TaskStep};
