//! User interface layer
//!
//! This module contains the main TUI application and its three views.

pub mod format;
pub mod results_view;
pub mod search_view;
pub mod shopper_tui;
pub mod task_view;

pub use shopper_tui::{run_tui, ShopperTui};
