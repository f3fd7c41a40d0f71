pub mod api;
pub mod config;
pub mod logging;
pub mod services;
pub mod state;
pub mod table_display;
pub mod timers;
pub mod ui;
