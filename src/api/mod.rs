//! External API client and models
//!
//! This module handles communication with the Shopper backend
//! and defines the data models for its requests/responses.

pub mod client;
pub mod credentials;
pub mod models;

pub use client::{ClientError, SearchClient, FALLBACK_ERROR_MESSAGE};
pub use credentials::{Anonymous, CredentialProvider, StaticToken, TokenEndpoint};
pub use models::{
    Action, ConversationMessage, LogLine, Marketplace, Product, Role, SearchMode, SearchRequest,
    SearchResponse,
};
