//! Fabao: a terminal front end for legal case search.
//!
//! The library exports the API client, search state, and layout helpers for
//! testing and reuse.

pub mod api;
pub mod cli;
pub mod config;
pub mod event;
pub mod layout;
pub mod logging;
pub mod search;
pub mod tui;
