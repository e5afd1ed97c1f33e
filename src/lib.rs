//! Portfolio manager: a terminal tracker for personal projects kept in a
//! local SQLite database.
//!
//! `db` is the data-access layer and has no knowledge of the terminal.
//! `ui` holds screen state, rendering and key handling on top of it.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;
