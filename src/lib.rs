//! `termfreq` - Term and document frequency counter with a persistent search history.

#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

pub mod crawler;
pub mod error;
pub mod history;
pub mod report;
pub mod shell;
pub mod text;
pub mod types;
