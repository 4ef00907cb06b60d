//! Tableau Server REST API: sign-in sessions and project endpoints.

mod client;
mod types;

pub use client::TableauClient;
