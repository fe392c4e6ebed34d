//! ragchat - streaming client for a retrieval-augmented chat service
//!
//! A query is POSTed to the backend, which answers with a newline-delimited
//! stream of `data: <json>` frames: one `sources` list, many `token`
//! fragments, or an `error`. This crate decodes that stream incrementally
//! and publishes typed [`events::SessionEvent`]s for a front end to render.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
