// ABOUTME: Main library entry point for the Vyayamam chat-driven strength coach
// ABOUTME: Wires parsing, resolution, session state, storage, and coaching into one message handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vyayamam
//!
//! The deterministic core of a chat-based strength-training coach. A chat
//! transport hands every inbound message to [`handler::MessageHandler`]
//! together with a user identifier; the handler answers with a typed
//! [`handler::Reply`] that [`formatters::render_reply`] turns into text.
//!
//! ## Architecture
//!
//! - **Catalog**: canonical exercises with aliases and muscle-group tags
//! - **Resolver**: maps free-text phrases ("db shoulderpress") to catalog entries
//! - **Parser**: maps message text to exactly one [`parser::Command`]
//! - **Session**: per-user state machine for `/start`, set logging, `next` and `/end`
//! - **Database**: storage collaborator contract with `SQLite` and in-memory stores
//! - **LLM**: language-model collaborator used for `/ask` and session summaries
//! - **Coach**: timeout-bounded model calls with canned fallbacks
//!
//! The metrics, recommendation, and grading engines live in the
//! `vyayamam-intelligence` crate.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vyayamam::config::environment::ServerConfig;
//! use vyayamam::errors::AppResult;
//! use vyayamam::handler::MessageHandler;
//! use vyayamam_core::models::UserId;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let handler = MessageHandler::from_config(&config).await?;
//!     let reply = handler.handle(&UserId::from("+15550001"), "smith incline 120 8").await;
//!     println!("{}", vyayamam::formatters::render_reply(&reply, &config.render_options()));
//!     Ok(())
//! }
//! ```

/// Exercise catalog and the built-in training plan
pub mod catalog;

/// Language-model coaching with timeouts and fallbacks
pub mod coach;

/// Environment configuration and workout plan loading
pub mod config;

/// Storage collaborator contract and implementations
pub mod database;

/// Error types re-exported from the core crate
pub mod errors;

/// Chat-text rendering of replies
pub mod formatters;

/// Message handler driving the command control flow
pub mod handler;

/// Language-model provider abstraction
pub mod llm;

/// Logging configuration and structured domain events
pub mod logging;

/// Intent parser mapping message text to commands
pub mod parser;

/// Fuzzy exercise name resolution
pub mod resolver;

/// Session state machine and per-user context registry
pub mod session;
