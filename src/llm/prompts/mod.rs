// ABOUTME: System prompts for coaching LLM calls, loaded at compile time
// ABOUTME: Builds the message list for the analysis and end-of-session summary requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are kept as markdown files next to this module for easy editing.

use super::ChatMessage;

/// System prompt for `/ask` questions
pub const ANALYSIS_SYSTEM_PROMPT: &str = include_str!("analysis_system.md");

/// System prompt for the end-of-session summary
pub const SESSION_SUMMARY_SYSTEM_PROMPT: &str = include_str!("session_summary_system.md");

/// Messages for answering a question from a training data summary
#[must_use]
pub fn analysis_messages(question: &str, summary_json: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Training data:\n```json\n{summary_json}\n```\n\nQuestion: {question}"
        )),
    ]
}

/// Messages for summarizing a finished session
#[must_use]
pub fn session_summary_messages(recap_json: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SESSION_SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(format!("Session recap:\n```json\n{recap_json}\n```")),
    ]
}
