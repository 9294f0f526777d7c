// ABOUTME: Application-wide constants for validation limits and service identity
// ABOUTME: Shared by the parser, readiness logging, and configuration defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Service identifiers used in structured logs
pub mod service_names {
    /// Service name reported at startup
    pub const VYAYAMAM: &str = "vyayamam";
    /// Log target prefix for the application crate
    pub const LOG_TARGET: &str = "vyayamam";
}

/// Validation limits for user-supplied values
pub mod limits {
    /// Lowest accepted RPE value
    pub const RPE_MIN: f64 = 1.0;
    /// Highest accepted RPE value
    pub const RPE_MAX: f64 = 10.0;
    /// Lowest accepted stress/soreness score
    pub const SCORE_MIN: f64 = 1.0;
    /// Highest accepted stress/soreness score
    pub const SCORE_MAX: f64 = 10.0;
    /// Hours of sleep are bounded by a day
    pub const SLEEP_HOURS_MAX: f64 = 24.0;
    /// Notes longer than this are truncated before storage
    pub const MAX_NOTE_CHARS: usize = 500;
    /// Largest weight accepted from a chat message
    pub const MAX_WEIGHT: f64 = 2000.0;
    /// Largest rep count accepted from a chat message
    pub const MAX_REPS: u32 = 1000;
}

/// Time windows used by reporting and summaries
pub mod windows {
    /// Trailing window for consistency/heatmap reporting
    pub const CONSISTENCY_DAYS: i64 = 28;
    /// Number of recent sessions included in a coaching summary
    pub const SUMMARY_SESSIONS: usize = 5;
    /// Trailing window for muscle-group volume in a coaching summary
    pub const SUMMARY_VOLUME_DAYS: i64 = 14;
}
