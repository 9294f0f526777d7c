// ABOUTME: Environment configuration for storage, timezone, display units, and the coaching model
// ABOUTME: Parses VYAYAMAM_* and LOCAL_LLM_* variables into a typed server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use crate::errors::{AppError, AppResult};
use crate::formatters::RenderOptions;
use crate::llm::OpenAiCompatibleConfig;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use vyayamam_intelligence::IntelligenceConfig;

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/vyayamam.db";

/// Default language-model timeout
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Unit weights are displayed in
///
/// Stored weights are plain numbers; the unit only affects rendering and
/// the prompt handed to the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms
    #[default]
    Kg,
    /// Pounds
    Lbs,
}

impl WeightUnit {
    /// Display suffix
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(Self::Kg),
            "lb" | "lbs" | "pounds" => Ok(Self::Lbs),
            other => Err(AppError::config(format!(
                "Invalid VYAYAMAM_WEIGHT_UNIT '{other}': expected kg or lbs"
            ))),
        }
    }
}

/// Language-model collaborator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// Whether `/ask` and session summaries call the model
    pub enabled: bool,
    /// Upper bound on one model call
    pub timeout: Duration,
    /// Endpoint and model
    pub provider: OpenAiCompatibleConfig,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            provider: OpenAiCompatibleConfig::default(),
        }
    }
}

/// Process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Storage location; `memory` for a process-local store
    pub database_url: String,
    /// Optional YAML plan replacing the built-in one
    pub plan_path: Option<PathBuf>,
    /// Offset from UTC used to decide a user's calendar day
    pub timezone_offset_minutes: i32,
    /// Display unit
    pub weight_unit: WeightUnit,
    /// Language-model settings
    pub llm: LlmSettings,
    /// Overload and grading tunables
    pub intelligence: IntelligenceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            plan_path: None,
            timezone_offset_minutes: 0,
            weight_unit: WeightUnit::Kg,
            llm: LlmSettings::default(),
            intelligence: IntelligenceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or if the
    /// intelligence tunables fail validation
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let timezone_offset_minutes: i32 = parse_env("VYAYAMAM_TIMEZONE_OFFSET_MINUTES", 0)?;
        if timezone_offset_minutes.abs() >= MINUTES_PER_DAY {
            return Err(AppError::config(format!(
                "VYAYAMAM_TIMEZONE_OFFSET_MINUTES must be within a day, got {timezone_offset_minutes}"
            )));
        }

        let intelligence = IntelligenceConfig::load()
            .map_err(|e| AppError::config(format!("Invalid intelligence configuration: {e}")))?;

        let config = Self {
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            plan_path: env::var("VYAYAMAM_PLAN_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            timezone_offset_minutes,
            weight_unit: parse_env("VYAYAMAM_WEIGHT_UNIT", WeightUnit::Kg)?,
            llm: LlmSettings {
                enabled: parse_env("VYAYAMAM_LLM_ENABLED", true)?,
                timeout: Duration::from_secs(parse_env(
                    "VYAYAMAM_LLM_TIMEOUT_SECS",
                    DEFAULT_LLM_TIMEOUT_SECS,
                )?),
                provider: OpenAiCompatibleConfig::from_env(),
            },
            intelligence,
        };

        info!(
            database = %config.database_url,
            plan = ?config.plan_path,
            offset_minutes = config.timezone_offset_minutes,
            unit = %config.weight_unit,
            llm.enabled = config.llm.enabled,
            llm.model = %config.llm.provider.default_model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Offset used to derive a user's local date
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Rendering options derived from the configuration
    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            weight_unit: self.weight_unit,
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid {key} value '{value}'"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_unit_parsing() {
        assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lb".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert!("stone".parse::<WeightUnit>().is_err());
    }

    #[test]
    fn test_offset_from_minutes() {
        let config = ServerConfig {
            timezone_offset_minutes: 330,
            ..ServerConfig::default()
        };
        assert_eq!(config.offset().local_minus_utc(), 330 * 60);
        assert_eq!(ServerConfig::default().offset().local_minus_utc(), 0);
    }
}
