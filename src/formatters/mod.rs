// ABOUTME: Rendering of typed replies into chat text for the transport layer
// ABOUTME: Holds display options and number formatting shared by every message template
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Reply Rendering
//!
//! The handler produces structured [`Reply`] values; this module is the only
//! place that turns them into text. A transport that wants a different
//! presentation can match on the reply itself and skip this module.
//!
//! ```rust
//! use vyayamam::formatters::{render_reply, RenderOptions};
//! use vyayamam::handler::{Reply, ResponsePayload};
//!
//! let text = render_reply(&Reply::Success(ResponsePayload::NoOpenSession), &RenderOptions::default());
//! assert!(text.contains("/start"));
//! ```

mod chat;

pub use chat::HELP_TEXT;

use crate::config::WeightUnit;
use crate::handler::Reply;

/// Display settings for rendered replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Unit appended to weights
    pub weight_unit: WeightUnit,
}

impl RenderOptions {
    /// Options with the given unit
    #[must_use]
    pub const fn new(weight_unit: WeightUnit) -> Self {
        Self { weight_unit }
    }

    /// A weight with its unit, e.g. `122.5kg`
    #[must_use]
    pub fn weight(&self, value: f64) -> String {
        format!("{}{}", format_number(value), self.weight_unit)
    }

    /// A set as `weight × reps`; zero load reads as bodyweight
    #[must_use]
    pub fn load(&self, weight: f64, reps: u32) -> String {
        if weight <= 0.0 {
            format!("bodyweight × {reps}")
        } else {
            format!("{} × {reps}", self.weight(weight))
        }
    }
}

/// Render a reply as chat text
#[must_use]
pub fn render_reply(reply: &Reply, options: &RenderOptions) -> String {
    match reply {
        Reply::Success(payload) => chat::render_payload(payload, options),
        Reply::Failure(failure) => chat::render_failure(failure),
    }
}

/// A number with at most one decimal and no trailing zero
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract().abs() < f64::EPSILON {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_trims_zeroes() {
        assert_eq!(format_number(120.0), "120");
        assert_eq!(format_number(122.5), "122.5");
        assert_eq!(format_number(152.000_001), "152");
        assert_eq!(format_number(133.333), "133.3");
    }

    #[test]
    fn test_load_reads_bodyweight_for_zero() {
        let options = RenderOptions::new(WeightUnit::Lbs);
        assert_eq!(options.load(0.0, 10), "bodyweight × 10");
        assert_eq!(options.load(45.0, 8), "45lbs × 8");
    }
}
