// ABOUTME: Chat message templates for every reply payload and failure
// ABOUTME: Produces short emoji-led texts suited to a messaging app
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_number, RenderOptions};
use crate::errors::{ParseError, ParseField, ResolutionError};
use crate::handler::{
    CatalogGroup, FailureReply, PlanListing, ResponsePayload, SessionEnded, SetLogged,
};
use chrono::Weekday;
use std::fmt::Write as _;
use vyayamam_core::models::{ReadinessLog, ReadinessMetric};
use vyayamam_intelligence::{Progression, Recommendation};

/// Command reference sent for `/help`
pub const HELP_TEXT: &str = "\
🏋️ Vyayamam commands

Log a set:
  <exercise> <weight> <reps> [rpe <1-10>] [notes <text>]
  e.g. smith incline 120 8 rpe 7

Session:
  /start - start a session for today's plan
  next - suggest the next planned exercise
  /end - finish, grade, and summarize the session

Readiness:
  /sleep <hours>
  /stress <1-10>
  /soreness <1-10>

Other:
  /list - today's plan and progress
  /list all - every exercise by muscle group
  /ask <question> - ask about your training
  /help - this message";

const SET_FORMAT: &str = "Format: <exercise> <weight> <reps> [rpe <1-10>] [notes <text>]";

pub(super) fn render_payload(payload: &ResponsePayload, options: &RenderOptions) -> String {
    match payload {
        ResponsePayload::SetLogged(logged) => set_logged(logged, options),
        ResponsePayload::SessionStarted { day_label, first } => {
            let mut text = day_label.as_deref().map_or_else(
                || "💪 Session started. Nothing is planned today, so log any exercise.".to_owned(),
                |label| format!("💪 Session started: {label}."),
            );
            if let Some(recommendation) = first {
                text.push_str("\n\n");
                text.push_str(&recommendation_text(recommendation, options));
            }
            text
        }
        ResponsePayload::SessionAlreadyOpen { day_label, .. } => format!(
            "A session is already open{}. Log sets, type next, or /end to finish.",
            day_label
                .as_deref()
                .map_or_else(String::new, |label| format!(" ({label})"))
        ),
        ResponsePayload::NextExercise {
            recommendation,
            session_open,
            ..
        } => {
            let text = recommendation_text(recommendation, options);
            if *session_open {
                text
            } else {
                format!("{text}\n\nNo session is open yet; logging a set will start one.")
            }
        }
        ResponsePayload::DayComplete { day_label } => format!(
            "🎉 That's everything planned for {day_label}. Type /end to finish and get your grade."
        ),
        ResponsePayload::NothingPlanned { session_open: true } => {
            "Nothing else is planned today. Log any exercise or type /end to finish.".to_owned()
        }
        ResponsePayload::NothingPlanned {
            session_open: false,
        } => "No session is open and nothing is planned today. Rest up, or type /start to train anyway."
            .to_owned(),
        ResponsePayload::SessionEnded(ended) => session_ended(ended, options),
        ResponsePayload::NoOpenSession => {
            "No session is open. Type /start to begin one.".to_owned()
        }
        ResponsePayload::Analysis(answer) => answer.text.clone(),
        ResponsePayload::PlanListing(listing) => plan_listing(listing),
        ResponsePayload::CatalogListing(groups) => catalog_listing(groups),
        ResponsePayload::ReadinessLogged { metric, value, log } => {
            readiness_logged(*metric, *value, log)
        }
        ResponsePayload::Help => HELP_TEXT.to_owned(),
    }
}

pub(super) fn render_failure(failure: &FailureReply) -> String {
    match failure {
        FailureReply::Parse(error) => parse_failure(error),
        FailureReply::Resolution(ResolutionError::NoMatch { query, suggestions }) => {
            let mut text = format!("❓ Could not find an exercise matching \"{query}\".");
            if !suggestions.is_empty() {
                let _ = write!(text, " Did you mean: {}?", suggestions.join(", "));
            }
            text.push_str("\nType /list all to see every exercise.");
            text
        }
        FailureReply::Resolution(ResolutionError::Ambiguous { query, candidates }) => format!(
            "❓ \"{query}\" could be {}. Please be more specific.",
            candidates.join(" or ")
        ),
        FailureReply::Unrecognized { text } => {
            format!("🤔 I didn't understand \"{text}\". Type /help for the list of commands.")
        }
        FailureReply::Storage {
            retryable: true, ..
        } => "⚠️ I couldn't save that right now. Nothing was recorded; please try again.".to_owned(),
        FailureReply::Storage {
            retryable: false, ..
        } => "⚠️ Something went wrong and nothing was recorded. Please try again later.".to_owned(),
    }
}

fn parse_failure(error: &ParseError) -> String {
    match error.field() {
        Some(ParseField::Value) => format!(
            "⚠️ {error}.\nUsage: /sleep <hours>, /stress <1-10>, /soreness <1-10>, /ask <question>"
        ),
        Some(ParseField::Exercise) => {
            format!("⚠️ Which exercise? Put its name before the numbers.\n{SET_FORMAT}")
        }
        _ => format!("⚠️ I couldn't log that: {error}.\n{SET_FORMAT}"),
    }
}

fn set_logged(logged: &SetLogged, options: &RenderOptions) -> String {
    let set = &logged.set;
    let mut text = String::new();
    if logged.session_opened {
        text.push_str("💪 New session started.\n");
    }

    let progress = logged.target_sets.map_or_else(
        || logged.set_index.to_string(),
        |target| format!("{}/{target}", logged.set_index),
    );
    let _ = write!(
        text,
        "✅ Set {progress} for {} logged: {}",
        set.exercise,
        options.load(set.weight, set.reps)
    );
    if let Some(rpe) = set.rpe {
        let _ = write!(text, " @ RPE {}", format_number(rpe));
    }
    text.push('.');
    if let Some(phrase) = &logged.matched_from {
        let _ = write!(text, " (from \"{phrase}\")");
    }

    if logged.new_record {
        text.push_str("\n🏆 New personal record!");
    } else {
        let record = &logged.personal_record;
        let _ = write!(text, "\nPR: {}", options.load(record.weight, record.reps));
    }
    if set.weight > 0.0 {
        let _ = write!(
            text,
            "\ne1RM {} (best {})",
            options.weight(logged.e1rm),
            options.weight(logged.best_e1rm)
        );
    }

    if logged.target_reached() {
        text.push_str("\nTarget sets done. Type next for the next exercise.");
    }
    text
}

fn recommendation_text(recommendation: &Recommendation, options: &RenderOptions) -> String {
    let mut text = format!("➡️ Next: {}", recommendation.exercise);
    match (recommendation.target_sets, &recommendation.rep_target) {
        (Some(sets), Some(reps)) => {
            let _ = write!(text, " ({sets} × {reps})");
        }
        (Some(sets), None) => {
            let _ = write!(text, " ({sets} sets)");
        }
        _ => {}
    }
    text.push('\n');

    let reps = recommendation.suggested_reps;
    let weight = recommendation.suggested_weight.unwrap_or_default();
    let advice = match recommendation.progression {
        Progression::IncreaseWeight => format!(
            "You hit your reps last time. Go up to {} for {reps} reps.",
            options.weight(weight)
        ),
        Progression::RepeatWeight => format!(
            "Stay at {} and aim for {reps} reps.",
            options.weight(weight)
        ),
        Progression::AddReps => format!("Aim for {reps} reps this time."),
        Progression::StartingWeight => format!(
            "No history yet. Start with {} for {reps} reps.",
            options.weight(weight)
        ),
        Progression::NoHistory => {
            format!("No history yet. Start conservatively and aim for {reps} reps.")
        }
    };
    text.push_str(&advice);

    if let Some(top) = &recommendation.last_top_set {
        let _ = write!(text, "\nLast time: {}", options.load(top.weight, top.reps));
    }
    if let Some(record) = &recommendation.personal_record {
        let _ = write!(text, "\nPR: {}", options.load(record.weight, record.reps));
    }
    if let Some(e1rm) = recommendation.best_e1rm.filter(|value| *value > 0.0) {
        let _ = write!(text, " · e1RM {}", options.weight(e1rm));
    }
    text
}

fn session_ended(ended: &SessionEnded, options: &RenderOptions) -> String {
    let report = &ended.report;
    let day = ended
        .day_label
        .as_deref()
        .map_or_else(String::new, |label| format!("{label}, "));
    let mut text = format!(
        "🏁 Session complete: grade {} ({day}{} min)",
        report.grade, ended.duration_minutes
    );

    let _ = write!(
        text,
        "\nSets: {} · Volume: {}",
        report.total_sets,
        options.weight(report.total_volume)
    );
    if report.planned_exercises > 0 {
        let _ = write!(
            text,
            " · Plan: {}/{} exercises",
            report.covered_exercises, report.planned_exercises
        );
    }
    if !ended.records.is_empty() {
        let _ = write!(text, "\n🏆 New PRs: {}", ended.records.join(", "));
    }

    text.push_str("\n\n");
    text.push_str(&ended.summary.text);
    text
}

fn plan_listing(listing: &PlanListing) -> String {
    let day = weekday_name(listing.weekday);
    let Some(label) = &listing.day_label else {
        return format!("📋 Nothing is planned for {day}. Rest day!");
    };

    let mut text = format!("📋 {label} ({day})");
    for (position, item) in listing.items.iter().enumerate() {
        let mark = if item.logged_sets >= item.target_sets as usize {
            "✅"
        } else if item.logged_sets > 0 {
            "🔸"
        } else {
            "⬜"
        };
        let _ = write!(
            text,
            "\n{}. {mark} {}: {}/{} sets × {}",
            position + 1,
            item.exercise,
            item.logged_sets,
            item.target_sets,
            item.target_reps
        );
    }
    text
}

fn catalog_listing(groups: &[CatalogGroup]) -> String {
    let mut text = String::from("📚 Exercises");
    for group in groups {
        let _ = write!(text, "\n\n{}", group.group);
        for exercise in &group.exercises {
            let _ = write!(text, "\n  • {exercise}");
        }
    }
    text
}

fn readiness_logged(metric: ReadinessMetric, value: f64, log: &ReadinessLog) -> String {
    let icon = match metric {
        ReadinessMetric::Sleep => "😴",
        ReadinessMetric::Stress => "🧠",
        ReadinessMetric::Soreness => "🦵",
    };
    let mut text = format!(
        "{icon} {} logged: {}{}.",
        capitalize(metric.command()),
        format_number(value),
        metric.unit()
    );

    let parts: Vec<String> = [
        ReadinessMetric::Sleep,
        ReadinessMetric::Stress,
        ReadinessMetric::Soreness,
    ]
    .into_iter()
    .filter_map(|m| {
        log.get(m)
            .map(|v| format!("{} {}{}", m.command(), format_number(v), m.unit()))
    })
    .collect();
    if parts.len() > 1 {
        let _ = write!(text, "\nToday: {}", parts.join(" · "));
    }
    text
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
