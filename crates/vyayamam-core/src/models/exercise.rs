// ABOUTME: Exercise reference data with aliases, muscle-group tags, and load unit
// ABOUTME: Immutable catalog entries loaded once at process start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary muscle group an exercise is tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    /// Pectorals
    Chest,
    /// Lats, traps, rhomboids
    Back,
    /// Deltoids
    Shoulders,
    /// Elbow flexors
    Biceps,
    /// Elbow extensors
    Triceps,
    /// Quadriceps
    Quads,
    /// Hamstrings
    Hamstrings,
    /// Gluteals
    Glutes,
    /// Calves
    Calves,
    /// Abdominals and trunk
    Core,
    /// Conditioning work with no single target
    Conditioning,
}

impl MuscleGroup {
    /// All groups in display order
    pub const ALL: [Self; 11] = [
        Self::Chest,
        Self::Back,
        Self::Shoulders,
        Self::Biceps,
        Self::Triceps,
        Self::Quads,
        Self::Hamstrings,
        Self::Glutes,
        Self::Calves,
        Self::Core,
        Self::Conditioning,
    ];

    /// Convert to storage string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Shoulders => "shoulders",
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Quads => "quads",
            Self::Hamstrings => "hamstrings",
            Self::Glutes => "glutes",
            Self::Calves => "calves",
            Self::Core => "core",
            Self::Conditioning => "conditioning",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Chest => "Chest",
            Self::Back => "Back",
            Self::Shoulders => "Shoulders",
            Self::Biceps => "Biceps",
            Self::Triceps => "Triceps",
            Self::Quads => "Quads",
            Self::Hamstrings => "Hamstrings",
            Self::Glutes => "Glutes",
            Self::Calves => "Calves",
            Self::Core => "Core",
            Self::Conditioning => "Conditioning",
        }
    }

    /// Parse from storage string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How load is expressed for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseUnit {
    /// External load; progression adds weight
    #[default]
    Weight,
    /// Bodyweight or machine-free work; progression adds reps
    Bodyweight,
}

/// A canonical exercise in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Canonical name, unique across the catalog
    pub name: String,
    /// Alternative spellings users type
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Primary muscle group
    pub muscle_group: MuscleGroup,
    /// Additional groups worked
    #[serde(default)]
    pub secondary_groups: Vec<MuscleGroup>,
    /// Load unit
    #[serde(default)]
    pub unit: ExerciseUnit,
}

impl Exercise {
    /// Create a weight-based exercise with no aliases
    #[must_use]
    pub fn new(name: impl Into<String>, muscle_group: MuscleGroup) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            muscle_group,
            secondary_groups: Vec::new(),
            unit: ExerciseUnit::Weight,
        }
    }

    /// Add aliases
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Add secondary muscle groups
    #[must_use]
    pub fn with_secondary(mut self, groups: &[MuscleGroup]) -> Self {
        self.secondary_groups.extend_from_slice(groups);
        self
    }

    /// Mark as bodyweight
    #[must_use]
    pub const fn bodyweight(mut self) -> Self {
        self.unit = ExerciseUnit::Bodyweight;
        self
    }

    /// Whether the exercise works the given group, primary or secondary
    #[must_use]
    pub fn works(&self, group: MuscleGroup) -> bool {
        self.muscle_group == group || self.secondary_groups.contains(&group)
    }
}
