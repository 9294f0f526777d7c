// ABOUTME: Exercise catalog holding canonical exercises, aliases, and muscle-group tags
// ABOUTME: Immutable after construction; shared read-only across every user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise Catalog
//!
//! The catalog is reference data: loaded once at process start and never
//! mutated. Names are unique after normalization, and no alias may collide
//! with another exercise's canonical name, so an exact match on a canonical
//! name always identifies a single entry.

mod defaults;

pub use defaults::{default_exercises, default_plan};

use crate::errors::{AppError, AppResult};
use crate::resolver::normalize;
use std::collections::{BTreeMap, HashMap};
use vyayamam_core::models::{Exercise, MuscleGroup};

/// Canonical exercises indexed by normalized name
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    index: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Build a catalog, rejecting blank or colliding names
    ///
    /// # Errors
    ///
    /// Returns an error if a name is blank, two exercises normalize to the
    /// same name, or an alias equals another exercise's name
    pub fn new(exercises: Vec<Exercise>) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(exercises.len());
        for (position, exercise) in exercises.iter().enumerate() {
            let key = normalize(&exercise.name);
            if key.is_empty() {
                return Err(AppError::invalid_input("Exercise name must not be blank"));
            }
            if index.insert(key, position).is_some() {
                return Err(AppError::invalid_input(format!(
                    "Duplicate exercise name in catalog: {}",
                    exercise.name
                )));
            }
        }

        for (position, exercise) in exercises.iter().enumerate() {
            for alias in &exercise.aliases {
                if let Some(&owner) = index.get(&normalize(alias)) {
                    if owner != position {
                        return Err(AppError::invalid_input(format!(
                            "Alias '{alias}' of {} collides with exercise {}",
                            exercise.name, exercises[owner].name
                        )));
                    }
                }
            }
        }

        Ok(Self { exercises, index })
    }

    /// Catalog of every exercise in the built-in plan
    #[must_use]
    pub fn default_catalog() -> Self {
        let exercises = default_exercises();
        let index = exercises
            .iter()
            .enumerate()
            .map(|(position, exercise)| (normalize(&exercise.name), position))
            .collect();
        Self { exercises, index }
    }

    /// Look up an exercise by canonical name, ignoring case and punctuation
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Exercise> {
        self.index
            .get(&normalize(name))
            .map(|&position| &self.exercises[position])
    }

    /// Look up an exercise by canonical name or by an alias
    ///
    /// An alias shared by several exercises identifies none of them.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Exercise> {
        if let Some(exercise) = self.get(name) {
            return Some(exercise);
        }
        let key = normalize(name);
        let mut owners = self
            .exercises
            .iter()
            .filter(|exercise| exercise.aliases.iter().any(|alias| normalize(alias) == key));
        let owner = owners.next()?;
        owners.next().is_none().then_some(owner)
    }

    /// Whether the catalog knows the exercise
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize(name))
    }

    /// Exercises in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    /// Number of exercises
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercises grouped by primary muscle group
    #[must_use]
    pub fn by_muscle_group(&self) -> BTreeMap<MuscleGroup, Vec<&Exercise>> {
        let mut groups: BTreeMap<MuscleGroup, Vec<&Exercise>> = BTreeMap::new();
        for exercise in &self.exercises {
            groups.entry(exercise.muscle_group).or_default().push(exercise);
        }
        groups
    }

    /// Primary and secondary groups for an exercise; empty when unknown
    #[must_use]
    pub fn groups_of(&self, name: &str) -> Vec<MuscleGroup> {
        self.get(name).map_or_else(Vec::new, |exercise| {
            let mut groups = vec![exercise.muscle_group];
            groups.extend(
                exercise
                    .secondary_groups
                    .iter()
                    .copied()
                    .filter(|group| *group != exercise.muscle_group),
            );
            groups
        })
    }
}

impl Default for ExerciseCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_consistent() {
        let catalog = ExerciseCatalog::default_catalog();
        assert_eq!(catalog.len(), 30);
        let rebuilt = ExerciseCatalog::new(catalog.iter().cloned().collect());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_every_planned_exercise_is_in_catalog() {
        let catalog = ExerciseCatalog::default_catalog();
        let plan = default_plan();
        assert_eq!(plan.days.len(), 6);
        for name in plan.exercise_names() {
            assert!(catalog.contains(name), "{name} missing from catalog");
        }
    }

    #[test]
    fn test_get_ignores_case_and_punctuation() {
        let catalog = ExerciseCatalog::default_catalog();
        assert_eq!(
            catalog.get("pull ups").map(|e| e.name.as_str()),
            Some("Pull-ups")
        );
        assert!(catalog.get("Bench Press").is_none());
    }

    #[test]
    fn test_lookup_accepts_aliases() {
        let catalog = ExerciseCatalog::default_catalog();
        assert_eq!(
            catalog.lookup("DB Curls").map(|e| e.name.as_str()),
            Some("Dumbbell Bicep Curls")
        );
        assert_eq!(
            catalog.lookup("cable tricep pushdowns").map(|e| e.name.as_str()),
            Some("Cable Tricep Pushdowns")
        );
        assert!(catalog.get("db curls").is_none());
        assert!(catalog.lookup("curls").is_none());
    }

    #[test]
    fn test_shared_alias_identifies_nothing() {
        let catalog = ExerciseCatalog::new(vec![
            Exercise::new("Cable Row", MuscleGroup::Back).with_aliases(["row"]),
            Exercise::new("Dumbbell Row", MuscleGroup::Back).with_aliases(["row"]),
        ])
        .unwrap();
        assert!(catalog.lookup("row").is_none());
        assert!(catalog.lookup("cable row").is_some());
    }

    #[test]
    fn test_alias_collision_rejected() {
        let exercises = vec![
            Exercise::new("Cable Row", MuscleGroup::Back),
            Exercise::new("Seated Row", MuscleGroup::Back).with_aliases(["cable row"]),
        ];
        assert!(ExerciseCatalog::new(exercises).is_err());
    }

    #[test]
    fn test_groups_of_includes_secondary() {
        let catalog = ExerciseCatalog::default_catalog();
        let groups = catalog.groups_of("Smith Machine Incline Press");
        assert_eq!(
            groups,
            vec![MuscleGroup::Chest, MuscleGroup::Shoulders, MuscleGroup::Triceps]
        );
        assert!(catalog.groups_of("Unknown").is_empty());
        assert!(catalog
            .by_muscle_group()
            .get(&MuscleGroup::Conditioning)
            .is_some_and(|list| list.len() == 2));
    }
}
