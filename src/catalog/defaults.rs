// ABOUTME: Built-in exercise catalog and six-day Push/Pull/Legs plan
// ABOUTME: Used when no plan file is configured; Sunday is a rest day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Weekday;
use vyayamam_core::models::MuscleGroup::{
    self, Back, Biceps, Calves, Chest, Conditioning, Glutes, Hamstrings, Quads, Shoulders, Triceps,
};
use vyayamam_core::models::{Exercise, PlanDay, PlannedExercise, WorkoutPlan};

/// One catalog row plus its prescription on the day it belongs to
struct Seed {
    name: &'static str,
    aliases: &'static [&'static str],
    primary: MuscleGroup,
    secondary: &'static [MuscleGroup],
    bodyweight: bool,
    sets: u32,
    reps: &'static str,
}

const fn seed(
    name: &'static str,
    aliases: &'static [&'static str],
    primary: MuscleGroup,
    secondary: &'static [MuscleGroup],
    sets: u32,
    reps: &'static str,
) -> Seed {
    Seed {
        name,
        aliases,
        primary,
        secondary,
        bodyweight: false,
        sets,
        reps,
    }
}

const fn bodyweight(mut s: Seed) -> Seed {
    s.bodyweight = true;
    s
}

#[rustfmt::skip]
const PUSH_A: [Seed; 5] = [
    seed("Smith Machine Incline Press", &["smith incline", "incline smith press"], Chest, &[Shoulders, Triceps], 4, "8-12"),
    seed("Dumbbell Shoulder Press", &["db shoulder press", "seated dumbbell press"], Shoulders, &[], 3, "10-15"),
    seed("Cable Crossover", &["cable fly", "crossovers"], Chest, &[], 3, "12-15"),
    seed("Dumbbell Lateral Raises", &["db lat raises", "side raises"], Shoulders, &[], 3, "15-20"),
    seed("Cable Tricep Pushdowns", &["tricep pushdowns", "rope pushdowns"], Triceps, &[], 3, "12-15"),
];

#[rustfmt::skip]
const PULL_A: [Seed; 5] = [
    seed("Lat Pulldowns", &["lats pulldown"], Back, &[Biceps], 4, "8-12"),
    seed("Dumbbell Rows", &["db rows", "single arm row"], Back, &[], 3, "10-12"),
    bodyweight(seed("Rowing Machine", &["rower"], Conditioning, &[Back, Quads], 1, "5 min")),
    seed("Cable Face Pulls", &["face pulls"], Shoulders, &[Back], 3, "15-20"),
    seed("Dumbbell Bicep Curls", &["db curls", "bicep curls"], Biceps, &[], 3, "10-15"),
];

#[rustfmt::skip]
const LEGS_A: [Seed; 5] = [
    seed("Leg Press Machine", &["leg press"], Quads, &[Glutes, Hamstrings], 4, "10-15"),
    seed("Dumbbell RDLs", &["rdl", "romanian deadlift"], Hamstrings, &[Glutes], 3, "12-15"),
    seed("Kettlebell Goblet Squats", &["goblet squat", "kb squat"], Quads, &[Glutes], 3, "15-20"),
    seed("Leg Extensions", &["quad extensions"], Quads, &[], 3, "15-20"),
    seed("Calf Raises", &["standing calf raises"], Calves, &[], 4, "15-25"),
];

#[rustfmt::skip]
const PUSH_B: [Seed; 5] = [
    seed("Machine Chest Press", &["chest press machine"], Chest, &[], 4, "8-12"),
    seed("Seated Dumbbell Lateral Raises", &["seated lat raises"], Shoulders, &[], 3, "15-20"),
    seed("Smith Machine Shoulder Press", &["smith shoulder press"], Shoulders, &[], 3, "10-15"),
    seed("Incline Dumbbell Flyes", &["incline db fly"], Chest, &[], 3, "12-15"),
    seed("Overhead Cable Tricep Extensions", &["overhead tricep extension"], Triceps, &[], 3, "12-15"),
];

#[rustfmt::skip]
const PULL_B: [Seed; 5] = [
    bodyweight(seed("Pull-ups", &["pullups"], Back, &[Biceps], 4, "To Failure")),
    seed("Seated Cable Rows", &["cable row"], Back, &[], 3, "10-15"),
    seed("Dumbbell Pullovers", &["db pullover"], Back, &[Chest], 3, "12-15"),
    seed("Hammer Curls", &["db hammer curls"], Biceps, &[], 3, "10-15"),
    bodyweight(seed("Boxing Bag", &["heavy bag"], Conditioning, &[Shoulders], 1, "5 min")),
];

#[rustfmt::skip]
const LEGS_B: [Seed; 5] = [
    seed("Smith Machine Squats", &["smith squat"], Quads, &[Glutes], 4, "8-12"),
    seed("Dumbbell Walking Lunges", &["db lunges"], Quads, &[Glutes], 3, "20 steps"),
    seed("Hamstring Curls", &["leg curls"], Hamstrings, &[], 3, "15-20"),
    seed("Bulgarian Split Squats", &["bss", "split squats"], Quads, &[Glutes], 3, "10-12/leg"),
    seed("Kettlebell Swings", &["kb swings"], Glutes, &[Hamstrings, Conditioning], 4, "20"),
];

const DAYS: [(&str, Weekday, &[Seed]); 6] = [
    ("Push A", Weekday::Mon, &PUSH_A),
    ("Pull A", Weekday::Tue, &PULL_A),
    ("Legs A", Weekday::Wed, &LEGS_A),
    ("Push B", Weekday::Thu, &PUSH_B),
    ("Pull B", Weekday::Fri, &PULL_B),
    ("Legs B", Weekday::Sat, &LEGS_B),
];

impl Seed {
    fn exercise(&self) -> Exercise {
        let exercise = Exercise::new(self.name, self.primary)
            .with_aliases(self.aliases.iter().copied())
            .with_secondary(self.secondary);
        if self.bodyweight {
            exercise.bodyweight()
        } else {
            exercise
        }
    }

    fn planned(&self) -> PlannedExercise {
        PlannedExercise::new(self.name, self.sets, self.reps)
    }
}

/// Every exercise referenced by the built-in plan, in plan order
#[must_use]
pub fn default_exercises() -> Vec<Exercise> {
    DAYS.iter()
        .flat_map(|(_, _, seeds)| seeds.iter().map(Seed::exercise))
        .collect()
}

/// Six-day Push/Pull/Legs split, Monday to Saturday
#[must_use]
pub fn default_plan() -> WorkoutPlan {
    WorkoutPlan::new(
        DAYS.iter()
            .map(|(label, weekday, seeds)| PlanDay {
                label: (*label).to_owned(),
                weekday: Some(*weekday),
                exercises: seeds.iter().map(Seed::planned).collect(),
            })
            .collect(),
    )
}
