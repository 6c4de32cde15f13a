use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use pagestate_core::error::AppError;
use pagestate_core::state::{contains_ci, Entity};

use super::timer::WorkoutTimer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub exercise: String,
    pub reps: u32,
    pub weight_kg: f64,
    #[serde(default)]
    pub completed: bool,
}

impl ExerciseSet {
    pub fn new(exercise: &str, reps: u32, weight_kg: f64) -> Result<Self, AppError> {
        let exercise = exercise.trim();
        if exercise.is_empty() {
            return Err(AppError::validation("exercise name is required"));
        }
        if reps == 0 {
            return Err(AppError::validation("reps must be at least 1"));
        }
        if !weight_kg.is_finite() || weight_kg < 0.0 {
            return Err(AppError::validation("weight must be zero or more"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            exercise: exercise.to_string(),
            reps,
            weight_kg,
            completed: false,
        })
    }

    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight_kg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetFilter {
    Search,
    Status,
}

impl fmt::Display for SetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetFilter::Search => "search",
            SetFilter::Status => "status",
        })
    }
}

impl FromStr for SetFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(SetFilter::Search),
            "status" => Ok(SetFilter::Status),
            other => Err(format!("unknown set filter: {other}")),
        }
    }
}

impl Entity for ExerciseSet {
    type Id = Uuid;
    type FilterKey = SetFilter;

    const SEARCH: SetFilter = SetFilter::Search;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn matches(&self, key: SetFilter, value: &str) -> bool {
        match key {
            SetFilter::Search => contains_ci(&self.exercise, value),
            SetFilter::Status => match value.trim() {
                "done" => self.completed,
                "pending" => !self.completed,
                _ => true,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExtra {
    #[serde(default)]
    pub timer: WorkoutTimer,
}

/// Sum of reps x weight over completed sets.
pub fn total_volume(sets: &[ExerciseSet]) -> f64 {
    sets.iter().filter(|s| s.completed).map(ExerciseSet::volume).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(ExerciseSet::new("  ", 5, 20.0).is_err());
        assert!(ExerciseSet::new("Squat", 0, 20.0).is_err());
        assert!(ExerciseSet::new("Squat", 5, -2.5).is_err());
        assert!(ExerciseSet::new("Squat", 5, f64::NAN).is_err());
        let set = ExerciseSet::new(" Squat ", 5, 0.0).unwrap();
        assert_eq!(set.exercise, "Squat");
    }

    #[test]
    fn volume_counts_completed_sets_only() {
        let mut a = ExerciseSet::new("Bench", 5, 60.0).unwrap();
        let b = ExerciseSet::new("Bench", 5, 62.5).unwrap();
        a.completed = true;
        assert_eq!(total_volume(&[a.clone(), b]), 300.0);
        assert!(a.matches(SetFilter::Status, "done"));
        assert!(!a.matches(SetFilter::Status, "pending"));
    }
}
