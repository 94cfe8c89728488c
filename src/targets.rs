use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::catalog::MacroProfile;

/// Query inputs that fail validation are rejected before any matching
/// runs; this is the only error kind the engine surfaces to callers.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    /// `top_n` must be at least 1; a missing count is never defaulted here.
    InvalidTopN(usize),
    /// The daily targets are split across meals; zero meals is undefined.
    InvalidMealCount(u32),
    /// A target macro was negative or not a finite number.
    InvalidMacro { name: &'static str, value: f32 },
    /// A deviation weight was negative or not a finite number.
    InvalidWeight { name: &'static str, value: f32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidTopN(value) => {
                write!(f, "top_n must be at least 1, got {}", value)
            }
            ValidationError::InvalidMealCount(value) => {
                write!(f, "meal count must be at least 1, got {}", value)
            }
            ValidationError::InvalidMacro { name, value } => {
                write!(f, "target macro '{}' must be non-negative, got {}", name, value)
            }
            ValidationError::InvalidWeight { name, value } => {
                write!(f, "weight '{}' must be non-negative, got {}", name, value)
            }
        }
    }
}

impl Error for ValidationError {}

/// Per-meal macro targets. Construction validates, so a `TargetProfile`
/// always holds four finite, non-negative values.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TargetProfile {
    pub macros: MacroProfile,
}

impl TargetProfile {
    pub fn new(macros: MacroProfile) -> Result<Self, ValidationError> {
        for (name, value) in [
            ("calories", macros.calories),
            ("protein", macros.protein),
            ("carbs", macros.carbs),
            ("fats", macros.fats),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidMacro { name, value });
            }
        }
        Ok(Self { macros })
    }

    /// Splits daily macro totals evenly across `meal_count` meals.
    pub fn per_meal(daily: &MacroProfile, meal_count: u32) -> Result<Self, ValidationError> {
        if meal_count == 0 {
            return Err(ValidationError::InvalidMealCount(meal_count));
        }
        let meals = meal_count as f32;
        Self::new(MacroProfile {
            calories: daily.calories / meals,
            protein: daily.protein / meals,
            carbs: daily.carbs / meals,
            fats: daily.fats / meals,
        })
    }
}

/// Per-macro multipliers for the weighted-deviation strategy.
///
/// The defaults follow the observed search configuration: fat deviation
/// counts double, protein deviation counts half. Whether protein or fats
/// should be the de-prioritized macro is an open product question, which
/// is why the whole vector is configuration rather than constants at the
/// scoring site.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct MacroWeights {
    pub calories: f32,
    pub protein: f32,
    pub carbs: f32,
    pub fats: f32,
}

impl Default for MacroWeights {
    fn default() -> Self {
        Self {
            calories: 1.0,
            protein: 0.5,
            carbs: 1.0,
            fats: 2.0,
        }
    }
}

impl MacroWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}
