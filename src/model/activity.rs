use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::progress_state::{ComboCategory, StatKey};

/// Preset activities with fixed rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Ward or maternity rotation.
    Ward,
    /// 12 hour on-call shift.
    Shift,
    /// Completed gym session.
    Workout,
}

impl Activity {
    pub const ALL: [Activity; 3] = [Activity::Ward, Activity::Shift, Activity::Workout];

    pub fn xp(&self) -> i32 {
        match self {
            Activity::Ward => 20,
            Activity::Shift => 40,
            Activity::Workout => 30,
        }
    }

    pub fn stat(&self) -> StatKey {
        match self {
            Activity::Ward => StatKey::Sen,
            Activity::Shift => StatKey::Vit,
            Activity::Workout => StatKey::Str,
        }
    }

    pub fn category(&self) -> ComboCategory {
        match self {
            Activity::Ward | Activity::Shift => ComboCategory::Medical,
            Activity::Workout => ComboCategory::Gym,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Activity::Ward => "Ward / maternity",
            Activity::Shift => "On-call shift (12h)",
            Activity::Workout => "Workout",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
