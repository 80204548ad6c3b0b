use serde::{Deserialize, Serialize};

use crate::model::progress_state::{Rank, StatKey};

/// What a single reward did to the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub xp_delta: i32,
    pub stat: Option<StatKey>,
    pub level_before: u32,
    pub level_after: u32,
    pub rank_before: Rank,
    pub rank_after: Rank,
    pub experience_after: i32,
}

impl ApplyReport {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    pub fn rank_changed(&self) -> bool {
        self.rank_after != self.rank_before
    }
}
