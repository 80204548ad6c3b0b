use crate::error::Blocked;
use crate::model::event_result::ApplyReport;
use crate::model::progress_state::{ProgressState, StatKey, XP_PER_LEVEL};

/// Apply an XP delta and optional stat point to the state.
///
/// Pure transition: persisting the result is the session's job.
/// A level-up is single step: crossing the threshold resets experience to
/// zero and any overflow is dropped, so a delta of 250 still yields exactly
/// one level.
pub fn apply_reward(
    state: &mut ProgressState,
    xp_delta: i32,
    stat: Option<StatKey>,
) -> Result<ApplyReport, Blocked> {
    if state.is_blocked() {
        return Err(Blocked);
    }

    let level_before = state.level;
    let rank_before = state.rank;

    state.experience = state.experience.saturating_add(xp_delta).max(0);

    if let Some(key) = stat {
        let value = state.stats.entry(key).or_insert(0);
        *value = value.saturating_add(1);
    }

    if state.experience >= XP_PER_LEVEL {
        state.level = state.level.saturating_add(1);
        state.experience = 0;
    }

    state.rank = state.derived_rank();

    Ok(ApplyReport {
        xp_delta,
        stat,
        level_before,
        level_after: state.level,
        rank_before,
        rank_after: state.rank,
        experience_after: state.experience,
    })
}
