use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::progress_state::ProgressState;

/// Re-enable the weekly rest on the reset weekday.
///
/// Clears `weekly_rest_used` at most once per reset day: the stamp in
/// `last_weekly_reset` makes repeated loads on the same day a no-op.
/// Returns whether the state changed.
pub fn reconcile_weekly_reset(state: &mut ProgressState, today: NaiveDate, reset_day: Weekday) -> bool {
    if today.weekday() != reset_day || state.last_weekly_reset == today {
        return false;
    }

    state.weekly_rest_used = false;
    state.last_weekly_reset = today;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn used_state(stamp: NaiveDate) -> ProgressState {
        let mut state = ProgressState::new(stamp);
        state.weekly_rest_used = true;
        state
    }

    #[test]
    fn test_resets_on_monday() {
        // 2026-10-12 is a Monday
        let monday = date(2026, 10, 12);
        let mut state = used_state(date(2026, 10, 5));

        assert!(reconcile_weekly_reset(&mut state, monday, Weekday::Mon));
        assert!(!state.weekly_rest_used);
        assert_eq!(state.last_weekly_reset, monday);
    }

    #[test]
    fn test_idempotent_same_day() {
        let monday = date(2026, 10, 12);
        let mut state = used_state(date(2026, 10, 5));
        reconcile_weekly_reset(&mut state, monday, Weekday::Mon);

        state.weekly_rest_used = true;
        assert!(!reconcile_weekly_reset(&mut state, monday, Weekday::Mon));
        assert!(state.weekly_rest_used);
    }

    #[test]
    fn test_next_reset_day_clears_again() {
        let mut state = used_state(date(2026, 10, 12));
        assert!(reconcile_weekly_reset(&mut state, date(2026, 10, 19), Weekday::Mon));
        assert!(!state.weekly_rest_used);
    }

    #[test]
    fn test_other_weekdays_are_noop() {
        let mut state = used_state(date(2026, 10, 5));
        // Saturday
        assert!(!reconcile_weekly_reset(&mut state, date(2026, 10, 17), Weekday::Mon));
        assert!(state.weekly_rest_used);
        assert_eq!(state.last_weekly_reset, date(2026, 10, 5));
    }

    #[test]
    fn test_custom_reset_day() {
        let mut state = used_state(date(2026, 10, 10));
        assert!(reconcile_weekly_reset(&mut state, date(2026, 10, 18), Weekday::Sun));
        assert!(!state.weekly_rest_used);
    }
}
