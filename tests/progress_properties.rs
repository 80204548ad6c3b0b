use chrono::NaiveDate;
use proptest::prelude::*;

use monarch_system::engine::apply_reward::apply_reward;
use monarch_system::model::progress_state::{ProgressState, Rank, StatKey, RANK_THRESHOLDS};
use monarch_system::Blocked;

fn stat_key() -> impl Strategy<Value = StatKey> {
    prop::sample::select(StatKey::ALL.to_vec())
}

fn state_with(experience: i32, stats: [u32; 5]) -> ProgressState {
    let mut state = ProgressState::new(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
    state.experience = experience;
    for (key, value) in StatKey::ALL.into_iter().zip(stats) {
        state.stats.insert(key, value);
    }
    state.rank = state.derived_rank();
    state
}

proptest! {
    #[test]
    fn penalties_freeze_progress(
        experience in 0i32..100,
        delta in 0i32..500,
        stats in prop::array::uniform5(0u32..200),
        stat in prop::option::of(stat_key()),
        penalties in prop::collection::vec("[a-z ]{1,20}", 1..4),
    ) {
        let mut state = state_with(experience, stats);
        state.penalties_active = penalties;
        let before = state.clone();

        prop_assert_eq!(apply_reward(&mut state, delta, stat), Err(Blocked));
        prop_assert_eq!(state, before);
    }

    #[test]
    fn single_step_level_up(
        experience in 0i32..100,
        delta in 0i32..100,
        stat in prop::option::of(stat_key()),
    ) {
        let mut state = state_with(experience, [10; 5]);
        let report = apply_reward(&mut state, delta, stat).unwrap();

        if experience + delta < 100 {
            prop_assert_eq!(state.level, 1);
            prop_assert_eq!(state.experience, experience + delta);
            prop_assert!(!report.leveled_up());
        } else {
            prop_assert_eq!(state.level, 2);
            prop_assert_eq!(state.experience, 0);
        }
        prop_assert!((0..100).contains(&state.experience));
    }

    #[test]
    fn rank_is_a_function_of_stat_total(stats in prop::array::uniform5(0u32..200)) {
        let total: u32 = stats.iter().sum();
        let rank = Rank::for_stat_total(total);

        // Highest rank whose threshold is at or below the total.
        let expected = RANK_THRESHOLDS
            .iter()
            .filter(|(_, t)| *t <= total)
            .map(|(r, _)| *r)
            .max()
            .unwrap();
        prop_assert_eq!(rank, expected);

        let mut state = state_with(0, stats);
        apply_reward(&mut state, 0, None).unwrap();
        prop_assert_eq!(state.rank, rank);
    }
}
