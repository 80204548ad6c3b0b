use chrono::{NaiveDate, Weekday};
use tracing::{debug, info};

use crate::engine::apply_reward::apply_reward;
use crate::engine::llm_client::TextGenerator;
use crate::engine::oracle::classify_report;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::store::JsonFileStore;
use crate::engine::weekly_reset::reconcile_weekly_reset;
use crate::error::{Blocked, Result, SystemError};
use crate::model::activity::Activity;
use crate::model::event_result::ApplyReport;
use crate::model::progress_state::{ProgressState, StatKey};

/// One user session: `open` loads, each operation mutates and writes through.
pub struct Session {
    store: JsonFileStore,
    state: ProgressState,
    oracle: Option<Box<dyn TextGenerator>>,
}

impl Session {
    /// Load the save (or start a fresh profile), apply the weekly reset and
    /// re-derive the rank. A reset is persisted immediately; a fresh profile
    /// is only written on its first mutation.
    pub fn open(store: JsonFileStore, today: NaiveDate, reset_day: Weekday) -> Result<Self> {
        let (mut state, existed) = match store.load()? {
            Some(state) => (state, true),
            None => {
                info!(path = %store.path().display(), "starting a fresh profile");
                (ProgressState::new(today), false)
            }
        };

        let mut dirty = reconcile_weekly_reset(&mut state, today, reset_day);
        if dirty {
            info!(%today, "weekly rest re-enabled");
        }

        let derived = state.derived_rank();
        if state.rank != derived {
            debug!(stored = %state.rank, %derived, "stored rank out of date");
            state.rank = derived;
            dirty = true;
        }

        if existed && dirty {
            store.save(&state)?;
        }

        Ok(Self {
            store,
            state,
            oracle: None,
        })
    }

    pub fn with_oracle(mut self, oracle: Option<Box<dyn TextGenerator>>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }

    /// Apply a reward and flush. On a storage error the in-memory state
    /// keeps the change but the file still holds the previous document.
    pub fn apply_reward(&mut self, xp_delta: i32, stat: Option<StatKey>) -> Result<ApplyReport> {
        let report = apply_reward(&mut self.state, xp_delta, stat)?;
        self.store.save(&self.state)?;
        announce(&report);
        Ok(report)
    }

    /// Preset activity: fixed reward, plus one on its combo counter.
    pub fn log_activity(&mut self, activity: Activity) -> Result<ApplyReport> {
        let report = apply_reward(&mut self.state, activity.xp(), Some(activity.stat()))?;
        *self
            .state
            .combo_counters
            .entry(activity.category())
            .or_insert(0) += 1;
        self.store.save(&self.state)?;

        info!(activity = ?activity, combo = self.state.combo(activity.category()), "activity logged");
        announce(&report);
        Ok(report)
    }

    /// Classify a report and apply the reward. Outstanding penalties are
    /// checked first so a blocked user never waits on the network.
    pub fn consult_oracle(&mut self, narrative: &str) -> Result<(ApplyReport, String)> {
        if self.state.is_blocked() {
            return Err(Blocked.into());
        }

        let reward = classify_report(self.oracle.as_deref(), narrative)?;
        info!(xp = reward.xp, stat = %reward.stat, "oracle verdict");

        let report = self.apply_reward(reward.xp, Some(reward.stat))?;
        Ok((report, reward.message))
    }

    pub fn add_penalty(&mut self, description: &str) -> Result<&[String]> {
        let description = description.trim();
        if description.is_empty() {
            return Err(SystemError::InvalidPenalty);
        }

        self.state.penalties_active.push(description.to_string());
        self.store.save(&self.state)?;
        info!(penalty = description, active = self.state.penalties_active.len(), "penalty added");
        Ok(&self.state.penalties_active)
    }

    /// Mark every outstanding penalty as paid. Returns what was cleared.
    pub fn clear_penalties(&mut self) -> Result<Vec<String>> {
        let cleared = std::mem::take(&mut self.state.penalties_active);
        if !cleared.is_empty() {
            self.store.save(&self.state)?;
            info!(count = cleared.len(), "penalties cleared");
        }
        Ok(cleared)
    }

    pub fn take_weekly_rest(&mut self) -> Result<()> {
        if self.state.weekly_rest_used {
            return Err(SystemError::RestAlreadyUsed);
        }

        self.state.weekly_rest_used = true;
        self.store.save(&self.state)?;
        info!("weekly rest taken");
        Ok(())
    }

    pub fn handle(&mut self, command: EngineCommand) -> Result<EngineResponse> {
        match command {
            EngineCommand::Status => Ok(EngineResponse::Status(self.state.clone())),

            EngineCommand::LogActivity(activity) => {
                let report = self.log_activity(activity)?;
                Ok(EngineResponse::RewardApplied {
                    report,
                    message: None,
                })
            }

            EngineCommand::ConsultOracle(narrative) => {
                let (report, message) = self.consult_oracle(&narrative)?;
                Ok(EngineResponse::RewardApplied {
                    report,
                    message: Some(message),
                })
            }

            EngineCommand::AddPenalty(description) => {
                let active = self.add_penalty(&description)?.to_vec();
                Ok(EngineResponse::PenaltiesChanged {
                    active,
                    cleared: Vec::new(),
                })
            }

            EngineCommand::ClearPenalties => {
                let cleared = self.clear_penalties()?;
                Ok(EngineResponse::PenaltiesChanged {
                    active: Vec::new(),
                    cleared,
                })
            }

            EngineCommand::TakeWeeklyRest => {
                self.take_weekly_rest()?;
                Ok(EngineResponse::RestTaken)
            }
        }
    }
}

fn announce(report: &ApplyReport) {
    if report.leveled_up() {
        info!(level = report.level_after, "level up");
    }
    if report.rank_changed() {
        info!(from = %report.rank_before, to = %report.rank_after, "rank changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SAVE_FILE_NAME;
    use crate::model::progress_state::{ComboCategory, Rank};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    fn open_in(dir: &tempfile::TempDir) -> Session {
        let store = JsonFileStore::new(dir.path().join(SAVE_FILE_NAME));
        Session::open(store, monday(), Weekday::Mon).unwrap()
    }

    #[test]
    fn test_fresh_profile_is_not_written_until_mutated() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);
        assert!(!session.store().path().exists());

        session.log_activity(Activity::Workout).unwrap();
        assert!(session.store().path().exists());
    }

    #[test]
    fn test_activity_bumps_combo_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);

        session.log_activity(Activity::Ward).unwrap();
        session.log_activity(Activity::Shift).unwrap();

        let state = session.store().load().unwrap().unwrap();
        assert_eq!(state.experience, 60);
        assert_eq!(state.stat(StatKey::Sen), 11);
        assert_eq!(state.stat(StatKey::Vit), 11);
        assert_eq!(state.combo(ComboCategory::Medical), 2);
        assert_eq!(state.combo(ComboCategory::Gym), 0);
    }

    #[test]
    fn test_blocked_activity_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);
        session.add_penalty("missed morning run").unwrap();
        let before = session.state().clone();

        let err = session.log_activity(Activity::Workout).unwrap_err();
        assert!(matches!(err, SystemError::Blocked(_)));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_penalty_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);

        assert!(matches!(session.add_penalty("  "), Err(SystemError::InvalidPenalty)));
        session.add_penalty("no sleep").unwrap();
        let active = session.add_penalty("junk food").unwrap().to_vec();
        assert_eq!(active, vec!["no sleep".to_string(), "junk food".to_string()]);

        let cleared = session.clear_penalties().unwrap();
        assert_eq!(cleared.len(), 2);
        assert!(!session.state().is_blocked());
        assert!(session.store().load().unwrap().unwrap().penalties_active.is_empty());

        session.log_activity(Activity::Workout).unwrap();
    }

    #[test]
    fn test_weekly_rest_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);

        session.take_weekly_rest().unwrap();
        assert!(matches!(session.take_weekly_rest(), Err(SystemError::RestAlreadyUsed)));
        assert!(session.store().load().unwrap().unwrap().weekly_rest_used);
    }

    #[test]
    fn test_open_normalises_stale_rank() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join(SAVE_FILE_NAME));
        let mut state = ProgressState::new(monday());
        state.stats.insert(StatKey::Int, 70);
        state.rank = Rank::S;
        store.save(&state).unwrap();

        let session = Session::open(store, monday(), Weekday::Mon).unwrap();
        assert_eq!(session.state().rank, Rank::D);
        assert_eq!(session.store().load().unwrap().unwrap().rank, Rank::D);
    }

    #[test]
    fn test_handle_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(&dir);

        match session.handle(EngineCommand::LogActivity(Activity::Shift)).unwrap() {
            EngineResponse::RewardApplied { report, message } => {
                assert_eq!(report.experience_after, 40);
                assert!(message.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }

        match session.handle(EngineCommand::ConsultOracle("a long day".into())) {
            Err(SystemError::Oracle(crate::error::OracleError::NoServiceConfigured)) => {}
            other => panic!("unexpected {:?}", other),
        }

        match session.handle(EngineCommand::Status).unwrap() {
            EngineResponse::Status(state) => assert_eq!(state.experience, 40),
            other => panic!("unexpected {:?}", other),
        }
    }
}
