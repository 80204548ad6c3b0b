use crate::model::activity::Activity;
use crate::model::event_result::ApplyReport;
use crate::model::progress_state::ProgressState;

pub enum EngineCommand {
    Status,
    LogActivity(Activity),
    ConsultOracle(String),
    AddPenalty(String),
    ClearPenalties,
    TakeWeeklyRest,
}

#[derive(Debug)]
pub enum EngineResponse {
    Status(ProgressState),

    RewardApplied {
        report: ApplyReport,
        /// The oracle's line for the user, when the reward came from it.
        message: Option<String>,
    },

    PenaltiesChanged {
        active: Vec<String>,
        cleared: Vec<String>,
    },

    RestTaken,
}
