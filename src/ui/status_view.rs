use std::fmt::Write;

use crate::engine::protocol::EngineResponse;
use crate::model::activity::Activity;
use crate::model::event_result::ApplyReport;
use crate::model::progress_state::{ComboCategory, ProgressState, StatKey, XP_PER_LEVEL};

/// Stat bars saturate here, same as the old radar chart's axis.
const STAT_AXIS_MAX: u32 = 30;
const XP_BAR_WIDTH: usize = 20;

pub fn render_status(state: &ProgressState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== SISTEMA: MONARCA ===");
    let _ = writeln!(
        out,
        "RANK {} | LVL {} | XP {:>2}/{} {}",
        state.rank,
        state.level,
        state.experience,
        XP_PER_LEVEL,
        xp_bar(state.experience)
    );

    let total = state.stat_total();
    match state.rank.next() {
        Some((next, needed)) => {
            let _ = writeln!(out, "\nSTATS (total {}, rank {} at {})", total, next, needed);
        }
        None => {
            let _ = writeln!(out, "\nSTATS (total {}, max rank)", total);
        }
    }
    for key in StatKey::ALL {
        let value = state.stat(key);
        let _ = writeln!(out, "  {} {:>3} {}", key, value, stat_bar(value));
    }

    let _ = writeln!(
        out,
        "\nCOMBOS  {} {} | {} {}",
        ComboCategory::Medical,
        state.combo(ComboCategory::Medical),
        ComboCategory::Gym,
        state.combo(ComboCategory::Gym)
    );

    let rest = if state.weekly_rest_used { "used" } else { "available" };
    let _ = writeln!(
        out,
        "WEEKLY REST {} (last reset {})",
        rest, state.last_weekly_reset
    );

    out.push('\n');
    out.push_str(&render_penalties(&state.penalties_active));
    out.push('\n');
    out.push_str(&render_activities());
    out
}

/// Preset activities available to `log`.
pub fn render_activities() -> String {
    let mut out = String::from("ACTIVITIES\n");
    for activity in Activity::ALL {
        let _ = writeln!(
            out,
            "  {:<20} +{} XP, {} +1 ({})",
            activity.label(),
            activity.xp(),
            activity.stat(),
            activity.category()
        );
    }
    out
}

pub fn render_penalties(penalties: &[String]) -> String {
    if penalties.is_empty() {
        return "PENALTIES: none. The path is clear, Monarch.\n".to_string();
    }

    let mut out = format!("PENALTIES ({}) - XP is blocked until paid:\n", penalties.len());
    for penalty in penalties {
        let _ = writeln!(out, "  x {}", penalty);
    }
    out
}

pub fn render_report(report: &ApplyReport, message: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(message) = message {
        let _ = writeln!(out, "[ORACLE] {}", message);
    }

    let stat = report
        .stat
        .map(|s| format!(", {} +1", s))
        .unwrap_or_default();
    let _ = writeln!(out, "+{} XP{}", report.xp_delta, stat);

    if report.leveled_up() {
        let _ = writeln!(out, "LEVEL UP! {} -> {}", report.level_before, report.level_after);
    } else {
        let _ = writeln!(out, "XP {}/{}", report.experience_after, XP_PER_LEVEL);
    }

    if report.rank_changed() {
        let _ = writeln!(out, "RANK {} -> {}", report.rank_before, report.rank_after);
    }
    out
}

pub fn render_response(response: &EngineResponse) -> String {
    match response {
        EngineResponse::Status(state) => render_status(state),
        EngineResponse::RewardApplied { report, message } => {
            render_report(report, message.as_deref())
        }
        EngineResponse::PenaltiesChanged { active, cleared } => {
            let mut out = String::new();
            if !cleared.is_empty() {
                let _ = writeln!(out, "Paid {} penalt{}.", cleared.len(), if cleared.len() == 1 { "y" } else { "ies" });
            }
            out.push_str(&render_penalties(active));
            out
        }
        EngineResponse::RestTaken => "Weekly rest taken. Recover well.\n".to_string(),
    }
}

fn xp_bar(experience: i32) -> String {
    let filled = (experience.clamp(0, XP_PER_LEVEL) as usize * XP_BAR_WIDTH) / XP_PER_LEVEL as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(XP_BAR_WIDTH - filled))
}

fn stat_bar(value: u32) -> String {
    "|".repeat(value.min(STAT_AXIS_MAX) as usize)
}
