use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Experience needed to complete one level.
pub const XP_PER_LEVEL: i32 = 100;

/// Every stat starts here.
pub const BASE_STAT_VALUE: u32 = 10;

/// Highest rank first; the first threshold at or below the stat total wins.
pub const RANK_THRESHOLDS: [(Rank, u32); 6] = [
    (Rank::S, 550),
    (Rank::A, 400),
    (Rank::B, 275),
    (Rank::C, 175),
    (Rank::D, 100),
    (Rank::E, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatKey {
    Str,
    Int,
    Sen,
    Vit,
    Est,
}

impl StatKey {
    pub const ALL: [StatKey; 5] = [
        StatKey::Str,
        StatKey::Int,
        StatKey::Sen,
        StatKey::Vit,
        StatKey::Est,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKey::Str => "STR",
            StatKey::Int => "INT",
            StatKey::Sen => "SEN",
            StatKey::Vit => "VIT",
            StatKey::Est => "EST",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StatKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown stat '{}'", s))
    }
}

/// Coarse tier derived from the stat total. Ordered E < D < C < B < A < S.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn for_stat_total(total: u32) -> Rank {
        RANK_THRESHOLDS
            .iter()
            .find(|(_, threshold)| total >= *threshold)
            .map(|(rank, _)| *rank)
            .unwrap_or(Rank::E)
    }

    /// Next rank up and the stat total it needs, `None` at S.
    pub fn next(&self) -> Option<(Rank, u32)> {
        RANK_THRESHOLDS
            .iter()
            .rev()
            .find(|(rank, _)| rank > self)
            .copied()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComboCategory {
    #[serde(rename = "med")]
    Medical,
    #[serde(rename = "gym")]
    Gym,
}

impl fmt::Display for ComboCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboCategory::Medical => f.write_str("med"),
            ComboCategory::Gym => f.write_str("gym"),
        }
    }
}

/// The whole persisted document. Field names on disk are kept compatible
/// with existing `sistema_data.json` saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(rename = "lvl", deserialize_with = "whole_number")]
    pub level: u32,

    /// Older saves may hold `25.0` here.
    #[serde(rename = "xp", deserialize_with = "whole_number")]
    pub experience: i32,

    /// Derived from `stats`; stored for readers of the raw file.
    pub rank: Rank,

    pub stats: BTreeMap<StatKey, u32>,

    #[serde(rename = "combos")]
    pub combo_counters: BTreeMap<ComboCategory, u32>,

    #[serde(rename = "descanso_usado")]
    pub weekly_rest_used: bool,

    #[serde(rename = "penalidades")]
    pub penalties_active: Vec<String>,

    #[serde(rename = "reset_semanal")]
    pub last_weekly_reset: NaiveDate,
}

impl ProgressState {
    /// Fresh profile. `today` seeds the weekly reset stamp so a brand new
    /// profile does not immediately reset on its first reset weekday load.
    pub fn new(today: NaiveDate) -> Self {
        let stats = StatKey::ALL
            .into_iter()
            .map(|key| (key, BASE_STAT_VALUE))
            .collect();

        let mut combo_counters = BTreeMap::new();
        combo_counters.insert(ComboCategory::Medical, 0);
        combo_counters.insert(ComboCategory::Gym, 0);

        Self {
            level: 1,
            experience: 0,
            rank: Rank::E,
            stats,
            combo_counters,
            weekly_rest_used: false,
            penalties_active: Vec::new(),
            last_weekly_reset: today,
        }
    }

    pub fn stat(&self, key: StatKey) -> u32 {
        self.stats.get(&key).copied().unwrap_or(0)
    }

    /// Saturates instead of overflowing on hand-edited saves.
    pub fn stat_total(&self) -> u32 {
        self.stats
            .values()
            .fold(0u32, |total, value| total.saturating_add(*value))
    }

    pub fn combo(&self, category: ComboCategory) -> u32 {
        self.combo_counters.get(&category).copied().unwrap_or(0)
    }

    pub fn is_blocked(&self) -> bool {
        !self.penalties_active.is_empty()
    }

    /// Rank implied by the current stats, regardless of the stored value.
    pub fn derived_rank(&self) -> Rank {
        Rank::for_stat_total(self.stat_total())
    }
}

/// Accepts `7` and `7.0`, rejects `7.5` and anything out of range for `T`.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let whole = number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| D::Error::custom(format!("expected a whole number, got {}", number)))?;
    T::try_from(whole).map_err(|_| D::Error::custom(format!("number out of range: {}", whole)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    #[test]
    fn test_rank_table_boundaries() {
        let sums = [0, 99, 100, 174, 175, 274, 275, 399, 400, 549, 550, 551];
        let expected = [
            Rank::E,
            Rank::E,
            Rank::D,
            Rank::D,
            Rank::C,
            Rank::C,
            Rank::B,
            Rank::B,
            Rank::A,
            Rank::A,
            Rank::S,
            Rank::S,
        ];
        for (sum, rank) in sums.iter().zip(expected.iter()) {
            assert_eq!(Rank::for_stat_total(*sum), *rank, "sum {}", sum);
        }
    }

    #[test]
    fn test_next_rank() {
        assert_eq!(Rank::E.next(), Some((Rank::D, 100)));
        assert_eq!(Rank::A.next(), Some((Rank::S, 550)));
        assert_eq!(Rank::S.next(), None);
    }

    #[test]
    fn test_default_profile() {
        let state = ProgressState::new(day());
        assert_eq!(state.level, 1);
        assert_eq!(state.experience, 0);
        assert_eq!(state.rank, Rank::E);
        assert_eq!(state.stat_total(), 50);
        assert!(StatKey::ALL.iter().all(|k| state.stat(*k) == 10));
        assert_eq!(state.combo(ComboCategory::Gym), 0);
        assert!(!state.is_blocked());
        assert_eq!(state.last_weekly_reset, day());
    }

    #[test]
    fn test_wire_format_uses_legacy_keys() {
        let state = ProgressState::new(day());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lvl"], 1);
        assert_eq!(json["xp"], 0);
        assert_eq!(json["rank"], "E");
        assert_eq!(json["stats"]["STR"], 10);
        assert_eq!(json["stats"]["EST"], 10);
        assert_eq!(json["combos"]["med"], 0);
        assert_eq!(json["descanso_usado"], false);
        assert_eq!(json["penalidades"], serde_json::json!([]));
        assert_eq!(json["reset_semanal"], "2026-10-12");
    }

    #[test]
    fn test_reads_legacy_document() {
        let raw = r#"{"lvl": 4, "xp": 35, "rank": "D",
            "stats": {"STR": 30, "INT": 20, "SEN": 25, "VIT": 15, "EST": 12},
            "combos": {"med": 3, "gym": 7},
            "descanso_usado": true, "penalidades": ["no gym on sunday"],
            "reset_semanal": "2026-10-05"}"#;
        let state: ProgressState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.level, 4);
        assert_eq!(state.stat(StatKey::Sen), 25);
        assert_eq!(state.combo(ComboCategory::Gym), 7);
        assert!(state.is_blocked());
        assert_eq!(state.derived_rank(), Rank::D);
    }

    #[test]
    fn test_reads_float_level_and_experience() {
        let raw = r#"{"lvl": 3.0, "xp": 25.0, "rank": "E",
            "stats": {"STR": 10, "INT": 10, "SEN": 10, "VIT": 10, "EST": 10},
            "combos": {"med": 0, "gym": 0},
            "descanso_usado": false, "penalidades": [],
            "reset_semanal": "2026-10-05"}"#;
        let state: ProgressState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.level, 3);
        assert_eq!(state.experience, 25);

        // written back as plain integers
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains(r#""xp":25,"#));

        let fractional = raw.replace("25.0", "25.5");
        assert!(serde_json::from_str::<ProgressState>(&fractional).is_err());
        let negative_level = raw.replace("3.0", "-1");
        assert!(serde_json::from_str::<ProgressState>(&negative_level).is_err());
    }

    #[test]
    fn test_stat_total_saturates() {
        let mut state = ProgressState::new(day());
        state.stats.insert(StatKey::Str, u32::MAX);
        assert_eq!(state.stat_total(), u32::MAX);
        assert_eq!(state.derived_rank(), Rank::S);
    }

    #[test]
    fn test_stat_key_parse() {
        assert_eq!("str".parse::<StatKey>(), Ok(StatKey::Str));
        assert_eq!(" VIT ".parse::<StatKey>(), Ok(StatKey::Vit));
        assert!("LUCK".parse::<StatKey>().is_err());
    }
}
