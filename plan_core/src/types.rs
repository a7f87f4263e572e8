//! Core domain types for the Weekplan system.
//!
//! This module defines the shared vocabulary of the planner:
//! - Sports, intensity zones and session tags
//! - Sessions and the week plan aggregate
//! - The user profile template
//! - The rule-evaluation context (recent load, today's readiness)

use crate::{Error, Result};
use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Session Vocabulary
// ============================================================================

/// Kind of training
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Swim,
    Bike,
    Run,
    Strength,
    Rest,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sport::Swim => "swim",
            Sport::Bike => "bike",
            Sport::Run => "run",
            Sport::Strength => "strength",
            Sport::Rest => "rest",
        };
        f.pad(s)
    }
}

impl FromStr for Sport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "swim" => Ok(Sport::Swim),
            "bike" => Ok(Sport::Bike),
            "run" => Ok(Sport::Run),
            "strength" => Ok(Sport::Strength),
            "rest" => Ok(Sport::Rest),
            other => Err(Error::Validation(format!("Unknown sport: {}", other))),
        }
    }
}

/// Ordinal intensity zone, z1 easiest through z5 hardest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intensity::Z1 => "z1",
            Intensity::Z2 => "z2",
            Intensity::Z3 => "z3",
            Intensity::Z4 => "z4",
            Intensity::Z5 => "z5",
        };
        f.pad(s)
    }
}

/// Semantically meaningful session labels
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Technique,
    Intervals,
    Vo2,
    Threshold,
    Optional,
    Long,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tag::Technique => "technique",
            Tag::Intervals => "intervals",
            Tag::Vo2 => "vo2",
            Tag::Threshold => "threshold",
            Tag::Optional => "optional",
            Tag::Long => "long",
        };
        f.pad(s)
    }
}

// ============================================================================
// Session and Plan Types
// ============================================================================

/// One planned or logged unit of training
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub date: NaiveDate,
    pub sport: Sport,
    pub title: String,
    pub duration_min: u32,
    pub intensity: Intensity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
}

impl Session {
    pub fn new(
        date: NaiveDate,
        sport: Sport,
        title: impl Into<String>,
        duration_min: u32,
        intensity: Intensity,
    ) -> Self {
        Self {
            date,
            sport,
            title: title.into(),
            duration_min,
            intensity,
            notes: None,
            tags: BTreeSet::new(),
        }
    }

    /// Builder-style tag addition
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Builder-style note addition (appends, never replaces)
    pub fn with_note(mut self, note: &str) -> Self {
        self.append_note(note);
        self
    }

    /// Append free text to the notes, keeping whatever was there
    pub fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{}; {}", existing, note),
            _ => note.to_string(),
        });
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_rest(&self) -> bool {
        self.sport == Sport::Rest
    }
}

/// The aggregate transformed by the rule engine
///
/// Rules never mutate a plan they are given; each returns a new value so the
/// caller can always compare before and after.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeekPlan {
    pub start_date: NaiveDate,
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub applied_rules: Vec<String>,
}

impl WeekPlan {
    /// Create an unannotated plan
    pub fn new(start_date: NaiveDate, sessions: Vec<Session>) -> Self {
        Self {
            start_date,
            sessions,
            warnings: Vec::new(),
            applied_rules: Vec::new(),
        }
    }

    /// Sum of planned minutes over all sessions
    pub fn total_minutes(&self) -> u32 {
        self.sessions.iter().map(|s| s.duration_min).sum()
    }

    /// All sessions scheduled on a given date, in plan order
    pub fn sessions_on(&self, date: NaiveDate) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(move |s| s.date == date)
    }

    /// Check the plan against the session invariants
    ///
    /// A zero-minute session is only valid for rest days.
    pub fn validate(&self) -> Result<()> {
        for session in &self.sessions {
            if session.duration_min == 0 && !session.is_rest() {
                return Err(Error::Validation(format!(
                    "{} session on {} has zero duration",
                    session.sport, session.date
                )));
            }
        }
        Ok(())
    }
}

/// Ensure a 7-day window starting at `start_date` fits in the calendar
pub fn validate_window(start_date: NaiveDate) -> Result<()> {
    start_date
        .checked_add_days(Days::new(6))
        .map(|_| ())
        .ok_or_else(|| {
            Error::Validation(format!(
                "7-day window starting {} runs past the end of the calendar",
                start_date
            ))
        })
}

// ============================================================================
// Profile Types
// ============================================================================

/// Entry in a profile's swim-day list
///
/// Either a plain weekday token (`"Wed"`) or the `"Sun_optional"` sentinel that
/// requests a recovery swim after the Sunday ride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SwimDay {
    Day(Weekday),
    SunOptional,
}

pub const SUN_OPTIONAL_TOKEN: &str = "Sun_optional";

impl FromStr for SwimDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == SUN_OPTIONAL_TOKEN {
            return Ok(SwimDay::SunOptional);
        }
        s.parse::<Weekday>()
            .map(SwimDay::Day)
            .map_err(|_| Error::Validation(format!("Unknown swim day: {}", s)))
    }
}

impl TryFrom<String> for SwimDay {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SwimDay> for String {
    fn from(day: SwimDay) -> Self {
        day.to_string()
    }
}

impl fmt::Display for SwimDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwimDay::Day(weekday) => write!(f, "{}", weekday),
            SwimDay::SunOptional => f.write_str(SUN_OPTIONAL_TOKEN),
        }
    }
}

/// Static weekly template parameters for one athlete
///
/// Missing fields fall back to the profile defaults in [`crate::config`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    /// Carried through for the presentation layer; the rules do not read it
    pub ftp: u32,
    pub timezone: String,
    pub swim_days: Vec<SwimDay>,
    pub bike_vo2_day: Weekday,
    pub long_bike_day: Weekday,
    pub no_long_run_day: Weekday,
}

impl UserProfile {
    pub fn swims_on(&self, weekday: Weekday) -> bool {
        self.swim_days.contains(&SwimDay::Day(weekday))
    }

    pub fn wants_sunday_recovery_swim(&self) -> bool {
        self.swim_days.contains(&SwimDay::SunOptional)
    }
}

// ============================================================================
// Rule Context Types
// ============================================================================

/// Logged load over the 7 days preceding the plan window
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Last7dStats {
    pub total_minutes: u32,
    #[serde(default)]
    pub by_date: BTreeMap<NaiveDate, u32>,
}

/// Today's self-reported recovery state
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TodayFatigue {
    /// 1 (wrecked) through 5 (fresh)
    pub readiness: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_score: Option<f64>,
}

/// External-state snapshot consumed by the rule engine
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct RulesContext {
    #[serde(default)]
    pub last_7d_stats: Last7dStats,
    #[serde(default)]
    pub today_fatigue: Option<TodayFatigue>,
}

impl RulesContext {
    pub fn new(last_7d_stats: Last7dStats, today_fatigue: Option<TodayFatigue>) -> Self {
        Self {
            last_7d_stats,
            today_fatigue,
        }
    }

    /// Reject snapshots outside the documented domain
    pub fn validate(&self) -> Result<()> {
        if let Some(ref fatigue) = self.today_fatigue {
            if !(1..=5).contains(&fatigue.readiness) {
                return Err(Error::Validation(format!(
                    "readiness must be between 1 and 5, got {}",
                    fatigue.readiness
                )));
            }
            if let Some(score) = fatigue.sleep_score {
                if !score.is_finite() || score < 0.0 {
                    return Err(Error::Validation(format!(
                        "sleep score must be a non-negative number, got {}",
                        score
                    )));
                }
            }
        }
        Ok(())
    }
}
