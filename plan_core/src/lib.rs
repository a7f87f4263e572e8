#![forbid(unsafe_code)]

//! Core domain model and planning logic for the Weekplan system.
//!
//! This crate provides:
//! - Domain types (sessions, week plans, profiles, rule context)
//! - Session classification (hard/easy, downgrades)
//! - Draft plan generation from the weekly template
//! - The ordered rule engine
//! - Collaborators (profile config, training-log history)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod classify;
pub mod generator;
pub mod rules;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use classify::{downgrade, is_hard};
pub use generator::{add_optional_sunday_swim, generate_draft_plan};
pub use rules::apply_rules;
pub use history::load_training_log;

use chrono::NaiveDate;

/// Run the full planning pipeline for one 7-day window
///
/// Validates caller-supplied input, expands the profile template, adds the
/// optional Sunday swim and applies the rules in order.
pub fn plan_week(
    profile: &UserProfile,
    start_date: NaiveDate,
    ctx: &RulesContext,
) -> Result<WeekPlan> {
    types::validate_window(start_date)?;
    ctx.validate()?;

    let draft = generate_draft_plan(profile, start_date);
    let draft = add_optional_sunday_swim(&draft, profile);
    draft.validate()?;

    Ok(apply_rules(&draft, ctx))
}
