//! Rule engine that adjusts a draft plan for safety and load.
//!
//! Rules run in a fixed order, each consuming the previous rule's output:
//!
//! 1. **SwimRotation**: Wednesday swims are technique, Friday swims intervals
//! 2. **ReadinessDownshift**: low readiness today downgrades today's hard work
//! 3. **NoHardHard**: never two hard sessions on consecutive days
//! 4. **WeeklyLoadCap**: planned minutes stay within 110% of last week
//!
//! A rule that changes something appends one entry to `applied_rules` (and,
//! for the safety and volume rules, one warning). Rules never remove entries
//! added by earlier rules.

use crate::classify::{downgrade, is_hard};
use crate::{Intensity, RulesContext, Sport, Tag, WeekPlan};
use chrono::{Datelike, Weekday};
use std::collections::BTreeSet;

pub const SWIM_ROTATION: &str = "SwimRotation";
pub const READINESS_DOWNSHIFT: &str = "ReadinessDownshift";
pub const NO_HARD_HARD: &str = "NoHardHard";
pub const WEEKLY_LOAD_CAP: &str = "WeeklyLoadCap";

/// Readiness at or below this value triggers the downshift
pub const LOW_READINESS_THRESHOLD: u8 = 2;

/// Allowed growth over last week's logged minutes
pub const LOAD_CAP_FACTOR: f64 = 1.10;

/// Scaled sessions never drop below this many minutes
pub const MIN_SCALED_DURATION_MIN: u32 = 30;

/// Signature shared by every rule
pub type Rule = fn(&WeekPlan, &RulesContext) -> WeekPlan;

/// Firing order. Structure first, then today's state, then multi-day
/// patterns, then volume on the final durations.
pub const RULES: [(&str, Rule); 4] = [
    (SWIM_ROTATION, swim_rotation),
    (READINESS_DOWNSHIFT, readiness_downshift),
    (NO_HARD_HARD, no_hard_hard),
    (WEEKLY_LOAD_CAP, weekly_load_cap),
];

/// Apply all rules in order to a freshly annotated copy of `plan`
///
/// Any warnings or applied-rule entries already on the input are discarded
/// before the first rule runs.
pub fn apply_rules(plan: &WeekPlan, ctx: &RulesContext) -> WeekPlan {
    let fresh = WeekPlan {
        warnings: Vec::new(),
        applied_rules: Vec::new(),
        ..plan.clone()
    };

    let result = RULES.iter().fold(fresh, |current, (name, rule)| {
        let next = rule(&current, ctx);
        if next.applied_rules.len() == current.applied_rules.len() {
            tracing::debug!("Rule {} made no changes", name);
        }
        next
    });

    tracing::info!(
        "Applied rules to plan starting {}: {} fired, {} warnings",
        result.start_date,
        result.applied_rules.len(),
        result.warnings.len()
    );

    result
}

/// Wednesday swims become technique, Friday swims become intervals
///
/// Idempotent: sessions already carrying the right tag are left alone and no
/// entry is recorded when nothing changed.
pub fn swim_rotation(plan: &WeekPlan, _ctx: &RulesContext) -> WeekPlan {
    let mut rewritten = 0;

    let sessions = plan
        .sessions
        .iter()
        .map(|session| {
            if session.sport != Sport::Swim {
                return session.clone();
            }

            let mut swim = session.clone();
            match session.date.weekday() {
                Weekday::Wed if !session.has_tag(Tag::Technique) => {
                    swim.title = "Swim Technique".to_string();
                    swim.tags = BTreeSet::from([Tag::Technique]);
                    swim.append_note("Wednesday swim rotated to technique focus");
                    rewritten += 1;
                }
                Weekday::Fri if !session.has_tag(Tag::Intervals) => {
                    swim.title = "Swim Intervals".to_string();
                    swim.tags = BTreeSet::from([Tag::Intervals]);
                    swim.intensity = Intensity::Z4;
                    swim.append_note("Friday swim rotated to intervals");
                    rewritten += 1;
                }
                _ => {}
            }
            swim
        })
        .collect();

    if rewritten == 0 {
        return plan.clone();
    }

    let entry = format!("{}: rotated {} swim session(s)", SWIM_ROTATION, rewritten);
    tracing::info!("{}", entry);

    let mut applied_rules = plan.applied_rules.clone();
    applied_rules.push(entry);

    WeekPlan {
        sessions,
        applied_rules,
        ..plan.clone()
    }
}

/// Downgrade hard sessions on the plan's first day when readiness is low
///
/// Only sessions dated `start_date` are considered.
pub fn readiness_downshift(plan: &WeekPlan, ctx: &RulesContext) -> WeekPlan {
    let readiness = match ctx.today_fatigue {
        Some(ref fatigue) if fatigue.readiness <= LOW_READINESS_THRESHOLD => fatigue.readiness,
        _ => return plan.clone(),
    };

    let reason = format!("Low readiness today ({}/5), kept easy", readiness);
    let mut downgraded = 0;

    let sessions = plan
        .sessions
        .iter()
        .map(|session| {
            if session.date == plan.start_date && is_hard(session) {
                downgraded += 1;
                downgrade(session, &reason)
            } else {
                session.clone()
            }
        })
        .collect();

    if downgraded == 0 {
        tracing::debug!(
            "Readiness {} but no hard session on {}",
            readiness,
            plan.start_date
        );
        return plan.clone();
    }

    let mut warnings = plan.warnings.clone();
    warnings.push(format!(
        "Readiness is {}/5: downgraded {} hard session(s) on {} to z2",
        readiness, downgraded, plan.start_date
    ));

    let entry = format!("{}: readiness {}", READINESS_DOWNSHIFT, readiness);
    tracing::info!("{}", entry);

    let mut applied_rules = plan.applied_rules.clone();
    applied_rules.push(entry);

    WeekPlan {
        sessions,
        warnings,
        applied_rules,
        ..plan.clone()
    }
}

/// Prevent hard sessions on two consecutive calendar days
///
/// Sessions are walked in date order (stable for same-date entries). When a
/// hard session directly follows a hard session on the previous calendar day
/// it is downgraded and counts as easy for the next comparison, so of three
/// hard days in a row only the middle one changes. Dates more than one day
/// apart are never consecutive, even if they are neighbours in the list.
pub fn no_hard_hard(plan: &WeekPlan, _ctx: &RulesContext) -> WeekPlan {
    let mut sorted = plan.sessions.clone();
    sorted.sort_by_key(|s| s.date);

    let mut previous: Option<(chrono::NaiveDate, bool)> = None;
    let mut downgraded_dates = Vec::new();
    let mut sessions = Vec::with_capacity(sorted.len());

    for session in sorted {
        let current_hard = is_hard(&session);

        let back_to_back = matches!(
            previous,
            Some((prev_date, true)) if (session.date - prev_date).num_days() == 1
        );

        if back_to_back && current_hard {
            downgraded_dates.push(session.date);
            previous = Some((session.date, false));
            sessions.push(downgrade(&session, "No back-to-back hard sessions"));
        } else {
            previous = Some((session.date, current_hard));
            sessions.push(session);
        }
    }

    if downgraded_dates.is_empty() {
        return WeekPlan {
            sessions,
            ..plan.clone()
        };
    }

    let dates = downgraded_dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut warnings = plan.warnings.clone();
    warnings.push(format!(
        "Hard sessions on consecutive days: downgraded {} to z2",
        dates
    ));

    let entry = format!(
        "{}: downgraded {} session(s)",
        NO_HARD_HARD,
        downgraded_dates.len()
    );
    tracing::info!("{}", entry);

    let mut applied_rules = plan.applied_rules.clone();
    applied_rules.push(entry);

    WeekPlan {
        sessions,
        warnings,
        applied_rules,
        ..plan.clone()
    }
}

/// Scale durations down when the week grows more than 10% over last week
///
/// Every non-rest session is scaled by the same factor with a 30-minute floor.
/// The floor means the resulting total can still exceed the cap; that is left
/// as is rather than renormalised.
pub fn weekly_load_cap(plan: &WeekPlan, ctx: &RulesContext) -> WeekPlan {
    let last_week = ctx.last_7d_stats.total_minutes;
    if last_week == 0 {
        tracing::debug!("No training history, skipping weekly load cap");
        return plan.clone();
    }

    let planned = plan.total_minutes();
    let max_allowed = (f64::from(last_week) * LOAD_CAP_FACTOR).round() as u32;
    if planned <= max_allowed {
        tracing::debug!(
            "Planned {} min within cap of {} min",
            planned,
            max_allowed
        );
        return plan.clone();
    }

    let scale = f64::from(max_allowed) / f64::from(planned);

    let sessions: Vec<_> = plan
        .sessions
        .iter()
        .map(|session| {
            if session.is_rest() || session.duration_min == 0 {
                return session.clone();
            }

            let scaled = (f64::from(session.duration_min) * scale).round() as u32;
            let new_duration = scaled.max(MIN_SCALED_DURATION_MIN);

            let mut capped = session.clone();
            if new_duration != session.duration_min {
                capped.append_note(&format!(
                    "Shortened from {} to {} min for weekly load cap",
                    session.duration_min, new_duration
                ));
                capped.duration_min = new_duration;
            }
            capped
        })
        .collect();

    let after: u32 = sessions.iter().map(|s| s.duration_min).sum();

    let mut warnings = plan.warnings.clone();
    warnings.push(format!(
        "Weekly load capped: last 7 days {} min, cap {} min",
        last_week, max_allowed
    ));

    let entry = format!("{}: {} -> {} min", WEEKLY_LOAD_CAP, planned, after);
    tracing::info!("{}", entry);

    let mut applied_rules = plan.applied_rules.clone();
    applied_rules.push(entry);

    WeekPlan {
        sessions,
        warnings,
        applied_rules,
        ..plan.clone()
    }
}
