//! Draft plan generation from the weekly template.
//!
//! Every weekday has a fixed session shape; the profile only decides which
//! variant of that shape is used (swim or rest, VO2 or threshold, long ride or
//! endurance ride). Matching is by weekday name, so any 7-day window follows
//! the same template regardless of where it starts.

use crate::{Intensity, Session, Sport, Tag, UserProfile, WeekPlan};
use chrono::{Datelike, NaiveDate, Weekday};

/// Expand one 7-day window into exactly one session per day
pub fn generate_draft_plan(profile: &UserProfile, start_date: NaiveDate) -> WeekPlan {
    let sessions: Vec<Session> = start_date
        .iter_days()
        .take(7)
        .map(|date| template_session(profile, date))
        .collect();

    tracing::info!(
        "Generated draft plan starting {} with {} sessions ({} min)",
        start_date,
        sessions.len(),
        sessions.iter().map(|s| s.duration_min).sum::<u32>()
    );

    WeekPlan::new(start_date, sessions)
}

/// Build the template session for a single date
fn template_session(profile: &UserProfile, date: NaiveDate) -> Session {
    let weekday = date.weekday();

    match weekday {
        Weekday::Mon => Session::new(date, Sport::Bike, "Bike Endurance", 60, Intensity::Z2),

        Weekday::Tue => Session::new(date, Sport::Run, "Run Intervals", 55, Intensity::Z4),

        Weekday::Wed => {
            if profile.swims_on(weekday) {
                Session::new(date, Sport::Swim, "Swim Technique", 50, Intensity::Z2)
                    .with_tag(Tag::Technique)
            } else {
                rest_day(date)
            }
        }

        Weekday::Thu => {
            if weekday == profile.bike_vo2_day {
                Session::new(date, Sport::Bike, "Bike VO2", 70, Intensity::Z5).with_tag(Tag::Vo2)
            } else {
                Session::new(date, Sport::Bike, "Bike Threshold", 70, Intensity::Z4)
                    .with_tag(Tag::Threshold)
            }
        }

        Weekday::Fri => {
            if profile.swims_on(weekday) {
                Session::new(date, Sport::Swim, "Swim Intervals", 50, Intensity::Z4)
                    .with_tag(Tag::Intervals)
            } else {
                rest_day(date)
            }
        }

        Weekday::Sat => Session::new(date, Sport::Run, "Run Tempo", 50, Intensity::Z3),

        Weekday::Sun => {
            if weekday == profile.long_bike_day {
                Session::new(date, Sport::Bike, "Long Ride", 180, Intensity::Z2).with_tag(Tag::Long)
            } else {
                Session::new(date, Sport::Bike, "Bike Endurance", 90, Intensity::Z2)
            }
        }
    }
}

fn rest_day(date: NaiveDate) -> Session {
    Session::new(date, Sport::Rest, "Rest", 0, Intensity::Z1)
}

/// Add the post-ride recovery swim on Sunday when the profile asks for it
///
/// Safe to call unconditionally: without the `Sun_optional` swim day or without
/// a Sunday session the plan is returned unchanged.
///
/// Beyond those two cases, a plan that already carries the optional Sunday
/// swim is also returned unchanged, so repeated calls never stack swims.
pub fn add_optional_sunday_swim(plan: &WeekPlan, profile: &UserProfile) -> WeekPlan {
    if !profile.wants_sunday_recovery_swim() {
        return plan.clone();
    }

    let Some(last_sunday_idx) = plan
        .sessions
        .iter()
        .rposition(|s| s.date.weekday() == Weekday::Sun)
    else {
        tracing::debug!("No Sunday session in plan, skipping optional swim");
        return plan.clone();
    };

    let sunday = plan.sessions[last_sunday_idx].date;
    let already_added = plan
        .sessions_on(sunday)
        .any(|s| s.sport == Sport::Swim && s.has_tag(Tag::Optional));
    if already_added {
        return plan.clone();
    }

    let swim = Session::new(sunday, Sport::Swim, "Recovery Swim", 35, Intensity::Z1)
        .with_tag(Tag::Optional)
        .with_note("Optional easy swim after the long ride to flush the legs");

    let mut sessions = plan.sessions.clone();
    sessions.insert(last_sunday_idx + 1, swim);

    tracing::info!("Added optional recovery swim on {}", sunday);

    WeekPlan {
        sessions,
        ..plan.clone()
    }
}
