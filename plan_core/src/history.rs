//! Training log loading and 7-day load aggregation.
//!
//! The log is a CSV with a `date,sport,duration_min` header. It feeds the
//! `last_7d_stats` part of the rule context.

use crate::{Last7dStats, Result, Sport};
use chrono::{Days, NaiveDate};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw CSV row; extra columns are ignored
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    sport: String,
    duration_min: u32,
}

/// A completed session from the training log
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedSession {
    pub date: NaiveDate,
    pub sport: Sport,
    pub duration_min: u32,
}

impl TryFrom<CsvRow> for LoggedSession {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .map_err(|e| crate::Error::Validation(format!("Invalid date {:?}: {}", row.date, e)))?;
        let sport = row.sport.parse()?;

        Ok(LoggedSession {
            date,
            sport,
            duration_min: row.duration_min,
        })
    }
}

/// Load every session from the training log
///
/// Returns an empty log if the file doesn't exist. Malformed rows are skipped
/// with a warning.
pub fn load_training_log(path: &Path) -> Result<Vec<LoggedSession>> {
    if !path.exists() {
        tracing::debug!("No training log found at {:?}", path);
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut sessions = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match LoggedSession::try_from(row) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("Failed to parse training log row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize training log row: {}", e);
            }
        }
    }

    tracing::info!("Loaded {} sessions from training log {:?}", sessions.len(), path);

    Ok(sessions)
}

impl Last7dStats {
    /// Aggregate minutes over the 7 days strictly before `start_date`
    ///
    /// Sums saturate at `u32::MAX` rather than wrapping.
    pub fn from_log(log: &[LoggedSession], start_date: NaiveDate) -> Self {
        let window_start = start_date
            .checked_sub_days(Days::new(7))
            .unwrap_or(NaiveDate::MIN);

        let mut by_date = BTreeMap::new();
        for session in log {
            if session.date >= window_start && session.date < start_date {
                let minutes = by_date.entry(session.date).or_insert(0u32);
                *minutes = minutes.saturating_add(session.duration_min);
            }
        }

        let total_minutes = by_date
            .values()
            .fold(0u32, |total, minutes| total.saturating_add(*minutes));

        tracing::debug!(
            "Last 7 days before {}: {} min over {} days",
            start_date,
            total_minutes,
            by_date.len()
        );

        Self {
            total_minutes,
            by_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn logged(date: NaiveDate, duration_min: u32) -> LoggedSession {
        LoggedSession {
            date,
            sport: Sport::Bike,
            duration_min,
        }
    }

    #[test]
    fn test_missing_log_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = load_training_log(&temp_dir.path().join("history.csv")).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_skips_bad_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");
        fs::write(
            &path,
            "date,sport,duration_min,note\n\
             2026-10-12,bike,90,club ride\n\
             2026-10-13, Run ,45,\n\
             not-a-date,swim,30,\n\
             2026-10-14,kayak,60,\n\
             2026-10-15,swim,-5,\n",
        )
        .unwrap();

        let log = load_training_log(&path).unwrap();
        assert_eq!(
            log,
            vec![
                LoggedSession {
                    date: date(2026, 10, 12),
                    sport: Sport::Bike,
                    duration_min: 90,
                },
                LoggedSession {
                    date: date(2026, 10, 13),
                    sport: Sport::Run,
                    duration_min: 45,
                },
            ]
        );
    }

    #[test]
    fn test_stats_window_excludes_start_and_older() {
        let start = date(2026, 10, 19);
        let log = vec![
            logged(date(2026, 10, 11), 500), // 8 days before, outside
            logged(date(2026, 10, 12), 60),  // 7 days before, inside
            logged(date(2026, 10, 18), 40),
            logged(date(2026, 10, 18), 20),
            logged(date(2026, 10, 19), 300), // start date, outside
        ];

        let stats = Last7dStats::from_log(&log, start);

        assert_eq!(stats.total_minutes, 120);
        assert_eq!(stats.by_date.len(), 2);
        assert_eq!(stats.by_date[&date(2026, 10, 18)], 60);
    }

    #[test]
    fn test_stats_saturate_on_huge_durations() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");
        fs::write(
            &path,
            "date,sport,duration_min\n\
             2026-10-13,bike,4294967295\n\
             2026-10-13,run,10\n\
             2026-10-14,run,10\n",
        )
        .unwrap();

        let log = load_training_log(&path).unwrap();
        assert_eq!(log.len(), 3);

        let stats = Last7dStats::from_log(&log, date(2026, 10, 19));

        assert_eq!(stats.by_date[&date(2026, 10, 13)], u32::MAX);
        assert_eq!(stats.by_date[&date(2026, 10, 14)], 10);
        assert_eq!(stats.total_minutes, u32::MAX);
    }

    #[test]
    fn test_stats_empty_log() {
        let stats = Last7dStats::from_log(&[], date(2026, 10, 19));
        assert_eq!(stats, Last7dStats::default());
    }
}
