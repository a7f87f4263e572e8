//! Session classification helpers.
//!
//! Decides what counts as a "hard" session and how a hard session is
//! rewritten into an easy one.

use crate::{Intensity, Session, Tag};

/// Tags that make a session hard regardless of its zone
pub const HARD_TAGS: [Tag; 2] = [Tag::Vo2, Tag::Threshold];

/// Suffix added to the title of every downgraded session
pub const DOWNGRADE_MARKER: &str = " (downgraded)";

/// True if the session is z4/z5 or carries a hard tag
pub fn is_hard(session: &Session) -> bool {
    session.intensity >= Intensity::Z4 || HARD_TAGS.iter().any(|t| session.has_tag(*t))
}

/// Return an easy z2 copy of the session
///
/// The title gets a downgrade marker, `reason` is appended to the notes and
/// hard tags are stripped. Other tags survive.
pub fn downgrade(session: &Session, reason: &str) -> Session {
    let mut easy = session.clone();
    easy.intensity = Intensity::Z2;
    easy.title.push_str(DOWNGRADE_MARKER);
    easy.append_note(reason);
    easy.tags.retain(|t| !HARD_TAGS.contains(t));

    tracing::debug!(
        "Downgraded {} on {} to z2: {}",
        session.sport,
        session.date,
        reason
    );

    easy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sport;
    use chrono::NaiveDate;

    fn session(intensity: Intensity) -> Session {
        Session::new(
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            Sport::Run,
            "Run Intervals",
            55,
            intensity,
        )
    }

    #[test]
    fn test_hard_by_zone() {
        assert!(!is_hard(&session(Intensity::Z1)));
        assert!(!is_hard(&session(Intensity::Z3)));
        assert!(is_hard(&session(Intensity::Z4)));
        assert!(is_hard(&session(Intensity::Z5)));
    }

    #[test]
    fn test_hard_by_tag() {
        assert!(is_hard(&session(Intensity::Z2).with_tag(Tag::Threshold)));
        assert!(is_hard(&session(Intensity::Z1).with_tag(Tag::Vo2)));
        // Intervals alone is not a hard tag
        assert!(!is_hard(&session(Intensity::Z2).with_tag(Tag::Intervals)));
    }

    #[test]
    fn test_downgrade_rewrites_copy() {
        let original = session(Intensity::Z5)
            .with_tag(Tag::Vo2)
            .with_tag(Tag::Long)
            .with_note("keep cadence high");

        let easy = downgrade(&original, "low readiness");

        assert_eq!(easy.intensity, Intensity::Z2);
        assert_eq!(easy.title, "Run Intervals (downgraded)");
        assert_eq!(easy.notes.as_deref(), Some("keep cadence high; low readiness"));
        assert!(!easy.has_tag(Tag::Vo2));
        assert!(easy.has_tag(Tag::Long));
        assert!(!is_hard(&easy));

        // Input is untouched
        assert_eq!(original.intensity, Intensity::Z5);
        assert!(original.has_tag(Tag::Vo2));
    }
}
