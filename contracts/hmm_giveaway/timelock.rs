//! Per-account claim window.

pub type Timestamp = u64;

/// An account without a recorded window may always claim.
pub fn is_eligible(now: Timestamp, next_eligible: Option<Timestamp>) -> bool {
    next_eligible.map_or(true, |next| now >= next)
}

/// Start of the window following a claim made at `now`.
pub fn next_eligible(now: Timestamp, previous: Option<Timestamp>, window: Timestamp) -> Option<Timestamp> {
    now.max(previous.unwrap_or(0)).checked_add(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Timestamp = 86_400_000;

    #[test]
    fn first_claim_is_eligible() {
        assert!(is_eligible(0, None));
        assert!(is_eligible(1_000, None));
    }

    #[test]
    fn claim_inside_window_is_rejected() {
        let next = next_eligible(1_000, None, WINDOW).unwrap();
        assert_eq!(next, 1_000 + WINDOW);
        assert!(!is_eligible(1_000, Some(next)));
        assert!(!is_eligible(next - 1, Some(next)));
        assert!(is_eligible(next, Some(next)));
    }

    #[test]
    fn skipped_windows_give_no_credit() {
        let first = next_eligible(0, None, WINDOW).unwrap();
        // come back five windows later: only one claim, then a full window again
        let late = 5 * WINDOW + 7;
        assert!(is_eligible(late, Some(first)));
        let second = next_eligible(late, Some(first), WINDOW).unwrap();
        assert_eq!(second, late + WINDOW);
        assert!(!is_eligible(late + 1, Some(second)));
    }

    #[test]
    fn window_never_moves_backwards() {
        assert_eq!(next_eligible(10, Some(50), WINDOW), Some(50 + WINDOW));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(next_eligible(u64::MAX, None, 1), None);
    }
}
