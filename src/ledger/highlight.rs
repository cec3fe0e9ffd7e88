//! Transient highlight of the most recently appended block.
//!
//! The highlight is a display concern layered over the ledger: it names a
//! block identifier and an expiry instant, and nothing in the ledger itself
//! changes when it is set or cleared.

use std::time::{Duration, Instant};

pub const HIGHLIGHT_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct Highlight {
    identifier: String,
    until: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct HighlightTimer {
    current: Option<Highlight>,
}

impl HighlightTimer {
    /// Highlight `identifier` for `HIGHLIGHT_WINDOW`, replacing any earlier highlight.
    pub fn mark(&mut self, identifier: &str, now: Instant) {
        self.current = Some(Highlight {
            identifier: identifier.to_string(),
            until: now + HIGHLIGHT_WINDOW,
        });
    }

    pub fn active(&self, now: Instant) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|h| now < h.until)
            .map(|h| h.identifier.as_str())
    }

    pub fn is_highlighted(&self, identifier: &str, now: Instant) -> bool {
        self.active(now) == Some(identifier)
    }

    /// Drop the highlight once its window has elapsed. Returns true if it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(h) if now >= h.until => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_lasts_two_seconds() {
        let start = Instant::now();
        let mut timer = HighlightTimer::default();
        timer.mark("abc", start);

        assert_eq!(timer.active(start), Some("abc"));
        assert!(timer.is_highlighted("abc", start + Duration::from_millis(1999)));
        assert_eq!(timer.active(start + HIGHLIGHT_WINDOW), None);
    }

    #[test]
    fn test_expire_only_after_window() {
        let start = Instant::now();
        let mut timer = HighlightTimer::default();
        timer.mark("abc", start);

        assert!(!timer.expire(start + Duration::from_millis(500)));
        assert_eq!(timer.active(start + Duration::from_millis(500)), Some("abc"));
        assert!(timer.expire(start + Duration::from_secs(3)));
        assert!(!timer.expire(start + Duration::from_secs(4)));
    }

    #[test]
    fn test_new_mark_replaces_previous() {
        let start = Instant::now();
        let mut timer = HighlightTimer::default();
        timer.mark("first", start);
        timer.mark("second", start + Duration::from_millis(1500));

        let later = start + Duration::from_millis(2500);
        assert!(!timer.is_highlighted("first", later));
        assert!(timer.is_highlighted("second", later));
    }
}
