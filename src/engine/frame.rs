//! Detection of new frames of the foreign update loop

use crate::core::types::FrameCounter;

/// Remembers the last frame that was fully processed.
///
/// Any difference from the remembered value counts as an advance, including
/// wrap-around and a counter that went backwards after a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameDetector {
    last_seen: Option<FrameCounter>,
}

impl FrameDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_advanced(&self, current: FrameCounter) -> bool {
        self.last_seen != Some(current)
    }

    /// Records `current` as processed; call only after a successful refresh
    pub fn commit(&mut self, current: FrameCounter) {
        self.last_seen = Some(current);
    }

    /// Forgets the last frame, so the next observation always advances
    pub fn reset(&mut self) {
        self.last_seen = None;
    }

    pub fn last_seen(&self) -> Option<FrameCounter> {
        self.last_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_observation_advances() {
        let detector = FrameDetector::new();
        assert!(detector.has_advanced(0));
        assert_eq!(detector.last_seen(), None);
    }

    #[test]
    fn test_commit_and_reset() {
        let mut detector = FrameDetector::new();
        detector.commit(42);
        assert!(!detector.has_advanced(42));
        assert!(detector.has_advanced(43));
        assert!(detector.has_advanced(41));

        detector.reset();
        assert!(detector.has_advanced(42));
    }

    #[test]
    fn test_wrap_around() {
        let mut detector = FrameDetector::new();
        detector.commit(u32::MAX);
        assert!(detector.has_advanced(0));
    }

    proptest! {
        #[test]
        fn advanced_iff_different(last in any::<u32>(), current in any::<u32>()) {
            let mut detector = FrameDetector::new();
            detector.commit(last);
            prop_assert_eq!(detector.has_advanced(current), last != current);
        }
    }
}
