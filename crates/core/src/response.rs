use crate::modality::{Modality, PerModality};

/// The player's match / no-match declarations for the round on screen.
///
/// `None` means undeclared. Cleared once per new stimulus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseTracker {
    declared: PerModality<Option<bool>>,
}

impl ResponseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins within a round.
    pub fn declare(&mut self, modality: Modality, is_match: bool) {
        self.declared[modality] = Some(is_match);
    }

    pub fn get(&self, modality: Modality) -> Option<bool> {
        self.declared[modality]
    }

    pub fn clear(&mut self) {
        self.declared = PerModality::splat(None);
    }

    pub fn is_empty(&self) -> bool {
        self.declared.iter().all(|(_, d)| d.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Modality, bool)> + '_ {
        self.declared.iter().filter_map(|(m, d)| d.map(|v| (m, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_declaration_wins() {
        let mut r = ResponseTracker::new();
        r.declare(Modality::Color, true);
        r.declare(Modality::Color, false);
        assert_eq!(r.get(Modality::Color), Some(false));
        assert_eq!(r.get(Modality::Position), None);
    }

    #[test]
    fn clear_resets_to_undeclared() {
        let mut r = ResponseTracker::new();
        r.declare(Modality::Letter, true);
        r.declare(Modality::Audio, false);
        assert_eq!(r.iter().count(), 2);

        r.clear();
        assert_eq!(r.get(Modality::Letter), None);
        assert!(r.is_empty());
    }
}
