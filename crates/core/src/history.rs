use crate::stimulus::Stimulus;

/// Every stimulus presented in the session, oldest first.
///
/// The newest entry is the stimulus currently on screen. Entries are never
/// reordered or edited once appended.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: Vec<Stimulus>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stimulus: Stimulus) {
        self.entries.push(stimulus);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Stimulus> {
        self.entries.last()
    }

    /// The stimulus shown `n` rounds before the newest one.
    ///
    /// `None` while fewer than `n` earlier rounds exist; `look_back(0)` is the
    /// newest entry.
    pub fn look_back(&self, n: usize) -> Option<&Stimulus> {
        let newest = self.entries.len().checked_sub(1)?;
        let idx = newest.checked_sub(n)?;
        self.entries.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stimulus> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(position: u32) -> Stimulus {
        Stimulus {
            position,
            ..Stimulus::default()
        }
    }

    #[test]
    fn look_back_counts_from_newest() {
        let mut h = HistoryBuffer::new();
        assert!(h.look_back(0).is_none());

        for p in [3, 7, 7, 2] {
            h.append(at(p));
        }
        assert_eq!(h.look_back(0).map(|s| s.position), Some(2));
        assert_eq!(h.look_back(2).map(|s| s.position), Some(7));
        assert_eq!(h.look_back(3).map(|s| s.position), Some(3));
        assert!(h.look_back(4).is_none());
    }

    #[test]
    fn warm_up_has_no_target() {
        let mut h = HistoryBuffer::new();
        h.append(at(1));
        h.append(at(2));
        assert!(h.look_back(2).is_none());
        h.append(at(3));
        assert_eq!(h.look_back(2).map(|s| s.position), Some(1));
    }
}
