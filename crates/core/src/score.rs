use crate::history::HistoryBuffer;
use crate::modality::{Modality, ModalitySet, PerModality};
use crate::response::ResponseTracker;
use crate::stimulus::Stimulus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityScore {
    pub correct: u32,
    pub wrong: u32,
    pub missed: u32,
}

impl ModalityScore {
    pub fn rounds(&self) -> u32 {
        self.correct + self.wrong + self.missed
    }

    /// Share of scored rounds answered correctly; 0.0 before any round was scored.
    pub fn accuracy(&self) -> f32 {
        let total = self.rounds();
        if total == 0 {
            0.0
        } else {
            self.correct as f32 / total as f32
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Wrong => self.wrong += 1,
            Verdict::Missed => self.missed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Wrong,
    Missed,
}

impl Verdict {
    pub fn judge(declared: Option<bool>, ground_truth: bool) -> Self {
        match declared {
            None => Verdict::Missed,
            Some(d) if d == ground_truth => Verdict::Correct,
            Some(_) => Verdict::Wrong,
        }
    }
}

/// How one modality of one finished round was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub modality: Modality,
    pub ground_truth: bool,
    pub declared: Option<bool>,
    pub verdict: Verdict,
}

/// Cumulative per-modality tallies for a session.
#[derive(Debug, Clone, Default)]
pub struct ScoreTally {
    scores: PerModality<ModalityScore>,
}

impl ScoreTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, modality: Modality) -> ModalityScore {
        self.scores[modality]
    }

    /// Judge the round that is ending.
    ///
    /// `current` is the stimulus still on screen (the newest history entry);
    /// it is compared with the entry `n` rounds before it. During warm-up no
    /// target exists and nothing is recorded. Otherwise each active modality
    /// records exactly one verdict.
    pub fn evaluate_round(
        &mut self,
        active: ModalitySet,
        responses: &ResponseTracker,
        history: &HistoryBuffer,
        current: &Stimulus,
        n: usize,
    ) -> Vec<RoundOutcome> {
        let Some(target) = history.look_back(n) else {
            return Vec::new();
        };

        active
            .iter()
            .map(|modality| {
                let ground_truth = target.matches(current, modality);
                let declared = responses.get(modality);
                let verdict = Verdict::judge(declared, ground_truth);
                self.scores[modality].record(verdict);
                RoundOutcome {
                    modality,
                    ground_truth,
                    declared,
                    verdict,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(positions: &[u32]) -> HistoryBuffer {
        let mut h = HistoryBuffer::new();
        for &position in positions {
            h.append(Stimulus {
                position,
                ..Stimulus::default()
            });
        }
        h
    }

    fn position_only() -> ModalitySet {
        [Modality::Position].into_iter().collect()
    }

    #[test]
    fn judge_covers_all_cases() {
        assert_eq!(Verdict::judge(None, true), Verdict::Missed);
        assert_eq!(Verdict::judge(None, false), Verdict::Missed);
        assert_eq!(Verdict::judge(Some(true), true), Verdict::Correct);
        assert_eq!(Verdict::judge(Some(false), false), Verdict::Correct);
        assert_eq!(Verdict::judge(Some(true), false), Verdict::Wrong);
        assert_eq!(Verdict::judge(Some(false), true), Verdict::Wrong);
    }

    #[test]
    fn warm_up_records_nothing() {
        let h = history_of(&[3, 7]);
        let mut tally = ScoreTally::new();
        let current = *h.latest().unwrap();
        let out = tally.evaluate_round(
            position_only(),
            &ResponseTracker::new(),
            &h,
            &current,
            2,
        );
        assert!(out.is_empty());
        assert_eq!(tally.get(Modality::Position), ModalityScore::default());
    }

    #[test]
    fn match_declaration_on_non_match_is_wrong() {
        let h = history_of(&[3, 7, 7]);
        let current = *h.latest().unwrap();
        let mut responses = ResponseTracker::new();
        responses.declare(Modality::Position, true);

        let mut tally = ScoreTally::new();
        let out = tally.evaluate_round(position_only(), &responses, &h, &current, 2);

        assert_eq!(out.len(), 1);
        assert!(!out[0].ground_truth);
        assert_eq!(out[0].verdict, Verdict::Wrong);
        assert_eq!(
            tally.get(Modality::Position),
            ModalityScore {
                correct: 0,
                wrong: 1,
                missed: 0
            }
        );
    }

    #[test]
    fn each_active_modality_gets_one_verdict() {
        let h = history_of(&[4, 1, 4]);
        let current = *h.latest().unwrap();
        let active: ModalitySet = [Modality::Position, Modality::Color, Modality::Shape]
            .into_iter()
            .collect();
        let mut responses = ResponseTracker::new();
        responses.declare(Modality::Position, true);
        responses.declare(Modality::Color, false);
        // Inactive modalities are never judged, even if something was recorded.
        responses.declare(Modality::Audio, true);

        let mut tally = ScoreTally::new();
        tally.evaluate_round(active, &responses, &h, &current, 2);

        assert_eq!(tally.get(Modality::Position).correct, 1);
        assert_eq!(tally.get(Modality::Color).wrong, 1);
        assert_eq!(tally.get(Modality::Shape).missed, 1);
        assert_eq!(tally.get(Modality::Audio).rounds(), 0);
    }

    #[test]
    fn accuracy_is_zero_without_rounds() {
        let mut s = ModalityScore::default();
        assert_eq!(s.accuracy(), 0.0);
        s.record(Verdict::Correct);
        s.record(Verdict::Missed);
        assert!((s.accuracy() - 0.5).abs() < 1e-6);
    }
}
