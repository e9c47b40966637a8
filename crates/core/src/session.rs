//! The session object: configuration, history, responses and tallies.

use crate::error::{ConfigError, NBackError};
use crate::history::HistoryBuffer;
use crate::modality::{Modality, ModalitySet};
use crate::response::ResponseTracker;
use crate::score::{ModalityScore, RoundOutcome, ScoreTally};
use crate::stimulus::{RandomSource, Stimulus, StimulusSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length of the square position grid.
    pub grid_size: u32,
    /// Lag depth: each stimulus is compared with the one `n` rounds earlier.
    pub n: usize,
    pub modalities: ModalitySet,
    pub interval_ms: u64,
    /// Fixed generator seed; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            n: 1,
            modalities: [Modality::Position].into_iter().collect(),
            interval_ms: 500,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub const MAX_GRID_SIZE: u32 = 64;
    pub const MIN_INTERVAL_MS: u64 = 10;
    pub const MAX_INTERVAL_MS: u64 = 60_000;

    pub fn new(
        grid_size: u32,
        n: usize,
        modalities: impl IntoIterator<Item = Modality>,
        interval_ms: u64,
    ) -> Self {
        Self {
            grid_size,
            n,
            modalities: modalities.into_iter().collect(),
            interval_ms,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || self.grid_size > Self::MAX_GRID_SIZE {
            return Err(ConfigError::GridSize {
                got: self.grid_size,
                max: Self::MAX_GRID_SIZE,
            });
        }
        if self.n == 0 {
            return Err(ConfigError::ZeroLag);
        }
        if self.modalities.is_empty() {
            return Err(ConfigError::NoModalities);
        }
        if !(Self::MIN_INTERVAL_MS..=Self::MAX_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(ConfigError::Interval {
                got: self.interval_ms,
                min: Self::MIN_INTERVAL_MS,
                max: Self::MAX_INTERVAL_MS,
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// One N-back session. All state changes go through its methods.
///
/// [`advance`](Self::advance) is one round transition: judge the round on
/// screen, draw the next stimulus, record it, forget the declarations.
#[derive(Debug)]
pub struct NBackSession {
    config: SessionConfig,
    source: Box<dyn StimulusSource>,
    history: HistoryBuffer,
    responses: ResponseTracker,
    tally: ScoreTally,
    last_outcomes: Vec<RoundOutcome>,
}

impl NBackSession {
    /// Start a fresh session with a random generator.
    pub fn configure(config: SessionConfig) -> Result<Self, NBackError> {
        let source = match config.seed {
            Some(seed) => RandomSource::new(seed),
            None => RandomSource::from_clock(),
        };
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(
        config: SessionConfig,
        source: Box<dyn StimulusSource>,
    ) -> Result<Self, NBackError> {
        config.validate()?;
        info!(
            "Session configured (grid={}x{}, n={}, modalities=[{}], interval={}ms)",
            config.grid_size, config.grid_size, config.n, config.modalities, config.interval_ms
        );
        Ok(Self {
            config,
            source,
            history: HistoryBuffer::new(),
            responses: ResponseTracker::new(),
            tally: ScoreTally::new(),
            last_outcomes: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The stimulus on screen; `None` before the first round.
    pub fn current(&self) -> Option<&Stimulus> {
        self.history.latest()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn responses(&self) -> &ResponseTracker {
        &self.responses
    }

    pub fn rounds_presented(&self) -> usize {
        self.history.len()
    }

    /// Whether the round on screen has an n-back target and will be scored.
    pub fn accepts_responses(&self) -> bool {
        self.history.look_back(self.config.n).is_some()
    }

    /// Tally for an active modality; `None` for inactive ones.
    pub fn score(&self, modality: Modality) -> Option<ModalityScore> {
        self.config
            .modalities
            .contains(modality)
            .then(|| self.tally.get(modality))
    }

    pub fn scores(&self) -> Vec<(Modality, ModalityScore)> {
        self.config
            .modalities
            .iter()
            .map(|m| (m, self.tally.get(m)))
            .collect()
    }

    /// Verdicts from the most recent scored round transition.
    pub fn last_outcomes(&self) -> &[RoundOutcome] {
        &self.last_outcomes
    }

    /// Ground truth for the round on screen; `None` during warm-up or for an
    /// inactive modality.
    pub fn is_match(&self, modality: Modality) -> Option<bool> {
        if !self.config.modalities.contains(modality) {
            return None;
        }
        let current = self.history.latest()?;
        let target = self.history.look_back(self.config.n)?;
        Some(target.matches(current, modality))
    }

    /// Text drawn inside the stimulus cell: the letter and/or digit, when active.
    pub fn visible_label(&self) -> Option<String> {
        let current = self.history.latest()?;
        let mut label = String::new();
        if self.config.modalities.contains(Modality::Letter) {
            label.push(current.letter);
        }
        if self.config.modalities.contains(Modality::Number) {
            label.push(current.number);
        }
        (!label.is_empty()).then_some(label)
    }

    pub fn declare_response(&mut self, modality: Modality, is_match: bool) -> Result<(), NBackError> {
        if !self.config.modalities.contains(modality) {
            return Err(NBackError::InactiveModality(modality));
        }
        self.responses.declare(modality, is_match);
        Ok(())
    }

    /// One round transition. Scoring sees only the pre-transition state.
    pub fn advance(&mut self) -> Stimulus {
        self.last_outcomes.clear();
        if let Some(current) = self.history.latest().copied() {
            self.last_outcomes = self.tally.evaluate_round(
                self.config.modalities,
                &self.responses,
                &self.history,
                &current,
                self.config.n,
            );
            for o in &self.last_outcomes {
                debug!(
                    "round {} {}: truth={} declared={:?} -> {:?}",
                    self.history.len(),
                    o.modality,
                    o.ground_truth,
                    o.declared,
                    o.verdict
                );
            }
        }

        let next = self.source.next_stimulus(self.config.grid_size);
        self.history.append(next);
        self.responses.clear();
        next
    }

    pub fn snapshot(&self, running: bool) -> SessionSnapshot {
        SessionSnapshot {
            running,
            config: self.config.clone(),
            rounds_presented: self.rounds_presented(),
            accepts_responses: self.accepts_responses(),
            current: self.current().copied(),
            label: self.visible_label(),
            responses: self
                .config
                .modalities
                .iter()
                .map(|modality| ResponseRow {
                    modality,
                    declared: self.responses.get(modality),
                })
                .collect(),
            scores: self
                .scores()
                .into_iter()
                .map(|(modality, score)| ScoreRow {
                    modality,
                    accuracy: score.accuracy(),
                    score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub modality: Modality,
    pub declared: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub modality: Modality,
    #[serde(flatten)]
    pub score: ModalityScore,
    pub accuracy: f32,
}

/// Read-only view of a session for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub running: bool,
    pub config: SessionConfig,
    pub rounds_presented: usize,
    pub accepts_responses: bool,
    pub current: Option<Stimulus>,
    pub label: Option<String>,
    pub responses: Vec<ResponseRow>,
    pub scores: Vec<ScoreRow>,
}
