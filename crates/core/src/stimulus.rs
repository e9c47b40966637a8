use crate::catalog::{Color, Note, Shape, COLORS, DIGITS, LETTERS, NOTES, SHAPES};
use crate::modality::Modality;
use crate::prng::Prng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value a stimulus carries for one modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "modality", content = "value", rename_all = "lowercase")]
pub enum Feature {
    Position(u32),
    Color(Color),
    Letter(char),
    Number(char),
    Shape(Shape),
    Audio(Note),
}

/// One presented round. Every modality is populated, whether or not it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stimulus {
    /// Cell index in `[0, grid_size * grid_size)`, row-major.
    pub position: u32,
    pub color: Color,
    pub letter: char,
    pub number: char,
    pub shape: Shape,
    pub audio: Note,
}

impl Default for Stimulus {
    fn default() -> Self {
        Self {
            position: 0,
            color: COLORS[0],
            letter: LETTERS[0],
            number: DIGITS[0],
            shape: SHAPES[0],
            audio: NOTES[0],
        }
    }
}

impl Stimulus {
    pub fn feature(&self, modality: Modality) -> Feature {
        match modality {
            Modality::Position => Feature::Position(self.position),
            Modality::Color => Feature::Color(self.color),
            Modality::Letter => Feature::Letter(self.letter),
            Modality::Number => Feature::Number(self.number),
            Modality::Shape => Feature::Shape(self.shape),
            Modality::Audio => Feature::Audio(self.audio),
        }
    }

    #[inline]
    pub fn matches(&self, other: &Stimulus, modality: Modality) -> bool {
        self.feature(modality) == other.feature(modality)
    }

    /// `(row, column)` of the stimulus cell on a square grid.
    pub fn row_col(&self, grid_size: u32) -> (u32, u32) {
        let g = grid_size.max(1);
        (self.position / g, self.position % g)
    }
}

/// Anything that can produce the next stimulus of a session.
pub trait StimulusSource: Send + fmt::Debug {
    fn next_stimulus(&mut self, grid_size: u32) -> Stimulus;
}

/// Independent uniform draw per modality.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Prng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Prng::new(seed),
        }
    }

    pub fn from_clock() -> Self {
        Self {
            rng: Prng::from_clock(),
        }
    }
}

impl StimulusSource for RandomSource {
    fn next_stimulus(&mut self, grid_size: u32) -> Stimulus {
        let cells = (grid_size as usize).saturating_mul(grid_size as usize);
        let d = Stimulus::default();
        Stimulus {
            position: self.rng.gen_index(cells) as u32,
            color: self.rng.choose(&COLORS).unwrap_or(d.color),
            letter: self.rng.choose(&LETTERS).unwrap_or(d.letter),
            number: self.rng.choose(&DIGITS).unwrap_or(d.number),
            shape: self.rng.choose(&SHAPES).unwrap_or(d.shape),
            audio: self.rng.choose(&NOTES).unwrap_or(d.audio),
        }
    }
}

/// Replays a fixed list of stimuli, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Vec<Stimulus>,
    idx: usize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Stimulus>) -> Self {
        Self { script, idx: 0 }
    }

    /// Script that varies only the position; the other modalities stay at their defaults.
    pub fn positions(positions: &[u32]) -> Self {
        Self::new(
            positions
                .iter()
                .map(|&position| Stimulus {
                    position,
                    ..Stimulus::default()
                })
                .collect(),
        )
    }
}

impl StimulusSource for ScriptedSource {
    fn next_stimulus(&mut self, grid_size: u32) -> Stimulus {
        if self.script.is_empty() {
            return Stimulus::default();
        }
        let mut s = self.script[self.idx % self.script.len()];
        self.idx = self.idx.wrapping_add(1);

        // Keep positions on the grid even if the script was written for a larger one.
        let cells = grid_size.max(1).saturating_mul(grid_size.max(1));
        s.position %= cells;
        s
    }
}
