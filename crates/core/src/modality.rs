//! Modalities and the per-modality containers used by scoring and responses.

use crate::error::NBackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One independent stimulus channel the player can be tested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Position,
    Color,
    Letter,
    Number,
    Shape,
    Audio,
}

impl Modality {
    pub const COUNT: usize = 6;

    /// Canonical order; sets and tallies iterate in this order.
    pub const ALL: [Modality; Modality::COUNT] = [
        Modality::Position,
        Modality::Color,
        Modality::Letter,
        Modality::Number,
        Modality::Shape,
        Modality::Audio,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Modality::Position => "position",
            Modality::Color => "color",
            Modality::Letter => "letter",
            Modality::Number => "number",
            Modality::Shape => "shape",
            Modality::Audio => "audio",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modality {
    type Err = NBackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Modality::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| NBackError::UnknownModality(s.to_string()))
    }
}

/// Set of active modalities, backed by a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Modality>", into = "Vec<Modality>")]
pub struct ModalitySet {
    bits: u8,
}

impl ModalitySet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        Modality::ALL.into_iter().collect()
    }

    #[inline]
    fn bit(m: Modality) -> u8 {
        1u8 << m.index()
    }

    /// Returns `true` if `m` was not already present.
    pub fn insert(&mut self, m: Modality) -> bool {
        let fresh = !self.contains(m);
        self.bits |= Self::bit(m);
        fresh
    }

    #[inline]
    pub fn contains(&self, m: Modality) -> bool {
        self.bits & Self::bit(m) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> Iter {
        Iter { set: *self, next: 0 }
    }
}

/// Members of a [`ModalitySet`] in canonical order.
#[derive(Debug, Clone)]
pub struct Iter {
    set: ModalitySet,
    next: usize,
}

impl Iterator for Iter {
    type Item = Modality;

    fn next(&mut self) -> Option<Modality> {
        while let Some(&m) = Modality::ALL.get(self.next) {
            self.next += 1;
            if self.set.contains(m) {
                return Some(m);
            }
        }
        None
    }
}

impl IntoIterator for ModalitySet {
    type Item = Modality;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl IntoIterator for &ModalitySet {
    type Item = Modality;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl FromIterator<Modality> for ModalitySet {
    fn from_iter<I: IntoIterator<Item = Modality>>(iter: I) -> Self {
        let mut set = ModalitySet::empty();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl From<Vec<Modality>> for ModalitySet {
    fn from(v: Vec<Modality>) -> Self {
        v.into_iter().collect()
    }
}

impl From<ModalitySet> for Vec<Modality> {
    fn from(set: ModalitySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for ModalitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for m in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(m.name())?;
        }
        Ok(())
    }
}

/// Fixed mapping from every [`Modality`] to a `T`.
///
/// Response and score bookkeeping index through this instead of carrying one
/// field per modality, so the round logic is written once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerModality<T>([T; Modality::COUNT]);

impl<T: Copy> PerModality<T> {
    pub fn splat(value: T) -> Self {
        Self([value; Modality::COUNT])
    }
}

impl<T> PerModality<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Modality, &T)> {
        Modality::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Modality> for PerModality<T> {
    type Output = T;

    #[inline]
    fn index(&self, m: Modality) -> &T {
        &self.0[m.index()]
    }
}

impl<T> IndexMut<Modality> for PerModality<T> {
    #[inline]
    fn index_mut(&mut self, m: Modality) -> &mut T {
        &mut self.0[m.index()]
    }
}
