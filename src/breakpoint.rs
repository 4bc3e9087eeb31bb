//! Responsive breakpoints
//!
//! The engine computes every breakpoint independently. [`Bps`] is a total
//! record with one value per breakpoint; [`Responsive`] is the authoring-side
//! choice between a single value for all breakpoints and an explicit,
//! possibly partial, per-breakpoint map.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// One of the five fixed responsive breakpoints, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a breakpoint name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown breakpoint '{0}' (expected one of xs, sm, md, lg, xl)")]
pub struct UnknownBreakpoint(pub String);

impl FromStr for Breakpoint {
    type Err = UnknownBreakpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bp| bp.as_str() == s)
            .ok_or_else(|| UnknownBreakpoint(s.to_string()))
    }
}

/// A value for every breakpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Bps<T>([T; 5]);

impl<T> Bps<T> {
    /// Build a record by computing each breakpoint's value
    pub fn from_fn(mut f: impl FnMut(Breakpoint) -> T) -> Self {
        Bps(std::array::from_fn(|i| f(Breakpoint::ALL[i])))
    }

    /// Iterate `(breakpoint, value)` pairs, smallest breakpoint first
    pub fn iter(&self) -> impl Iterator<Item = (Breakpoint, &T)> {
        Breakpoint::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Breakpoint, &mut T)> {
        Breakpoint::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn map<U>(self, mut f: impl FnMut(Breakpoint, T) -> U) -> Bps<U> {
        let mut i = 0;
        Bps(self.0.map(|value| {
            let bp = Breakpoint::ALL[i];
            i += 1;
            f(bp, value)
        }))
    }
}

impl<T: Clone> Bps<T> {
    /// Same value at every breakpoint
    pub fn splat(value: T) -> Self {
        Bps::from_fn(|_| value.clone())
    }
}

impl<T: Default> Default for Bps<T> {
    fn default() -> Self {
        Bps::from_fn(|_| T::default())
    }
}

impl<T> Index<Breakpoint> for Bps<T> {
    type Output = T;

    fn index(&self, bp: Breakpoint) -> &T {
        &self.0[bp.index()]
    }
}

impl<T> IndexMut<Breakpoint> for Bps<T> {
    fn index_mut(&mut self, bp: Breakpoint) -> &mut T {
        &mut self.0[bp.index()]
    }
}

impl<T: Serialize> Serialize for Bps<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (bp, value) in self.iter() {
            map.serialize_entry(bp.as_str(), value)?;
        }
        map.end()
    }
}

/// Either one value for all breakpoints or an explicit per-breakpoint map
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Responsive<T> {
    Uniform(T),
    PerBreakpoint(BTreeMap<Breakpoint, T>),
}

impl<T> Responsive<T> {
    /// Value that applies at `bp`, if any
    pub fn at(&self, bp: Breakpoint) -> Option<&T> {
        match self {
            Responsive::Uniform(value) => Some(value),
            Responsive::PerBreakpoint(map) => map.get(&bp),
        }
    }
}

impl<T> From<T> for Responsive<T> {
    fn from(value: T) -> Self {
        Responsive::Uniform(value)
    }
}
