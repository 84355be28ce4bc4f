//! Pot state and brew records.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pot::additions::{check_additions, AdditionError, Additions, MILK_KEY};

/// What kind of vessel a pot is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotKind {
    Coffee,
    Teapot,
}

impl PotKind {
    /// URI scheme the registry files this kind under.
    pub fn scheme(&self) -> &'static str {
        match self {
            PotKind::Coffee => "coffee",
            PotKind::Teapot => "tea",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PotKind::Coffee => "coffee",
            PotKind::Teapot => "teapot",
        }
    }
}

/// Current activity of a pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PotStatus {
    #[default]
    Idle,
    Brewing,
    PouringMilk,
    Ready,
}

impl PotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PotStatus::Idle => "idle",
            PotStatus::Brewing => "brewing",
            PotStatus::PouringMilk => "pouring-milk",
            PotStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for PotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed brew. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewRecord {
    pub id: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub additions: Additions,
    pub status: &'static str,
}

/// Reasons a BREW is refused, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrewError {
    #[error("pot is a teapot")]
    Teapot,

    #[error("pot is empty")]
    Empty,

    #[error(transparent)]
    Additions(#[from] AdditionError),
}

/// Result of a WHEN request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenOutcome {
    /// Milk was pouring and has been stopped; the pot is brewing again.
    Stopped,
    /// Nothing was pouring; carries the untouched status.
    NotPouring(PotStatus),
}

/// Snapshot of a pot as rendered by status and registry listings.
#[derive(Debug, Clone, Serialize)]
pub struct PotSummary {
    pub pot_id: String,
    #[serde(rename = "type")]
    pub kind: PotKind,
    pub status: PotStatus,
    pub level: u32,
    pub capacity: u32,
    pub level_display: String,
    pub varieties: Vec<String>,
    pub brew_count: usize,
}

/// A coffee pot or teapot and its brew history.
#[derive(Debug, Clone)]
pub struct Pot {
    id: String,
    kind: PotKind,
    capacity: u32,
    level: u32,
    varieties: Vec<String>,
    status: PotStatus,
    history: Vec<BrewRecord>,
}

impl Pot {
    /// Create an idle pot. The level is clamped to the capacity.
    pub fn new(
        id: impl Into<String>,
        kind: PotKind,
        capacity: u32,
        level: u32,
        varieties: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            capacity,
            level: level.min(capacity),
            varieties,
            status: PotStatus::Idle,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> PotKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> PotStatus {
        self.status
    }

    pub fn history(&self) -> &[BrewRecord] {
        &self.history
    }

    /// Registry key, e.g. `coffee://pot-1` or `tea://kettle-1`.
    pub fn uri(&self) -> String {
        format!("{}://{}", self.kind.scheme(), self.id)
    }

    /// Set the level, clamped to the capacity. Returns the level applied.
    pub fn set_level(&mut self, level: u32) -> u32 {
        self.level = level.min(self.capacity);
        self.level
    }

    /// Brew one cup.
    ///
    /// Checks run in a fixed order: teapot, empty, then the additions. On
    /// success one record is appended, the level drops by one and the pot
    /// starts pouring milk if milk was asked for.
    pub fn brew(&mut self, additions: Additions) -> Result<&BrewRecord, BrewError> {
        if self.kind == PotKind::Teapot {
            return Err(BrewError::Teapot);
        }
        if self.level == 0 {
            return Err(BrewError::Empty);
        }
        check_additions(&additions)?;

        let has_milk = additions.contains_key(MILK_KEY);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();

        self.history.push(BrewRecord {
            id: self.history.len() as u64 + 1,
            timestamp,
            additions,
            status: "completed",
        });
        self.level -= 1;
        self.status = if has_milk {
            PotStatus::PouringMilk
        } else {
            PotStatus::Brewing
        };

        Ok(&self.history[self.history.len() - 1])
    }

    /// Stop the milk stream (RFC 2324 §2.1.3).
    pub fn stop_milk(&mut self) -> WhenOutcome {
        match self.status {
            PotStatus::PouringMilk => {
                self.status = PotStatus::Brewing;
                WhenOutcome::Stopped
            }
            other => WhenOutcome::NotPouring(other),
        }
    }

    pub fn summary(&self) -> PotSummary {
        PotSummary {
            pot_id: self.id.clone(),
            kind: self.kind,
            status: self.status,
            level: self.level,
            capacity: self.capacity,
            level_display: format!("{}/{} cups", self.level, self.capacity),
            varieties: self.varieties.clone(),
            brew_count: self.history.len(),
        }
    }
}
