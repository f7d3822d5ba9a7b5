use std::fmt;

use serde::{Deserialize, Serialize};

/// One screen of the enrollment flow, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepId {
    #[serde(rename = "step-1")]
    Student,
    #[serde(rename = "step-2")]
    Academic,
    #[serde(rename = "step-3")]
    Address,
    #[serde(rename = "review")]
    Review,
}

impl StepId {
    /// The fixed, linear step sequence.
    pub const SEQUENCE: [StepId; 4] = [Self::Student, Self::Academic, Self::Address, Self::Review];

    /// Route name used by the navigation surface.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Student => "step-1",
            Self::Academic => "step-2",
            Self::Address => "step-3",
            Self::Review => "review",
        }
    }

    pub fn from_route(route: &str) -> Option<Self> {
        let route = route.trim().trim_start_matches("/enroll/").trim_matches('/');
        Self::SEQUENCE.into_iter().find(|s| s.route() == route)
    }

    /// Short label shown in progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Academic => "Academic",
            Self::Address => "Address",
            Self::Review => "Review",
        }
    }

    /// Zero-based position in [`StepId::SEQUENCE`].
    pub fn index(&self) -> usize {
        match self {
            Self::Student => 0,
            Self::Academic => 1,
            Self::Address => 2,
            Self::Review => 3,
        }
    }

    /// The following step. Review is last and maps to itself.
    pub fn next(&self) -> Self {
        Self::SEQUENCE
            .get(self.index() + 1)
            .copied()
            .unwrap_or(Self::Review)
    }

    /// The preceding step, if any.
    pub fn previous(&self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::SEQUENCE.get(i).copied())
    }

    /// `(index + 1) / 4`: 0.25 on the first step, 1.0 on review.
    pub fn progress_fraction(&self) -> f64 {
        (self.index() + 1) as f64 / Self::SEQUENCE.len() as f64
    }
}

impl fmt::Display for StepId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.route())
    }
}
