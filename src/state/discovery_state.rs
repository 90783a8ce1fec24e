/// Discovery state definitions for the listing scroll loop
///
/// Each poll of the listing page reports the accumulated number of unique
/// links; the state machine decides whether to scroll again or stop.
use std::fmt;

/// Limits that govern one discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryPolicy {
    /// Number of unique links wanted
    pub target: usize,

    /// Maximum number of polls before giving up
    pub max_polls: u32,
}

/// Represents where a discovery run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryState {
    // ===== Active State =====
    /// Still polling; `polls` completed so far, `last_total` seen on the latest poll
    Iterating { polls: u32, last_total: Option<usize> },

    // ===== Terminal States =====
    /// Enough unique links were collected
    TargetReached { polls: u32 },

    /// A poll added nothing new; the listing is exhausted
    Converged { polls: u32 },

    /// The poll limit was hit before either of the above
    Capped { polls: u32 },
}

impl DiscoveryState {
    /// The state before the first poll
    ///
    /// A zero target is already satisfied and needs no polling.
    pub fn start(policy: &DiscoveryPolicy) -> Self {
        if policy.target == 0 {
            Self::TargetReached { polls: 0 }
        } else {
            Self::Iterating {
                polls: 0,
                last_total: None,
            }
        }
    }

    /// Advances the machine with the total unique links after one more poll
    ///
    /// Transition order: target reached, then convergence, then the poll cap.
    /// Terminal states absorb further observations.
    pub fn observe(self, total: usize, policy: &DiscoveryPolicy) -> Self {
        let (polls, last_total) = match self {
            Self::Iterating { polls, last_total } => (polls + 1, last_total),
            terminal => return terminal,
        };

        if total >= policy.target {
            Self::TargetReached { polls }
        } else if last_total == Some(total) {
            Self::Converged { polls }
        } else if polls >= policy.max_polls {
            Self::Capped { polls }
        } else {
            Self::Iterating {
                polls,
                last_total: Some(total),
            }
        }
    }

    /// Returns true once no further polling should happen
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Iterating { .. })
    }

    /// Number of polls performed so far
    pub fn polls(&self) -> u32 {
        match *self {
            Self::Iterating { polls, .. }
            | Self::TargetReached { polls }
            | Self::Converged { polls }
            | Self::Capped { polls } => polls,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iterating { .. } => "iterating",
            Self::TargetReached { .. } => "target_reached",
            Self::Converged { .. } => "converged",
            Self::Capped { .. } => "capped",
        }
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} poll(s)", self.as_str(), self.polls())
    }
}
