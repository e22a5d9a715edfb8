use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// whether a segment may count as its own sidepath. a sample point always lies
/// on its own segment, so under [`SelfMatchPolicy::Include`] every sampled
/// segment is reported as having a sidepath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatchPolicy {
    #[default]
    Include,
    Exclude,
}

impl SelfMatchPolicy {
    pub fn accepts(&self, sampled: usize, candidate: usize) -> bool {
        match self {
            SelfMatchPolicy::Include => true,
            SelfMatchPolicy::Exclude => sampled != candidate,
        }
    }
}

impl Display for SelfMatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelfMatchPolicy::Include => write!(f, "include"),
            SelfMatchPolicy::Exclude => write!(f, "exclude"),
        }
    }
}
