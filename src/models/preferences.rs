use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};

use super::CategoryId;

/// Per-client interaction counts by category
///
/// Stored as a JSON object keyed by the stringified category id, e.g. `{"28": 3}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PreferenceCounter(HashMap<CategoryId, u64>);

impl PreferenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interaction count for a category, zero when never seen
    pub fn score(&self, id: CategoryId) -> u64 {
        self.0.get(&id).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, id: CategoryId) {
        *self.0.entry(id).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn apply_decay(&mut self, policy: DecayPolicy) {
        match policy {
            DecayPolicy::None => {}
            DecayPolicy::Cap(max) => {
                for count in self.0.values_mut() {
                    *count = (*count).min(max);
                }
            }
            DecayPolicy::HalveAbove(threshold) => {
                if self.0.values().any(|&count| count > threshold) {
                    for count in self.0.values_mut() {
                        *count /= 2;
                    }
                    self.0.retain(|_, count| *count > 0);
                }
            }
        }
    }
}

impl FromIterator<(CategoryId, u64)> for PreferenceCounter {
    fn from_iter<I: IntoIterator<Item = (CategoryId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How the preference counter is kept from growing without bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecayPolicy {
    /// Counts grow forever
    #[default]
    None,
    /// Each count is clamped at the given maximum
    Cap(u64),
    /// All counts are halved once any count exceeds the threshold
    HalveAbove(u64),
}

impl FromStr for DecayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s.is_empty() || s == "none" {
            return Ok(DecayPolicy::None);
        }

        let (name, value) = s
            .split_once(':')
            .ok_or_else(|| format!("Unknown decay policy '{}'", s))?;
        let value: u64 = value
            .parse()
            .map_err(|_| format!("Invalid decay threshold '{}'", value))?;
        if value == 0 {
            return Err("Decay threshold must be positive".to_string());
        }

        match name {
            "cap" => Ok(DecayPolicy::Cap(value)),
            "halve" => Ok(DecayPolicy::HalveAbove(value)),
            _ => Err(format!("Unknown decay policy '{}'", name)),
        }
    }
}
