//! Registry of configured bucket durations.

use std::collections::BTreeMap;

use crate::{BucketDuration, RegistryError};

/// The fixed set of bucket durations every tick is folded into.
///
/// Built once at startup and read-only afterwards. Construction rejects an
/// empty set and a decision duration that is not also a bucketing duration,
/// so a registry that exists is always usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationRegistry {
    durations: BTreeMap<String, BucketDuration>,
    decision: BucketDuration,
}

impl DurationRegistry {
    /// Creates a registry from `(label, duration)` pairs and a decision duration.
    ///
    /// # Errors
    ///
    /// Returns an error if `entries` is empty, a label repeats, or `decision`
    /// is not among the entries.
    pub fn new<I, S>(entries: I, decision: BucketDuration) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, BucketDuration)>,
        S: Into<String>,
    {
        let mut durations = BTreeMap::new();
        for (label, duration) in entries {
            let label = label.into();
            if durations.insert(label.clone(), duration).is_some() {
                return Err(RegistryError::DuplicateLabel(label));
            }
        }

        if durations.is_empty() {
            return Err(RegistryError::Empty);
        }
        if !durations.values().any(|d| *d == decision) {
            return Err(RegistryError::DecisionNotRegistered(decision));
        }

        Ok(Self {
            durations,
            decision,
        })
    }

    /// Parses a registry from duration labels such as `["1s", "1m", "1h"]`.
    ///
    /// Each label is stored in its canonical form.
    ///
    /// # Errors
    ///
    /// Returns an error if any label is invalid or the registry rules fail.
    pub fn from_labels<I, S>(labels: I, decision: &str) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = labels
            .into_iter()
            .map(|label| {
                let duration: BucketDuration = label.as_ref().parse()?;
                Ok((duration.label(), duration))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        let decision: BucketDuration = decision.parse()?;
        Self::new(entries, decision)
    }

    /// Looks up a duration by label.
    ///
    /// Falls back to parsing the label, so `"60s"` finds the `1m` entry.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<BucketDuration> {
        self.durations.get(label).copied().or_else(|| {
            let parsed: BucketDuration = label.parse().ok()?;
            self.contains(parsed).then_some(parsed)
        })
    }

    /// Returns true if `duration` is one of the bucketing durations.
    #[must_use]
    pub fn contains(&self, duration: BucketDuration) -> bool {
        self.durations.values().any(|d| *d == duration)
    }

    /// Returns the duration whose new buckets gate the decision hook.
    #[must_use]
    pub const fn decision(&self) -> BucketDuration {
        self.decision
    }

    /// Returns true if `duration` is the decision duration.
    #[must_use]
    pub fn is_decision(&self, duration: BucketDuration) -> bool {
        self.decision == duration
    }

    /// Returns `(label, duration)` pairs ordered by label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, BucketDuration)> {
        self.durations.iter().map(|(label, d)| (label.as_str(), *d))
    }

    /// Returns the bucketing durations, shortest first.
    #[must_use]
    pub fn durations(&self) -> Vec<BucketDuration> {
        let mut durations: Vec<_> = self.durations.values().copied().collect();
        durations.sort_unstable();
        durations.dedup();
        durations
    }

    /// Returns the number of configured labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Always false; an empty registry cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

impl Default for DurationRegistry {
    /// Second, minute and hour buckets, deciding on the minute.
    fn default() -> Self {
        let entries = [
            BucketDuration::SECOND,
            BucketDuration::MINUTE,
            BucketDuration::HOUR,
        ]
        .map(|d| (d.label(), d));
        Self {
            durations: entries.into_iter().collect(),
            decision: BucketDuration::MINUTE,
        }
    }
}
