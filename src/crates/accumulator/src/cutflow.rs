//! Ordered stage counters of one dataset and channel.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Event counts per cutflow stage, kept in the order stages were first seen.
///
/// Serialized as a JSON object whose keys appear in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cutflow {
    stages: Vec<(String, u64)>,
}

impl Cutflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to `stage`, appending the stage if it is new.
    pub fn add(&mut self, stage: &str, count: u64) {
        match self.stages.iter_mut().find(|(name, _)| name == stage) {
            Some((_, total)) => *total += count,
            None => self.stages.push((stage.to_string(), count)),
        }
    }

    pub fn merge_in(&mut self, other: &Cutflow) {
        for (stage, count) in &other.stages {
            self.add(stage, *count);
        }
    }

    pub fn get(&self, stage: &str) -> Option<u64> {
        self.stages
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, count)| *count)
    }

    pub fn counts(&self) -> Vec<u64> {
        self.stages.iter().map(|(_, count)| *count).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.stages.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether no stage counts more events than the one before it.
    pub fn is_monotone(&self) -> bool {
        self.stages.windows(2).all(|w| w[0].1 >= w[1].1)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Cutflow {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut cutflow = Cutflow::new();
        for (stage, count) in iter {
            cutflow.add(&stage.into(), count);
        }
        cutflow
    }
}

impl Serialize for Cutflow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len()))?;
        for (stage, count) in &self.stages {
            map.serialize_entry(stage, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cutflow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CutflowVisitor;

        impl<'de> Visitor<'de> for CutflowVisitor {
            type Value = Cutflow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of stage names to event counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Cutflow, A::Error> {
                let mut cutflow = Cutflow::new();
                while let Some((stage, count)) = map.next_entry::<String, u64>()? {
                    cutflow.add(&stage, count);
                }
                Ok(cutflow)
            }
        }

        deserializer.deserialize_map(CutflowVisitor)
    }
}
