//! Analysis channels and their cutflow stage names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particle::ObjectKind;

/// Name of the first cutflow stage of every channel.
pub const ALL_EVENTS: &str = "all_events";
/// Name of the last cutflow stage of every channel.
pub const SIGNAL_REGION: &str = "SR";

/// One analysis-defined final state.
///
/// Serialized by its short tag (`mm`, `ee`, `jj`), which is also the suffix
/// used for yield keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "mm", alias = "dimuon")]
    Dimuon,
    #[serde(rename = "ee", alias = "dielectron")]
    Dielectron,
    #[serde(rename = "jj", alias = "dijet")]
    Dijet,
}

/// Threshold keys a channel reads from the selection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdKeys {
    pub mass_min: &'static str,
    pub mass_max: &'static str,
    pub met_min: &'static str,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Dimuon, Channel::Dielectron, Channel::Dijet];

    pub fn tag(&self) -> &'static str {
        match self {
            Channel::Dimuon => "mm",
            Channel::Dielectron => "ee",
            Channel::Dijet => "jj",
        }
    }

    /// The object kind whose pair defines the channel.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Channel::Dimuon => ObjectKind::Muon,
            Channel::Dielectron => ObjectKind::Electron,
            Channel::Dijet => ObjectKind::Jet,
        }
    }

    /// Stage names in cut order: all events, object count, mass window,
    /// signal region.
    pub fn stages(&self) -> [&'static str; 4] {
        match self {
            Channel::Dimuon => [ALL_EVENTS, "2_muons", "Z_window", SIGNAL_REGION],
            Channel::Dielectron => [ALL_EVENTS, "2_electrons", "Z_window", SIGNAL_REGION],
            Channel::Dijet => [ALL_EVENTS, "2_jets", "Mjj_window", SIGNAL_REGION],
        }
    }

    pub fn threshold_keys(&self) -> ThresholdKeys {
        match self {
            Channel::Dimuon => ThresholdKeys {
                mass_min: "z_mass_min_mm",
                mass_max: "z_mass_max_mm",
                met_min: "met_min_mm",
            },
            Channel::Dielectron => ThresholdKeys {
                mass_min: "z_mass_min_ee",
                mass_max: "z_mass_max_ee",
                met_min: "met_min_ee",
            },
            Channel::Dijet => ThresholdKeys {
                mass_min: "mjj_min",
                mass_max: "mjj_max",
                met_min: "met_min_jj",
            },
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Channel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" | "dimuon" => Ok(Channel::Dimuon),
            "ee" | "dielectron" => Ok(Channel::Dielectron),
            "jj" | "dijet" => Ok(Channel::Dijet),
            other => Err(ConfigError::UnknownChannel(other.to_string())),
        }
    }
}
