use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinematics::FourMomentum;

/// A reconstructed physics object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    pub charge: Option<f64>,
}

impl Particle {
    pub fn new(pt: f64, eta: f64, phi: f64, energy: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            energy,
            charge: None,
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn four_momentum(&self) -> FourMomentum {
        FourMomentum::from_pt_eta_phi_e(self.pt, self.eta, self.phi, self.energy)
    }

    pub(crate) fn attribute(&self, attr: Attribute) -> f64 {
        match attr {
            Attribute::Pt => self.pt,
            Attribute::Eta => self.eta,
            Attribute::Phi => self.phi,
            Attribute::Energy => self.energy,
            Attribute::Charge => self.charge.unwrap_or(0.0),
        }
    }
}

/// The selected objects of one event, in their original order.
pub type ParticleCollection = Vec<Particle>;

/// Per-object attribute stored as a jagged column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Pt,
    Eta,
    Phi,
    Energy,
    Charge,
}

impl Attribute {
    pub fn suffix(&self) -> &'static str {
        match self {
            Attribute::Pt => "pt",
            Attribute::Eta => "eta",
            Attribute::Phi => "phi",
            Attribute::Energy => "e",
            Attribute::Charge => "charge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Muon,
    Electron,
    Jet,
}

const CHARGED: &[Attribute] = &[
    Attribute::Pt,
    Attribute::Eta,
    Attribute::Phi,
    Attribute::Energy,
    Attribute::Charge,
];
const NEUTRAL: &[Attribute] = &[
    Attribute::Pt,
    Attribute::Eta,
    Attribute::Phi,
    Attribute::Energy,
];

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [ObjectKind::Muon, ObjectKind::Electron, ObjectKind::Jet];

    /// Branch-name prefix in the event schema.
    pub fn prefix(&self) -> &'static str {
        match self {
            ObjectKind::Muon => "muon",
            ObjectKind::Electron => "ele",
            ObjectKind::Jet => "jet",
        }
    }

    /// Jets carry no charge branch.
    pub fn has_charge(&self) -> bool {
        !matches!(self, ObjectKind::Jet)
    }

    pub fn attributes(&self) -> &'static [Attribute] {
        if self.has_charge() { CHARGED } else { NEUTRAL }
    }

    pub fn field(&self, attr: Attribute) -> String {
        format!("{}_{}", self.prefix(), attr.suffix())
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
