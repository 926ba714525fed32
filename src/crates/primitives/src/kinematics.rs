//! Four-vector arithmetic for reconstructed objects.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::particle::Particle;

/// Cartesian four-momentum `(E, px, py, pz)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    pub fn from_pt_eta_phi_e(pt: f64, eta: f64, phi: f64, e: f64) -> Self {
        Self {
            e,
            px: pt * phi.cos(),
            py: pt * phi.sin(),
            pz: pt * eta.sinh(),
        }
    }

    /// `E² − |p|²`, which may be slightly negative due to cancellation.
    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass, clamped so that a negative `mass_squared` gives 0.
    pub fn mass(&self) -> f64 {
        self.mass_squared().max(0.0).sqrt()
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: Self) -> Self::Output {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourMomentum::default(), Add::add)
    }
}

/// Invariant mass of the system formed by `particles`.
///
/// Returns `None` for fewer than two objects: the mass is undefined and must
/// fail any window test rather than count as zero.
pub fn invariant_mass(particles: &[Particle]) -> Option<f64> {
    if particles.len() < 2 {
        return None;
    }
    let total: FourMomentum = particles.iter().map(Particle::four_momentum).sum();
    Some(total.mass())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_back_to_back_pair() {
        // Two massless objects back to back in the transverse plane: m = 2 * pt.
        let a = Particle::new(45.5, 0.0, 0.0, 45.5);
        let b = Particle::new(45.5, 0.0, std::f64::consts::PI, 45.5);
        let m = invariant_mass(&[a, b]).unwrap();
        assert!((m - 91.0).abs() < TOLERANCE, "mass was {m}");
    }

    #[test]
    fn test_forward_pair_uses_sinh_eta() {
        let eta: f64 = 1.3;
        let pt = 20.0;
        let e = pt * eta.cosh();
        let a = Particle::new(pt, eta, 0.5, e);
        let b = Particle::new(pt, -eta, 0.5 + std::f64::consts::PI, e);
        // Longitudinal momenta cancel, transverse momenta cancel.
        let m = invariant_mass(&[a, b]).unwrap();
        assert!((m - 2.0 * e).abs() < 1e-6);
    }

    #[test]
    fn test_negative_mass_squared_clamps_to_zero() {
        let p = FourMomentum::new(10.0, 10.0, 1e-3, 0.0);
        assert!(p.mass_squared() < 0.0);
        assert_eq!(p.mass(), 0.0);

        // Collinear massless objects whose energies are rounded slightly low.
        let a = Particle::new(50.0, 0.7, 1.1, 50.0 * 0.7f64.cosh() * (1.0 - 1e-12));
        let b = Particle::new(30.0, 0.7, 1.1, 30.0 * 0.7f64.cosh() * (1.0 - 1e-12));
        let total = a.four_momentum() + b.four_momentum();
        assert!(total.mass_squared() < 0.0);
        assert_eq!(invariant_mass(&[a, b]), Some(0.0));
    }

    #[test]
    fn test_fewer_than_two_objects_is_undefined() {
        assert_eq!(invariant_mass(&[]), None);
        assert_eq!(invariant_mass(&[Particle::new(40.0, 0.0, 0.0, 40.0)]), None);
    }

    #[test]
    fn test_three_body_mass() {
        let parts = [
            Particle::new(10.0, 0.0, 0.0, 10.0),
            Particle::new(10.0, 0.0, 2.0 * std::f64::consts::PI / 3.0, 10.0),
            Particle::new(10.0, 0.0, 4.0 * std::f64::consts::PI / 3.0, 10.0),
        ];
        let m = invariant_mass(&parts).unwrap();
        assert!((m - 30.0).abs() < 1e-9);
    }
}
