//! Unit constants
//!
//! Two unit systems are supported:
//! - `Si`: kg, m, s
//! - `Astronomical`: solar masses, AU, Julian years, where `G = 4 pi^2`

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const G_SI: f64 = 6.674_30e-11; // m^3 kg^-1 s^-2
pub const G_ASTRO: f64 = 4.0 * PI * PI; // AU^3 Msun^-1 yr^-2

pub const SOLAR_MASS: f64 = 1.988_92e30; // kg
pub const AU: f64 = 1.495_978_707e11; // m
pub const DAY: f64 = 86_400.0; // s
pub const YEAR: f64 = 365.25 * DAY; // Julian year, s

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[serde(rename = "si")]
    Si,

    #[default]
    #[serde(rename = "astronomical", alias = "astro")]
    Astronomical,
}

impl UnitSystem {
    pub fn gravitational_constant(&self) -> f64 {
        match self {
            UnitSystem::Si => G_SI,
            UnitSystem::Astronomical => G_ASTRO,
        }
    }

    /// One solar mass in this system's mass unit
    pub fn solar_mass(&self) -> f64 {
        match self {
            UnitSystem::Si => SOLAR_MASS,
            UnitSystem::Astronomical => 1.0,
        }
    }

    /// One AU in this system's length unit
    pub fn au(&self) -> f64 {
        match self {
            UnitSystem::Si => AU,
            UnitSystem::Astronomical => 1.0,
        }
    }

    /// One Julian year in this system's time unit
    pub fn year(&self) -> f64 {
        match self {
            UnitSystem::Si => YEAR,
            UnitSystem::Astronomical => 1.0,
        }
    }
}
