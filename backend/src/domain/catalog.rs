//! Per-user fluid and pipe-material catalogs.

use std::collections::BTreeMap;

/// Physical properties of a custom fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidProperties {
    /// Density in kg/m³.
    pub density: f64,
    /// Kinematic viscosity in m²/s.
    pub kinematic_viscosity: f64,
    /// Vapour pressure in kPa; `None` for entries saved before the column
    /// existed.
    pub vapor_pressure_kpa: Option<f64>,
}

/// A fluid about to be added; every new entry carries a vapour pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewFluid {
    /// Density in kg/m³.
    pub density: f64,
    /// Kinematic viscosity in m²/s.
    pub kinematic_viscosity: f64,
    /// Vapour pressure in kPa.
    pub vapor_pressure_kpa: f64,
}

impl NewFluid {
    pub const fn new(density: f64, kinematic_viscosity: f64, vapor_pressure_kpa: f64) -> Self {
        Self {
            density,
            kinematic_viscosity,
            vapor_pressure_kpa,
        }
    }
}

impl From<NewFluid> for FluidProperties {
    fn from(fluid: NewFluid) -> Self {
        Self {
            density: fluid.density,
            kinematic_viscosity: fluid.kinematic_viscosity,
            vapor_pressure_kpa: Some(fluid.vapor_pressure_kpa),
        }
    }
}

/// A user's fluids keyed by fluid name.
pub type FluidCatalog = BTreeMap<String, FluidProperties>;

/// A user's pipe materials keyed by material name, valued by absolute
/// roughness.
pub type MaterialCatalog = BTreeMap<String, f64>;
