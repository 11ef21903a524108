//! Material (batch) model
//!
//! A `Material` is the discretized unit of physical resource flowing through
//! the simulation: a non-negative mass tagged with the recipe it matches and
//! the commodity it trades as. Batches are created by production or inbound
//! shipment and destroyed when fully consumed or shipped.
//!
//! Ownership discipline: a batch lives in exactly one ledger at a time.
//! Moving material between ledgers transfers the value; it is never copied.
//!
//! CRITICAL: All masses are f64 and compared against `MASS_EPSILON`.

use crate::models::commodity::{Commodity, Recipe};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance below which a mass is treated as zero.
pub const MASS_EPSILON: f64 = 1e-9;

/// Errors that can occur during material operations
#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    #[error("material mass must be finite and non-negative, got {mass}")]
    InvalidMass { mass: f64 },

    #[error("split of {requested} exceeds batch mass {available}")]
    SplitExceedsMass { requested: f64, available: f64 },
}

/// A batch of physical material
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, Material, Recipe};
///
/// let recipe = Recipe::new("uox", vec![("u".to_string(), 1.0)]).unwrap();
/// let batch = Material::new(10.0, recipe, Commodity::new("fresh_fuel")).unwrap();
/// assert_eq!(batch.mass(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Batch mass (non-negative)
    mass: f64,

    /// Composition template this batch matches
    recipe: Recipe,

    /// Commodity this batch trades as
    commodity: Commodity,
}

impl Material {
    /// Create a batch, validating the mass
    pub fn new(mass: f64, recipe: Recipe, commodity: Commodity) -> Result<Self, MaterialError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(MaterialError::InvalidMass { mass });
        }
        Ok(Self {
            mass,
            recipe,
            commodity,
        })
    }

    /// Batch mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Composition template this batch matches
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Commodity this batch trades as
    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    /// Whether the batch has been reduced to (effectively) zero mass
    pub fn is_depleted(&self) -> bool {
        self.mass <= MASS_EPSILON
    }

    /// Split off `mass` from this batch into a new batch
    ///
    /// The new batch carries the same recipe and commodity. The remainder
    /// stays in `self`. Used by FIFO withdrawal when an order consumes part
    /// of a batch.
    pub fn split(&mut self, mass: f64) -> Result<Material, MaterialError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(MaterialError::InvalidMass { mass });
        }
        if mass > self.mass + MASS_EPSILON {
            return Err(MaterialError::SplitExceedsMass {
                requested: mass,
                available: self.mass,
            });
        }

        let taken = mass.min(self.mass);
        self.mass -= taken;
        Ok(Self {
            mass: taken,
            recipe: self.recipe.clone(),
            commodity: self.commodity.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_material(mass: f64) -> Material {
        let recipe = Recipe::new("uox", vec![("u".to_string(), 1.0)]).unwrap();
        Material::new(mass, recipe, Commodity::new("fresh_fuel")).unwrap()
    }

    #[test]
    fn test_material_creation() {
        let batch = test_material(12.5);
        assert_eq!(batch.mass(), 12.5);
        assert_eq!(batch.commodity().name(), "fresh_fuel");
        assert!(!batch.is_depleted());
    }

    #[test]
    fn test_negative_mass_rejected() {
        let recipe = Recipe::new("uox", vec![("u".to_string(), 1.0)]).unwrap();
        let result = Material::new(-1.0, recipe, Commodity::new("fresh_fuel"));
        assert!(matches!(result, Err(MaterialError::InvalidMass { .. })));
    }

    #[test]
    fn test_split_conserves_mass() {
        let mut batch = test_material(10.0);
        let taken = batch.split(4.0).unwrap();

        assert_eq!(taken.mass(), 4.0);
        assert_eq!(batch.mass(), 6.0);
        assert_eq!(taken.recipe().name(), batch.recipe().name());
    }

    #[test]
    fn test_split_to_zero_depletes() {
        let mut batch = test_material(3.0);
        let taken = batch.split(3.0).unwrap();

        assert_eq!(taken.mass(), 3.0);
        assert!(batch.is_depleted());
    }

    #[test]
    fn test_split_exceeding_mass_rejected() {
        let mut batch = test_material(2.0);
        let result = batch.split(5.0);
        assert!(matches!(
            result,
            Err(MaterialError::SplitExceedsMass { .. })
        ));
        // Failed split leaves the batch untouched
        assert_eq!(batch.mass(), 2.0);
    }
}
