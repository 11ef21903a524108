//! Commodity and recipe definitions
//!
//! A `Commodity` is a named category of tradeable resource (e.g. "fresh
//! fuel"). A `Recipe` is the fixed composition template that material of a
//! commodity must match. Both are identity types: immutable once defined,
//! compared by name.
//!
//! Recipes are validated at construction; a facility never sees a recipe
//! whose component fractions do not form a proper composition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for composition fraction sums.
const FRACTION_TOLERANCE: f64 = 1e-6;

/// Named category of tradeable resource
///
/// Identity only: two commodities are the same exactly when their names are.
///
/// # Example
/// ```
/// use material_sim_core::Commodity;
///
/// let fuel = Commodity::new("fresh_fuel");
/// assert_eq!(fuel.name(), "fresh_fuel");
/// assert_eq!(fuel, Commodity::new("fresh_fuel"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commodity(String);

impl Commodity {
    /// Create a commodity from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Commodity name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while defining a recipe
#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("recipe '{recipe}' has no components")]
    EmptyComposition { recipe: String },

    #[error("recipe '{recipe}' component '{component}' has non-positive fraction {fraction}")]
    NonPositiveFraction {
        recipe: String,
        component: String,
        fraction: f64,
    },

    #[error("recipe '{recipe}' component fractions sum to {sum}, expected 1.0")]
    UnnormalizedComposition { recipe: String, sum: f64 },
}

/// Fixed composition template for material
///
/// Each component is a `(name, mass_fraction)` pair; fractions must be
/// positive and sum to 1.0. Recipes are compared by name everywhere a
/// facility validates incoming material.
///
/// # Example
/// ```
/// use material_sim_core::Recipe;
///
/// let uox = Recipe::new(
///     "uox_fresh",
///     vec![("u235".to_string(), 0.04), ("u238".to_string(), 0.96)],
/// )
/// .unwrap();
/// assert_eq!(uox.name(), "uox_fresh");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe identifier, unique within a scenario
    name: String,

    /// Component mass fractions, in declaration order
    composition: Vec<(String, f64)>,
}

impl Recipe {
    /// Define a recipe, validating its composition
    pub fn new(
        name: impl Into<String>,
        composition: Vec<(String, f64)>,
    ) -> Result<Self, RecipeError> {
        let name = name.into();

        if composition.is_empty() {
            return Err(RecipeError::EmptyComposition { recipe: name });
        }

        for (component, fraction) in &composition {
            if *fraction <= 0.0 {
                return Err(RecipeError::NonPositiveFraction {
                    recipe: name,
                    component: component.clone(),
                    fraction: *fraction,
                });
            }
        }

        let sum: f64 = composition.iter().map(|(_, f)| f).sum();
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(RecipeError::UnnormalizedComposition { recipe: name, sum });
        }

        Ok(Self { name, composition })
    }

    /// Recipe name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component mass fractions, in declaration order
    pub fn composition(&self) -> &[(String, f64)] {
        &self.composition
    }

    /// Whether two recipes denote the same composition template
    ///
    /// Recipes are identity types: equality of names is equality of recipes.
    pub fn matches(&self, other: &Recipe) -> bool {
        self.name == other.name
    }
}
