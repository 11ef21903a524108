//! Simulation configuration
//!
//! Two layers, following the configuration-collaborator boundary:
//! - `SimulationConfig` is the typed, fully resolved configuration the
//!   engine consumes; recipes and commodities are concrete values.
//! - `ScenarioFile` is the serde-facing shape of a JSON scenario: recipes
//!   and commodities are declared once in a table and referenced by name.
//!   `resolve()` checks every reference and produces a `SimulationConfig`;
//!   a dangling name is a configuration error and the simulation does not
//!   start.
//!
//! Operational windows accept either absolute months or (year, month) date
//! pairs relative to the simulation start, mirroring the
//! construction/operation/license date fields facilities are described with.

use crate::facility::{ConverterSpec, OperationalWindow, StorageSpec};
use crate::models::commodity::{Commodity, Recipe};
use crate::models::material::Material;
use crate::scheduler::engine::SimulationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Fully resolved, typed configuration for one simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of months to simulate
    pub months: u32,

    /// Id of the market resolver node at the hierarchy root
    pub market: String,

    /// Interior hierarchy links: (child, parent)
    pub hierarchy: Vec<(String, String)>,

    /// Per-facility configuration, in registration order
    pub facilities: Vec<FacilityConfig>,
}

/// Configuration for a single facility
#[derive(Debug, Clone)]
pub struct FacilityConfig {
    /// Unique facility identifier
    pub id: String,

    /// Hierarchy parent (institution or region)
    pub parent: String,

    /// Months during which the facility operates
    pub window: OperationalWindow,

    /// Policy selection, closed set
    pub policy: FacilityPolicyConfig,

    /// Material seeded into stocks before the first month
    pub initial_stocks: Vec<Material>,
}

/// Policy selection for a facility
///
/// The set of policies is closed and known at compile time; there is no
/// runtime registration.
#[derive(Debug, Clone)]
pub enum FacilityPolicyConfig {
    Converter(ConverterSpec),
    Storage(StorageSpec),
}

impl SimulationConfig {
    /// Parse and resolve a JSON scenario
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let scenario: ScenarioFile = serde_json::from_str(json)
            .map_err(|e| SimulationError::InvalidConfig(format!("scenario parse error: {e}")))?;
        scenario.resolve()
    }
}

// ============================================================================
// Scenario file shapes (serde)
// ============================================================================

fn default_market_id() -> String {
    "market".to_string()
}

/// JSON scenario: name-referenced declaration of a simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub months: u32,

    #[serde(default = "default_market_id")]
    pub market: String,

    pub commodities: Vec<String>,

    pub recipes: Vec<RecipeDef>,

    #[serde(default)]
    pub hierarchy: Vec<HierarchyLink>,

    pub facilities: Vec<FacilityDef>,
}

/// Recipe declaration in the scenario's recipe table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDef {
    pub name: String,
    pub composition: Vec<ComponentDef>,
}

/// One component of a recipe's composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    pub component: String,
    pub fraction: f64,
}

/// Hierarchy link: child node reports to parent node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyLink {
    pub child: String,
    pub parent: String,
}

/// Facility declaration referencing the recipe/commodity tables by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityDef {
    pub id: String,
    pub parent: String,
    pub window: WindowDef,

    #[serde(flatten)]
    pub kind: FacilityKindDef,

    #[serde(default)]
    pub initial_stocks: Vec<BatchDef>,
}

/// Operational window: absolute months, or operation/license dates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowDef {
    Months {
        start_month: u32,
        end_month: u32,
    },
    Dates {
        start_op: DateDef,
        license_expiry: DateDef,
    },
}

/// (year, month-of-year) pair; years count from simulation start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateDef {
    pub year: u32,
    pub month: u32,
}

fn default_capacity_factor() -> f64 {
    1.0
}

/// Facility kind and its policy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FacilityKindDef {
    Converter {
        in_commodity: String,
        out_commodity: String,
        in_recipe: String,
        out_recipe: String,
        capacity: f64,
        #[serde(default = "default_capacity_factor")]
        capacity_factor: f64,
        inventory_size: f64,
        processing_delay: u32,
    },
    Storage {
        commodity: String,
        recipe: String,
        capacity: f64,
        inventory_size: f64,
        residence_time: u32,
    },
}

/// Seed batch for a facility's stocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDef {
    pub recipe: String,
    pub mass: f64,
}

impl ScenarioFile {
    /// Resolve every name reference, producing a typed configuration
    pub fn resolve(&self) -> Result<SimulationConfig, SimulationError> {
        let commodities: HashSet<&str> = self.commodities.iter().map(String::as_str).collect();

        let mut recipes: HashMap<&str, Recipe> = HashMap::new();
        for def in &self.recipes {
            let composition = def
                .composition
                .iter()
                .map(|c| (c.component.clone(), c.fraction))
                .collect();
            let recipe = Recipe::new(def.name.clone(), composition)
                .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;
            if recipes.insert(def.name.as_str(), recipe).is_some() {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate recipe '{}'",
                    def.name
                )));
            }
        }

        let lookup_commodity = |name: &str| -> Result<Commodity, SimulationError> {
            if commodities.contains(name) {
                Ok(Commodity::new(name))
            } else {
                Err(SimulationError::InvalidConfig(format!(
                    "unknown commodity '{name}'"
                )))
            }
        };
        let lookup_recipe = |name: &str| -> Result<Recipe, SimulationError> {
            recipes.get(name).cloned().ok_or_else(|| {
                SimulationError::InvalidConfig(format!("unknown recipe '{name}'"))
            })
        };

        let mut facilities = Vec::with_capacity(self.facilities.len());
        for def in &self.facilities {
            let window = match &def.window {
                WindowDef::Months {
                    start_month,
                    end_month,
                } => OperationalWindow::new(&def.id, *start_month, *end_month)?,
                WindowDef::Dates {
                    start_op,
                    license_expiry,
                } => OperationalWindow::from_dates(
                    &def.id,
                    (start_op.year, start_op.month),
                    (license_expiry.year, license_expiry.month),
                )?,
            };

            let (policy, stock_commodity) = match &def.kind {
                FacilityKindDef::Converter {
                    in_commodity,
                    out_commodity,
                    in_recipe,
                    out_recipe,
                    capacity,
                    capacity_factor,
                    inventory_size,
                    processing_delay,
                } => {
                    let in_commodity = lookup_commodity(in_commodity)?;
                    let spec = ConverterSpec {
                        in_commodity: in_commodity.clone(),
                        out_commodity: lookup_commodity(out_commodity)?,
                        in_recipe: lookup_recipe(in_recipe)?,
                        out_recipe: lookup_recipe(out_recipe)?,
                        capacity: *capacity,
                        capacity_factor: *capacity_factor,
                        inventory_size: *inventory_size,
                        processing_delay: *processing_delay,
                    };
                    (FacilityPolicyConfig::Converter(spec), in_commodity)
                }
                FacilityKindDef::Storage {
                    commodity,
                    recipe,
                    capacity,
                    inventory_size,
                    residence_time,
                } => {
                    let commodity = lookup_commodity(commodity)?;
                    let spec = StorageSpec {
                        commodity: commodity.clone(),
                        recipe: lookup_recipe(recipe)?,
                        capacity: *capacity,
                        inventory_size: *inventory_size,
                        residence_time: *residence_time,
                    };
                    (FacilityPolicyConfig::Storage(spec), commodity)
                }
            };

            let mut initial_stocks = Vec::with_capacity(def.initial_stocks.len());
            for batch in &def.initial_stocks {
                let material =
                    Material::new(batch.mass, lookup_recipe(&batch.recipe)?, stock_commodity.clone())
                        .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;
                initial_stocks.push(material);
            }

            facilities.push(FacilityConfig {
                id: def.id.clone(),
                parent: def.parent.clone(),
                window,
                policy,
                initial_stocks,
            });
        }

        Ok(SimulationConfig {
            months: self.months,
            market: self.market.clone(),
            hierarchy: self
                .hierarchy
                .iter()
                .map(|l| (l.child.clone(), l.parent.clone()))
                .collect(),
            facilities,
        })
    }
}
