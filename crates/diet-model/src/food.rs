use std::collections::BTreeMap;

use crate::constraint::Constraint;

/// Foods keyed by identifier. Ordered so generated models are reproducible.
pub type FoodTable = BTreeMap<String, Food>;

/// Nutrients keyed by identifier.
pub type NutrientTable = BTreeMap<String, Nutrient>;

/// A purchasable item: unit cost, purchase bounds and nutrient content per unit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub cost: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub f_min: f64,
    pub f_max: f64,
    /// Amount of each nutrient in one unit of this food
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: BTreeMap<String, f64>,
}

impl Food {
    pub fn new(cost: f64, f_min: f64, f_max: f64) -> Self {
        Self {
            cost,
            f_min,
            f_max,
            content: BTreeMap::new(),
        }
    }

    pub fn with_content(mut self, nutrient: impl Into<String>, amount: f64) -> Self {
        self.content.insert(nutrient.into(), amount);
        self
    }

    /// Content of `nutrient` per unit, zero when the food does not list it.
    #[inline]
    pub fn amount_of(&self, nutrient: &str) -> f64 {
        self.content.get(nutrient).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn admits(&self, quantity: f64, tolerance: f64) -> bool {
        quantity >= self.f_min - tolerance && quantity <= self.f_max + tolerance
    }
}

/// A tracked dietary quantity. A `None` bound leaves that side unconstrained.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nutrient {
    #[cfg_attr(feature = "serde", serde(default))]
    pub n_min: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub n_max: Option<f64>,
}

impl Nutrient {
    pub fn new(n_min: Option<f64>, n_max: Option<f64>) -> Self {
        Self { n_min, n_max }
    }

    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn at_least(n_min: f64) -> Self {
        Self::new(Some(n_min), None)
    }

    pub fn at_most(n_max: f64) -> Self {
        Self::new(None, Some(n_max))
    }

    pub fn between(n_min: f64, n_max: f64) -> Self {
        Self::new(Some(n_min), Some(n_max))
    }
}

/// Everything needed to build a diet model, as read from a data file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DietData {
    pub foods: FoodTable,
    pub nutrients: NutrientTable,
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<Constraint>,
}
