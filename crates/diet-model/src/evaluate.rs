use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::food::{FoodTable, NutrientTable};
use crate::plan::Plan;

/// Slack allowed when comparing solver output against bounds
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Cost and nutrient totals of a plan
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_cost: f64,
    /// Aggregate amount of every nutrient in the table
    pub nutrient_totals: BTreeMap<String, f64>,
    /// One line per food in the plan
    pub lines: Vec<FoodLine>,
}

/// A single food's share of a plan
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLine {
    pub food: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub cost: f64,
    pub nutrients: BTreeMap<String, f64>,
}

impl Summary {
    pub fn nutrient_total(&self, nutrient: &str) -> f64 {
        self.nutrient_totals.get(nutrient).copied().unwrap_or(0.0)
    }

    pub fn line(&self, food: &str) -> Option<&FoodLine> {
        self.lines.iter().find(|l| l.food == food)
    }
}

/// A nutrient total or food quantity outside its allowed range
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundViolation {
    /// Offending nutrient or food identifier
    pub name: String,
    /// The bound that was crossed
    pub required: f64,
    pub actual: f64,
    pub violation_amount: f64,
    pub description: String,
}

/// Total cost and per-nutrient aggregates of `plan`.
pub fn evaluate(plan: &Plan, foods: &FoodTable, nutrients: &NutrientTable) -> Result<Summary, ModelError> {
    let mut nutrient_totals: BTreeMap<String, f64> =
        nutrients.keys().map(|n| (n.clone(), 0.0)).collect();
    let mut total_cost = 0.0;
    let mut lines = Vec::with_capacity(plan.len());

    for (name, quantity) in plan.iter() {
        let food = foods
            .get(name)
            .ok_or_else(|| ModelError::UnknownFood(name.to_string()))?;
        if !quantity.is_finite() {
            return Err(ModelError::InvalidQuantity(name.to_string(), quantity));
        }

        let mut contributions = BTreeMap::new();
        for (nutrient, amount) in &food.content {
            let total = nutrient_totals
                .get_mut(nutrient)
                .ok_or_else(|| ModelError::UnknownNutrient(nutrient.clone()))?;
            let contribution = amount * quantity;
            *total += contribution;
            contributions.insert(nutrient.clone(), contribution);
        }

        let cost = food.cost * quantity;
        total_cost += cost;
        lines.push(FoodLine {
            food: name.to_string(),
            quantity,
            unit_cost: food.cost,
            cost,
            nutrients: contributions,
        });
    }

    Ok(Summary {
        total_cost,
        nutrient_totals,
        lines,
    })
}

/// Names of nutrients and foods whose bounds `plan` violates. Empty when feasible.
pub fn check_feasibility(plan: &Plan, foods: &FoodTable, nutrients: &NutrientTable) -> Vec<String> {
    check_feasibility_with_tolerance(plan, foods, nutrients, FEASIBILITY_TOLERANCE)
}

pub fn check_feasibility_with_tolerance(
    plan: &Plan,
    foods: &FoodTable,
    nutrients: &NutrientTable,
    tolerance: f64,
) -> Vec<String> {
    let mut names: Vec<String> = bound_violations(plan, foods, nutrients, tolerance)
        .into_iter()
        .map(|v| v.name)
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Detailed bound violations, worst first.
///
/// Plan entries naming foods missing from the table are reported as violations
/// rather than errors; use [`evaluate`] to reject them outright.
pub fn bound_violations(
    plan: &Plan,
    foods: &FoodTable,
    nutrients: &NutrientTable,
    tolerance: f64,
) -> Vec<BoundViolation> {
    let mut violations = Vec::new();
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for (name, quantity) in plan.iter() {
        let Some(food) = foods.get(name) else {
            violations.push(BoundViolation {
                name: name.to_string(),
                required: 0.0,
                actual: quantity,
                violation_amount: if quantity.is_finite() { quantity.abs() } else { f64::INFINITY },
                description: format!("{} is not in the food table", name),
            });
            continue;
        };
        for (nutrient, amount) in &food.content {
            *totals.entry(nutrient.as_str()).or_insert(0.0) += amount * quantity;
        }
    }

    // Foods absent from the plan are bought at zero
    for (name, food) in foods {
        let quantity = plan.quantity(name);
        if let Some(v) = range_violation(name, quantity, Some(food.f_min), Some(food.f_max), tolerance) {
            violations.push(v);
        }
    }

    for (name, nutrient) in nutrients {
        let total = totals.get(name.as_str()).copied().unwrap_or(0.0);
        if let Some(v) = range_violation(name, total, nutrient.n_min, nutrient.n_max, tolerance) {
            violations.push(v);
        }
    }

    violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
    violations
}

fn range_violation(
    name: &str,
    actual: f64,
    min: Option<f64>,
    max: Option<f64>,
    tolerance: f64,
) -> Option<BoundViolation> {
    // NaN slips past every ordered comparison, so it is caught up front
    if !actual.is_finite() && (min.is_some() || max.is_some()) {
        return Some(BoundViolation {
            name: name.to_string(),
            required: min.or(max).unwrap_or(0.0),
            actual,
            violation_amount: f64::INFINITY,
            description: format!("{} is not a finite quantity ({})", name, actual),
        });
    }
    if let Some(min) = min {
        if actual < min - tolerance {
            let amt = min - actual;
            return Some(BoundViolation {
                name: name.to_string(),
                required: min,
                actual,
                violation_amount: amt,
                description: format!("{} is below minimum of {:.2} by {:.2}", name, min, amt),
            });
        }
    }
    if let Some(max) = max {
        if actual > max + tolerance {
            let amt = actual - max;
            return Some(BoundViolation {
                name: name.to_string(),
                required: max,
                actual,
                violation_amount: amt,
                description: format!("{} exceeds maximum of {:.2} by {:.2}", name, max, amt),
            });
        }
    }
    None
}
