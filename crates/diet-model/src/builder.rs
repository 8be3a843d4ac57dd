use std::collections::HashSet;

use crate::constraint::{Bound, Constraint};
use crate::error::ModelError;
use crate::food::{DietData, Food, FoodTable, Nutrient, NutrientTable};
use crate::problem::{Model, RowOp, Variable};

/// Build the diet LP from the food and nutrient tables plus explicit
/// fixed-quantity, cap and nutrient constraints.
///
/// Every reference and bound is validated here, so a model that comes back
/// `Ok` can only fail later as infeasible or unbounded, never as malformed.
pub fn build_model(
    foods: &FoodTable,
    nutrients: &NutrientTable,
    constraints: &[Constraint],
) -> Result<Model, ModelError> {
    for (name, nutrient) in nutrients {
        validate_nutrient(name, nutrient)?;
    }
    for (name, food) in foods {
        validate_food(name, food, nutrients)?;
    }

    let food_names: Vec<&String> = foods.keys().collect();
    let variables = foods
        .iter()
        .map(|(name, food)| Variable {
            name: name.clone(),
            lower: food.f_min,
            upper: food.f_max,
        })
        .collect();
    let costs = foods.values().map(|f| f.cost).collect();

    let mut model = Model::new(variables, costs);

    for constraint in constraints {
        add_constraint(&mut model, constraint, foods, nutrients, &food_names)?;
    }

    // Daily bounds from the nutrient table
    for (name, nutrient) in nutrients {
        let coeffs = nutrient_coefficients(foods, name);
        if let Some(min) = nutrient.n_min {
            model.add_row(format!("{}_daily_min", name), coeffs.clone(), RowOp::Ge, min);
        }
        if let Some(max) = nutrient.n_max {
            model.add_row(format!("{}_daily_max", name), coeffs, RowOp::Le, max);
        }
    }

    let mut seen = HashSet::new();
    for row in &model.rows {
        if !seen.insert(row.name.as_str()) {
            return Err(ModelError::invalid(&row.name, "duplicate row name"));
        }
    }

    log::debug!(
        "built diet model: {} variables, {} rows",
        model.num_variables(),
        model.num_rows()
    );

    Ok(model)
}

impl DietData {
    pub fn build_model(&self) -> Result<Model, ModelError> {
        build_model(&self.foods, &self.nutrients, &self.constraints)
    }
}

fn validate_nutrient(name: &str, nutrient: &Nutrient) -> Result<(), ModelError> {
    for bound in [nutrient.n_min, nutrient.n_max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(ModelError::invalid(name, format!("bound {} is not finite", bound)));
        }
    }
    if let (Some(min), Some(max)) = (nutrient.n_min, nutrient.n_max) {
        if min > max {
            return Err(ModelError::invalid(
                name,
                format!("n_min {} exceeds n_max {}", min, max),
            ));
        }
    }
    Ok(())
}

fn validate_food(name: &str, food: &Food, nutrients: &NutrientTable) -> Result<(), ModelError> {
    if !food.cost.is_finite() || food.cost < 0.0 {
        return Err(ModelError::invalid(name, format!("cost {} must be non-negative", food.cost)));
    }
    if !food.f_min.is_finite() || food.f_min < 0.0 {
        return Err(ModelError::invalid(name, format!("f_min {} must be non-negative", food.f_min)));
    }
    // f_max may be +inf for an uncapped food
    if food.f_max.is_nan() || food.f_max < 0.0 {
        return Err(ModelError::invalid(name, format!("f_max {} must be non-negative", food.f_max)));
    }
    if food.f_min > food.f_max {
        return Err(ModelError::invalid(
            name,
            format!("f_min {} exceeds f_max {}", food.f_min, food.f_max),
        ));
    }
    for (nutrient, amount) in &food.content {
        if !nutrients.contains_key(nutrient) {
            return Err(ModelError::invalid(
                name,
                format!("content references unknown nutrient {}", nutrient),
            ));
        }
        if !amount.is_finite() || *amount < 0.0 {
            return Err(ModelError::invalid(
                name,
                format!("{} content {} must be non-negative", nutrient, amount),
            ));
        }
    }
    Ok(())
}

fn add_constraint(
    model: &mut Model,
    constraint: &Constraint,
    foods: &FoodTable,
    nutrients: &NutrientTable,
    food_names: &[&String],
) -> Result<(), ModelError> {
    let row_name = constraint.row_name();

    match constraint {
        Constraint::Fixed { food, amount, .. } | Constraint::AtMost { food, amount, .. } => {
            let entry = foods.get(food).ok_or_else(|| {
                ModelError::invalid(&row_name, format!("references unknown food {}", food))
            })?;
            if !amount.is_finite() {
                return Err(ModelError::invalid(&row_name, format!("amount {} is not finite", amount)));
            }

            let is_fixed = matches!(constraint, Constraint::Fixed { .. });
            if is_fixed && !entry.admits(*amount, 0.0) {
                return Err(ModelError::invalid(
                    &row_name,
                    format!(
                        "fixed amount {} outside [{}, {}] for {}",
                        amount, entry.f_min, entry.f_max, food
                    ),
                ));
            }
            if !is_fixed && *amount < entry.f_min {
                return Err(ModelError::invalid(
                    &row_name,
                    format!("cap {} below f_min {} for {}", amount, entry.f_min, food),
                ));
            }

            let coeffs = food_names
                .iter()
                .map(|name| if *name == food { 1.0 } else { 0.0 })
                .collect();
            let op = if is_fixed { RowOp::Eq } else { RowOp::Le };
            model.add_row(row_name, coeffs, op, *amount);
        }
        Constraint::Nutrient {
            nutrient, bound, value, ..
        } => {
            if !nutrients.contains_key(nutrient) {
                return Err(ModelError::invalid(
                    &row_name,
                    format!("references unknown nutrient {}", nutrient),
                ));
            }
            if !value.is_finite() {
                return Err(ModelError::invalid(&row_name, format!("bound {} is not finite", value)));
            }

            let op = match bound {
                Bound::AtLeast => RowOp::Ge,
                Bound::AtMost => RowOp::Le,
            };
            model.add_row(row_name, nutrient_coefficients(foods, nutrient), op, *value);
        }
    }

    Ok(())
}

/// Each food's contribution to `nutrient`, in variable order
fn nutrient_coefficients(foods: &FoodTable, nutrient: &str) -> Vec<f64> {
    foods.values().map(|f| f.amount_of(nutrient)).collect()
}
