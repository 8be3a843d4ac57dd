use std::fmt;
use std::path::Path;

use crate::error::ModelError;
use crate::plan::Plan;

/// Abstract linear program handed to a solver backend
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// One decision variable per food, `Buy[food]`
    pub variables: Vec<Variable>,
    /// Objective function coefficients (unit costs)
    pub objective: Objective,
    /// Named constraint rows
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Name/label for the row (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub op: RowOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl RowOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RowOp::Le => "<=",
            RowOp::Ge => ">=",
            RowOp::Eq => "=",
        }
    }
}

/// A model row not satisfied by a plan
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    pub row: String,
    /// Required value (from the row RHS)
    pub required: f64,
    pub actual: f64,
    pub violation_amount: f64,
    pub description: String,
}

impl Model {
    pub(crate) fn new(variables: Vec<Variable>, costs: Vec<f64>) -> Self {
        Self {
            variables,
            objective: Objective {
                name: "Total_Cost".to_string(),
                coefficients: costs,
            },
            rows: Vec::new(),
        }
    }

    pub(crate) fn add_row(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: RowOp, rhs: f64) {
        self.rows.push(Row {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Plan quantities in variable order. Foods absent from the plan count as zero.
    pub fn values(&self, plan: &Plan) -> Vec<f64> {
        self.variables
            .iter()
            .map(|v| plan.quantity(&v.name))
            .collect()
    }

    pub fn objective_value(&self, plan: &Plan) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(self.values(plan))
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Rows of this model that `plan` violates, worst first
    pub fn violations(&self, plan: &Plan, tolerance: f64) -> Vec<ConstraintViolation> {
        let values = self.values(plan);
        let mut violations = Vec::new();

        for row in &self.rows {
            let lhs: f64 = row
                .coefficients
                .iter()
                .zip(&values)
                .map(|(coef, x)| coef * x)
                .sum();

            let violated = match row.op {
                RowOp::Le if lhs > row.rhs + tolerance => {
                    let amt = lhs - row.rhs;
                    Some((amt, format!("{} exceeds maximum of {:.2} by {:.2}", row.name, row.rhs, amt)))
                }
                RowOp::Ge if lhs < row.rhs - tolerance => {
                    let amt = row.rhs - lhs;
                    Some((amt, format!("{} is below minimum of {:.2} by {:.2}", row.name, row.rhs, amt)))
                }
                RowOp::Eq if (lhs - row.rhs).abs() > tolerance => {
                    let amt = (lhs - row.rhs).abs();
                    Some((amt, format!("{} requires exactly {:.2} but got {:.2}", row.name, row.rhs, lhs)))
                }
                _ => None,
            };

            if let Some((violation_amount, description)) = violated {
                violations.push(ConstraintViolation {
                    row: row.name.clone(),
                    required: row.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }

    /// Write the `.mod`-style text of this model to `path`. Debug/export only.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string())
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        log::info!("wrote model to {}", path.display());
        Ok(())
    }
}

fn write_linear(f: &mut fmt::Formatter<'_>, coefficients: &[f64], variables: &[Variable]) -> fmt::Result {
    let mut first = true;
    for (coef, var) in coefficients.iter().zip(variables) {
        if *coef == 0.0 {
            continue;
        }
        if first {
            write!(f, "{} * {}", coef, var.name)?;
            first = false;
        } else if *coef < 0.0 {
            write!(f, " - {} * {}", -coef, var.name)?;
        } else {
            write!(f, " + {} * {}", coef, var.name)?;
        }
    }
    if first {
        write!(f, "0")?;
    }
    Ok(())
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in &self.variables {
            write!(f, "var {} >= {}", v.name, v.lower)?;
            if v.upper.is_finite() {
                write!(f, ", <= {}", v.upper)?;
            }
            writeln!(f, ";")?;
        }
        writeln!(f)?;

        write!(f, "minimize {}: ", self.objective.name)?;
        write_linear(f, &self.objective.coefficients, &self.variables)?;
        writeln!(f, ";")?;

        for row in &self.rows {
            writeln!(f)?;
            write!(f, "subject to {}:\n    ", row.name)?;
            write_linear(f, &row.coefficients, &self.variables)?;
            writeln!(f, " {} {};", row.op.symbol(), row.rhs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_food_model() -> Model {
        let mut model = Model::new(
            vec![
                Variable { name: "BEEF".to_string(), lower: 0.0, upper: 10.0 },
                Variable { name: "EGG".to_string(), lower: 0.0, upper: f64::INFINITY },
            ],
            vec![3.0, 1.0],
        );
        model.add_row("BEEF_fixed", vec![1.0, 0.0], RowOp::Eq, 3.0);
        model.add_row("EGG_max", vec![0.0, 1.0], RowOp::Le, 3.0);
        model.add_row("Ene_daily_max", vec![250.0, 70.0], RowOp::Le, 2100.0);
        model
    }

    #[test]
    fn test_objective_value() {
        let model = two_food_model();
        let plan: Plan = [("BEEF", 3.0), ("EGG", 2.0)].into_iter().collect();
        assert!((model.objective_value(&plan) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_violations_worst_first() {
        let model = two_food_model();
        // BEEF = 8: fixed row off by 5, energy 2000 + 350 = 2350 over by 250
        let plan: Plan = [("BEEF", 8.0), ("EGG", 5.0)].into_iter().collect();
        let violations = model.violations(&plan, 1e-6);

        let names: Vec<&str> = violations.iter().map(|v| v.row.as_str()).collect();
        assert_eq!(names, vec!["Ene_daily_max", "BEEF_fixed", "EGG_max"]);
        assert!((violations[0].actual - 2350.0).abs() < 1e-9);
        assert!((violations[0].violation_amount - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_violations_for_satisfying_plan() {
        let model = two_food_model();
        let plan: Plan = [("BEEF", 3.0), ("EGG", 3.0)].into_iter().collect();
        assert!(model.violations(&plan, 1e-6).is_empty());
    }

    #[test]
    fn test_display_mod_text() {
        let text = two_food_model().to_string();
        assert!(text.contains("var BEEF >= 0, <= 10;"));
        assert!(text.contains("var EGG >= 0;"));
        assert!(text.contains("minimize Total_Cost: 3 * BEEF + 1 * EGG;"));
        assert!(text.contains("subject to BEEF_fixed:\n    1 * BEEF = 3;"));
        assert!(text.contains("250 * BEEF + 70 * EGG <= 2100;"));
    }
}
