use std::time::{Duration, Instant};

use diet_model::{Model, Plan, RowOp, Variable};
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
};
use thiserror::Error;

use crate::config::{SolverBackend, SolverConfig};

#[derive(Error, Debug)]
pub enum SolveError {
    /// Diagnostic from the backend, passed through untouched
    #[error("Solver failure: {0}")]
    Failure(#[from] ResolutionError),
    #[error("Solve cancelled")]
    Cancelled,
    #[error("Solve took {elapsed:?}, exceeding the limit of {limit:?}")]
    DeadlineExceeded { limit: Duration, elapsed: Duration },
}

/// Hands diet models to an LP backend and reads back a plan
pub struct Solver {
    config: SolverConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Minimise the model's cost objective subject to all of its rows
    pub fn solve(&self, model: &Model) -> Result<Plan, SolveError> {
        if self.config.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<good_lp::Variable> = model
            .variables
            .iter()
            .map(|v| {
                let mut def = variable().min(v.lower).name(v.name.clone());
                if v.upper.is_finite() {
                    def = def.max(v.upper);
                }
                vars.add(def)
            })
            .collect();

        let objective = linear_expression(&model.objective.coefficients, &handles);
        let rows: Vec<good_lp::Constraint> = model
            .rows
            .iter()
            .map(|row| {
                let lhs = linear_expression(&row.coefficients, &handles);
                let rhs = Expression::from(row.rhs);
                match row.op {
                    RowOp::Le => constraint::leq(lhs, rhs),
                    RowOp::Ge => constraint::geq(lhs, rhs),
                    RowOp::Eq => constraint::eq(lhs, rhs),
                }
            })
            .collect();

        log::debug!(
            "solving with {}: {} variables, {} rows",
            self.config.backend.name(),
            handles.len(),
            rows.len()
        );

        let problem = vars.minimise(objective);
        let started = Instant::now();
        let values = match self.config.backend {
            SolverBackend::Microlp => run(problem.using(good_lp::microlp), rows, &handles),
            #[cfg(feature = "clarabel")]
            SolverBackend::Clarabel => run(problem.using(good_lp::clarabel), rows, &handles),
        };
        let elapsed = started.elapsed();
        let values = values?;

        if let Some(limit) = self.config.time_limit {
            if elapsed > limit {
                log::warn!("solve finished after {:?}, limit was {:?}", elapsed, limit);
                return Err(SolveError::DeadlineExceeded { limit, elapsed });
            }
        }

        log::debug!("solve finished in {:?}", elapsed);

        let tol = self.config.zero_tolerance;
        Ok(model
            .variables
            .iter()
            .zip(values)
            .map(|(var, value)| (var.name.as_str(), snap_to_bounds(value, var, tol)))
            .collect())
    }
}

/// Pull backend round-off back inside the variable's bounds, then flush
/// near-zero values to exactly zero
fn snap_to_bounds(value: f64, var: &Variable, zero_tolerance: f64) -> f64 {
    let mut value = value.max(var.lower);
    if var.upper.is_finite() {
        value = value.min(var.upper);
    }
    if value.abs() < zero_tolerance { 0.0 } else { value }
}

fn linear_expression(coefficients: &[f64], vars: &[good_lp::Variable]) -> Expression {
    coefficients
        .iter()
        .zip(vars)
        .filter(|(coef, _)| **coef != 0.0)
        .fold(Expression::from(0.0), |acc, (coef, var)| acc + *coef * *var)
}

fn run<M>(mut model: M, rows: Vec<good_lp::Constraint>, vars: &[good_lp::Variable]) -> Result<Vec<f64>, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for row in rows {
        model.add_constraint(row);
    }
    let solution = model.solve()?;
    Ok(vars.iter().map(|v| solution.value(*v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CancelFlag;
    use diet_model::{
        build_model, check_feasibility, evaluate, Bound, Constraint, Food, FoodTable, Nutrient, NutrientTable,
    };

    fn tables() -> (FoodTable, NutrientTable) {
        let mut foods = FoodTable::new();
        foods.insert(
            "BEEF".to_string(),
            Food::new(3.0, 0.0, 10.0).with_content("Ene", 250.0).with_content("Prot", 26.0),
        );
        foods.insert(
            "CABB".to_string(),
            Food::new(0.5, 0.0, 5.0).with_content("Ene", 25.0).with_content("Prot", 1.3),
        );
        foods.insert(
            "EGG".to_string(),
            Food::new(1.0, 0.0, 10.0).with_content("Ene", 70.0).with_content("Prot", 6.0),
        );

        let mut nutrients = NutrientTable::new();
        nutrients.insert("Ene".to_string(), Nutrient::at_most(2100.0));
        nutrients.insert("Prot".to_string(), Nutrient::at_least(100.0));
        (foods, nutrients)
    }

    #[test]
    fn test_solve_fixed_and_capped_diet() {
        // Minimize: 3 BEEF + 0.5 CABB + EGG
        // Subject to:
        //   BEEF = 3, EGG <= 3
        //   26 BEEF + 1.3 CABB + 6 EGG >= 100
        //   250 BEEF + 25 CABB + 70 EGG <= 2100
        // Eggs are the cheapest protein, so EGG=3 and cabbage covers the rest: CABB = 4/1.3
        let (foods, nutrients) = tables();
        let constraints = vec![Constraint::fixed("BEEF", 3.0), Constraint::at_most("EGG", 3.0)];
        let model = build_model(&foods, &nutrients, &constraints).unwrap();

        let plan = Solver::default().solve(&model).unwrap();

        println!("Plan: {:?}", plan);

        assert!((plan.quantity("BEEF") - 3.0).abs() < 1e-6, "BEEF = {}", plan.quantity("BEEF"));
        assert!((plan.quantity("EGG") - 3.0).abs() < 1e-6, "EGG = {}", plan.quantity("EGG"));
        let cabb = 4.0 / 1.3;
        assert!((plan.quantity("CABB") - cabb).abs() < 1e-6, "CABB = {}", plan.quantity("CABB"));

        let summary = evaluate(&plan, &foods, &nutrients).unwrap();
        assert!((summary.total_cost - (9.0 + 3.0 + 0.5 * cabb)).abs() < 1e-6);
        assert!((model.objective_value(&plan) - summary.total_cost).abs() < 1e-9);

        assert!(check_feasibility(&plan, &foods, &nutrients).is_empty());
        assert!(model.violations(&plan, 1e-6).is_empty());
    }

    #[test]
    fn test_explicit_energy_cap_is_respected() {
        let (foods, nutrients) = tables();
        let constraints = vec![Constraint::nutrient("Ene", Bound::AtMost, 1000.0).labeled("Energy_Max")];
        let model = build_model(&foods, &nutrients, &constraints).unwrap();
        assert!(model.row("Energy_Max").is_some());

        let plan = Solver::default().solve(&model).unwrap();
        let summary = evaluate(&plan, &foods, &nutrients).unwrap();

        assert!(summary.nutrient_total("Ene") <= 1000.0 + 1e-6);
        assert!(summary.nutrient_total("Prot") >= 100.0 - 1e-6);
        assert!(model.violations(&plan, 1e-6).is_empty());
    }

    #[test]
    fn test_infeasible_model_surfaces_backend_error() {
        // Nine beef alone is 2250 kcal against a 2100 cap
        let (foods, nutrients) = tables();
        let model = build_model(&foods, &nutrients, &[Constraint::fixed("BEEF", 9.0)]).unwrap();

        let err = Solver::default().solve(&model).unwrap_err();
        assert!(
            matches!(err, SolveError::Failure(ResolutionError::Infeasible)),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_infeasible_model_reports_failure_under_time_limit() {
        // A failed solve is reported as such even when the limit has also passed
        let (foods, nutrients) = tables();
        let model = build_model(&foods, &nutrients, &[Constraint::fixed("BEEF", 9.0)]).unwrap();

        let solver = Solver::new(SolverConfig::new().with_time_limit(Duration::ZERO));
        let err = solver.solve(&model).unwrap_err();
        assert!(
            matches!(err, SolveError::Failure(ResolutionError::Infeasible)),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_snap_to_bounds() {
        let var = Variable {
            name: "BEEF".to_string(),
            lower: 0.0,
            upper: 10.0,
        };
        assert_eq!(snap_to_bounds(-1e-8, &var, 1e-9), 0.0);
        assert_eq!(snap_to_bounds(10.0 + 1e-8, &var, 1e-9), 10.0);
        assert_eq!(snap_to_bounds(5e-10, &var, 1e-9), 0.0);
        assert_eq!(snap_to_bounds(4.5, &var, 1e-9), 4.5);

        let floored = Variable {
            name: "EGG".to_string(),
            lower: 1.0,
            upper: f64::INFINITY,
        };
        assert_eq!(snap_to_bounds(1.0 - 1e-7, &floored, 1e-9), 1.0);
        assert_eq!(snap_to_bounds(1e6, &floored, 1e-9), 1e6);
    }

    #[test]
    fn test_cancelled_before_solve() {
        let (foods, nutrients) = tables();
        let model = build_model(&foods, &nutrients, &[]).unwrap();

        let flag = CancelFlag::new();
        flag.cancel();
        let solver = Solver::new(SolverConfig::new().with_cancel_flag(flag));

        assert!(matches!(solver.solve(&model), Err(SolveError::Cancelled)));
    }

    #[test]
    fn test_zero_time_limit_discards_result() {
        let (foods, nutrients) = tables();
        let model = build_model(&foods, &nutrients, &[]).unwrap();

        let solver = Solver::new(SolverConfig::new().with_time_limit(Duration::ZERO));
        assert!(matches!(solver.solve(&model), Err(SolveError::DeadlineExceeded { .. })));
    }

    #[test]
    fn test_solve_sample_data() {
        let data: diet_model::DietData =
            serde_json::from_str(include_str!("../../../data/diet.json")).unwrap();
        let model = data.build_model().unwrap();

        let plan = Solver::default().solve(&model).unwrap();

        for food in ["BEEF", "MUSH", "RAME"] {
            assert!((plan.quantity(food) - 3.0).abs() < 1e-6, "{} = {}", food, plan.quantity(food));
        }
        assert!(plan.quantity("CABB") <= 5.0 + 1e-6);
        assert!(plan.quantity("EGG") <= 3.0 + 1e-6);

        assert!(check_feasibility(&plan, &data.foods, &data.nutrients).is_empty());
        assert!(model.violations(&plan, 1e-6).is_empty());

        let summary = evaluate(&plan, &data.foods, &data.nutrients).unwrap();
        assert!(summary.nutrient_total("Ene") <= 2100.0 + 1e-6);
        assert!((model.objective_value(&plan) - summary.total_cost).abs() < 1e-9);
    }
}
