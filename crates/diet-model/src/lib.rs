mod builder;
mod constraint;
mod error;
mod evaluate;
mod food;
mod plan;
mod problem;

pub use builder::build_model;
pub use constraint::{Bound, Constraint};
pub use error::ModelError;
pub use evaluate::{
    bound_violations, check_feasibility, check_feasibility_with_tolerance, evaluate, BoundViolation, FoodLine,
    Summary, FEASIBILITY_TOLERANCE,
};
pub use food::{DietData, Food, FoodTable, Nutrient, NutrientTable};
pub use plan::Plan;
pub use problem::{ConstraintViolation, Model, Objective, Row, RowOp, Variable};
