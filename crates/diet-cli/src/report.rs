use diet_model::{Bound, BoundViolation, Constraint, DietData, Summary};

/// Plans are reported as if spread evenly over this many meals
pub const MEALS_PER_DAY: f64 = 3.0;

/// Quantities at or below this are left out of the plan table
pub const DISPLAY_EPSILON: f64 = 0.001;

const PLAN_WIDTH: usize = 85;
const NUTRITION_WIDTH: usize = 65;

/// Data file plus the display choices that go with it
pub struct ReportContext<'a> {
    pub diet: &'a DietData,
    /// Nutrient shown in the energy column
    pub energy: &'a str,
}

pub fn describe_constraint(constraint: &Constraint) -> String {
    match constraint {
        Constraint::Fixed { food, amount, .. } => format!("{}: fixed at {} units per day", food, amount),
        Constraint::AtMost { food, amount, .. } => format!("{}: maximum {} units per day", food, amount),
        Constraint::Nutrient {
            nutrient, bound, value, ..
        } => match bound {
            Bound::AtLeast => format!("{}: at least {} per day", nutrient, value),
            Bound::AtMost => format!("{}: at most {} per day", nutrient, value),
        },
    }
}

pub fn print_plan(ctx: &ReportContext<'_>, summary: &Summary) {
    println!();
    println!("Daily Diet Plan with Limits:");
    for constraint in &ctx.diet.constraints {
        println!("- {}", describe_constraint(constraint));
    }
    println!("{}", "-".repeat(PLAN_WIDTH));
    println!(
        "Food      Daily Amount    Per Meal*    Cost/unit    Daily Cost    Energy({})",
        ctx.energy
    );
    println!("{}", "-".repeat(PLAN_WIDTH));

    let mut shown_cost = 0.0;
    let mut shown_energy = 0.0;
    for line in &summary.lines {
        if line.quantity <= DISPLAY_EPSILON {
            continue;
        }
        let energy = line.nutrients.get(ctx.energy).copied().unwrap_or(0.0);
        shown_cost += line.cost;
        shown_energy += energy;
        println!(
            "{:8} {:10.2} {:10.2} {:12.2} ${:10.2} {:12.1}",
            line.food,
            line.quantity,
            line.quantity / MEALS_PER_DAY,
            line.unit_cost,
            line.cost,
            energy
        );
    }

    println!("{}", "-".repeat(PLAN_WIDTH));
    println!("Totals:{} ${:10.2} {:12.1}", " ".repeat(29), shown_cost, shown_energy);

    println!();
    println!("Per Meal Average:");
    println!("Cost: ${:.2}", summary.total_cost / MEALS_PER_DAY);
    println!("Energy: {:.1}", summary.nutrient_total(ctx.energy) / MEALS_PER_DAY);
}

pub fn print_nutrition(ctx: &ReportContext<'_>, summary: &Summary) {
    println!();
    println!("Daily Nutrition Analysis:");
    println!("{}", "-".repeat(NUTRITION_WIDTH));
    println!("Nutrient   Current Amount   Minimum Required   Maximum Allowed");
    println!("{}", "-".repeat(NUTRITION_WIDTH));

    for (name, nutrient) in &ctx.diet.nutrients {
        println!(
            "{:8} {:15.1} {:>17} {:>17}",
            name,
            summary.nutrient_total(name),
            format_bound(nutrient.n_min),
            format_bound(nutrient.n_max)
        );
    }

    println!();
    println!("Note: *Per Meal shows average; actual distribution may vary");
}

pub fn print_violations(violations: &[BoundViolation]) {
    if violations.is_empty() {
        return;
    }
    println!();
    println!("Bound violations:");
    for v in violations {
        println!("  - {}", v.description);
    }
}

fn format_bound(bound: Option<f64>) -> String {
    match bound {
        Some(value) => format!("{:.1}", value),
        None => "-".to_string(),
    }
}
