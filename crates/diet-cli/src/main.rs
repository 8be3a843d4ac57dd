mod report;

use clap::{Parser, Subcommand, ValueEnum};
use diet_model::{bound_violations, evaluate, DietData, Model, Plan, FEASIBILITY_TOLERANCE};
use diet_solver::{Solver, SolverBackend, SolverConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

use report::ReportContext;

#[derive(Parser)]
#[command(name = "diet")]
#[command(about = "Least-cost daily diet planning", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, solve and report a diet
    Solve {
        /// JSON file with foods, nutrients and constraints
        file: PathBuf,
        /// Also write the generated model text here
        #[arg(long)]
        export_model: Option<PathBuf>,
        /// Print the plan and summary as JSON
        #[arg(long)]
        json: bool,
        /// Discard the result if solving takes longer than this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
        #[arg(long, value_enum, default_value_t = BackendArg::Microlp)]
        backend: BackendArg,
        /// Nutrient shown in the energy column
        #[arg(long, default_value = "Ene")]
        energy: String,
    },
    /// Check a data file for errors
    Check {
        file: PathBuf,
    },
    /// Print or write the generated model text
    Export {
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate an existing plan against the data, without solving
    Evaluate {
        file: PathBuf,
        /// JSON object mapping food to quantity
        plan: PathBuf,
        #[arg(long, default_value = "Ene")]
        energy: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Microlp,
    #[cfg(feature = "clarabel")]
    Clarabel,
}

impl From<BackendArg> for SolverBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Microlp => SolverBackend::Microlp,
            #[cfg(feature = "clarabel")]
            BackendArg::Clarabel => SolverBackend::Clarabel,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Solve {
            file,
            export_model,
            json,
            time_limit,
            backend,
            energy,
        } => {
            let data = read_data(&file);
            let model = build(&data);

            if let Some(path) = export_model {
                if let Err(e) = model.export(&path) {
                    eprintln!("Export error: {}", e);
                    std::process::exit(1);
                }
            }

            let mut config = SolverConfig::new().with_backend(backend.into());
            if let Some(secs) = time_limit {
                match Duration::try_from_secs_f64(secs) {
                    Ok(limit) => config = config.with_time_limit(limit),
                    Err(e) => {
                        eprintln!("Invalid time limit {}: {}", secs, e);
                        std::process::exit(1);
                    }
                }
            }

            let plan = match Solver::new(config).solve(&model) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            report_plan(&data, &model, &plan, json, &energy);
        }
        Commands::Check { file } => {
            let data = read_data(&file);
            let model = build(&data);

            println!("✓ {} is valid", file.display());
            println!("  {} foods", data.foods.len());
            println!("  {} nutrients", data.nutrients.len());
            println!("  {} constraints", data.constraints.len());
            println!("  {} model rows", model.num_rows());
        }
        Commands::Export { file, output } => {
            let data = read_data(&file);
            let model = build(&data);

            match output {
                Some(path) => {
                    if let Err(e) = model.export(&path) {
                        eprintln!("Export error: {}", e);
                        std::process::exit(1);
                    }
                }
                None => print!("{}", model),
            }
        }
        Commands::Evaluate { file, plan, energy } => {
            let data = read_data(&file);
            let model = build(&data);

            let source = read_source(&plan);
            let plan: Plan = match serde_json::from_str(&source) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Parse error in {}: {}", plan.display(), e);
                    std::process::exit(1);
                }
            };
            if plan.is_empty() {
                log::warn!("{} names no foods; every quantity is taken as zero", file.display());
            }

            report_plan(&data, &model, &plan, false, &energy);
        }
    }
}

fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn read_data(path: &Path) -> DietData {
    let source = read_source(path);
    match serde_json::from_str(&source) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Parse error in {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn build(data: &DietData) -> Model {
    match data.build_model() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(1);
        }
    }
}

fn report_plan(data: &DietData, model: &Model, plan: &Plan, json: bool, energy: &str) {
    let summary = match evaluate(plan, &data.foods, &data.nutrients) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Evaluation error: {}", e);
            std::process::exit(1);
        }
    };
    let violations = bound_violations(plan, &data.foods, &data.nutrients, FEASIBILITY_TOLERANCE);
    let row_violations = model.violations(plan, FEASIBILITY_TOLERANCE);

    if json {
        let output = serde_json::json!({
            "plan": plan,
            "total_cost": summary.total_cost,
            "summary": summary,
            "violations": violations,
            "violated_rows": row_violations.iter().map(|v| v.row.as_str()).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error encoding JSON: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let ctx = ReportContext { diet: data, energy };
    report::print_plan(&ctx, &summary);
    report::print_nutrition(&ctx, &summary);
    report::print_violations(&violations);

    if !row_violations.is_empty() {
        println!();
        println!("Violated model rows:");
        for v in &row_violations {
            println!("  - {}", v.description);
        }
    }
}
