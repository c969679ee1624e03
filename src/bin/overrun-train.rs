//! Developer utility to train and export the overrun models.

use std::path::PathBuf;

use overrun::dataset::read_jsonl;
use overrun::logging::{self, LoggingOptions};
use overrun::ml::gbdt::TrainOptions;
use overrun::ml::metrics::RegressionMetrics;
use overrun::training::{TrainingOptions, train_artifacts};

fn main() {
    if let Err(err) = logging::init_with(&LoggingOptions::stdout_only()) {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let records = read_jsonl(&options.dataset).map_err(|err| err.to_string())?;
    let report = train_artifacts(&records, &options.training).map_err(|err| err.to_string())?;
    report
        .artifacts
        .save(&options.out_dir)
        .map_err(|err| err.to_string())?;

    println!(
        "trained on {} rows, evaluated on {} rows",
        report.train_rows, report.test_rows
    );
    print_metrics("time overrun (days)", &report.time_metrics);
    print_metrics("cost overrun (%)", &report.cost_metrics);
    println!(
        "features: {}",
        report.artifacts.model_features.join(", ")
    );
    println!("artifacts written to {}", options.out_dir.display());
    Ok(())
}

fn print_metrics(label: &str, metrics: &RegressionMetrics) {
    println!(
        "{label:<20}  rmse={:.3}  mae={:.3}  r2={:.4}",
        metrics.rmse, metrics.mae, metrics.r2
    );
}

#[derive(Debug, Clone)]
struct CliOptions {
    dataset: PathBuf,
    out_dir: PathBuf,
    training: TrainingOptions,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut dataset: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("models");
    let mut training = TrainingOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        if flag == "-h" || flag == "--help" {
            return Err(help_text());
        }
        idx += 1;
        let value = args.get(idx).ok_or_else(|| format!("{flag} requires a value"))?;
        match flag {
            "--dataset" => dataset = Some(PathBuf::from(value)),
            "--out" => out_dir = PathBuf::from(value),
            "--rounds" => training.gbdt.rounds = parse_value(flag, value)?,
            "--learning-rate" => training.gbdt.learning_rate = parse_value(flag, value)?,
            "--max-depth" => training.gbdt.max_depth = parse_value(flag, value)?,
            "--lambda" => training.gbdt.lambda = parse_value(flag, value)?,
            "--bins" => training.gbdt.bins = parse_value(flag, value)?,
            "--test-fraction" => training.test_fraction = parse_value(flag, value)?,
            "--seed" => training.seed = parse_value(flag, value)?,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    if !(0.0..1.0).contains(&training.test_fraction) {
        return Err(format!(
            "--test-fraction must be in [0, 1), got {}",
            training.test_fraction
        ));
    }
    let dataset = dataset.ok_or_else(help_text)?;
    Ok(CliOptions {
        dataset,
        out_dir,
        training,
    })
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn help_text() -> String {
    let defaults = TrainOptions::default();
    [
        "overrun-train".to_string(),
        String::new(),
        "Trains the time and cost overrun regressors from a JSONL dataset.".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  overrun-train --dataset <file> [--out models] [options]".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --dataset <file>        JSONL dataset from overrun-generate (required).".to_string(),
        "  --out <dir>             Artifact directory (default: models).".to_string(),
        format!("  --rounds <n>            Boosting rounds (default: {}).", defaults.rounds),
        format!(
            "  --learning-rate <f64>   Learning rate (default: {}).",
            defaults.learning_rate
        ),
        format!("  --max-depth <n>         Maximum tree depth (default: {}).", defaults.max_depth),
        format!("  --lambda <f64>          L2 leaf regularization (default: {}).", defaults.lambda),
        format!("  --bins <n>              Split search bins (default: {}).", defaults.bins),
        "  --test-fraction <f64>   Held-out share (default: 0.2).".to_string(),
        "  --seed <u64>            Shuffle seed (default: 42).".to_string(),
    ]
    .join("\n")
}
