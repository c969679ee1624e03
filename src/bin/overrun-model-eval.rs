//! Developer utility to evaluate trained artifacts against a dataset.

use std::path::PathBuf;

use overrun::artifacts::ModelArtifacts;
use overrun::dataset::read_jsonl;
use overrun::encoding::encode_matrix;
use overrun::ml::metrics::evaluate;
use overrun::training::{TrainingOptions, split_indices};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Split {
    All,
    Test,
}

#[derive(Debug, Clone)]
struct CliOptions {
    artifacts_dir: PathBuf,
    dataset: PathBuf,
    split: Split,
    test_fraction: f64,
    seed: u64,
    top: usize,
}

#[derive(Debug, Clone)]
struct WorstPrediction {
    project_name: String,
    actual: f64,
    predicted: f64,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let artifacts = ModelArtifacts::load(&options.artifacts_dir).map_err(|err| err.to_string())?;
    let mut records = read_jsonl(&options.dataset).map_err(|err| err.to_string())?;
    if options.split == Split::Test {
        let (_, test) = split_indices(records.len(), options.test_fraction, options.seed);
        records = test.into_iter().map(|idx| records[idx].clone()).collect();
    }
    if records.is_empty() {
        return Err("No rows selected for evaluation".to_string());
    }

    let x = encode_matrix(&artifacts.encoder, &artifacts.model_features, &records)
        .map_err(|err| err.to_string())?;
    let time_y: Vec<f64> = records
        .iter()
        .map(|r| r.actual_time_overrun_days as f64)
        .collect();
    let cost_y: Vec<f64> = records.iter().map(|r| r.actual_cost_overrun_pct).collect();

    println!("rows: {}", records.len());
    for (label, model, y) in [
        ("time overrun (days)", &artifacts.time_model, &time_y),
        ("cost overrun (%)", &artifacts.cost_model, &cost_y),
    ] {
        let metrics = evaluate(model, &x, y);
        println!(
            "{label:<20}  rmse={:.3}  mae={:.3}  r2={:.4}",
            metrics.rmse, metrics.mae, metrics.r2
        );
    }

    let mut worst: Vec<WorstPrediction> = records
        .iter()
        .zip(&x)
        .zip(&time_y)
        .map(|((record, row), &actual)| WorstPrediction {
            project_name: record.project_name.clone(),
            actual,
            predicted: artifacts.time_model.predict(row),
        })
        .collect();
    worst.sort_by(|a, b| {
        let err_a = (a.predicted - a.actual).abs();
        let err_b = (b.predicted - b.actual).abs();
        err_b.total_cmp(&err_a)
    });
    println!();
    println!("Largest time overrun errors:");
    for item in worst.iter().take(options.top) {
        println!(
            "- {}  actual={:.0}  pred={:.1}",
            item.project_name, item.actual, item.predicted
        );
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let defaults = TrainingOptions::default();
    let mut artifacts_dir = PathBuf::from("models");
    let mut dataset: Option<PathBuf> = None;
    let mut split = Split::All;
    let mut test_fraction = defaults.test_fraction;
    let mut seed = defaults.seed;
    let mut top = 10usize;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--artifacts" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--artifacts requires a value".to_string())?;
                artifacts_dir = PathBuf::from(value);
            }
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                dataset = Some(PathBuf::from(value));
            }
            "--split" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--split requires a value".to_string())?;
                split = match value.as_str() {
                    "all" => Split::All,
                    "test" => Split::Test,
                    other => return Err(format!("Invalid --split value: {other}")),
                };
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                test_fraction = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid --test-fraction value: {value}"))?;
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            "--top" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--top requires a value".to_string())?;
                top = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --top value: {value}"))?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let dataset = dataset.ok_or_else(help_text)?;
    Ok(CliOptions {
        artifacts_dir,
        dataset,
        split,
        test_fraction,
        seed,
        top,
    })
}

fn help_text() -> String {
    [
        "overrun-model-eval",
        "",
        "Scores trained overrun models against a JSONL dataset.",
        "",
        "Usage:",
        "  overrun-model-eval --dataset <file> [--artifacts models] [options]",
        "",
        "Options:",
        "  --dataset <file>        JSONL dataset (required).",
        "  --artifacts <dir>       Artifact directory (default: models).",
        "  --split <all|test>      Rows to score; `test` replays the training hold-out (default: all).",
        "  --test-fraction <f64>   Hold-out share used with --split test (default: 0.2).",
        "  --seed <u64>            Shuffle seed used with --split test (default: 42).",
        "  --top <n>               Largest time errors to list (default: 10).",
    ]
    .join("\n")
}
