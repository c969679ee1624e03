//! Developer utility to write a synthetic project dataset.

use std::path::PathBuf;

use overrun::dataset::{GenerateOptions, generate_projects, write_jsonl};
use overrun::logging::{self, LoggingOptions};

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
    let records = generate_projects(&GenerateOptions {
        rows: options.rows,
        seed: options.seed,
    });
    write_jsonl(&options.out, &records).map_err(|err| err.to_string())?;
    println!(
        "wrote {} projects to {}",
        records.len(),
        options.out.display()
    );
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    out: PathBuf,
    rows: usize,
    seed: Option<u64>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut out = PathBuf::from("projects.jsonl");
    let mut rows = GenerateOptions::default().rows;
    let mut seed = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out = PathBuf::from(value);
            }
            "--rows" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--rows requires a value".to_string())?;
                rows = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --rows value: {value}"))?;
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    if rows == 0 {
        return Err("--rows must be at least 1".to_string());
    }
    Ok(CliOptions { out, rows, seed })
}

fn help_text() -> String {
    [
        "overrun-generate",
        "",
        "Writes synthetic infrastructure project records as JSON lines.",
        "",
        "Usage:",
        "  overrun-generate [--out projects.jsonl] [--rows <n>] [--seed <u64>]",
        "",
        "Options:",
        "  --out <file>   Output path (default: projects.jsonl).",
        "  --rows <n>     Number of projects (default: 1000).",
        "  --seed <u64>   Fixed seed for reproducible output.",
    ]
    .join("\n")
}
