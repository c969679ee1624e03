//! Entry point for the overrun prediction service.

use std::path::PathBuf;

use overrun::artifacts::ModelArtifacts;
use overrun::config;
use overrun::logging;
use overrun::predict::Predictor;
use overrun::server::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run().await {
        tracing::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let options = match parse_args(std::env::args().skip(1).collect())? {
        Command::Serve(options) => options,
        Command::Help => {
            println!("{}", help_text());
            return Ok(());
        }
    };
    let mut config = config::load(options.config.as_deref()).map_err(|err| err.to_string())?;
    if let Some(bind) = options.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = options.artifacts {
        config.artifacts.dir = dir;
    }
    let addr = config.bind_addr().map_err(|err| err.to_string())?;

    let artifacts = ModelArtifacts::load(&config.artifacts.dir).map_err(|err| {
        format!(
            "Failed to load model artifacts from {}: {err}",
            config.artifacts.dir.display()
        )
    })?;
    tracing::info!(
        dir = %config.artifacts.dir.display(),
        features = artifacts.model_features.len(),
        "Model artifacts loaded"
    );
    let predictor = Predictor::new(artifacts).map_err(|err| err.to_string())?;
    server::serve(addr, AppState::new(predictor), config.server.cors)
        .await
        .map_err(|err| err.to_string())
}

#[derive(Debug, Clone)]
enum Command {
    Serve(CliOptions),
    Help,
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    bind: Option<String>,
    artifacts: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--bind" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--bind requires a value".to_string())?;
                options.bind = Some(value.clone());
            }
            "--artifacts" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--artifacts requires a value".to_string())?;
                options.artifacts = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Command::Serve(options))
}

fn help_text() -> String {
    [
        "overrun",
        "",
        "Serves project overrun predictions over HTTP.",
        "",
        "Usage:",
        "  overrun [--config <file>] [--bind <addr>] [--artifacts <dir>]",
        "",
        "Options:",
        "  --config <file>     TOML config (default: overrun.toml in the app directory).",
        "  --bind <addr>       Listen address (default: 127.0.0.1:8000).",
        "  --artifacts <dir>   Model artifact directory (default: models).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn overrides_are_parsed() {
        let Command::Serve(options) =
            parse_args(args(&["--bind", "0.0.0.0:80", "--artifacts", "out"])).unwrap()
        else {
            panic!("expected serve options");
        };
        assert_eq!(options.bind.as_deref(), Some("0.0.0.0:80"));
        assert_eq!(options.artifacts, Some(PathBuf::from("out")));
        assert!(options.config.is_none());
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(matches!(
            parse_args(args(&["--bind", "0.0.0.0:80", "--help"])),
            Ok(Command::Help)
        ));
        assert!(matches!(parse_args(args(&["-h"])), Ok(Command::Help)));
    }

    #[test]
    fn missing_value_is_reported() {
        let err = parse_args(args(&["--config"])).unwrap_err();
        assert_eq!(err, "--config requires a value");
    }
}
