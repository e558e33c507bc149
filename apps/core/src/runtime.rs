use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::{self, Config, ConfigError};
use crate::contract::render_json;
use crate::input::{Behavior, InputOptions, TypeaheadInput, DEBOUNCE_WINDOW};
use crate::logging;
use crate::lookup::{default_catalog, CatalogLookup, Lookup};
use crate::presentation::Presentation;

const SELECT_COMMAND: &str = ":select";

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Io(std::io::Error),
    Catalog { path: PathBuf, error: std::io::Error },
    Render(serde_json::Error),
    Session(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Catalog { path, error } => {
                write!(f, "failed to read catalog {}: {error}", path.display())
            }
            Self::Render(error) => write!(f, "render error: {error}"),
            Self::Session(error) => write!(f, "session error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub latency_ms: Option<u64>,
    pub json: bool,
    pub show_help: bool,
}

pub fn usage() -> &'static str {
    "usage: typeahead-core [--config PATH] [--catalog PATH] [--latency-ms N] [--json] [--help]\n\
     Each stdin line replaces the input text; `:select N` clicks row N."
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => options.config_path = Some(PathBuf::from(expect_value(&mut iter, arg)?)),
            "--catalog" => {
                options.catalog_path = Some(PathBuf::from(expect_value(&mut iter, arg)?))
            }
            "--latency-ms" => {
                let raw = expect_value(&mut iter, arg)?;
                let parsed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--latency-ms expects a number, got '{raw}'"))?;
                options.latency_ms = Some(parsed);
            }
            "--json" => options.json = true,
            "--help" | "-h" => options.show_help = true,
            other => return Err(format!("unknown argument '{other}'\n{}", usage())),
        }
    }

    Ok(options)
}

fn expect_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, String> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    if options.show_help {
        println!("{}", usage());
        return Ok(());
    }

    let mut config = config::load(options.config_path.as_deref())?;
    if let Some(latency_ms) = options.latency_ms {
        config.lookup_latency_ms = latency_ms;
    }
    if let Some(catalog_path) = options.catalog_path {
        config.catalog_path = Some(catalog_path);
    }
    config::validate(&config).map_err(ConfigError::Invalid)?;

    match logging::init(&config.log_level) {
        Ok(log_path) => info!(
            config_path = %config.config_path.display(),
            log_path = %log_path.display(),
            "typeahead session starting"
        ),
        Err(error) => eprintln!("[typeahead-core] file logging disabled: {error}"),
    }

    let lookup = build_lookup(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(RuntimeError::Io)?;
    runtime.block_on(run_session(&config, lookup, options.json))
}

fn build_lookup(config: &Config) -> Result<Arc<dyn Lookup>, RuntimeError> {
    let limit = config.max_results as usize;
    let catalog = match &config.catalog_path {
        Some(path) => CatalogLookup::from_path(path, limit).map_err(|error| {
            RuntimeError::Catalog {
                path: path.clone(),
                error,
            }
        })?,
        None => CatalogLookup::new(default_catalog(), limit),
    };
    if catalog.is_empty() {
        warn!("catalog is empty; every query will report no result");
    }
    Ok(Arc::new(
        catalog.with_latency(Duration::from_millis(config.lookup_latency_ms)),
    ))
}

async fn run_session(
    config: &Config,
    lookup: Arc<dyn Lookup>,
    json: bool,
) -> Result<(), RuntimeError> {
    let mut options = InputOptions::new(|value| println!("[typeahead-core] selected: {value}"));
    if let Some(placeholder) = &config.placeholder {
        options = options.with_placeholder(placeholder.clone());
    }

    let mut input = TypeaheadInput::new(options, lookup, Behavior::from(config));
    let Some(mut failures) = input.take_failures() else {
        return Err(RuntimeError::Session("failure channel unavailable".into()));
    };
    let mut changes = input.subscribe();

    if !json {
        println!("{}", input.placeholder().unwrap_or(""));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.map_err(RuntimeError::Io)? {
                Some(line) => handle_line(&mut input, &line, json)?,
                None => break,
            },
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                print_view(&input.view(), json)?;
            }
            Some(failure) = failures.recv() => {
                eprintln!("[typeahead-core] {failure}");
            }
        }
    }

    tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;
    let settle_budget = Duration::from_millis(config.lookup_latency_ms) + Duration::from_secs(1);
    let settled = tokio::time::timeout(settle_budget, async {
        changes.wait_for(|machine| !machine.is_loading()).await.is_ok()
    })
    .await
    .unwrap_or(false);
    if !settled {
        warn!("input closed while a lookup was still running");
    }

    while let Ok(failure) = failures.try_recv() {
        eprintln!("[typeahead-core] {failure}");
    }
    print_view(&input.view(), json)?;
    input.shutdown();
    info!("typeahead session finished");
    Ok(())
}

fn handle_line(input: &mut TypeaheadInput, line: &str, json: bool) -> Result<(), RuntimeError> {
    if let Some(rest) = line.strip_prefix(SELECT_COMMAND) {
        match rest.trim().parse::<usize>() {
            Ok(index) => {
                if input.select(index).is_none() {
                    eprintln!("[typeahead-core] no selectable row at {index}");
                }
            }
            Err(_) => eprintln!("[typeahead-core] {SELECT_COMMAND} expects a row index"),
        }
        return Ok(());
    }

    input.on_input(line);
    print_view(&input.view(), json)
}

fn print_view(view: &Presentation, json: bool) -> Result<(), RuntimeError> {
    if json {
        println!("{}", render_json(view)?);
    } else {
        for line in format_view(view) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_view(view: &Presentation) -> Vec<String> {
    match view {
        Presentation::Hidden => Vec::new(),
        Presentation::Loading => vec!["  ... loading".to_string()],
        Presentation::Rows(rows) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| format!("  {index:>2} | {} [{}]", row.text, row.class_name()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_view, parse_cli_args, RuntimeOptions};
    use crate::model::{ResultRow, SearchState};
    use crate::presentation::{present, Presentation};
    use std::path::PathBuf;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_cli_args(&args(&[
            "--config",
            "cfg.toml",
            "--catalog",
            "words.txt",
            "--latency-ms",
            "250",
            "--json",
        ]))
        .expect("arguments should parse");

        assert_eq!(
            options,
            RuntimeOptions {
                config_path: Some(PathBuf::from("cfg.toml")),
                catalog_path: Some(PathBuf::from("words.txt")),
                latency_ms: Some(250),
                json: true,
                show_help: false,
            }
        );
    }

    #[test]
    fn rejects_unknown_flag_and_missing_value() {
        assert!(parse_cli_args(&args(&["--verbose"]))
            .expect_err("unknown flag should fail")
            .contains("unknown argument"));
        assert_eq!(
            parse_cli_args(&args(&["--catalog"])).expect_err("missing value should fail"),
            "--catalog requires a value"
        );
        assert!(parse_cli_args(&args(&["--latency-ms", "soon"])).is_err());
    }

    #[test]
    fn formats_rows_with_index_and_class() {
        let state = SearchState {
            loading: false,
            rows: vec![
                ResultRow::matched(1, "apple".to_string()),
                ResultRow::matched(2, "band".to_string()),
            ],
        };
        let lines = format_view(&present(&state, true));
        assert_eq!(
            lines,
            vec![
                "   0 | apple [item results-container__result]",
                "   1 | band [item results-container__result]",
            ]
        );
    }

    #[test]
    fn hidden_view_prints_nothing() {
        assert!(format_view(&Presentation::Hidden).is_empty());
        assert_eq!(format_view(&Presentation::Loading), vec!["  ... loading"]);
    }
}
