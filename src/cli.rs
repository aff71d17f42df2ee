use clap::{Parser, Subcommand};
use pilotwatch::config::{self, AppConfig, FileConfig, ScheduleSource};
use std::net::SocketAddr;
use std::path::PathBuf;

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve(AppConfig),
    Check(AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    let file = match cli.config.as_deref() {
        Some(path) => match FileConfig::load(path) {
            Ok(file) => file,
            Err(err) => {
                eprintln!("error: {err}");
                return RunOutcome::Exit(2);
            }
        },
        None => FileConfig::default(),
    };

    let config = match resolve_config(&cli, file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return RunOutcome::Exit(2);
        }
    };

    match cli.command {
        Some(Command::Check) => RunOutcome::Check(config),
        Some(Command::Serve) | None => RunOutcome::Serve(config),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pilotwatch",
    version,
    about = "Watches the pilot schedule and pushes change alerts to subscribers"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// TOML file with defaults for every flag below.
    #[arg(long, env = "PILOTWATCH_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PILOTWATCH_BIND")]
    bind: Option<SocketAddr>,
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    #[arg(long, env = "PILOTWATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Schedule page URL or local HTML file.
    #[arg(long, env = "PILOTWATCH_SOURCE")]
    source: Option<String>,
    #[arg(long = "table-id")]
    table_ids: Vec<String>,
    #[arg(long, env = "PILOTWATCH_CHECK_INTERVAL")]
    check_interval: Option<String>,
    #[arg(long, env = "PILOTWATCH_FETCH_TIMEOUT")]
    fetch_timeout: Option<String>,
    /// Upper bound for each FCM request, token exchange included.
    #[arg(long, env = "PILOTWATCH_DELIVERY_TIMEOUT")]
    delivery_timeout: Option<String>,
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    #[arg(long, env = "PILOTWATCH_MAX_LINES_PER_PUSH")]
    max_lines_per_push: Option<usize>,
    #[arg(long, env = "FIREBASE_CREDENTIALS_JSON", hide_env_values = true)]
    fcm_credentials_json: Option<String>,
    #[arg(long, env = "PILOTWATCH_FCM_CREDENTIALS_FILE")]
    fcm_credentials_file: Option<PathBuf>,
    #[arg(long, env = "PILOTWATCH_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API and run scheduled checks (default).
    Serve,
    /// Run one check cycle and print the result as JSON.
    Check,
}

/// Flags win over the config file, which wins over built-in defaults.
fn resolve_config(cli: &Cli, file: FileConfig) -> Result<AppConfig, String> {
    let defaults = AppConfig::default();

    let bind = match (cli.bind, cli.port, file.bind, file.port) {
        (Some(bind), _, _, _) => bind,
        (None, Some(port), _, _) => SocketAddr::new(defaults.bind.ip(), port),
        (None, None, Some(bind), _) => bind,
        (None, None, None, Some(port)) => SocketAddr::new(defaults.bind.ip(), port),
        (None, None, None, None) => defaults.bind,
    };

    let source = match cli.source.as_deref().or(file.source.as_deref()) {
        Some(raw) if raw.trim().is_empty() => return Err("source cannot be empty".to_string()),
        Some(raw) => ScheduleSource::parse(raw),
        None => defaults.source,
    };

    let table_ids = pick_list(&cli.table_ids, file.table_ids, defaults.table_ids);
    let restriction_keywords =
        pick_list(&cli.keywords, file.restriction_keywords, defaults.restriction_keywords);

    let check_interval = match cli.check_interval.as_deref().or(file.check_interval.as_deref()) {
        Some(raw) => config::parse_duration(raw).map_err(|err| format!("check interval: {err}"))?,
        None => defaults.check_interval,
    };
    let fetch_timeout = match cli.fetch_timeout.as_deref().or(file.fetch_timeout.as_deref()) {
        Some(raw) => config::parse_duration(raw).map_err(|err| format!("fetch timeout: {err}"))?,
        None => defaults.fetch_timeout,
    };
    let delivery_timeout =
        match cli.delivery_timeout.as_deref().or(file.delivery_timeout.as_deref()) {
            Some(raw) => {
                config::parse_duration(raw).map_err(|err| format!("delivery timeout: {err}"))?
            }
            None => defaults.delivery_timeout,
        };

    let fcm_credentials = match (
        cli.fcm_credentials_json.as_deref(),
        cli.fcm_credentials_file.as_deref().or(file.fcm_credentials_file.as_deref()),
    ) {
        (Some(json), _) if !json.trim().is_empty() => Some(json.to_string()),
        (_, Some(path)) => Some(config::read_credentials_file(path).map_err(|err| err.to_string())?),
        _ => None,
    };

    let config = AppConfig {
        bind,
        data_dir: cli.data_dir.clone().or(file.data_dir).unwrap_or(defaults.data_dir),
        source,
        table_ids,
        check_interval,
        fetch_timeout,
        delivery_timeout,
        restriction_keywords,
        max_lines_per_push: cli
            .max_lines_per_push
            .or(file.max_lines_per_push)
            .unwrap_or(defaults.max_lines_per_push),
        fcm_credentials,
        log_level: cli.log_level.clone().or(file.log_level).unwrap_or(defaults.log_level),
    };
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

/// First non-empty list wins; blank entries are dropped.
fn pick_list(flags: &[String], file: Option<Vec<String>>, default: Vec<String>) -> Vec<String> {
    let clean = |values: &[String]| -> Vec<String> {
        values
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    };
    let from_flags = clean(flags);
    if !from_flags.is_empty() {
        return from_flags;
    }
    match file.map(|values| clean(&values)) {
        Some(values) if !values.is_empty() => values,
        _ => default,
    }
}
