use std::env;
use std::path::{Path, PathBuf};

use dh_doom::AppConfig;

const DEFAULT_OUT_DIR: &str = "dist";

fn print_usage() {
    eprintln!("Usage: dh-doom [--config PATH] <COMMAND> [OPTIONS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  serve [--host H] [--port P]   Serve the site over HTTP");
    eprintln!("  build [--out DIR]             Export the site as static files (default: {DEFAULT_OUT_DIR})");
    eprintln!("  warm <ORIGIN>                 Precache a running site and record the result");
    eprintln!("  currency [CODE]               List currencies or set the preferred one");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --config <PATH>     Config file (default: $DH_DOOM_CONFIG or the user config dir)");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Set RUST_LOG to change the log level (default: info).");
}

enum Command {
    Serve { host: Option<String>, port: Option<u16> },
    Build { out: PathBuf },
    Warm { origin: String },
    Currency { code: Option<String> },
}

struct CliArgs {
    config_path: Option<PathBuf>,
    command: Command,
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    eprintln!();
    print_usage();
    std::process::exit(1);
}

fn value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(&format!("{flag} requires a value")))
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut config_path = None;
    let mut command: Option<String> = None;
    let mut positional = Vec::new();
    let mut host = None;
    let mut port = None;
    let mut out = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config_path = Some(PathBuf::from(value(&args, &mut i, "--config"))),
            "--host" => host = Some(value(&args, &mut i, "--host")),
            "--port" => {
                let raw = value(&args, &mut i, "--port");
                port = Some(
                    raw.parse()
                        .unwrap_or_else(|_| fail(&format!("invalid port: {raw}"))),
                );
            }
            "--out" | "-o" => out = Some(PathBuf::from(value(&args, &mut i, "--out"))),
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => fail(&format!("unknown option: {arg}")),
            arg if command.is_none() => command = Some(arg.to_string()),
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let command = match command.as_deref() {
        Some("serve") => Command::Serve { host, port },
        Some("build") => Command::Build {
            out: out.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
        },
        Some("warm") => Command::Warm {
            origin: positional
                .first()
                .cloned()
                .unwrap_or_else(|| fail("warm requires an origin URL")),
        },
        Some("currency") => Command::Currency {
            code: positional.first().cloned(),
        },
        Some(other) => fail(&format!("unknown command: {other}")),
        None => {
            print_usage();
            std::process::exit(0);
        }
    };

    CliArgs {
        config_path,
        command,
    }
}

#[tokio::main]
async fn main() -> dh_doom::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config_path = args.config_path.unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_or_create(&config_path)?;
    let data_dir = AppConfig::data_dir();

    #[cfg(feature = "cli")]
    let config = dh_doom::cli::with_stored_currency(config, &data_dir);

    match args.command {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Build { out } => build(config, out).await,
        Command::Warm { origin } => warm(config, origin, data_dir).await,
        Command::Currency { code } => currency(&config, code, &data_dir),
    }
}

#[cfg(any(not(feature = "cli"), not(feature = "server")))]
fn not_compiled(feature: &str) -> ! {
    eprintln!("This command needs the '{feature}' feature, which is not compiled in");
    std::process::exit(1);
}

#[cfg(feature = "server")]
async fn serve(config: AppConfig, host: Option<String>, port: Option<u16>) -> dh_doom::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    dh_doom::server::run(config.with_server(host, port)).await
}

#[cfg(not(feature = "server"))]
async fn serve(_config: AppConfig, _host: Option<String>, _port: Option<u16>) -> dh_doom::Result<()> {
    not_compiled("server")
}

#[cfg(feature = "cli")]
async fn build(config: AppConfig, out: PathBuf) -> dh_doom::Result<()> {
    dh_doom::cli::run_build(config, &out).await
}

#[cfg(feature = "cli")]
async fn warm(config: AppConfig, origin: String, data_dir: PathBuf) -> dh_doom::Result<()> {
    dh_doom::cli::run_warm(config, &origin, &data_dir).await
}

#[cfg(feature = "cli")]
fn currency(config: &AppConfig, code: Option<String>, data_dir: &Path) -> dh_doom::Result<()> {
    dh_doom::cli::run_currency(config, code.as_deref(), data_dir)
}

#[cfg(not(feature = "cli"))]
async fn build(_config: AppConfig, _out: PathBuf) -> dh_doom::Result<()> {
    not_compiled("cli")
}

#[cfg(not(feature = "cli"))]
async fn warm(_config: AppConfig, _origin: String, _data_dir: PathBuf) -> dh_doom::Result<()> {
    not_compiled("cli")
}

#[cfg(not(feature = "cli"))]
fn currency(_config: &AppConfig, _code: Option<String>, _data_dir: &Path) -> dh_doom::Result<()> {
    not_compiled("cli")
}
