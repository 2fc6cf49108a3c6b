mod handlers;
mod logging;
mod signals;

use clap::{Args, Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use telepoll_api::BotApi;
use telepoll_core::{
    config::{self, shellexpand, Config},
    offset_store::FileOffsetStore,
    LongPollingRunner, RunnerOptions,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "telepoll",
    version,
    about = "Run a Telegram bot handler over long polling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "telepoll.toml", global = true)]
    config: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll for updates and pass them to a handler until interrupted.
    Run(RunArgs),
    /// Check the token and webhook state.
    Status,
}

/// Flags for `run`. Anything given here overrides the config file.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Telegram bot token.
    #[arg(short, long)]
    token: Option<String>,

    /// Long-polling updates limit (1-100).
    #[arg(long)]
    limit: Option<u32>,

    /// Long-polling timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// First update id to request.
    #[arg(long)]
    starting_offset: Option<i64>,

    /// Consecutive fetch failures tolerated before giving up (0 = none).
    #[arg(long)]
    max_failures: Option<u32>,

    /// Persist the offset here and resume from it on the next start.
    #[arg(long)]
    offset_file: Option<String>,

    /// Logging level: debug, info, warn or error.
    #[arg(short, long)]
    verbosity: Option<String>,

    /// Log file (default: stderr).
    #[arg(short, long)]
    log_file: Option<String>,

    /// Handler to run: simple or echo.
    #[arg(value_name = "HANDLER")]
    handler: Option<String>,
}

impl RunArgs {
    fn apply(self, cfg: &mut Config) {
        if let Some(token) = self.token {
            cfg.bot.token = token.trim().to_string();
        }
        if let Some(handler) = self.handler {
            cfg.bot.handler = handler;
        }
        if let Some(limit) = self.limit {
            cfg.polling.limit = limit;
        }
        if let Some(timeout) = self.timeout {
            cfg.polling.timeout_secs = timeout;
        }
        if let Some(offset) = self.starting_offset {
            cfg.polling.starting_offset = offset;
        }
        if let Some(max) = self.max_failures {
            cfg.polling.max_consecutive_failures = max;
        }
        if self.offset_file.is_some() {
            cfg.polling.offset_file = self.offset_file;
        }
        if let Some(level) = self.verbosity {
            cfg.logging.level = match level.to_ascii_lowercase().as_str() {
                "warning" => "warn".to_string(),
                other => other.to_string(),
            };
        }
        if self.log_file.is_some() {
            cfg.logging.file = self.log_file;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Run(args) => {
            args.apply(&mut cfg);
            cfg.validate()?;
            let _guard = logging::init(&cfg.logging)?;
            log_config_source(&cli.config);
            run(cfg).await
        }
        Commands::Status => {
            cfg.validate()?;
            let _guard = logging::init(&cfg.logging)?;
            log_config_source(&cli.config);
            status(&cli.config, &cfg).await
        }
    }
}

/// Say where the configuration came from. Returns `true` when the file was
/// missing and defaults are in use.
fn log_config_source(config_path: &str) -> bool {
    if Path::new(config_path).exists() {
        info!("Config: {config_path}");
        false
    } else {
        info!("Config file not found at {config_path}, using defaults");
        true
    }
}

/// Poll until Ctrl-C/SIGTERM or a fatal error.
async fn run(cfg: Config) -> anyhow::Result<()> {
    let api = Arc::new(BotApi::new(&cfg.bot.token));
    let handler = handlers::resolve(&cfg.bot.handler, api.clone())?;

    let mut runner = LongPollingRunner::new(api, handler, RunnerOptions::from(&cfg.polling));
    if let Some(ref path) = cfg.polling.offset_file {
        let store = FileOffsetStore::new(shellexpand(path));
        info!("Offset file: {}", store.path().display());
        runner = runner.with_offset_store(Arc::new(store));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        signals::watch(signals::shutdown_signal, on_signal).await;
        std::process::exit(130);
    });

    info!(
        "Starting handler '{}' (limit {}, timeout {}s)",
        cfg.bot.handler, cfg.polling.limit, cfg.polling.timeout_secs
    );
    let report = runner.run(cancel).await?;
    info!(
        "Stopped at offset {}: {} dispatched, {} handler errors, {} fetch errors",
        report.next_offset, report.dispatched, report.handler_failures, report.transport_failures
    );
    Ok(())
}

/// Print bot identity and webhook state.
async fn status(config_path: &str, cfg: &Config) -> anyhow::Result<()> {
    let api = BotApi::new(&cfg.bot.token);
    println!("telepoll status\n");
    println!("Config: {config_path}");
    println!("Handler: {}", cfg.bot.handler);
    println!();

    let me = match api.get_me().await {
        Ok(me) => me,
        Err(e) if e.is_unauthorized() => {
            anyhow::bail!("the API rejected the bot token ({e})")
        }
        Err(e) => return Err(e.into()),
    };
    println!("  bot: {} (id {})", me.display_name(), me.id);

    let webhook = api.get_webhook_info().await?;
    if webhook.url.is_empty() {
        println!("  webhook: none");
    } else {
        println!(
            "  webhook: {} (getUpdates is refused while it is set)",
            webhook.url
        );
    }
    println!("  pending updates: {}", webhook.pending_update_count);
    if let Some(ref msg) = webhook.last_error_message {
        println!("  last webhook error: {msg}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_defaults() {
        let cli = parse(&["telepoll", "run"]);
        assert_eq!(cli.config, "telepoll.toml");
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.handler.is_none());
        assert!(args.token.is_none());
    }

    #[test]
    fn test_run_flags_override_config() {
        let cli = parse(&[
            "telepoll",
            "run",
            "-t",
            " 123:abc ",
            "--limit",
            "20",
            "--timeout",
            "30",
            "--starting-offset",
            "500",
            "--max-failures",
            "0",
            "--offset-file",
            "/tmp/offset.json",
            "-v",
            "WARNING",
            "-l",
            "bot.log",
            "-c",
            "other.toml",
            "echo",
        ]);
        assert_eq!(cli.config, "other.toml");
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        let mut cfg = Config::default();
        cfg.bot.token = "from-file".into();
        args.apply(&mut cfg);

        assert_eq!(cfg.bot.token, "123:abc");
        assert_eq!(cfg.bot.handler, "echo");
        assert_eq!(cfg.polling.limit, 20);
        assert_eq!(cfg.polling.timeout_secs, 30);
        assert_eq!(cfg.polling.starting_offset, 500);
        assert_eq!(cfg.polling.max_consecutive_failures, 0);
        assert_eq!(cfg.polling.offset_file.as_deref(), Some("/tmp/offset.json"));
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.logging.file.as_deref(), Some("bot.log"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_run_without_flags_keeps_config() {
        let mut cfg = Config::default();
        cfg.bot.token = "from-file".into();
        cfg.polling.offset_file = Some("state.json".into());
        RunArgs::default().apply(&mut cfg);

        assert_eq!(cfg.bot.token, "from-file");
        assert_eq!(cfg.bot.handler, "simple");
        assert_eq!(cfg.polling.offset_file.as_deref(), Some("state.json"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_status_subcommand() {
        let cli = parse(&["telepoll", "status", "--config", "x.toml"]);
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.config, "x.toml");
    }

    #[test]
    fn test_log_config_source() {
        assert!(log_config_source("definitely/not/here/telepoll.toml"));
        assert!(!log_config_source("Cargo.toml"));
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["telepoll", "start"]).is_err());
    }
}
