//! # homesim — smart-home simulator
//!
//! Composition root: loads configuration, initialises logging, builds the
//! home and runs the command loop over stdin (or a single `--exec` command).

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use homesim::config::{Config, DEFAULT_CONFIG_PATH};
use homesim::shell::{OutputFormat, Shell};
use homesim_app::home::{Home, HomeOptions};
use homesim_domain::time;

#[derive(Debug, Parser)]
#[command(name = "homesim")]
#[command(about = "Smart-home simulator with contextual rules and suggestions")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "HOMESIM_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log filter, overriding the config file and environment
    #[arg(long)]
    log: Option<String>,

    /// Start with an empty house instead of the default devices and rules
    #[arg(long)]
    no_defaults: bool,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    /// Run a single command and exit
    #[arg(short = 'e', long)]
    exec: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let filter = args.log.as_deref().unwrap_or(&config.logging.filter);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).context("invalid log filter")?)
        .with_writer(std::io::stderr)
        .init();

    let options = HomeOptions {
        history_capacity: config.history.capacity,
    };
    let home = if config.bootstrap.defaults && !args.no_defaults {
        Home::bootstrap(options)?
    } else {
        Home::empty(options)
    };
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut shell = Shell::new(home, format);

    if let Some(line) = args.exec {
        let reply = shell.handle_line(&line, time::now())?;
        println!("{}", reply.output);
        return Ok(());
    }

    repl(&mut shell)
}

fn repl(shell: &mut Shell) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    writeln!(stdout, "homesim ready, type `help` for commands")?;

    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "homesim> ")?;
        stdout.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match shell.handle_line(&line, time::now()) {
            Ok(reply) => {
                writeln!(stdout, "{}", reply.output)?;
                if reply.quit {
                    break;
                }
            }
            Err(err) => {
                tracing::debug!(error = ?err, "command rejected");
                writeln!(stdout, "error: {err}")?;
            }
        }
    }
    Ok(())
}
