//! vhostguard config test.
//!
//! - Strict-parses and validates the config, compiles every vhost rule set.
//! - Logs a per-vhost summary (enabled, rule counts, default mode).
//! - `probe <vhost> <conn> <address>` evaluates one admission request and
//!   prints the decision.
//!
//! Exit code is non-zero on config error or a rejected probe.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use vhostguard_core::security::{ConnType, Mode};
use vhostguard_gateway::{config, policy::SecurityRegistry};

/// Security config checker for vhostguard
#[derive(Parser, Debug)]
#[command(name = "vhostguard-gateway")]
#[command(version)]
#[command(about = "Validate vhost security rules and probe admission decisions", long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE", default_value = "vhostguard.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one connection against the loaded rules
    Probe {
        /// Vhost the connection targets
        vhost: String,
        /// Connection type
        #[arg(value_enum)]
        conn: ConnArg,
        /// Source address of the connection
        address: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ConnArg {
    Play,
    /// Alias for fmle-publish
    Publish,
    FmlePublish,
    FlashPublish,
    HaivisionPublish,
}

impl From<ConnArg> for ConnType {
    fn from(c: ConnArg) -> Self {
        match c {
            ConnArg::Play => ConnType::Play,
            ConnArg::Publish | ConnArg::FmlePublish => ConnType::FmlePublish,
            ConnArg::FlashPublish => ConnType::FlashPublish,
            ConnArg::HaivisionPublish => ConnType::HaivisionPublish,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    ConfigError,
    Denied,
}

impl From<Outcome> for ExitCode {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Ok => ExitCode::SUCCESS,
            Outcome::ConfigError | Outcome::Denied => ExitCode::FAILURE,
        }
    }
}

fn run(args: &Args, out: &mut impl Write) -> Outcome {
    let path = args.config.display().to_string();

    let cfg = match config::load_from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%path, code = e.code().as_str(), error = %e, "config load failed");
            return Outcome::ConfigError;
        }
    };

    let registry = match SecurityRegistry::new(&cfg) {
        Ok(r) => r,
        Err(e) => {
            error!(%path, error = %e, "security compile failed");
            return Outcome::ConfigError;
        }
    };

    for name in registry.vhost_names() {
        let Some(sec) = registry.vhost(&name) else { continue };
        let (allow, deny) = sec
            .rules()
            .map(|r| (r.allow_count(), r.deny_count()))
            .unwrap_or((0, 0));
        let mode = match (sec.enabled(), sec.mode()) {
            (false, _) => "disabled",
            (true, None) => "default-deny",
            (true, Some(Mode::Whitelist)) => "whitelist",
            (true, Some(Mode::Blacklist)) => "blacklist",
        };
        info!(vhost = %name, mode, allow, deny, "security");
    }
    info!(%path, "config test ok");

    let Some(Command::Probe { vhost, conn, address }) = &args.command else {
        return Outcome::Ok;
    };

    let conn = ConnType::from(*conn);
    let d = registry.evaluate(conn, address, vhost);
    let _ = writeln!(
        out,
        "{} {} {} {}: {}",
        vhost,
        conn.as_str(),
        address,
        if d.admitted { "ALLOW" } else { "DENY" },
        d.reason
    );

    if d.admitted {
        Outcome::Ok
    } else {
        Outcome::Denied
    }
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    run(&args, &mut io::stdout().lock()).into()
}
