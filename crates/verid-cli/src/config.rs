use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use verid::{Settings, SystemClock, TimeSource, VerifiableId};

/// Upper bound on `next --count`.
pub const MAX_COUNT: usize = 1_000_000;

/// Command-line arguments for the `verid` binary.
///
/// Generator options can be supplied as flags or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "verid",
    version,
    about = "Mint, verify and inspect time-ordered verifiable identifiers"
)]
pub struct CliArgs {
    /// Secret key folded into every checksum.
    ///
    /// Environment variable: `VERID_SECRET_KEY`
    #[arg(
        long,
        global = true,
        env = "VERID_SECRET_KEY",
        hide_env_values = true,
        default_value_t = String::new()
    )]
    pub secret_key: String,

    /// Epoch ticks are counted from, in milliseconds since 1970-01-01 UTC.
    /// Defaults to 2014-09-01 UTC.
    ///
    /// Environment variable: `VERID_START_TIME_MS`
    #[arg(long, global = true, env = "VERID_START_TIME_MS")]
    pub start_time_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mint new identifiers, one per line.
    Next {
        /// How many identifiers to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Decimal)]
        format: Format,
    },
    /// Check an identifier's checksum. Exits with status 1 on mismatch.
    Verify {
        /// Identifier, decimal unless `--hex` is given.
        id: String,

        /// Parse `id` as hexadecimal (an `0x` prefix is accepted).
        #[arg(long)]
        hex: bool,
    },
    /// Break an identifier down into tick, sequence and checksum.
    Inspect {
        /// Identifier, decimal unless `--hex` is given.
        id: String,

        /// Parse `id` as hexadecimal (an `0x` prefix is accepted).
        #[arg(long)]
        hex: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Decimal,
    Hex,
}

/// What the binary was asked to do, with every argument already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Next { count: usize, format: Format },
    Verify(VerifiableId),
    Inspect(VerifiableId),
}

#[derive(Clone)]
pub struct Config {
    pub settings: Settings,
    pub action: Action,
}

// Keeps the secret out of logs.
impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("start_time", &self.settings.epoch())
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut settings = Settings::default().with_secret_key(args.secret_key);

        if let Some(ms) = args.start_time_ms {
            if i128::from(ms) * 1_000_000 > i128::from(SystemClock.current_nanos()) {
                bail!("VERID_START_TIME_MS ({ms}) is in the future");
            }
            settings = settings.with_start_time(Duration::from_millis(ms));
        }

        let action = match args.command {
            Command::Next { count, format } => {
                if count == 0 {
                    bail!("--count must be greater than 0");
                }
                if count > MAX_COUNT {
                    bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
                }
                Action::Next { count, format }
            }
            Command::Verify { id, hex } => Action::Verify(parse_id(&id, hex)?),
            Command::Inspect { id, hex } => Action::Inspect(parse_id(&id, hex)?),
        };

        Ok(Self { settings, action })
    }
}

fn parse_id(raw: &str, hex: bool) -> anyhow::Result<VerifiableId> {
    let parsed = if hex {
        VerifiableId::from_hex_str(raw)
    } else {
        VerifiableId::from_decimal_str(raw)
    };
    parsed.with_context(|| format!("invalid identifier `{raw}`"))
}
