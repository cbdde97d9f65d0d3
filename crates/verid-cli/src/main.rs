#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{Action, CliArgs, Config, Format};
use std::io::{self, Write};
use std::process::ExitCode;
use verid::{
    SystemClock, TIME_UNIT, TimeSource, VerifiableGenerator, VerifiableId, duration_to_ticks,
    to_ticks,
};

fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    telemetry::init_tracing();

    let config = Config::try_from(args)?;
    tracing::debug!(?config, "parsed configuration");

    let stdout = io::stdout();
    if run(&config, SystemClock, &mut stdout.lock())? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Executes `config.action`, writing its report to `out`.
///
/// Returns `false` when a verification failed.
fn run<T>(config: &Config, time: T, out: &mut impl Write) -> anyhow::Result<bool>
where
    T: TimeSource,
{
    match config.action {
        Action::Next { count, format } => {
            let generator = VerifiableGenerator::new(&config.settings, &time);
            for _ in 0..count {
                let id = generator.next_id();
                match format {
                    Format::Decimal => writeln!(out, "{id}")?,
                    Format::Hex => writeln!(out, "{id:x}")?,
                }
            }
            tracing::info!(count, "minted identifiers");
            Ok(true)
        }
        Action::Verify(id) => {
            if id.verify(&config.settings.secret_key) {
                writeln!(out, "valid")?;
                Ok(true)
            } else {
                tracing::warn!(%id, "checksum mismatch");
                writeln!(out, "invalid")?;
                Ok(false)
            }
        }
        Action::Inspect(id) => {
            inspect(config, id, time.current_nanos(), out)?;
            Ok(true)
        }
    }
}

fn inspect(
    config: &Config,
    id: VerifiableId,
    now_nanos: i64,
    out: &mut impl Write,
) -> io::Result<()> {
    let epoch = config.settings.epoch();
    let current_tick = to_ticks(now_nanos) - duration_to_ticks(epoch);
    let minted_ms = i128::from(id.unwrapped_tick(current_tick)) * TIME_UNIT.as_millis() as i128
        + epoch.as_millis() as i128;

    writeln!(out, "id:        {id}")?;
    writeln!(out, "hex:       {id:#x}")?;
    writeln!(out, "tick:      {}", id.tick())?;
    writeln!(out, "sequence:  {}", id.sequence())?;
    writeln!(out, "checksum:  {:#04x}", id.checksum())?;
    writeln!(out, "minted_ms: {minted_ms}")?;
    writeln!(out, "valid:     {}", id.verify(&config.settings.secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verid::Settings;

    struct FixedTime(i64);

    impl TimeSource for FixedTime {
        fn current_nanos(&self) -> i64 {
            self.0
        }
    }

    /// One second past 2023-11-14T22:13:20Z.
    const AFTER_EPOCH: FixedTime = FixedTime(1_700_000_001 * 1_000_000_000);

    fn output(config: &Config) -> (bool, String) {
        output_at(config, SystemClock)
    }

    fn output_at(config: &Config, time: impl TimeSource) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run(config, time, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn next_prints_count_verifiable_lines() {
        let config = Config {
            settings: Settings::default().with_secret_key("k"),
            action: Action::Next {
                count: 4,
                format: Format::Hex,
            },
        };

        let (ok, out) = output(&config);
        assert!(ok);

        let ids: Vec<_> = out
            .lines()
            .map(|line| VerifiableId::from_hex_str(line).unwrap())
            .collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| id.verify("k")));
    }

    #[test]
    fn verify_reports_and_sets_exit_code() {
        let mut config = Config {
            settings: Settings::default().with_secret_key(" "),
            action: Action::Verify(VerifiableId::from_raw(0x121)),
        };
        assert_eq!(output(&config), (true, "valid\n".to_owned()));

        config.settings = Settings::default();
        assert_eq!(output(&config), (false, "invalid\n".to_owned()));
    }

    #[test]
    fn inspect_breaks_down_fields() {
        let config = Config {
            settings: Settings::default()
                .with_secret_key(" ")
                .with_start_time(core::time::Duration::from_secs(1_700_000_000)),
            action: Action::Inspect(VerifiableId::from_raw(0x10021)),
        };

        let (ok, out) = output_at(&config, AFTER_EPOCH);
        assert!(ok);
        assert!(out.contains("id:        65569\n"));
        assert!(out.contains("hex:       0x10021\n"));
        assert!(out.contains("tick:      1\n"));
        assert!(out.contains("sequence:  0\n"));
        assert!(out.contains("checksum:  0x21\n"));
        assert!(out.contains("minted_ms: 1700000000010\n"));
        assert!(out.contains("valid:     true\n"));
    }

    #[test]
    fn inspect_places_wrapped_tick_in_current_cycle() {
        let settings = Settings::default();
        let minted = VerifiableGenerator::new(&settings, SystemClock).next_id();
        let config = Config {
            settings,
            action: Action::Inspect(minted),
        };

        let (ok, out) = output(&config);
        let now_ms = i128::from(SystemClock.current_nanos() / 1_000_000);
        assert!(ok);

        let minted_ms: i128 = out
            .lines()
            .find_map(|line| line.strip_prefix("minted_ms:"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(minted_ms <= now_ms);
        assert!(now_ms - minted_ms < 1_000);
    }
}
