use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::decode::cmd_decode;

mod cli;
pub(crate) mod timestamp;
mod wav;

fn build_logger(cli: &Cli) -> env_logger::Builder {
    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(cli.loglevel.to_level_filter());
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                let line = json_record(
                    &buf.timestamp().to_string(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                );
                writeln!(buf, "{line}")
            });
        }
    }
    env_builder
}

fn json_record(ts: &str, level: log::Level, target: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": ts,
        "lvl": level.as_str(),
        "target": target,
        "msg": msg,
    })
    .to_string()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let multi = MultiProgress::new();
    let mut env_builder = build_logger(&cli);

    let pb = if cli.progress {
        LogWrapper::new(multi.clone(), env_builder.build()).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    if let Some(describe) = option_env!("VERGEN_GIT_DESCRIBE") {
        log::debug!("{} {describe}", env!("CARGO_PKG_NAME"));
    }

    match cli.command {
        Commands::Decode(ref args) => cmd_decode(args, &cli, pb)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_record_escapes_control_characters() {
        let line = json_record(
            "2026-01-01T00:00:00Z",
            log::Level::Warn,
            "audiopipe::process",
            "decoder said \u{1b}[31m\"oops\"\n",
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["lvl"], "WARN");
        assert_eq!(value["target"], "audiopipe::process");
        assert_eq!(value["msg"], "decoder said \u{1b}[31m\"oops\"\n");
        assert!(!line.contains('\n'));
    }
}
