use anyhow::Result;
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    // Reproducible builds pin the timestamp through SOURCE_DATE_EPOCH.
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => chrono::Utc
            .timestamp_opt(val.parse::<i64>()?, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("SOURCE_DATE_EPOCH out of range: {val}"))?,
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let audiopipe_version = audiopipe_version_from_metadata().unwrap_or_else(|_| {
        audiopipe_version_fallback().unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=AUDIOPIPE_VERSION={audiopipe_version}");

    println!("cargo:rerun-if-changed=audiopipe/Cargo.toml");

    Ok(())
}

/// Version of the audiopipe library as resolved by cargo, whether it comes
/// from the workspace or from a registry.
fn audiopipe_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    let from_packages = metadata["packages"].as_array().and_then(|packages| {
        packages
            .iter()
            .find(|package| package["name"].as_str() == Some("audiopipe"))
            .and_then(|package| package["version"].as_str())
    });
    if let Some(version) = from_packages {
        return Ok(version.to_string());
    }

    // Registry ids look like "audiopipe 0.1.0 (registry+...)".
    let from_resolve = metadata["resolve"]["nodes"].as_array().and_then(|nodes| {
        nodes
            .iter()
            .filter_map(|node| node["id"].as_str())
            .find(|id| id.starts_with("audiopipe "))
            .and_then(|id| id.split(' ').nth(1))
    });
    if let Some(version) = from_resolve {
        return Ok(version.to_string());
    }

    anyhow::bail!("audiopipe package not found in metadata");
}

fn audiopipe_version_fallback() -> Result<String> {
    let toml_content = fs::read_to_string("audiopipe/Cargo.toml")?;

    toml_content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("version"))
        .find_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').trim_matches('\'').to_string())
        .ok_or_else(|| anyhow::anyhow!("Could not find version in audiopipe/Cargo.toml"))
}
