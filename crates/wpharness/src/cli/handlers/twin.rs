//! `wpharness twin`: serve the in-memory WordPress twin.

use std::time::Duration;

use anyhow::Result;
use clap::ArgMatches;
use twins::TwinConfig;

/// Build the twin configuration from the subcommand's flags.
#[must_use]
pub fn twin_config(matches: &ArgMatches) -> TwinConfig {
    let defaults = TwinConfig::default();
    TwinConfig {
        port: matches.get_one::<u16>("port").copied().unwrap_or(defaults.port),
        flood_window: matches
            .get_one::<u64>("flood-window-secs")
            .map_or(defaults.flood_window, |secs| Duration::from_secs(*secs)),
        username: matches
            .get_one::<String>("username")
            .cloned()
            .unwrap_or(defaults.username),
        password: matches
            .get_one::<String>("password")
            .cloned()
            .unwrap_or(defaults.password),
        ..TwinConfig::default()
    }
}

pub async fn handle(matches: &ArgMatches) -> Result<()> {
    twins::serve(twin_config(matches)).await?;
    Ok(())
}
