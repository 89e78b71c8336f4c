pub mod run;
pub mod twin;

use anyhow::Result;
use clap::ArgMatches;

pub async fn dispatch(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("run", sub_m)) => run::handle(sub_m).await,
        Some(("twin", sub_m)) => twin::handle(sub_m).await,
        _ => anyhow::bail!("Unknown command. Run 'wpharness --help' for usage."),
    }
}
