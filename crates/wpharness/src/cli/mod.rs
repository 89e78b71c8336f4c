pub mod handlers;

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("wpharness")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Boundary-value tests for the WordPress comment form")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(cmd_run())
        .subcommand(cmd_twin())
}

fn cmd_run() -> Command {
    Command::new("run")
        .about("Run checks against a WordPress site")
        .arg(
            Arg::new("target")
                .value_parser(["comments", "login", "smoke", "all"])
                .default_value("all")
                .help("Which checks to run"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Site root, overriding config"),
        )
        .arg(
            Arg::new("webdriver-url")
                .long("webdriver-url")
                .value_name("URL")
                .help("WebDriver endpoint, overriding config"),
        )
        .arg(
            Arg::new("driver")
                .long("driver")
                .value_parser(["browser", "http"])
                .help("How comment cases are submitted"),
        )
        .arg(
            Arg::new("only")
                .long("only")
                .value_name("CASE_ID")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Run only these cases, e.g. TC-COMMENT-06"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
}

fn cmd_twin() -> Command {
    Command::new("twin")
        .about("Serve an in-memory WordPress twin")
        .arg(
            Arg::new("port")
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080"),
        )
        .arg(
            Arg::new("flood-window-secs")
                .long("flood-window-secs")
                .value_parser(clap::value_parser!(u64))
                .default_value("15")
                .help("Minimum seconds between comments; 0 disables flood control"),
        )
        .arg(Arg::new("username").long("username").default_value("admin"))
        .arg(Arg::new("password").long("password").default_value("password"))
}
