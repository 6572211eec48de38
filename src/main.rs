use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use rainflow_fatigue::app_logic;

fn main() -> Result<()> {
    let matches = Command::new("rainflow")
        .version("0.1.0")
        .about("Rainflow cycle counting of load and stress time series")
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .value_name("CONFIG")
                .help("YAML or TOML run configuration")
                .required(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log progress to stderr"),
        )
        .after_help("The report is printed to stdout as JSON. RUST_LOG overrides --verbose.")
        .get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Some(config_path) = matches.get_one::<String>("run") {
        let report = app_logic::run(config_path)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
