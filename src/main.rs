use std::path::PathBuf;
use std::sync::Arc;

use bittrack::console::publish::{self, PublishOptions};
use bittrack::core::Tracker;
use bittrack::{app, logging};
use bittrack_configuration::Configuration;
use clap::{Arg, ArgAction, Command};
use log::info;

fn parser() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file to load."),
        )
        .subcommand(
            Command::new("publish")
                .about("Create a .torrent for a file and register it with the tracker.")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("piece-length")
                        .long("piece-length")
                        .value_name("BYTES")
                        .default_value("262144"),
                )
                .arg(
                    Arg::new("tracker")
                        .long("tracker")
                        .value_name("URL")
                        .action(ArgAction::Append)
                        .help("Announce URL; repeat for multiple tiers."),
                )
                .arg(
                    Arg::new("webseed")
                        .long("webseed")
                        .value_name("URL")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("private")
                        .long("private")
                        .action(ArgAction::SetTrue)
                        .help("Ask compliant clients to disable DHT and PEX."),
                ),
        )
}

#[tokio::main]
async fn main() {
    let matches = parser().get_matches();

    let config = match Configuration::resolve_path(matches.get_one::<String>("config").cloned()) {
        Some(path) => match Configuration::load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("bittrack: failed to load configuration: {err}");
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("No configuration file supplied. Using defaults.");
            Configuration::default()
        }
    };

    logging::setup_logging(&config);

    let tracker = match Tracker::new(&config) {
        Ok(tracker) => Arc::new(tracker),
        Err(err) => {
            eprintln!("bittrack: failed to start the tracker: {err}");
            std::process::exit(1);
        }
    };

    if let Some(publish_matches) = matches.subcommand_matches("publish") {
        let options = PublishOptions {
            file: PathBuf::from(publish_matches.get_one::<String>("file").expect("file is required")),
            piece_length: publish_matches
                .get_one::<String>("piece-length")
                .expect("piece-length has a default")
                .parse()
                .unwrap_or_else(|_| {
                    eprintln!("bittrack: --piece-length must be a number of bytes");
                    std::process::exit(1);
                }),
            trackers: publish_matches
                .get_many::<String>("tracker")
                .unwrap_or_default()
                .cloned()
                .collect(),
            webseeds: publish_matches
                .get_many::<String>("webseed")
                .unwrap_or_default()
                .cloned()
                .collect(),
            private: publish_matches.get_flag("private"),
        };

        match publish::invoke(&tracker, &config, &options).await {
            Ok(output) => info!("torrent file written to {}", output.display()),
            Err(err) => {
                eprintln!("bittrack: publish failed: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    let server_job = app::start(&config, tracker).await;

    tokio::select! {
        _ = server_job => {
            info!("HTTP tracker exited.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("CTRL-C, exiting...");
        }
    }
}
