use clap::{App, AppSettings, Arg, SubCommand};
use tracing_subscriber::EnvFilter;

mod command_dispute;
mod command_keygen;
mod config;

pub use command_dispute::*;
pub use command_keygen::*;
pub use config::*;

fn main() {
    let matches = App::new("votecast")
        .version("0.1")
        .about("Vote-cast confirmation dispute resolution")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity, RUST_LOG overrides it"),
        )
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate a dispute resolver signing key")
                .arg(
                    Arg::with_name("SECRET_FILE")
                        .index(1)
                        .required(true)
                        .help("File to write the hex encoded secret key to"),
                ),
        )
        .subcommand(
            SubCommand::with_name("dispute")
                .about("Resolve confirmation disputes after the election closed")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("resolve")
                        .about("Reconcile the four nodes' extractions and sign the resolved confirmed votes")
                        .arg(
                            Arg::with_name("INPUT")
                                .index(1)
                                .required(true)
                                .help("Dispute extraction in JSON or CBOR format"),
                        )
                        .arg(
                            Arg::with_name("secret")
                                .long("secret")
                                .takes_value(true)
                                .help("File holding the hex encoded signing key - can also be set with VOTECAST_SECRET_KEY"),
                        )
                        .arg(
                            Arg::with_name("output")
                                .long("output")
                                .short("o")
                                .takes_value(true)
                                .help("Where to write the signed payload - defaults to VOTECAST_OUTPUT_DIR or stdout"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("verify")
                        .about("Verify a signed resolved confirmed votes payload")
                        .arg(
                            Arg::with_name("PAYLOAD")
                                .index(1)
                                .required(true)
                                .help("Signed payload in JSON format"),
                        )
                        .arg(
                            Arg::with_name("public-key")
                                .long("public-key")
                                .takes_value(true)
                                .help("Hex encoded public key the payload must be signed with"),
                        ),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("keygen") {
        command_keygen(matches);
        std::process::exit(0);
    }

    if let Some(matches) = matches.subcommand_matches("dispute") {
        let config = Config::from_env().unwrap_or_else(|e| {
            eprintln!("votecast: {}", e);
            std::process::exit(1);
        });
        command_dispute(matches, &config);
        std::process::exit(0);
    }
}

/// Expand `~` and environment variables in a path given on the command line
pub fn expand(filename: &str) -> String {
    match shellexpand::full(filename) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            eprintln!("votecast: unable to expand {}: {}", filename, e);
            std::process::exit(1);
        }
    }
}
