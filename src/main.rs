use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use jotter::build::build_site;
use jotter::config::{Config, Options};
use jotter::logging::init_logging;
use std::error::Error;
use std::path::{Path, PathBuf};

fn main() {
    let matches = App::new("jotter")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the post listing and feed")
                .arg(
                    Arg::with_name("drafts")
                        .long("drafts")
                        .help("Includes posts from the drafts directory"),
                )
                .arg(
                    Arg::with_name("destination")
                        .long("destination")
                        .short("d")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("Writes the site to DIR instead of the configured destination"),
                )
                .arg(
                    Arg::with_name("config")
                        .long("config")
                        .short("c")
                        .takes_value(true)
                        .value_name("FILE")
                        .help("Uses FILE instead of searching for `_config.yml`"),
                )
                .arg(
                    Arg::with_name("quiet")
                        .long("quiet")
                        .short("q")
                        .help("Only logs warnings and errors"),
                ),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    match matches.subcommand() {
        ("build", Some(matches)) => {
            init_logging(matches.is_present("quiet"));
            let options = Options {
                drafts: matches.is_present("drafts"),
                destination: matches.value_of("destination").map(PathBuf::from),
            };
            let config = match matches.value_of("config") {
                Some(path) => Config::from_project_file(Path::new(path), &options)?,
                None => Config::from_directory(&std::env::current_dir()?, &options)?,
            };
            let summary = build_site(&config)?;
            log::info!(
                "listed {} posts ({} drafts) in {}",
                summary.posts,
                summary.drafts,
                summary.index.display()
            );
            Ok(())
        }
        // `SubcommandRequiredElseHelp` prints help before we get here.
        _ => Ok(()),
    }
}
