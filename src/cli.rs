use crate::commands::{parse_command, Command as Input};
use crate::config::ResolvedConfig;
use crate::cpv::normalize_cpv;
use crate::errors::{AppError, AppResult};
use crate::gateway::{HttpGateway, TenderGateway};
use crate::logging;
use crate::models::Region;
use crate::regions::{canonical_region, list_provinces, list_regions};
use crate::ui;
use crate::view;
use crate::wizard::{Session, UserEvent, Wizard};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Builds the command-line definition.
pub fn build_command() -> Command {
    Command::new("licitaciones")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("api_url")
                .long("api-url")
                .global(true)
                .help("Base URL of the tenders backend (overrides the config file)")
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("wizard").about("Interactive search: regions, tenders, CPV filter, detail"),
        )
        .subcommand(
            Command::new("search")
                .about("Search tenders in one or more regions and print them")
                .after_help("Example:\n  licitaciones search -r madrid -r galicia -c 30200000")
                .arg(
                    Arg::new("region")
                        .short('r')
                        .long("region")
                        .help("Region to search (community or province); repeatable")
                        .required(true)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("cpv")
                        .short('c')
                        .long("cpv")
                        .help("Only keep tenders with this 8-digit CPV code; repeatable")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .help("Maximum number of tenders to request")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("detail")
                .about("Print the full record of one tender")
                .arg(
                    Arg::new("url")
                        .help("Tender URL, as listed by `search`")
                        .required(true),
                )
                .arg(
                    Arg::new("feed")
                        .long("feed")
                        .help("Feed the tender was listed in")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("regions")
                .about("List the regions accepted by the backend")
                .arg(
                    Arg::new("provinces")
                        .long("provinces")
                        .help("List provinces instead of autonomous communities")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Parses command-line arguments and runs the selected subcommand.
///
/// Without a subcommand the interactive wizard starts.
///
/// # Errors
///
/// Returns configuration errors before anything runs. In the interactive
/// wizard, backend and validation errors are printed and the session goes on;
/// the non-interactive subcommands return them.
pub async fn cli() -> AppResult<()> {
    let matches = build_command().get_matches();
    let config = resolve_config(&matches)?;
    logging::init(&config.log_filter)?;

    match matches.subcommand() {
        Some(("search", sub)) => run_search(&config, sub).await,
        Some(("detail", sub)) => run_detail(&config, sub).await,
        Some(("regions", sub)) => {
            print_regions(sub.get_flag("provinces"));
            Ok(())
        }
        _ => run_wizard(&config).await,
    }
}

/// Loads the config file when given, then applies flag overrides.
fn resolve_config(matches: &ArgMatches) -> AppResult<ResolvedConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ResolvedConfig::from_toml_file(path)?,
        None => ResolvedConfig::default(),
    };
    if let Some(url) = matches.get_one::<String>("api_url") {
        config.api_base_url = url.clone();
    }
    if let Some(("search", sub)) = matches.subcommand() {
        if let Some(&limit) = sub.get_one::<usize>("limit") {
            config.search_limit = limit;
        }
    }
    config.validate()?;
    Ok(config)
}

async fn run_wizard(config: &ResolvedConfig) -> AppResult<()> {
    let gateway = HttpGateway::new(config)?;
    info!(base_url = %gateway.base_url(), "Starting wizard");

    let mut session = Session::new(Wizard::new(config), gateway);
    let mut cpv_term = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n\nType 'help' for the list of commands.", view::render(session.state(), &cpv_term));
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line, session.state()) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                println!("{}", view::HELP);
                continue;
            }
            Ok(Input::Show) => {}
            Ok(Input::FindCpv(term)) => cpv_term = term,
            Ok(Input::Event(event)) => {
                if let Err(e) = dispatch(&mut session, event).await {
                    println!("! {e}");
                }
            }
            Err(e) => {
                println!("! {e}");
                continue;
            }
        }
        println!("\n{}", view::render(session.state(), &cpv_term));
    }

    info!("Wizard closed");
    Ok(())
}

/// Dispatches one event, spinning while backend requests are outstanding.
async fn dispatch<G: TenderGateway>(session: &mut Session<G>, event: UserEvent) -> AppResult<()> {
    let spinner = ui::create_spinner()?;
    let result = session
        .dispatch_with(event, |request| {
            ui::start(&spinner, request.operation().label())
        })
        .await;
    spinner.finish_and_clear();
    result
}

async fn run_search(config: &ResolvedConfig, sub: &ArgMatches) -> AppResult<()> {
    let regions: Vec<Region> = sub
        .get_many::<String>("region")
        .into_iter()
        .flatten()
        .map(|r| canonical_region(r))
        .collect();
    let codes = sub
        .get_many::<String>("cpv")
        .into_iter()
        .flatten()
        .map(|c| {
            normalize_cpv(c)
                .ok_or_else(|| AppError::InvalidInput(format!("'{c}' is not an 8-digit CPV code")))
        })
        .collect::<AppResult<Vec<String>>>()?;

    let gateway = HttpGateway::new(config)?;
    let spinner = ui::create_spinner()?;

    ui::start(&spinner, "Searching tenders...");
    let mut results = gateway.search(&regions, config.search_limit).await;
    if !codes.is_empty() && results.is_ok() {
        spinner.set_message("Extracting CPV codes (this may take a while)...");
        results = match gateway.populate_cpv().await {
            Ok(_) => {
                spinner.set_message("Applying CPV filter...");
                gateway.filter_by_cpv(&codes).await
            }
            Err(e) => Err(e),
        };
    }
    spinner.finish_and_clear();
    let results = results?;

    if codes.is_empty() {
        println!("Found {} tenders", results.total_count);
    } else {
        println!(
            "Found {} tenders matching CPV {}",
            results.total_count,
            codes.join(", ")
        );
    }
    println!("{}", view::render_tender_list(&results, None));
    Ok(())
}

async fn run_detail(config: &ResolvedConfig, sub: &ArgMatches) -> AppResult<()> {
    let url = sub
        .get_one::<String>("url")
        .ok_or_else(|| AppError::InvalidInput("A tender URL is required".into()))?;
    let feed = sub.get_one::<String>("feed").map(String::as_str);

    let gateway = HttpGateway::new(config)?;
    let spinner = ui::create_spinner()?;
    ui::start(&spinner, "Loading tender detail...");
    let detail = gateway.fetch_detail(url, feed).await;
    spinner.finish_and_clear();

    println!("{}", view::render_detail(&detail?));
    Ok(())
}

fn print_regions(provinces: bool) {
    let names = if provinces {
        list_provinces()
    } else {
        list_regions()
    };
    for (index, name) in names.iter().enumerate() {
        println!("{:>2}. {name}", index + 1);
    }
}

fn prompt() -> AppResult<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        build_command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn no_subcommand_defaults_to_wizard() {
        let matches = parse(&["licitaciones"]);
        assert!(matches.subcommand().is_none());
        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.search_limit, 100);
    }

    #[test]
    fn search_requires_a_region() {
        let err = build_command().try_get_matches_from(["licitaciones", "search"]);
        assert!(err.is_err());
    }

    #[test]
    fn search_collects_repeated_args_and_limit() {
        let matches = parse(&[
            "licitaciones",
            "search",
            "-r",
            "madrid",
            "--region",
            "galicia",
            "-c",
            "30200000",
            "-l",
            "20",
        ]);
        let sub = matches.subcommand_matches("search").unwrap();
        let regions: Vec<&String> = sub.get_many::<String>("region").unwrap().collect();
        assert_eq!(regions, ["madrid", "galicia"]);
        assert_eq!(resolve_config(&matches).unwrap().search_limit, 20);
    }

    #[test]
    fn global_api_url_overrides_default() {
        let matches = parse(&[
            "licitaciones",
            "regions",
            "--api-url",
            "http://localhost:8000",
        ]);
        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn invalid_api_url_is_config_error() {
        let matches = parse(&["licitaciones", "--api-url", "ftp://example.com"]);
        assert!(matches!(
            resolve_config(&matches),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let matches = parse(&["licitaciones", "search", "-r", "madrid", "-l", "0"]);
        assert!(resolve_config(&matches).is_err());
    }

    #[test]
    fn detail_requires_url() {
        let err = build_command().try_get_matches_from(["licitaciones", "detail"]);
        assert!(err.is_err());
    }

    #[test]
    fn print_regions_runs() {
        print_regions(false);
        print_regions(true);
    }
}
