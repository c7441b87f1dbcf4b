use ranklr::cli::{CliInterface, Command, load_puzzle, parse_cli, render_report, resolve_date, verify};
use ranklr::dates::SystemClock;
use ranklr::logging;
use ranklr::repository::JsonFileRepository;
use ranklr::session::game_loop;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();
    logging::init(cli.verbose);

    let Some(store_path) = cli.resolve_store_path() else {
        eprintln!("No puzzle store given and no data directory found; pass --input.");
        return ExitCode::FAILURE;
    };
    log::debug!("using puzzle store {}", store_path.display());
    let repo = JsonFileRepository::new(store_path);

    match cli.command {
        Command::Verify => match verify(&repo) {
            Ok(report) => {
                print!("{}", render_report(&report));
                if report.is_success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                eprintln!("Error during verification: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Play { date } => {
            let date = match resolve_date(date.as_deref(), &SystemClock) {
                Ok(date) => date,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            match load_puzzle(&repo, &date) {
                Ok(Some(puzzle)) => {
                    let stdin = io::stdin();
                    let mut interface = CliInterface::new(stdin.lock());
                    game_loop(&puzzle, &mut interface);
                    ExitCode::SUCCESS
                }
                Ok(None) => {
                    eprintln!("No puzzle published for {date}.");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    eprintln!("Failed to load puzzle for {date}: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
