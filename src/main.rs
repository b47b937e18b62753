use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use crewcheck::crew::CrewMember;
use crewcheck::time::parse_local;
use crewcheck::{AssignmentValidator, Rejection, Rules, SharedStore, Store, compute_duration};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json")]
    scenario: PathBuf,

    /// Path to a TOML file overriding the default rules
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let Ok(mut pager) = pager else {
        println!("{}", content);
        return;
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_table<T: Tabled>(rows: &[T], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn print_rejection(rejection: &Rejection) {
    println!(
        "{} [{} {}] {}",
        "REJECTED".red().bold(),
        rejection.status(),
        rejection.category(),
        rejection
    );
    for conflict in rejection.conflicts() {
        println!("  - {}", conflict.to_string().yellow());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let rules = match &args.rules {
        Some(path) => Rules::load(path)?,
        None => Rules::default(),
    };

    let store = Store::load_from_file(&args.scenario, &rules)?;
    println!(
        "Crew desk online. Loaded {} crew and {} flights from {}",
        store.crew.len(),
        store.flights.len(),
        args.scenario.display()
    );
    let shared = SharedStore::new(store, AssignmentValidator::new(rules));

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "check".to_string(),
            "assign".to_string(),
            "remove".to_string(),
            "duty".to_string(),
            "duration".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let sub = parts.get(1).copied().unwrap_or("flights");
                        shared.read(|store| match sub {
                            "c" | "crew" => {
                                let mut crew: Vec<&CrewMember> = store.crew.values().collect();
                                crew.sort_by(|a, b| a.id.cmp(&b.id));
                                print_table(&crew, "No crew found.");
                            },
                            "a" | "assignments" => print_table(&store.assignments, "No assignments yet."),
                            "p" | "airports" => {
                                let mut airports: Vec<_> = store.airports.values().collect();
                                airports.sort_by(|a, b| a.id.cmp(&b.id));
                                print_table(&airports, "No airports found.");
                            },
                            _ => print_table(&store.flights, "No flights found."),
                        });
                    },
                    "check" | "assign" => {
                        if let (Some(crew), Some(flight)) = (parts.get(1), parts.get(2)) {
                            let (crew, flight): (Arc<str>, Arc<str>) = (Arc::from(*crew), Arc::from(*flight));
                            if parts[0] == "check" {
                                match shared.validate(&crew, &flight) {
                                    Ok(()) => println!("{} {} may fly {}", "VALID".green().bold(), crew, flight),
                                    Err(rejection) => print_rejection(&rejection),
                                }
                            } else {
                                match shared.commit(&crew, &flight) {
                                    Ok(id) => println!("{} assignment #{}: {} on {}", "ACCEPTED".green().bold(), id, crew, flight),
                                    Err(rejection) => print_rejection(&rejection),
                                }
                            }
                        } else {
                            println!("Usage: {} <crew_id> <flight_id>", parts[0]);
                        }
                    },
                    "remove" => {
                        if let (Some(crew), Some(flight)) = (parts.get(1), parts.get(2)) {
                            match shared.remove(&Arc::from(*crew), &Arc::from(*flight)) {
                                Ok(id) => println!("Removed assignment #{}.", id),
                                Err(e) => println!("{} {}", "Error:".red(), e),
                            }
                        } else {
                            println!("Usage: remove <crew_id> <flight_id>");
                        }
                    },
                    "duty" => {
                        let date = parts.get(2).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
                        if let (Some(crew), Some(date)) = (parts.get(1), date) {
                            let summary = shared.read(|store| store.duty_summary(shared.rules(), &Arc::from(*crew), date));
                            print_table(&summary.flights, "No flights on that day.");
                            let status = if summary.within_limits { "within limits".green() } else { "over limit".red() };
                            println!(
                                "{} flights, duty {} - {}, total {} ({})",
                                summary.total_flights,
                                summary.duty_start.as_deref().unwrap_or("--:--"),
                                summary.duty_end.as_deref().unwrap_or("--:--"),
                                summary.total_duty_time,
                                status
                            );
                        } else {
                            println!("Usage: duty <crew_id> <YYYY-MM-DD>");
                        }
                    },
                    "duration" => {
                        let departure = parts.get(1).and_then(|s| parse_local(s));
                        let arrival = parts.get(2).and_then(|s| parse_local(s));
                        if let (Some(departure), Some(arrival)) = (departure, arrival) {
                            let result = compute_duration(
                                departure,
                                arrival,
                                parts.get(3).copied(),
                                parts.get(4).copied(),
                                shared.rules().max_flight_duration(),
                            );
                            if result.is_valid {
                                println!("{} ({} minutes)", result.text.green(), result.minutes);
                            } else {
                                println!("{} {}", result.text.red(), "(outside plausible range)".red());
                            }
                        } else {
                            println!("Usage: duration <YYYY-MM-DDTHH:MM> <YYYY-MM-DDTHH:MM> [GMT±H] [GMT±H]");
                        }
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [what]                - List flights, or: c - crew, a - assignments, p - airports");
                        println!("  check <crew> <flight>    - Validate an assignment without storing it");
                        println!("  assign <crew> <flight>   - Validate and store an assignment");
                        println!("  remove <crew> <flight>   - Remove an active assignment");
                        println!("  duty <crew> <date>       - Show the duty summary of <crew> on <date>");
                        println!("  duration <dep> <arr> [origin_offset] [dest_offset]");
                        println!("                           - Compute a flight duration from local times");
                        println!("  help / ?                 - Show this help menu");
                        println!("  exit / quit              - Exit\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
