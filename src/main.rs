use clap::{Parser, Subcommand};
use notedrill::{
    config::{Config, ConfigStore, FileConfigStore},
    export::JsonLayoutWriter,
    key_quiz::KeyChallenge,
    music::{Clef, Difficulty, NoteLetter},
    ErrorPayload, PracticeService,
};
use serde::Serialize;
use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

/// music theory drills: name the note, read generated melodies, track progress
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Key recognition quizzes and procedurally generated sight-reading melodies, with every answer logged for accuracy and response-time analytics."
)]
pub struct Cli {
    /// directory holding data.csv and sessions.csv
    #[clap(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// session token identifying this player to the tracker
    #[clap(short = 't', long, global = true)]
    token: Option<String>,

    /// seed the random generator for reproducible challenges
    #[clap(long, global = true)]
    seed: Option<u64>,

    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// log debug output to stderr (RUST_LOG takes precedence)
    #[clap(short = 'v', long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// interactive key recognition quiz on stdin
    Key {
        /// stop after this many questions
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },
    /// generate a sight-reading melody and print it as JSON
    Melody {
        #[clap(long, value_enum)]
        difficulty: Option<Difficulty>,
        #[clap(long, value_enum)]
        clef: Option<Clef>,
        /// also write a practice sheet layout to the export directory
        #[clap(long)]
        export: bool,
    },
    /// overall accuracy and recent activity
    Stats,
    /// persisted and reconstructed session summaries
    Sessions,
    /// accuracy and response time per session, for charting
    Graph,
    /// per-day practice rollup
    Daily,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(result: notedrill::Result<T>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&ErrorPayload::from(&err))?);
            std::process::exit(1);
        }
    }
}

/// Describe where the note sits on the staff without giving its name away
fn staff_position(challenge: &KeyChallenge) -> String {
    let letter = NoteLetter::ALL
        .iter()
        .position(|n| *n == challenge.note)
        .unwrap_or(0) as i32;
    // bottom line: E4 on treble, G2 on bass
    let bottom = match challenge.clef {
        Clef::Treble => 4 * 7 + 2,
        Clef::Bass => 2 * 7 + 4,
    };
    let steps = challenge.octave as i32 * 7 + letter - bottom;

    let place = match steps {
        s if s < 0 => format!("{} step(s) below the staff", -s),
        s if s > 8 => format!("{} step(s) above the staff", s - 8),
        s if s % 2 == 0 => format!("line {}", s / 2 + 1),
        s => format!("space {}", s / 2 + 1),
    };

    let accidental = match challenge.accidental.symbol() {
        "#" => " with a sharp",
        "b" => " with a flat",
        _ => "",
    };

    format!("{} clef, {}{}", challenge.clef, place, accidental)
}

fn run_key_quiz(
    service: &mut PracticeService,
    token: &str,
    count: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut asked = 0usize;

    loop {
        if count.is_some_and(|c| asked >= c) {
            break;
        }

        let challenge = service.new_key_challenge(token);
        print!("{} > ", staff_position(&challenge));
        io::stdout().flush()?;

        let answer = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if answer.trim().eq_ignore_ascii_case("q") {
            break;
        }

        match service.check_key_answer(token, &answer) {
            Ok(result) => {
                let verdict = if result.correct { "correct" } else { "wrong" };
                println!(
                    "{verdict}: {} ({} ms) [{}]",
                    result.correct_answer, result.response_time_ms, result.session_progress
                );
                if result.session_complete {
                    println!("session complete");
                }
            }
            Err(err) => {
                println!("{}", serde_json::to_string(&ErrorPayload::from(&err))?);
            }
        }
        asked += 1;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config: Config = store.load();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }

    let data_dir = config.resolved_data_dir();
    let token = cli
        .token
        .clone()
        .unwrap_or_else(|| config.session_token.clone());

    let mut service = match cli.seed {
        Some(seed) => PracticeService::seeded(&data_dir, seed),
        None => PracticeService::open(&data_dir),
    };
    tracing::debug!(data_dir = %data_dir.display(), token = %token, "practice service ready");

    match cli.command {
        Command::Key { count } => run_key_quiz(&mut service, &token, count),
        Command::Melody {
            difficulty,
            clef,
            export,
        } => {
            let difficulty = difficulty.unwrap_or(config.difficulty);
            let clef = clef.unwrap_or(config.clef);
            let mut result = service.generate_melody(&token, difficulty, clef);
            if export {
                let writer = JsonLayoutWriter::new(config.resolved_export_dir());
                result = result.and_then(|melody| {
                    service.export_melody(&token, &writer)?;
                    Ok(melody)
                });
            }
            print_json(result)
        }
        Command::Stats => print_json(service.stats(&token)),
        Command::Sessions => print_json(service.session_summaries()),
        Command::Graph => print_json(service.graph_series()),
        Command::Daily => print_json(service.daily_stats()),
    }
}
