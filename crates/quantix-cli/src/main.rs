//! quantix CLI — math problems in, solved answers out.
//!
//! ```text
//! quantix normalize "derivative of x squared plus two"
//! quantix parse --text "2x + 3 = 7" [--json] [--server http://localhost:8000]
//! quantix parse --json --text "..." | quantix solve
//! quantix ask "derivative of x squared" [--rate up|down] [--correction ...]
//! quantix dictate [--solve] [--rate up|down]
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use quantix_lib::client::SolverClient;
use quantix_lib::dictation::DictationSession;
use quantix_lib::quantix_core::render::{render_parse_summary, render_solution};
use quantix_lib::quantix_core::speech;
use quantix_lib::quantix_core::types::{
    ClientConfig, EngineDirective, ParseResponse, ProblemInput, Rating, RecognitionEvent,
    RecognitionUpdate,
};
use quantix_lib::session::SolveSession;

/// quantix — client for the Quantix math-solver service
#[derive(Parser)]
#[command(name = "quantix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a spoken-math transcript into a symbolic expression
    Normalize {
        /// Transcript, e.g. "derivative of x squared plus two"
        transcript: String,
    },
    /// Parse a problem and show the backend's structured reading
    Parse {
        #[command(flatten)]
        input: InputArgs,
        /// Print the full parse response as JSON (pipe into `quantix solve`)
        #[arg(long)]
        json: bool,
        /// Solver backend URL
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
    /// Solve a previously parsed problem (parse-response JSON)
    Solve {
        /// Path to the parse response; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Solver backend URL
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
    /// Parse and solve a typed problem in one go
    Ask {
        /// The problem text
        text: String,
        /// Rate the answer afterwards
        #[arg(long, value_enum)]
        rate: Option<RateArg>,
        /// Correction to send along with a thumbs-down
        #[arg(long)]
        correction: Option<String>,
        /// Solver backend URL
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
    /// Dictate a problem, one stdin line per recognition update
    Dictate {
        /// Solve the final expression once dictation ends
        #[arg(long)]
        solve: bool,
        /// Rate the answer afterwards (requires --solve)
        #[arg(long, value_enum)]
        rate: Option<RateArg>,
        /// Solver backend URL
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Typed problem text
    #[arg(long)]
    text: Option<String>,
    /// Spoken transcript, normalized before submission
    #[arg(long)]
    transcript: Option<String>,
    /// Path to a problem image
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RateArg {
    Up,
    Down,
}

impl From<RateArg> for Rating {
    fn from(value: RateArg) -> Self {
        match value {
            RateArg::Up => Rating::Up,
            RateArg::Down => Rating::Down,
        }
    }
}

impl InputArgs {
    async fn into_input(self) -> Result<ProblemInput, String> {
        if let Some(text) = self.text {
            Ok(ProblemInput::text(&text))
        } else if let Some(raw) = self.transcript {
            Ok(ProblemInput::transcript(&speech::normalize(&raw)))
        } else if let Some(path) = self.image {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image")
                .to_string();
            Ok(ProblemInput::image(&file_name, bytes))
        } else {
            Err("provide --text, --transcript, or --image".to_string())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Normalize { transcript } => {
            println!("{}", speech::normalize(&transcript));
            Ok(())
        }

        Command::Parse { input, json, server } => {
            let client = client_for(&server)?;
            let input = input.into_input().await?;
            let response = client.parse(&input).await?;
            if json {
                let pretty = serde_json::to_string_pretty(&response)
                    .map_err(|e| format!("cannot encode parse response: {e}"))?;
                println!("{pretty}");
            } else {
                print!("{}", render_parse_summary(&response));
            }
            Ok(())
        }

        Command::Solve { input, server } => {
            let raw = match input {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
                None => read_stdin()?,
            };
            let parse: ParseResponse = serde_json::from_str(&raw)
                .map_err(|e| format!("invalid parse response JSON: {e}"))?;

            let client = client_for(&server)?;
            let solution = client.solve(&parse.parsed_problem).await?;
            print!("{}", render_solution(&solution));
            Ok(())
        }

        Command::Ask { text, rate, correction, server } => {
            let client = client_for(&server)?;
            let mut session = SolveSession::new(client);

            let input = ProblemInput::text(&text);
            let parse = session.parse(&input).await?;
            print!("{}", render_parse_summary(parse));
            println!();

            let solution = session.solve().await?;
            print!("{}", render_solution(solution));

            if let Some(rate) = rate {
                session.feedback(rate.into(), correction).await?;
                println!("Feedback saved.");
            }
            Ok(())
        }

        Command::Dictate { solve, rate, server } => dictate(solve, rate, &server).await,
    }
}

/// Drive a dictation session from stdin: every line is one interim
/// recognition result (replacing the transcript), a blank line simulates
/// the engine ending its stream, EOF stops for good.
async fn dictate(solve_after: bool, rate: Option<RateArg>, server: &str) -> Result<(), String> {
    let (session, mut link) = DictationSession::spawn();
    let mut status_rx = session.subscribe();

    session.start();
    match link.directive_rx.recv().await {
        Some(EngineDirective::Start) => {
            eprintln!("listening - one transcript line per update, blank line restarts, Ctrl-D ends");
        }
        _ => return Err("dictation session closed before starting".to_string()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            let _ = link.event_tx.send(RecognitionEvent::End);
            // Continuous mode: the session immediately asks for a restart.
            if link.directive_rx.recv().await != Some(EngineDirective::Start) {
                return Err("dictation session closed mid-stream".to_string());
            }
            continue;
        }

        let _ = link.event_tx.send(RecognitionEvent::Update(RecognitionUpdate {
            start_index: 0,
            segments: vec![line.clone()],
        }));

        // Echo the normalized expression once the update is folded in.
        loop {
            if status_rx.changed().await.is_err() {
                return Err("dictation session closed mid-stream".to_string());
            }
            let status = status_rx.borrow_and_update().clone();
            if status.transcript == line {
                eprintln!("-> {}", status.expression);
                break;
            }
        }
    }

    session.stop();
    while let Some(directive) = link.directive_rx.recv().await {
        if directive == EngineDirective::Stop {
            break;
        }
    }

    let expression = session.status().expression;
    if expression.is_empty() {
        return Err("no dictation captured".to_string());
    }
    println!("{expression}");

    if solve_after {
        let client = client_for(server)?;
        let mut solve_session = SolveSession::new(client);
        let input = ProblemInput::transcript(&expression);
        let solution = solve_session.solve_input(&input).await?;
        print!("{}", render_solution(solution));

        if let Some(rate) = rate {
            solve_session.feedback(rate.into(), None).await?;
            println!("Feedback saved.");
        }
    }

    Ok(())
}

fn client_for(server: &str) -> Result<SolverClient, String> {
    SolverClient::new(ClientConfig {
        base_url: server.to_string(),
        ..ClientConfig::default()
    })
}

fn read_stdin() -> Result<String, String> {
    use std::io::Read;
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("cannot read stdin: {e}"))?;
    Ok(buf)
}
