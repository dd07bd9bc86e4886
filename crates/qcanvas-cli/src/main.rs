//! qcanvas CLI - capture question/answer pairs into canvas files

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qcanvas_core::canvas::{CanvasStore, IdSource, Mutation, find_slot};
use qcanvas_core::config::Config;
use qcanvas_core::session::{Handled, Outcome, Session, StaticInput, Trigger, resolve_target};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::json;
use tracing::debug;

#[derive(Parser)]
#[command(name = "qcanvas")]
#[command(author, version, about = "Capture question/answer pairs into canvas files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one question/answer pair into a canvas
    Add {
        /// Question, written as the edge label
        #[arg(long)]
        question: String,
        /// Answer, written as the node text
        #[arg(long)]
        answer: String,
        /// Canvas file to update
        path: String,
    },

    /// Interactive capture session
    Session,

    /// Show a canvas summary and the next blank slot
    Inspect {
        /// Canvas file to read
        path: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

/// One line typed into the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Question(String),
    Answer(String),
    Commit(String),
    Status,
    Clear,
    Help,
    Quit,
    Empty,
}

const REPL_HELP: &str = "\
Commands:
  q, question <text>   capture the question
  a, answer <text>     capture the answer
  commit <path>        write the pair into a canvas file
  status               show what has been captured
  clear                drop captured input
  help                 show this help
  quit, exit           leave the session";

/// Parse a session line; text after the command word is kept as typed
fn parse_line(line: &str) -> qcanvas_core::Result<ReplCommand> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(ReplCommand::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    };

    let argument = |what: &str| {
        if rest.trim().is_empty() {
            Err(qcanvas_core::Error::InvalidInput(format!(
                "`{}` needs {}",
                word, what
            )))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_lowercase().as_str() {
        "q" | "question" => argument("the question text").map(ReplCommand::Question),
        "a" | "answer" => argument("the answer text").map(ReplCommand::Answer),
        "commit" => argument("a canvas path").map(ReplCommand::Commit),
        "status" => Ok(ReplCommand::Status),
        "clear" => Ok(ReplCommand::Clear),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" => Ok(ReplCommand::Quit),
        other => Err(qcanvas_core::Error::InvalidInput(format!(
            "unknown command `{}`, type `help` for a list",
            other
        ))),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("qcanvas=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Add {
            question,
            answer,
            path,
        } => cmd_add(question, answer, path, cli.format, cli.quiet),

        Commands::Session => cmd_session(cli.format, cli.quiet),

        Commands::Inspect { path } => cmd_inspect(&path, cli.format),

        Commands::Config { action } => cmd_config(action, cli.format, cli.quiet),
    }
}

/// Print an error with its code and suggestion when it came from the core
fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<qcanvas_core::Error>() {
        Some(core) => print_core_error(core),
        None => eprintln!("Error: {:#}", e),
    }
}

fn print_core_error(e: &qcanvas_core::Error) {
    eprintln!("Error [{}]: {}", e.code(), e);
    if let Some(suggestion) = e.suggestion() {
        eprintln!("  Try: {}", suggestion);
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn cmd_add(
    question: String,
    answer: String,
    path: String,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut session = Session::from_config(&config);
    let mut input = StaticInput::new(question, answer, path);

    for trigger in [Trigger::Question, Trigger::Answer, Trigger::Commit] {
        if let Handled::Committed(outcome) = session.handle(trigger, &mut input)? {
            print_outcome(&outcome, format, quiet)?;
        }
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text if quiet => {}
        OutputFormat::Text => {
            if outcome.recovered {
                println!("Warning: previous content was not a valid canvas and was replaced");
            }
            let action = match &outcome.mutation {
                Mutation::Filled { .. } => "Filled blank slot",
                Mutation::Appended { .. } => "Appended new card",
            };
            println!(
                "{} in {} (node {}, edge {})",
                action,
                outcome.path.display(),
                outcome.mutation.node_id(),
                outcome.mutation.edge_id()
            );
            println!("  Nodes: {}  Edges: {}", outcome.nodes, outcome.edges);
        }
    }
    Ok(())
}

fn cmd_session(format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut session = Session::from_config(&config);
    let mut rl = DefaultEditor::new()?;

    if !quiet {
        println!("qcanvas session. Type `help` for commands.");
    }

    loop {
        let line = match rl.readline("qcanvas> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                print_core_error(&e);
                continue;
            }
        };
        debug!(?command, "Session command");

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Question(text) => {
                session.capture_question(text);
                if !quiet {
                    println!("Question captured");
                }
            }
            ReplCommand::Answer(text) => {
                session.capture_answer(text);
                if !quiet {
                    println!("Answer captured");
                }
            }
            ReplCommand::Commit(path) => match session.commit(&path) {
                Ok(outcome) => print_outcome(&outcome, format, quiet)?,
                Err(e) => print_core_error(&e),
            },
            ReplCommand::Status => print_status(&session, format)?,
            ReplCommand::Clear => {
                session.clear();
                if !quiet {
                    println!("Input cleared");
                }
            }
            ReplCommand::Help => println!("{}", REPL_HELP),
            ReplCommand::Quit => break,
        }
    }
    Ok(())
}

fn print_status<I>(session: &Session<I>, format: OutputFormat) -> anyhow::Result<()>
where
    I: IdSource,
{
    match format {
        OutputFormat::Json => {
            let status = json!({
                "question": session.question(),
                "answer": session.answer(),
                "complete": session.is_complete(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Text => {
            println!("Question: {}", session.question().unwrap_or("(none)"));
            println!("Answer:   {}", session.answer().unwrap_or("(none)"));
            println!(
                "Ready:    {}",
                if session.is_complete() { "yes" } else { "no" }
            );
        }
    }
    Ok(())
}

fn cmd_inspect(path: &str, format: OutputFormat) -> anyhow::Result<()> {
    let config = Config::load()?;
    let path = resolve_target(path, &config.canvas.extension)?;
    let loaded = CanvasStore::new(config.canvas.on_malformed).load(&path)?;
    let canvas = &loaded.canvas;

    let slot = find_slot(canvas).map(|slot| {
        (
            canvas.nodes[slot.node].id().unwrap_or_default(),
            canvas.edges[slot.edge].id().unwrap_or_default(),
        )
    });

    match format {
        OutputFormat::Json => {
            let summary = json!({
                "path": path,
                "nodes": canvas.nodes.len(),
                "edges": canvas.edges.len(),
                "max_y": canvas.max_y(),
                "parseable": !loaded.recovered,
                "next_slot": slot.as_ref().map(|(node, edge)| json!({ "node_id": node, "edge_id": edge })),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("Canvas: {}", path.display());
            if loaded.recovered {
                println!("  Warning: not a valid canvas; the next commit replaces it");
            }
            println!("  Nodes: {}", canvas.nodes.len());
            println!("  Edges: {}", canvas.edges.len());
            match slot {
                Some((node, edge)) => println!("  Next slot: node {} via edge {}", node, edge),
                None => println!("  Next slot: none, the next entry is appended"),
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, config.get(&key)?);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            match format {
                OutputFormat::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = items
                        .into_iter()
                        .map(|(key, value)| (key, serde_json::Value::String(value)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&map)?);
                }
                OutputFormat::Text => {
                    for (key, value) in items {
                        println!("{} = {}", key, value);
                    }
                }
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
