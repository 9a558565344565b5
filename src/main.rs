use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linnaeus::{KbError, Oracle, RoundOutcome, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linnaeus", about = "A 20-questions knowledge base that learns")]
struct Cli {
    /// Knowledge-base file
    #[arg(long, default_value = "animals.kb")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play guessing rounds, learning new animals along the way
    Play,
    /// Verify the stored tree's structural invariants
    Check,
    /// Count the nodes in the stored tree
    Count,
    /// Report session statistics for the stored tree
    Stats,
}

/// Oracle over stdin/stdout
struct TerminalOracle {
    stdin: io::Stdin,
}

impl TerminalOracle {
    fn new() -> Self {
        Self { stdin: io::stdin() }
    }

    fn read_line(&mut self) -> Result<String, KbError> {
        let mut line = String::new();
        let read = self
            .stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| KbError::Input(e.to_string()))?;
        if read == 0 {
            return Err(KbError::Input("end of input".into()));
        }
        Ok(line.trim().to_owned())
    }
}

impl Oracle for TerminalOracle {
    fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, KbError> {
        loop {
            print!("{prompt} (y/n): ");
            io::stdout().flush().map_err(|e| KbError::Input(e.to_string()))?;
            match self.read_line()?.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }

    fn ask_free_text(&mut self, prompt: &str) -> Result<String, KbError> {
        loop {
            print!("{prompt} ");
            io::stdout().flush().map_err(|e| KbError::Input(e.to_string()))?;
            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("Please enter something.");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play => run_play(cli.file)?,
        Commands::Check => run_check(cli.file)?,
        Commands::Count => run_count(cli.file)?,
        Commands::Stats => run_stats(cli.file)?,
    }

    Ok(())
}

fn load_session(file: &Path) -> Result<Session> {
    let mut session = Session::new();
    if file.exists() {
        session
            .load(file)
            .with_context(|| format!("failed to load knowledge base {}", file.display()))?;
    }
    Ok(session)
}

fn run_play(file: PathBuf) -> Result<()> {
    let mut session = load_session(&file)?;
    let mut oracle = TerminalOracle::new();

    println!("Think of an animal, and I'll try to guess it!");
    loop {
        match session.play(&mut oracle)? {
            RoundOutcome::Guessed => println!("I got the animal right!"),
            RoundOutcome::Learned => println!("Thanks, I'll remember that."),
            RoundOutcome::Seeded => println!("Thanks, now I know one animal."),
        }

        let answer = oracle.ask_free_text("Play again? (y/n, u = undo, r = redo)")?;
        match answer.to_ascii_lowercase().as_str() {
            "u" => {
                match session.undo() {
                    Ok(()) => println!("Last edit undone."),
                    Err(KbError::NothingToUndo) => println!("Nothing to undo."),
                    Err(e) => return Err(e.into()),
                }
            }
            "r" => {
                match session.redo() {
                    Ok(()) => println!("Edit redone."),
                    Err(KbError::NothingToRedo) => println!("Nothing to redo."),
                    Err(e) => return Err(e.into()),
                }
            }
            "y" | "yes" => {}
            _ => break,
        }
    }

    if session.tree().root().is_some() {
        let count = session
            .save(&file)
            .with_context(|| format!("failed to save knowledge base {}", file.display()))?;
        println!("Saved {count} nodes to {}.", file.display());
    }
    Ok(())
}

fn run_check(file: PathBuf) -> Result<()> {
    let session = load_session(&file)?;
    if session.check_integrity() {
        println!("{}: tree is structurally valid", file.display());
        Ok(())
    } else {
        anyhow::bail!("{}: integrity check FAILED", file.display());
    }
}

fn run_count(file: PathBuf) -> Result<()> {
    let session = load_session(&file)?;
    println!("{}", session.tree().count_from_root()?);
    Ok(())
}

fn run_stats(file: PathBuf) -> Result<()> {
    let session = load_session(&file)?;
    let stats = session.stats()?;
    println!("nodes:              {}", stats.nodes);
    println!("distinct questions: {}", stats.distinct_questions);
    println!("undo depth:         {}", stats.undo_depth);
    println!("redo depth:         {}", stats.redo_depth);
    Ok(())
}
