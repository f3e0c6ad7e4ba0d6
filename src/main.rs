//! FlashMind - flashcard sets from the command line
//!
//! Create and edit sets, study them in a self-graded quiz, exchange them as
//! JSON files or generate them with an AI model.

mod app;
mod display;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use flashmind::{CardId, Config, FlashError, GenerationRequest, SetId, SetStorage, SortKey};

use app::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "flashmind")]
#[command(author, version, about = "Flashcard sets with a self-graded study loop", long_about = None)]
struct Args {
    /// Directory containing the saved sets
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sets (the default command)
    List {
        /// Only sets whose name or card text contains this
        #[arg(short, long, default_value = "")]
        query: String,

        /// newest, oldest, recent, name-asc, name-desc, cards-asc, cards-desc
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Show every card of a set
    Show { id: SetId },

    /// Create a set
    New {
        name: String,

        /// A card as "question::answer"; repeat for more cards
        #[arg(short, long = "card", value_parser = parse_card)]
        cards: Vec<(String, String)>,
    },

    /// Rename a set
    Rename { id: SetId, name: String },

    /// Append a card to a set
    AddCard {
        id: SetId,
        question: String,
        answer: String,
    },

    /// Change one card of a set
    EditCard {
        id: SetId,
        card: CardId,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
    },

    /// Remove one card from a set
    RemoveCard { id: SetId, card: CardId },

    /// Delete a set
    Delete { id: SetId },

    /// Write a set to a JSON file
    Export {
        id: SetId,

        /// Target directory (defaults to the documents folder)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Add a set from a JSON file
    Import { file: PathBuf },

    /// Generate a set on a topic with the configured AI model
    Generate {
        topic: String,
        #[arg(short = 'n', long)]
        count: Option<u32>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        question_lang: Option<String>,
        #[arg(long)]
        answer_lang: Option<String>,
    },

    /// Study a set
    Study { id: SetId },

    /// Print the config file location and current values
    Config,
}

fn parse_card(raw: &str) -> Result<(String, String), String> {
    match raw.split_once("::") {
        Some((question, answer)) => Ok((question.trim().to_string(), answer.trim().to_string())),
        None => Err(format!("expected \"question::answer\", got \"{}\"", raw)),
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default config: {:#}", e);
        Config::default()
    });

    if let Some(Command::Config) = args.command {
        println!("# {}", Config::default_path().display());
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Determine data directory
    let data_dir = args
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(SetStorage::default_path);

    // Initialize storage
    let storage = SetStorage::new(data_dir)?;
    let mut app = App::new(storage, config)?;

    let command = args.command.unwrap_or(Command::List {
        query: String::new(),
        sort: None,
    });
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run(&mut app, command, &mut out);
    if let Some(hint) = result
        .as_ref()
        .err()
        .and_then(|e| e.downcast_ref::<FlashError>())
        .map(hint)
    {
        eprintln!("Hint: {}", hint);
    }
    result
}

/// One line of advice shown under a failed command.
fn hint(err: &FlashError) -> &'static str {
    match err {
        FlashError::NoDraft => "Start from `new` or edit an existing set by id",
        FlashError::EmptyName => "Give the set a name that is not only spaces",
        FlashError::NoValidCards => "Fill in the question and answer of at least one card",
        FlashError::MalformedImport(_) => {
            r#"Expected {"name": "...", "cards": [{"question": "...", "answer": "..."}]}"#
        }
        FlashError::Generation(_) => "Try another topic or fewer cards, or check the `ai` config section",
    }
}

fn run(app: &mut App, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::List { query, sort } => {
            let sort = sort
                .as_deref()
                .map(SortKey::from_key)
                .unwrap_or_else(|| app.config.sort_key());
            app.list(out, &query, sort)?;
        }
        Command::Show { id } => app.show(out, id)?,
        Command::New { name, cards } => {
            let id = app.create(&name, &cards)?;
            writeln!(out, "✓ Created '{}' ({})", name.trim(), id)?;
        }
        Command::Rename { id, name } => {
            app.rename(id, &name)?;
            writeln!(out, "✓ Renamed {} to '{}'", id, name.trim())?;
        }
        Command::AddCard {
            id,
            question,
            answer,
        } => {
            let card = app.add_card(id, &question, &answer)?;
            writeln!(out, "✓ Added card {}", card)?;
        }
        Command::EditCard {
            id,
            card,
            question,
            answer,
        } => {
            app.edit_card(id, card, question.as_deref(), answer.as_deref())?;
            writeln!(out, "✓ Updated card {}", card)?;
        }
        Command::RemoveCard { id, card } => {
            app.remove_card(id, card)?;
            writeln!(out, "✓ Removed card {}", card)?;
        }
        Command::Delete { id } => {
            if app.delete(id)? {
                writeln!(out, "✓ Deleted set {}", id)?;
            } else {
                writeln!(out, "No set with id {}", id)?;
            }
        }
        Command::Export { id, out: dir } => {
            let dir = dir.unwrap_or_else(SetStorage::default_export_dir);
            let path = app.export(id, &dir)?;
            writeln!(out, "✓ Exported to {}", path.display())?;
        }
        Command::Import { file } => {
            let id = app.import(&file)?;
            let name = app.set_name(id).unwrap_or_default();
            writeln!(out, "✓ Imported '{}' ({})", name, id)?;
        }
        Command::Generate {
            topic,
            count,
            level,
            question_lang,
            answer_lang,
        } => {
            let mut request = GenerationRequest::new(topic, &app.config.ai);
            if let Some(count) = count {
                request.count = count;
            }
            if let Some(level) = level {
                request.level = level;
            }
            if let Some(lang) = question_lang {
                request.question_lang = lang;
            }
            if let Some(lang) = answer_lang {
                request.answer_lang = lang;
            }
            let id = app.generate(&request)?;
            let size = app.repo().get(id).map_or(0, |s| s.cards.len());
            writeln!(out, "✓ Generated {} cards on '{}' ({})", size, request.topic, id)?;
        }
        Command::Study { id } => {
            let stdin = io::stdin();
            app.study(id, stdin.lock(), out)?;
        }
        Command::Config => {}
    }
    Ok(())
}
