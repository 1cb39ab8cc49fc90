//! grind CLI
//!
//! Daily algorithmic practice on a spaced-repetition schedule: ask for
//! today's questions, record how an attempt went, and watch difficulty tiers
//! unlock as mastery accumulates.

mod prompt;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use grind_core::{
    is_tier_unlocked, process_review, select_today, Difficulty, Feedback, Phase, Question,
    QuestionStore, SeedQuestion, SqliteStore, TodayEntry, TodayOutcome,
};

/// grind - practice scheduler for algorithmic problems
#[derive(Parser)]
#[command(name = "grind")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Practice algorithmic problems on a spaced-repetition schedule")]
#[command(
    long_about = "grind suggests up to two problems a day, blending new material with\nreview, and walks you from easy through hard as you demonstrate mastery."
)]
struct Cli {
    /// Use a custom database file instead of the platform data directory
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest today's practice questions
    Today {
        /// Generate another set after finishing today's questions
        #[arg(long, short = 'm')]
        more: bool,
    },

    /// Record a completed attempt and update its review schedule
    Complete {
        /// Question id (see 'grind list')
        id: i64,
    },

    /// List every question with attempt state and last score
    List,

    /// Show attempted questions split by mastery
    Status,

    /// Show progression-gate status for each difficulty tier
    Progress,

    /// Bulk-load questions from a JSON seed file
    Seed {
        /// Path to a JSON array of {name, url, difficulty} objects
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SqliteStore::new(cli.db)?;

    match cli.command {
        Commands::Today { more } => run_today(&store, more),
        Commands::Complete { id } => run_complete(&store, id),
        Commands::List => run_list(&store),
        Commands::Status => run_status(&store),
        Commands::Progress => run_progress(&store),
        Commands::Seed { file } => run_seed(&store, file),
    }
}

// ============================================================================
// TODAY
// ============================================================================

/// Run the today command
fn run_today(store: &SqliteStore, more: bool) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let mut rng = rand::thread_rng();

    match select_today(store, today, more, &mut rng)? {
        TodayOutcome::Pending(entries) => show_pending(&entries),
        TodayOutcome::AllDone => {
            println!("{}", "You have already completed today's questions!".green());
            println!("{}", "Run 'grind today --more' for another set.".yellow());
            Ok(())
        }
        TodayOutcome::Fresh { phase, questions } => {
            phase_banner(phase);
            println!("{}", "Here are your questions for today:".cyan());
            let refs: Vec<&Question> = questions.iter().collect();
            offer_open(&refs)
        }
        TodayOutcome::Empty => {
            println!("No questions available. Load some with 'grind seed <file>'.");
            Ok(())
        }
    }
}

fn phase_banner(phase: Phase) {
    match phase {
        Phase::Easy => println!("{}", "Focusing on: Easy Questions".green()),
        Phase::Medium => println!("{}", "Focusing on: Medium Questions (with review)".yellow()),
        Phase::Hard => println!("{}", "Focusing on: Hard Questions (with review)".red()),
        Phase::Mastery => println!("{}", "Mastery mode: reviewing everything!".magenta()),
    }
}

/// Redisplay an existing set, listing only the entries still open
fn show_pending(entries: &[TodayEntry]) -> anyhow::Result<()> {
    let completed = entries.iter().filter(|e| e.completed).count();
    println!(
        "{}",
        format!(
            "You have completed {completed} of {} questions for today.",
            entries.len()
        )
        .cyan()
    );

    let open: Vec<&Question> = entries
        .iter()
        .filter(|e| !e.completed)
        .map(|e| &e.question)
        .collect();
    offer_open(&open)
}

/// Print a numbered question list and optionally open one in the browser
fn offer_open(questions: &[&Question]) -> anyhow::Result<()> {
    for (idx, q) in questions.iter().enumerate() {
        println!(
            "  {}. {} ({}) - {}",
            idx + 1,
            q.name.bold(),
            q.difficulty,
            q.url.dimmed()
        );
    }

    let Some(choice) = prompt::select("Open a question in your browser?", questions.len())? else {
        return Ok(());
    };

    let question = questions[choice];
    println!(
        "{}",
        format!("Opening {} ({})", question.name, question.url).cyan()
    );
    open::that(&question.url)
        .with_context(|| format!("could not open {}", question.url))?;
    Ok(())
}

// ============================================================================
// COMPLETE
// ============================================================================

/// Run the complete command
fn run_complete(store: &SqliteStore, id: i64) -> anyhow::Result<()> {
    let Some(mut question) = store.question(id)? else {
        anyhow::bail!("no question with id {id}; run 'grind list' to see ids");
    };

    println!("Recording an attempt for: {}", question.name.bold());

    let time_taken = prompt::int_at_least(
        "How many minutes did it take? (-1 if you needed the solution)",
        -1,
    )?;
    let hints_used = prompt::int_at_least("How many hints did you use? (0 = none)", 0)?;
    let optimality = prompt::rating("How optimal was your solution? (1=brute force, 5=optimal)")?;
    let bugs = prompt::rating("How clean was your first version? (1=many bugs, 5=bug-free)")?;

    let feedback = Feedback {
        time_taken_minutes: time_taken,
        hints_used,
        optimality,
        bugs,
    };

    // The whole update is computed in memory, then persisted in one write
    process_review(&mut question, &feedback, Utc::now());
    store.save_question(&question)?;

    let today = Local::now().date_naive();
    if store.mark_assignment_completed(id, today)? {
        tracing::debug!(id, "today's assignment entry completed");
    }

    println!();
    println!(
        "{}",
        format!(
            "Recorded. '{}' scored {:.2} this attempt.",
            question.name, question.last_p_score
        )
        .green()
    );
    if question.mastered {
        println!(
            "{}",
            "Mastered - this question will no longer come up as focus material.".magenta()
        );
    }
    println!(
        "Next review in {} day(s); streak {}, easiness {:.2}.",
        question.review_interval, question.review_streak, question.easiness_factor
    );

    Ok(())
}

// ============================================================================
// LIST / STATUS / PROGRESS
// ============================================================================

fn tier_heading(tier: Difficulty) -> colored::ColoredString {
    match tier {
        Difficulty::Easy => "Easy Questions:".green().bold(),
        Difficulty::Medium => "Medium Questions:".yellow().bold(),
        Difficulty::Hard => "Hard Questions:".red().bold(),
    }
}

/// Run the list command
fn run_list(store: &SqliteStore) -> anyhow::Result<()> {
    let questions = store.all_questions()?;
    if questions.is_empty() {
        println!("No questions yet. Load some with 'grind seed <file>'.");
        return Ok(());
    }

    println!("{}", "=== All Questions ===".cyan().bold());

    for tier in Difficulty::ALL {
        let in_tier: Vec<&Question> =
            questions.iter().filter(|q| q.difficulty == tier).collect();
        if in_tier.is_empty() {
            continue;
        }

        println!();
        println!("{}", tier_heading(tier));
        for q in in_tier {
            let marker = if q.attempted {
                "x".green()
            } else {
                "-".dimmed()
            };
            let mastered = if q.mastered {
                " (mastered)".magenta().to_string()
            } else {
                String::new()
            };
            println!(
                "  [{}] {:>3}  {}  score {:.2}{}",
                marker, q.id, q.name, q.last_p_score, mastered
            );
        }
    }

    println!();
    println!("Total questions: {}", questions.len());
    println!("Record an attempt with: grind complete <id>");
    Ok(())
}

/// Run the status command
fn run_status(store: &SqliteStore) -> anyhow::Result<()> {
    let attempted = store.attempted_questions()?;
    if attempted.is_empty() {
        println!("{}", "No attempts recorded yet.".yellow());
        return Ok(());
    }

    let (mastered, in_progress): (Vec<&Question>, Vec<&Question>) =
        attempted.iter().partition(|q| q.mastered);

    if mastered.is_empty() {
        println!("{}", "No questions mastered yet.".yellow());
    } else {
        println!("{}", format!("Mastered ({}):", mastered.len()).green());
        for q in &mastered {
            println!("    - {}", q.name);
        }
    }

    if in_progress.is_empty() {
        if !mastered.is_empty() {
            println!("{}", "Every attempted question is mastered.".yellow());
        }
    } else {
        println!("{}", format!("Still in progress ({}):", in_progress.len()).red());
        for q in &in_progress {
            println!("    - {}", q.name);
        }
    }

    Ok(())
}

/// Run the progress command
fn run_progress(store: &SqliteStore) -> anyhow::Result<()> {
    println!("{}", "=== Progression Gate Status ===".cyan().bold());
    println!();

    for tier in Difficulty::ALL {
        let questions = store.questions_by_tier(tier)?;
        if questions.is_empty() {
            println!("{}", format!("No {tier} questions found").yellow());
            continue;
        }

        let mastered = questions.iter().filter(|q| q.mastered).count();
        let percentage = mastered as f64 / questions.len() as f64 * 100.0;
        let unlocked = is_tier_unlocked(&questions);

        let line = format!(
            "{}: {}/{} mastered ({:.1}%)",
            tier,
            mastered,
            questions.len(),
            percentage
        );
        if unlocked {
            println!("{}", line.green());
            println!("{}", "   unlocked - the next tier is open".green());
        } else {
            println!("{}", line.red());
            let needed = ((questions.len() as f64 * 0.51) as usize)
                .saturating_sub(mastered)
                .max(1);
            println!(
                "{}",
                format!("   locked - master {needed} more to unlock").yellow()
            );
        }
        println!();
    }

    Ok(())
}

// ============================================================================
// SEED
// ============================================================================

/// Run the seed command
fn run_seed(store: &SqliteStore, file: PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("could not read seed file {}", file.display()))?;
    let seeds: Vec<SeedQuestion> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid seed file {}", file.display()))?;

    if seeds.is_empty() {
        println!("{}", "Seed file contains no questions.".yellow());
        return Ok(());
    }

    println!("{}", format!("Inserting {} questions...", seeds.len()).yellow());
    let inserted = store.insert_questions(&seeds)?;
    println!(
        "{}",
        format!("Seeded {inserted} questions into the database").green()
    );

    Ok(())
}
