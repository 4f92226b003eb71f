//! Binary entrypoint for the WonderKids progression CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the player document
//! - `status` - level, XP, coins and streak summary
//! - `answer [--category <key>] [--bonus <xp>] [--wrong]` - record one answer
//! - `play <game> [--category <key>] [--score N] [--correct N] [--accuracy P] [--perfect]` - record a game
//! - `bonus` - claim today's daily bonus
//! - `achievements [--unlocked]`, `challenges`, `categories [<key>]` - reports
//! - `reset --yes` - wipe progress and start over
//!
//! See the library crate docs for module-level details: `wonderkids::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use wonderkids::config::Config;
use wonderkids::progress::{report, GameResult, ProgressError, Progression};

#[derive(Parser)]
#[command(name = "wonderkids")]
#[command(about = "Progression tracker for the WonderKids learning games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the player document
    Init,
    /// Show level, XP, coins and streaks
    Status,
    /// Record one answer
    Answer {
        /// Category key (math, language, science, memory, creative, social, action)
        #[arg(short = 'k', long)]
        category: Option<String>,
        /// Extra XP granted by the game
        #[arg(short, long, default_value_t = 0)]
        bonus: u64,
        /// The answer was wrong
        #[arg(short, long)]
        wrong: bool,
    },
    /// Record a finished game session
    Play {
        /// Game identifier, e.g. rocket-math
        game: String,
        /// Category key; looked up from the game id when omitted
        #[arg(short = 'k', long)]
        category: Option<String>,
        #[arg(short, long)]
        score: Option<u64>,
        /// Correct answers during the session
        #[arg(long)]
        correct: Option<u64>,
        /// Accuracy percentage (0-100)
        #[arg(short, long)]
        accuracy: Option<f64>,
        #[arg(short, long)]
        perfect: bool,
    },
    /// Claim today's daily bonus
    Bonus,
    /// List achievements
    Achievements {
        /// Only show unlocked achievements
        #[arg(short, long)]
        unlocked: bool,
    },
    /// Show daily and weekly challenges
    Challenges,
    /// Show category progress
    Categories {
        /// Single category key
        category: Option<String>,
    },
    /// Wipe all progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_exists = tokio::fs::metadata(&cli.config).await.is_ok();

    let created = matches!(cli.command, Commands::Init) && !config_exists;
    if created {
        Config::create_default(&cli.config).await?;
    }

    // A missing config file just means defaults
    let config = if config_exists || created {
        Config::load(&cli.config).await?
    } else {
        Config::default()
    };
    init_logging(&Some(config.clone()), cli.verbose);
    if created {
        info!("Configuration file created at {}", cli.config);
    }

    let mut progression = Progression::from_config(&config)?;
    if !progression.is_saved() {
        warn!(
            "progress could not be written to {}; changes this run may be lost",
            progression.store_description()
        );
    }

    let output = match cli.command {
        Commands::Init => {
            if !created {
                warn!("{} already exists; leaving it untouched", cli.config);
            }
            format!("Player progress ready in {}\n", progression.store_description())
        }
        Commands::Status => report::format_status(&progression),
        Commands::Answer {
            category,
            bonus,
            wrong,
        } => {
            let outcome = keep_unsaved(progression.record_answer(category.as_deref(), bonus, !wrong))?;
            report::format_answer_outcome(outcome.flatten().as_ref())
        }
        Commands::Play {
            game,
            category,
            score,
            correct,
            accuracy,
            perfect,
        } => {
            let result = GameResult {
                score,
                correct,
                accuracy,
                perfect,
            };
            match keep_unsaved(progression.record_game_play(&game, category.as_deref(), &result))? {
                Some(outcome) => report::format_game_outcome(&outcome),
                None => "Game recorded (not saved).\n".to_string(),
            }
        }
        Commands::Bonus => {
            let bonus = keep_unsaved(progression.claim_daily_bonus())?;
            report::format_daily_bonus(bonus.flatten().as_ref())
        }
        Commands::Achievements { unlocked } => {
            let mut statuses = progression.achievements_list();
            if unlocked {
                statuses.retain(|s| s.earned);
            }
            report::format_achievements(&statuses)
        }
        Commands::Challenges => {
            let mut out = report::format_challenges("Daily challenges", progression.daily_challenges());
            out.push_str(&report::format_challenges(
                "Weekly challenges",
                progression.weekly_challenges(),
            ));
            out
        }
        Commands::Categories { category } => {
            let mut all = progression.all_category_progress();
            if let Some(key) = category {
                all.retain(|c| c.key == key);
                if all.is_empty() {
                    return Err(anyhow!("unknown category '{}'", key));
                }
            }
            report::format_categories(&all)
        }
        Commands::Reset { yes } => {
            if !yes {
                println!("Refusing to reset without --yes.");
                return Ok(());
            }
            progression.reset()?;
            "Progress reset.\n".to_string()
        }
    };

    print!("{}", output);
    Ok(())
}

/// An unsaved write is reported but not fatal; the change still happened for
/// this run. Any other error propagates.
fn keep_unsaved<T>(result: Result<T, ProgressError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unsaved() => {
            warn!("{}", e);
            eprintln!("Warning: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    let file = log_file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()
    });

    if let Some(f) = file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
