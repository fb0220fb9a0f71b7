//! funnel - run a single combat encounter from the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel::combat::{roll_critical_damage, roll_damage, LuckDecision, LuckOffer, RandomRoller};
use funnel::combatants::{Character, Monster};
use funnel::tracking::InMemoryTracker;
use funnel::{Driver, Encounter, EngineConfig, LuckPolicy};

/// Funnel combat resolver
#[derive(Parser, Debug)]
#[command(
    name = "funnel",
    version,
    about = "Resolve a one-on-one tabletop combat encounter"
)]
struct Args {
    /// Emit diagnostics as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fight one monster
    Fight {
        /// Character record (JSON)
        #[arg(short, long)]
        character: PathBuf,

        /// Monster record (JSON)
        #[arg(short, long)]
        monster: PathBuf,

        /// Engine configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for reproducible dice
        #[arg(long)]
        seed: Option<u64>,

        /// How to answer luck negotiations (overrides the config)
        #[arg(long, value_enum)]
        luck: Option<LuckPolicy>,

        /// Use mighty deeds whenever possible
        #[arg(long)]
        deeds: bool,
    },
    /// Roll damage expressions
    Roll {
        /// Expressions such as "1d8+2", "d6" or "3"
        #[arg(required = true)]
        expressions: Vec<String>,

        /// Roll each expression as a critical hit
        #[arg(long)]
        critical: bool,

        #[arg(long)]
        seed: Option<u64>,
    },
}

type Input = Arc<Mutex<Lines<BufReader<Stdin>>>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Narrative goes to stdout, diagnostics to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "funnel=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match args.command {
        Command::Fight {
            character,
            monster,
            config,
            seed,
            luck,
            deeds,
        } => fight(&character, &monster, config.as_deref(), seed, luck, deeds).await,
        Command::Roll {
            expressions,
            critical,
            seed,
        } => {
            roll(&expressions, critical, seed);
            Ok(())
        }
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid record in {}", path.display()))
}

async fn fight(
    character: &Path,
    monster: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
    luck: Option<LuckPolicy>,
    deeds: bool,
) -> Result<()> {
    let character: Character = load_json(character)?;
    let monster: Monster = load_json(monster)?;
    let mut config = EngineConfig::load(config)?;
    if let Some(policy) = luck {
        config.luck_policy = policy;
    }
    config.prefer_mighty_deeds |= deeds;

    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "dice seeded");

    let tracker = InMemoryTracker::new();
    let encounter = Encounter::new(character, monster, config, RandomRoller::seeded(seed))
        .with_tracker(tracker.clone());
    let mut driver = Driver::new(encounter);

    let input: Input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let outcome = driver
        .run(
            |offer| ask_luck(input.clone(), offer),
            |entry| println!("{entry}"),
        )
        .await;

    let encounter = driver.encounter();
    let hero = encounter.character();
    println!(
        "{}: {}/{} hp, Luck {}/{}",
        hero.name,
        hero.hp,
        hero.max_hp,
        hero.luck,
        hero.original_luck()
    );
    info!(?outcome, recorded = tracker.records().len(), "fight over");
    Ok(())
}

async fn ask_luck(input: Input, offer: LuckOffer) -> LuckDecision {
    println!(
        "Rolled {} for a total of {}, short by {}. Burn how much Luck? (1-{}, enter to decline)",
        offer.raw, offer.total, offer.shortfall, offer.luck_available
    );
    loop {
        let line = match input.lock().await.next_line().await {
            Ok(Some(text)) => text,
            _ => return LuckDecision::Decline,
        };
        let text = line.trim();
        if text.is_empty() {
            return LuckDecision::Decline;
        }
        match text.parse::<i32>() {
            Ok(amount) if (1..=offer.luck_available).contains(&amount) => {
                return LuckDecision::Burn(amount)
            }
            _ => println!(
                "'{text}' is not a valid burn. Enter 1-{} or press enter to decline.",
                offer.luck_available
            ),
        }
    }
}

fn roll(expressions: &[String], critical: bool, seed: Option<u64>) {
    let mut roller = RandomRoller::seeded(seed.unwrap_or_else(rand::random));
    for expression in expressions {
        let damage = if critical {
            roll_critical_damage(Some(expression.as_str()), &mut roller)
        } else {
            roll_damage(Some(expression.as_str()), &mut roller)
        };
        println!("{expression}: {damage}");
    }
}
