#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts Reflex Arcade rounds headlessly.

mod autoplay;
mod config;
mod hud;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reflex_arcade_core::{Difficulty, RoundPhase};
use reflex_arcade_persistence::{BestScoreStore, JsonFileStore};
use reflex_arcade_session::{ManualTimeSource, Session, SessionConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    autoplay::{Autoplay, BotAction},
    config::{ArcadeConfig, BotConfig},
    hud::Hud,
};

/// Reflex Arcade: click the targets before they vanish.
#[derive(Debug, Parser)]
#[command(name = "reflex-arcade", version)]
struct Cli {
    /// TOML file with surface, seed and scores settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Location of the best-score record.
    #[arg(long, global = true, value_name = "FILE")]
    scores: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Play one round with the autoplay bot against a virtual clock.
    Play(PlayArgs),
    /// Print the best score recorded for every difficulty.
    Scores,
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Difficulty key; unknown keys select medium.
    #[arg(long, default_value = "medium")]
    difficulty: String,
    /// Seed for target placement and the bot's decisions.
    #[arg(long)]
    seed: Option<u64>,
    /// Virtual milliseconds between frames.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Probability that the bot clicks a scoring target.
    #[arg(long)]
    accuracy: Option<f64>,
    /// Probability that the bot leaves a penalty target alone.
    #[arg(long)]
    discipline: Option<f64>,
    /// Average bot reaction time in milliseconds.
    #[arg(long)]
    reaction_ms: Option<u64>,
    /// Pause once this many seconds of play have elapsed.
    #[arg(long, value_name = "SECONDS")]
    pause_at: Option<f64>,
    /// How long the pause lasts in virtual seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 5.0)]
    pause_for: f64,
    /// Only print the final summary.
    #[arg(long)]
    quiet: bool,
}

impl PlayArgs {
    fn bot_config(&self, file: BotConfig) -> Result<BotConfig> {
        let bot = BotConfig {
            accuracy: self.accuracy.unwrap_or(file.accuracy),
            discipline: self.discipline.unwrap_or(file.discipline),
            reaction_ms: self.reaction_ms.unwrap_or(file.reaction_ms),
        };
        bot.validate()?;
        Ok(bot)
    }

    fn pause_window(&self) -> Result<Option<(Duration, Duration)>> {
        let Some(at) = self.pause_at else {
            return Ok(None);
        };
        let at = Duration::try_from_secs_f64(at).context("invalid --pause-at")?;
        let length = Duration::try_from_secs_f64(self.pause_for).context("invalid --pause-for")?;
        Ok(Some((at, length)))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ArcadeConfig::from_path(path)?,
        None => ArcadeConfig::default(),
    };
    let scores_path = config.scores_path(cli.scores);

    match cli.command {
        CliCommand::Play(args) => play(&config, scores_path, &args),
        CliCommand::Scores => {
            print_scores(scores_path);
            Ok(())
        }
    }
}

fn play(config: &ArcadeConfig, scores_path: PathBuf, args: &PlayArgs) -> Result<()> {
    if args.frame_ms == 0 {
        bail!("--frame-ms must be at least 1");
    }
    let frame = Duration::from_millis(args.frame_ms);
    let bot_config = args.bot_config(config.bot)?;
    let pause_window = args.pause_window()?;
    let seed = config.seed(args.seed);

    let time = ManualTimeSource::new();
    let session_config = SessionConfig {
        seed,
        surface: config.surface.to_surface(),
        difficulty: Difficulty::from_key(&args.difficulty),
    };
    info!(
        seed,
        difficulty = %session_config.difficulty,
        scores = %scores_path.display(),
        "starting autoplay round"
    );

    let mut session = Session::new(session_config, time.clone(), JsonFileStore::new(scores_path));
    let mut bot = Autoplay::new(bot_config, seed.rotate_left(17));
    let hud = Hud::new(args.quiet);
    let mut paused_once = false;

    let relay = |session: &mut Session<ManualTimeSource, JsonFileStore>, bot: &mut Autoplay| {
        let events = session.drain_events();
        hud.report(&events);
        bot.observe(&events);
    };

    relay(&mut session, &mut bot);
    session.start();
    relay(&mut session, &mut bot);

    while session.snapshot().phase == RoundPhase::Active {
        time.advance(frame);
        session.frame();
        relay(&mut session, &mut bot);

        for action in bot.due_actions() {
            match action {
                BotAction::Hit(target) => session.hit_target(target),
                BotAction::MissBoard => session.miss_board(),
            }
            relay(&mut session, &mut bot);
        }

        if let Some((at, length)) = pause_window {
            let active = session.snapshot().phase == RoundPhase::Active;
            if !paused_once && active && bot.play_time() >= at {
                paused_once = true;
                session.toggle_pause();
                time.advance(length);
                session.frame();
                session.toggle_pause();
                relay(&mut session, &mut bot);
            }
        }
    }

    let snapshot = session.snapshot();
    println!(
        "{}: score {} streak {} best {}",
        snapshot.difficulty, snapshot.score, snapshot.streak, snapshot.best
    );
    Ok(())
}

fn print_scores(scores_path: PathBuf) {
    let store = JsonFileStore::new(scores_path);
    let best = store.load().unwrap_or_else(|error| {
        warn!(%error, "ignoring unreadable best-score record");
        Default::default()
    });
    println!("{}", hud::score_table(&best));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "reflex-arcade",
            "play",
            "--scores",
            "best.json",
            "--difficulty",
            "hard",
            "--pause-at",
            "4.5",
        ])
        .expect("valid arguments");

        assert_eq!(cli.scores, Some(PathBuf::from("best.json")));
        let CliCommand::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.difficulty, "hard");
        assert_eq!(args.frame_ms, 16);
        assert_eq!(
            args.pause_window().expect("valid pause"),
            Some((Duration::from_millis(4_500), Duration::from_secs(5)))
        );
    }

    #[test]
    fn flags_override_bot_file_settings() {
        let cli = Cli::try_parse_from(["reflex-arcade", "play", "--accuracy", "0.5"])
            .expect("valid arguments");
        let CliCommand::Play(args) = cli.command else {
            panic!("expected play");
        };
        let bot = args
            .bot_config(BotConfig {
                accuracy: 0.9,
                discipline: 0.1,
                reaction_ms: 999,
            })
            .expect("valid bot");
        assert_eq!(bot.accuracy, 0.5);
        assert_eq!(bot.discipline, 0.1);
        assert_eq!(bot.reaction_ms, 999);
    }

    #[test]
    fn negative_pause_is_rejected() {
        let cli = Cli::try_parse_from(["reflex-arcade", "play", "--pause-at=-1"])
            .expect("clap accepts the number");
        let CliCommand::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert!(args.pause_window().is_err());
    }
}
