//! Text transcript of the events a round produces.

use reflex_arcade_core::{BestScores, Event, RemovalCause, RoundPhase};

/// Prints the heads-up display for a headless round.
#[derive(Debug)]
pub(crate) struct Hud {
    quiet: bool,
}

impl Hud {
    pub(crate) fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub(crate) fn report(&self, events: &[Event]) {
        if self.quiet {
            return;
        }
        for line in events.iter().filter_map(describe) {
            println!("{line}");
        }
    }
}

/// Formats an event as a transcript line, skipping per-frame noise.
pub(crate) fn describe(event: &Event) -> Option<String> {
    match event {
        Event::TimeAdvanced { .. } | Event::TimeChanged { .. } => None,
        Event::StatusChanged { phase, message } => {
            Some(format!("[{}] {message}", phase_label(*phase)))
        }
        Event::DifficultyChanged { difficulty } => Some(format!("difficulty: {difficulty}")),
        Event::BestScoreChanged { difficulty, best } => {
            Some(format!("best ({difficulty}): {best}"))
        }
        Event::ScoreChanged { score, streak } => {
            Some(format!("score {score}  streak {streak}"))
        }
        Event::TargetSpawned { target } => Some(format!(
            "  + {} {} at ({:.0}, {:.0})",
            target.id,
            if target.is_penalty { "penalty" } else { "target" },
            target.position.x(),
            target.position.y(),
        )),
        Event::TargetRemoved { target, cause } => {
            let verb = match cause {
                RemovalCause::Hit => "hit",
                RemovalCause::Expired => "expired",
                RemovalCause::Cleared => "cleared",
            };
            Some(format!("  - {target} {verb}"))
        }
        Event::RoundEnded {
            difficulty,
            score,
            best,
            new_best,
            ..
        } => Some(format!(
            "round over on {difficulty}: {score} points (best {best}{})",
            if *new_best { ", new record" } else { "" }
        )),
    }
}

fn phase_label(phase: RoundPhase) -> &'static str {
    match phase {
        RoundPhase::Idle => "idle",
        RoundPhase::Active => "active",
        RoundPhase::Paused => "paused",
        RoundPhase::Ended => "ended",
    }
}

/// Renders the best-score table, one difficulty per line.
pub(crate) fn score_table(best: &BestScores) -> String {
    best.iter()
        .map(|(difficulty, score)| format!("{:<8}{score:>6}", difficulty.key()))
        .collect::<Vec<_>>()
        .join("\n")
}
