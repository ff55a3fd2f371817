#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Trail Defence sessions.
//!
//! The runner places a handful of light towers along the generated trail,
//! advances the simulation at a fixed frame rate, and reports an end-of-run
//! summary. It exists to exercise the full loop without any graphics stack.

mod logging;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use trail_defence_core::{Difficulty, Event, SessionPhase, TowerKind};
use trail_defence_session::{Session, SessionConfig};
use trail_defence_world::query;

#[derive(Debug, Parser)]
#[command(name = "trail-defence", about = "Headless Trail Defence session runner")]
struct Args {
    /// Seed for trail generation; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Difficulty level the session runs at.
    #[arg(long, value_enum, default_value = "medium")]
    difficulty: DifficultyArg,

    /// Simulated seconds to run before reporting.
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Frames simulated per second.
    #[arg(long, default_value_t = 20)]
    fps: u32,

    /// Number of light towers placed evenly along the trail.
    #[arg(long, default_value_t = 3)]
    towers: u32,

    /// Emit the summary as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Log debug records in addition to info records.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    spawned: u32,
    killed: u32,
    leaked: u32,
    shots: u32,
}

impl Tally {
    fn absorb(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.killed += 1,
                Event::EnemyReachedEnd { .. } => self.leaked += 1,
                Event::TowerFired { .. } => self.shots += 1,
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    difficulty: Difficulty,
    simulated_secs: f64,
    score: u32,
    base_health: u32,
    game_over: bool,
    #[serde(flatten)]
    tally: Tally,
}

/// Entry point for the Trail Defence command-line runner.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = SessionConfig {
        seed,
        difficulty: args.difficulty.into(),
        ..SessionConfig::default()
    };
    let mut session = Session::new(config)?;
    println!("{}", query::welcome_banner(session.world()));

    let mut events = Vec::new();
    let mut tally = Tally::default();

    session.start(&mut events);
    place_guard_towers(&mut session, args.towers, &mut events);
    tally.absorb(&events);

    let frame = Duration::from_secs(1) / args.fps.max(1);
    let frames = args.duration_secs.saturating_mul(u64::from(args.fps.max(1)));
    for _ in 0..frames {
        events.clear();
        session.step(frame, &mut events);
        tally.absorb(&events);
        if session.phase() == SessionPhase::GameOver {
            break;
        }
    }

    let summary = Summary {
        seed,
        difficulty: args.difficulty.into(),
        simulated_secs: session.elapsed().as_secs_f64(),
        score: session.score(),
        base_health: session.base_health().get(),
        game_over: session.phase() == SessionPhase::GameOver,
        tally,
    };
    report(&summary, args.json)?;
    Ok(())
}

/// Spreads light towers across the trail so every run sees some combat.
fn place_guard_towers(session: &mut Session, count: u32, out_events: &mut Vec<Event>) {
    if count == 0 {
        return;
    }

    let posts: Vec<_> = {
        let trail = query::trail(session.world());
        let total = trail.total_length();
        (1..=count)
            .map(|index| trail.position_at(total * index as f32 / (count + 1) as f32))
            .collect()
    };

    for post in posts {
        session.place_tower(TowerKind::Light, post, out_events);
    }
}

fn report(summary: &Summary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "ran {:.1}s at {:?}: {} spawned, {} killed, {} leaked, {} shots",
        summary.simulated_secs,
        summary.difficulty,
        summary.tally.spawned,
        summary.tally.killed,
        summary.tally.leaked,
        summary.tally.shots
    );
    println!(
        "score {}, base health {}{}",
        summary.score,
        summary.base_health,
        if summary.game_over { ", game over" } else { "" }
    );
    Ok(())
}
