#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays RescuOrch mission timelines.
//!
//! The binary owns the wall-clock loop: it starts a run, feeds fixed-step
//! tick commands into the engine, narrates the emitted events to stdout and
//! optionally dumps the final state snapshot as JSON.

use std::{fs, path::PathBuf, thread, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use rescue_orch_catalog::{load_scenario_str, Catalog};
use rescue_orch_core::{Command, Event, ScenarioId};
use rescue_orch_engine::{apply, query, Mission};

/// Replays a scripted rescue mission and narrates it on the terminal.
#[derive(Debug, Parser)]
#[command(name = "rescue-orch-cli", version, about)]
struct Args {
    /// Identifier of the scenario to replay.
    #[arg(long, default_value = "kitchen")]
    scenario: String,

    /// Lists the available scenarios and exits.
    #[arg(long)]
    list: bool,

    /// Simulated milliseconds advanced per tick.
    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    /// Stops the replay after this much simulated time even if incomplete.
    #[arg(long)]
    duration_secs: Option<f32>,

    /// Sleeps one tick of wall-clock time between steps.
    #[arg(long)]
    realtime: bool,

    /// Prints the final mission snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Loads an additional scenario from a TOML manifest file.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut catalog = Catalog::builtin();
    if let Some(path) = &args.manifest {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let loaded = load_scenario_str(&source)
            .with_context(|| format!("failed to load manifest {}", path.display()))?;
        for dropped in &loaded.dropped {
            eprintln!(
                "warning: dropped event {} from {}: {}",
                dropped.index,
                path.display(),
                dropped.reason
            );
        }
        catalog.insert(loaded.scenario);
    }

    if args.list {
        for scenario in catalog.iter() {
            println!("{:<12} {} - {}", scenario.id(), scenario.name(), scenario.briefing());
        }
        return Ok(());
    }

    if args.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }
    let limit = match args.duration_secs {
        Some(secs) if !secs.is_finite() || secs < 0.0 => {
            bail!("--duration-secs must be a non-negative number")
        }
        Some(secs) => Some(Duration::from_secs_f32(secs)),
        None => None,
    };

    let scenario_id = ScenarioId::new(&args.scenario);
    let Some(scenario) = catalog.get(&scenario_id) else {
        bail!("unknown scenario `{}`; use --list to see what is available", args.scenario);
    };
    println!("{}: {}", scenario.name(), scenario.briefing());

    let mut mission = Mission::new(scenario.clone());
    let tick = Duration::from_millis(args.tick_ms);
    let mut events = Vec::new();

    apply(&mut mission, &catalog, Command::Start, &mut events);
    narrate(&events);

    while query::is_running(&mission) {
        if limit.is_some_and(|limit| query::elapsed(&mission) >= limit) {
            events.clear();
            apply(&mut mission, &catalog, Command::Stop, &mut events);
            narrate(&events);
            break;
        }

        events.clear();
        apply(&mut mission, &catalog, Command::Tick { dt: tick }, &mut events);
        narrate(&events);

        if args.realtime {
            thread::sleep(tick);
        }
    }

    if args.json {
        let snapshot = query::snapshot(&mission);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}

/// Prints the human-readable narration for one batch of engine events.
fn narrate(events: &[Event]) {
    for event in events {
        match event {
            Event::LogRecorded { entry } => {
                println!("[{:>6.1}s] {}", entry.at.as_secs_f32(), entry.text);
            }
            Event::DecisionRecorded { entry } => {
                println!("[{:>6.1}s] DECISION: {}", entry.at.as_secs_f32(), entry.text);
            }
            Event::PhaseChanged { phase, intensity } => {
                println!("          phase -> {phase:?} (intensity {:.2})", intensity.get());
            }
            Event::MoveOrdered { agent, target } => {
                println!(
                    "          {agent} moving to ({:.1}, {:.1})",
                    target.x(),
                    target.y()
                );
            }
            Event::TaskAssigned { agent, task } => {
                println!("          {agent} task -> {task:?}");
            }
            Event::OrderDropped { agent, reason } => {
                eprintln!("warning: order for {agent} dropped ({reason:?})");
            }
            Event::VictimRescued { at } => {
                println!("[{:>6.1}s] VICTIM RESCUED", at.as_secs_f32());
            }
            Event::MissionCompleted { at } => {
                println!("[{:>6.1}s] mission complete", at.as_secs_f32());
            }
            Event::ScenarioSelected { .. }
            | Event::ScenarioUnknown { .. }
            | Event::RunStateChanged { .. }
            | Event::TimeAdvanced { .. }
            | Event::AgentMoved { .. } => {}
        }
    }
}
