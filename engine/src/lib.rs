#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative mission state management for the RescuOrch timeline engine.
//!
//! A [`Mission`] owns the active scenario, the cursor into its event script,
//! and the replaceable mission state. Adapters drive it exclusively through
//! [`apply`]: control commands switch between stopped and running, and each
//! `Tick` advances simulated time, applies every due script event in
//! declaration order, then interpolates agent motion. The [`query`] module is
//! the read-only boundary the display layer observes; nothing outside the
//! tick body mutates mission state.

mod cursor;
mod dispatch;
mod motion;

use std::time::Duration;

use glam::Vec2;
use rescue_orch_catalog::{Catalog, Scenario};
use rescue_orch_core::{
    AgentCategory, AgentId, AgentTask, Command, Event, FireIntensity, FirePhase, LogEntry,
    Position,
};

use cursor::ScriptCursor;
pub use motion::ARRIVAL_EPSILON;

/// Authoritative state of the active mission replay.
#[derive(Clone, Debug)]
pub struct Mission {
    scenario: Scenario,
    cursor: ScriptCursor,
    state: MissionState,
}

impl Mission {
    /// Creates a stopped mission positioned at the scenario's initial state.
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        let state = MissionState::initial(&scenario);
        Self {
            scenario,
            cursor: ScriptCursor::default(),
            state,
        }
    }

    /// Replaces the mission state wholesale from the scenario's initial
    /// snapshot and rewinds the script cursor. Leaves the engine stopped.
    fn reset(&mut self, out_events: &mut Vec<Event>) {
        let was_running = self.state.running;
        self.state = MissionState::initial(&self.scenario);
        self.cursor.rewind();
        if was_running {
            out_events.push(Event::RunStateChanged { running: false });
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MissionState {
    pub(crate) elapsed: Duration,
    pub(crate) phase: FirePhase,
    pub(crate) intensity: FireIntensity,
    pub(crate) agents: Vec<AgentRuntime>,
    pub(crate) log: Vec<LogEntry>,
    pub(crate) decisions: Vec<LogEntry>,
    pub(crate) victim_rescued: bool,
    pub(crate) mission_complete: bool,
    pub(crate) running: bool,
}

impl MissionState {
    fn initial(scenario: &Scenario) -> Self {
        let agents = scenario
            .agents()
            .iter()
            .map(|spec| AgentRuntime {
                id: spec.id().clone(),
                label: spec.label().to_owned(),
                category: spec.category(),
                speed: spec.speed(),
                position: vec_of(spec.start()),
                target: vec_of(spec.start()),
                task: AgentTask::Standby,
            })
            .collect();

        Self {
            elapsed: Duration::ZERO,
            phase: FirePhase::Idle,
            intensity: FireIntensity::ZERO,
            agents,
            log: Vec::new(),
            decisions: Vec::new(),
            victim_rescued: false,
            mission_complete: false,
            running: false,
        }
    }

    pub(crate) fn agent_mut(&mut self, id: &AgentId) -> Option<&mut AgentRuntime> {
        self.agents.iter_mut().find(|agent| &agent.id == id)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct AgentRuntime {
    pub(crate) id: AgentId,
    pub(crate) label: String,
    pub(crate) category: AgentCategory,
    pub(crate) speed: f32,
    pub(crate) position: Vec2,
    pub(crate) target: Vec2,
    pub(crate) task: AgentTask,
}

/// Applies the provided command to the mission, mutating state
/// deterministically.
///
/// The catalog is consulted only for `SelectScenario`; every other command
/// operates on the already active scenario. Repeated `Start`, `Stop`, and
/// `Reset` commands are no-ops in the states where they have nothing to do,
/// and `Tick` is ignored entirely while stopped so a stale timer can never
/// mutate a finished run.
pub fn apply(mission: &mut Mission, catalog: &Catalog, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectScenario { scenario } => match catalog.get(&scenario) {
            Some(next) => {
                mission.scenario = next.clone();
                mission.reset(out_events);
                out_events.push(Event::ScenarioSelected { scenario });
            }
            None => out_events.push(Event::ScenarioUnknown { scenario }),
        },
        Command::Start => {
            if mission.state.running {
                return;
            }
            mission.reset(out_events);
            mission.state.running = true;
            out_events.push(Event::RunStateChanged { running: true });
        }
        Command::Stop => {
            if !mission.state.running {
                return;
            }
            mission.state.running = false;
            out_events.push(Event::RunStateChanged { running: false });
        }
        Command::Reset => {
            mission.reset(out_events);
        }
        Command::Tick { dt } => {
            if !mission.state.running {
                return;
            }

            mission.state.elapsed = mission.state.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            // Event application strictly precedes motion interpolation, so a
            // move order issued this tick starts influencing position next
            // tick at the earliest.
            let due = mission
                .cursor
                .advance_to(mission.scenario.script(), mission.state.elapsed);
            dispatch::apply_due(&mut mission.state, due, out_events);
            motion::integrate(&mut mission.state, dt, out_events);

            if mission.cursor.is_exhausted(mission.scenario.script())
                && mission.state.elapsed >= mission.scenario.completion_guard()
            {
                mission.state.mission_complete = true;
                mission.state.running = false;
                out_events.push(Event::MissionCompleted {
                    at: mission.state.elapsed,
                });
                out_events.push(Event::RunStateChanged { running: false });
            }
        }
    }
}

/// Query functions that provide read-only access to the mission state.
pub mod query {
    use std::time::Duration;

    use rescue_orch_core::{
        serde_secs, AgentCategory, AgentId, AgentTask, FireIntensity, FirePhase, LogEntry,
        Position, ScenarioId,
    };
    use serde::Serialize;

    use super::{position_of, AgentRuntime, Mission};
    use rescue_orch_catalog::Scenario;

    /// Immutable snapshot of the complete mission state after a tick.
    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub struct MissionSnapshot {
        /// Identifier of the active scenario.
        pub scenario: ScenarioId,
        /// Simulated time elapsed since the run started.
        #[serde(with = "serde_secs")]
        pub elapsed: Duration,
        /// Macro-state of the fire incident.
        pub fire_phase: FirePhase,
        /// Fire intensity in `[0, 1]`.
        pub fire_intensity: FireIntensity,
        /// Agent snapshots in scenario declaration order.
        pub agents: Vec<AgentSnapshot>,
        /// Ordered system log.
        pub log: Vec<LogEntry>,
        /// Ordered decision log emitted by the planning core.
        pub decisions: Vec<LogEntry>,
        /// Whether the victim has been rescued in this run.
        pub victim_rescued: bool,
        /// Whether the mission has completed.
        pub mission_complete: bool,
        /// Whether a run is currently ticking.
        pub running: bool,
    }

    /// Immutable representation of a single agent's state used for queries.
    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub struct AgentSnapshot {
        /// Identifier of the agent.
        pub id: AgentId,
        /// Human-readable label shown by the display layer.
        pub label: String,
        /// Broad category of the agent.
        pub category: AgentCategory,
        /// Current interpolated position.
        pub position: Position,
        /// Point the agent is approaching.
        pub target: Position,
        /// Task currently assigned to the agent.
        pub task: AgentTask,
        /// Nominal speed in metres per simulated second.
        pub speed: f32,
    }

    /// Captures a complete read-only snapshot of the mission state.
    #[must_use]
    pub fn snapshot(mission: &Mission) -> MissionSnapshot {
        MissionSnapshot {
            scenario: mission.scenario.id().clone(),
            elapsed: mission.state.elapsed,
            fire_phase: mission.state.phase,
            fire_intensity: mission.state.intensity,
            agents: mission.state.agents.iter().map(agent_snapshot).collect(),
            log: mission.state.log.clone(),
            decisions: mission.state.decisions.clone(),
            victim_rescued: mission.state.victim_rescued,
            mission_complete: mission.state.mission_complete,
            running: mission.state.running,
        }
    }

    /// Provides read-only access to the active scenario record.
    #[must_use]
    pub fn scenario(mission: &Mission) -> &Scenario {
        &mission.scenario
    }

    /// Simulated time elapsed since the run started.
    #[must_use]
    pub fn elapsed(mission: &Mission) -> Duration {
        mission.state.elapsed
    }

    /// Reports whether a run is currently ticking.
    #[must_use]
    pub fn is_running(mission: &Mission) -> bool {
        mission.state.running
    }

    /// Reports whether the mission has completed.
    #[must_use]
    pub fn mission_complete(mission: &Mission) -> bool {
        mission.state.mission_complete
    }

    /// Reports whether the victim has been rescued in this run.
    #[must_use]
    pub fn victim_rescued(mission: &Mission) -> bool {
        mission.state.victim_rescued
    }

    /// Captures a snapshot of a single agent, if the scenario defines it.
    #[must_use]
    pub fn agent(mission: &Mission, id: &AgentId) -> Option<AgentSnapshot> {
        mission
            .state
            .agents
            .iter()
            .find(|agent| &agent.id == id)
            .map(agent_snapshot)
    }

    /// Ordered system log of the current run.
    #[must_use]
    pub fn system_log(mission: &Mission) -> &[LogEntry] {
        &mission.state.log
    }

    /// Ordered decision log of the current run.
    #[must_use]
    pub fn decision_log(mission: &Mission) -> &[LogEntry] {
        &mission.state.decisions
    }

    fn agent_snapshot(agent: &AgentRuntime) -> AgentSnapshot {
        AgentSnapshot {
            id: agent.id.clone(),
            label: agent.label.clone(),
            category: agent.category,
            position: position_of(agent.position),
            target: position_of(agent.target),
            task: agent.task,
            speed: agent.speed,
        }
    }
}

pub(crate) fn vec_of(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

pub(crate) fn position_of(vector: Vec2) -> Position {
    Position::new(vector.x, vector.y)
}
