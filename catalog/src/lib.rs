#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static scenario catalog for the RescuOrch mission timeline engine.
//!
//! A [`Scenario`] is an immutable record: display metadata, site geometry,
//! agent roster, and the ordered event script that the engine replays. The
//! [`Catalog`] owns one record per scenario for the process lifetime and
//! hands out read-only references; the engine clones the record it activates
//! and never mutates catalog state. Scenarios can additionally be authored
//! as versioned TOML manifests and loaded through [`load_scenario_str`].

mod builtin;
mod manifest;

use std::time::Duration;

use rescue_orch_core::{
    AgentCategory, AgentId, Position, ScenarioId, ScriptAction, ScriptEvent,
};
use thiserror::Error;

pub use manifest::{
    load_scenario_str, DroppedEvent, EventDefect, LoadedScenario, ManifestError,
    SUPPORTED_MANIFEST_VERSION,
};

/// Nominal speed applied when an agent definition omits one, in m/s.
pub const DEFAULT_NOMINAL_SPEED: f32 = 0.5;

/// Rectangular extent of a scenario map measured in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapBounds {
    width: f32,
    height: f32,
}

impl MapBounds {
    /// Creates new map bounds from the provided extent.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the map in metres.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the map in metres.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Fixed geometry of an incident site: map extent and points of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteGeometry {
    map: MapBounds,
    floorplan: String,
    fire_origin: Position,
    victim: Position,
}

impl SiteGeometry {
    /// Creates the site geometry, sanitizing the points of interest.
    #[must_use]
    pub fn new(
        map: MapBounds,
        floorplan: impl Into<String>,
        fire_origin: Position,
        victim: Position,
    ) -> Self {
        Self {
            map,
            floorplan: floorplan.into(),
            fire_origin: fire_origin.sanitized(),
            victim: victim.sanitized(),
        }
    }

    /// Extent of the scenario map.
    #[must_use]
    pub const fn map(&self) -> MapBounds {
        self.map
    }

    /// Asset key of the floorplan the display layer renders underneath.
    #[must_use]
    pub fn floorplan(&self) -> &str {
        &self.floorplan
    }

    /// Point where the fire originates.
    #[must_use]
    pub const fn fire_origin(&self) -> Position {
        self.fire_origin
    }

    /// Point where the victim is located.
    #[must_use]
    pub const fn victim(&self) -> Position {
        self.victim
    }
}

/// Immutable definition of a single agent within a scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSpec {
    id: AgentId,
    label: String,
    category: AgentCategory,
    speed: f32,
    start: Position,
}

impl AgentSpec {
    /// Creates an agent definition with the default nominal speed.
    #[must_use]
    pub fn new(
        id: AgentId,
        label: impl Into<String>,
        category: AgentCategory,
        start: Position,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            category,
            speed: DEFAULT_NOMINAL_SPEED,
            start: start.sanitized(),
        }
    }

    /// Overrides the nominal speed in metres per simulated second.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Human-readable label shown by the display layer.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Broad category of the agent.
    #[must_use]
    pub const fn category(&self) -> AgentCategory {
        self.category
    }

    /// Nominal speed in metres per simulated second.
    ///
    /// Speed is fixed for the scenario and never varies with the assigned
    /// task.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Position the agent occupies before the run starts.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }
}

/// One complete, named rescue situation with its own site, agents and script.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    id: ScenarioId,
    name: String,
    briefing: String,
    geometry: SiteGeometry,
    agents: Vec<AgentSpec>,
    script: Vec<ScriptEvent>,
    settle: Duration,
}

impl Scenario {
    /// Creates a new scenario record.
    ///
    /// Construction is infallible; use [`Scenario::validate`] to check the
    /// structural invariants before handing the record to the engine.
    #[must_use]
    pub fn new(
        id: ScenarioId,
        name: impl Into<String>,
        briefing: impl Into<String>,
        geometry: SiteGeometry,
        agents: Vec<AgentSpec>,
        script: Vec<ScriptEvent>,
        settle: Duration,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            briefing: briefing.into(),
            geometry,
            agents,
            script,
            settle,
        }
    }

    /// Identifier of the scenario.
    #[must_use]
    pub const fn id(&self) -> &ScenarioId {
        &self.id
    }

    /// Display name of the scenario.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short mission briefing shown by the display layer.
    #[must_use]
    pub fn briefing(&self) -> &str {
        &self.briefing
    }

    /// Fixed geometry of the incident site.
    #[must_use]
    pub const fn geometry(&self) -> &SiteGeometry {
        &self.geometry
    }

    /// Agent roster in declaration order.
    #[must_use]
    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// Looks up an agent definition by identifier.
    #[must_use]
    pub fn agent(&self, id: &AgentId) -> Option<&AgentSpec> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    /// Ordered event script replayed by the engine.
    #[must_use]
    pub fn script(&self) -> &[ScriptEvent] {
        &self.script
    }

    /// Buffer past the last scripted event before completion is declared.
    #[must_use]
    pub const fn settle(&self) -> Duration {
        self.settle
    }

    /// Simulated time after which an exhausted script completes the mission.
    ///
    /// Derived from the last event's trigger time plus the settle buffer so
    /// the guard tracks future script edits; an empty script completes after
    /// the settle buffer alone.
    #[must_use]
    pub fn completion_guard(&self) -> Duration {
        self.script
            .last()
            .map_or(self.settle, |event| event.at().saturating_add(self.settle))
    }

    /// Checks the structural invariants of the record.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.agents.is_empty() {
            return Err(ScenarioError::NoAgents);
        }

        for (index, agent) in self.agents.iter().enumerate() {
            if self.agents[..index]
                .iter()
                .any(|earlier| earlier.id() == agent.id())
            {
                return Err(ScenarioError::DuplicateAgent {
                    agent: agent.id().clone(),
                });
            }
            if !agent.speed().is_finite() || agent.speed() <= 0.0 {
                return Err(ScenarioError::InvalidSpeed {
                    agent: agent.id().clone(),
                    speed: agent.speed(),
                });
            }
        }

        let mut previous = Duration::ZERO;
        for (index, event) in self.script.iter().enumerate() {
            if event.at() < previous {
                return Err(ScenarioError::UnsortedScript { index });
            }
            previous = event.at();

            let referenced = match event.action() {
                ScriptAction::MoveOrder { agent, .. }
                | ScriptAction::TaskAssignment { agent, .. } => Some(agent),
                _ => None,
            };
            if let Some(agent) = referenced {
                if self.agent(agent).is_none() {
                    return Err(ScenarioError::UnknownScriptAgent {
                        index,
                        agent: agent.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Reasons a scenario record fails validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScenarioError {
    /// The scenario defines no agents.
    #[error("scenario defines no agents")]
    NoAgents,
    /// An agent identifier is declared more than once.
    #[error("agent '{agent}' is declared more than once")]
    DuplicateAgent {
        /// The duplicated identifier.
        agent: AgentId,
    },
    /// An agent carries a non-positive or non-finite nominal speed.
    #[error("agent '{agent}' has invalid nominal speed {speed}")]
    InvalidSpeed {
        /// The offending agent.
        agent: AgentId,
        /// The rejected speed value.
        speed: f32,
    },
    /// A script event triggers earlier than its predecessor.
    #[error("script event {index} triggers before its predecessor")]
    UnsortedScript {
        /// Zero-based index of the offending event.
        index: usize,
    },
    /// A script event references an agent the roster does not define.
    #[error("script event {index} references unknown agent '{agent}'")]
    UnknownScriptAgent {
        /// Zero-based index of the offending event.
        index: usize,
        /// The unknown identifier.
        agent: AgentId,
    },
}

/// Read-only table of scenario records keyed by identifier.
#[derive(Clone, Debug)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Creates the catalog holding the built-in demo scenarios.
    #[must_use]
    pub fn builtin() -> Self {
        let scenarios = vec![builtin::kitchen(), builtin::factory()];
        for scenario in &scenarios {
            debug_assert!(
                scenario.validate().is_ok(),
                "builtin scenario '{}' must validate",
                scenario.id()
            );
        }
        Self { scenarios }
    }

    /// Retrieves the scenario registered under the provided identifier.
    #[must_use]
    pub fn get(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id() == id)
    }

    /// Iterator over the held scenarios in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Registers a scenario, replacing any record with the same identifier.
    pub fn insert(&mut self, scenario: Scenario) {
        match self
            .scenarios
            .iter()
            .position(|existing| existing.id() == scenario.id())
        {
            Some(index) => self.scenarios[index] = scenario,
            None => self.scenarios.push(scenario),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescue_orch_core::{AgentTask, FirePhase, FireIntensity};

    fn geometry() -> SiteGeometry {
        SiteGeometry::new(
            MapBounds::new(10.0, 10.0),
            "test-floorplan",
            Position::new(8.0, 2.0),
            Position::new(2.0, 8.0),
        )
    }

    fn roster() -> Vec<AgentSpec> {
        vec![AgentSpec::new(
            AgentId::new("unit1"),
            "Unit 1",
            AgentCategory::Ground,
            Position::new(0.0, 0.0),
        )
        .with_speed(0.7)]
    }

    #[test]
    fn builtin_scenarios_validate() {
        let catalog = Catalog::builtin();
        for scenario in catalog.iter() {
            scenario
                .validate()
                .unwrap_or_else(|error| panic!("{} failed: {error}", scenario.id()));
        }
    }

    #[test]
    fn builtin_catalog_holds_kitchen_and_factory() {
        let catalog = Catalog::builtin();
        assert!(catalog.get(&ScenarioId::new("kitchen")).is_some());
        assert!(catalog.get(&ScenarioId::new("factory")).is_some());
        assert!(catalog.get(&ScenarioId::new("warehouse")).is_none());
    }

    #[test]
    fn kitchen_guard_derives_from_last_event_plus_settle() {
        let catalog = Catalog::builtin();
        let kitchen = catalog
            .get(&ScenarioId::new("kitchen"))
            .expect("kitchen registered");
        let last = kitchen.script().last().expect("kitchen script populated").at();
        assert_eq!(kitchen.completion_guard(), last + kitchen.settle());
        assert_eq!(kitchen.completion_guard(), Duration::from_secs(30));
    }

    #[test]
    fn builtin_scripts_are_sorted_by_trigger_time() {
        for scenario in Catalog::builtin().iter() {
            let mut previous = Duration::ZERO;
            for event in scenario.script() {
                assert!(event.at() >= previous, "{} script unsorted", scenario.id());
                previous = event.at();
            }
        }
    }

    #[test]
    fn validate_rejects_unknown_script_agent() {
        let script = vec![ScriptEvent::new(
            Duration::from_secs(1),
            ScriptAction::TaskAssignment {
                agent: AgentId::new("ghost"),
                task: AgentTask::Scout,
            },
        )];
        let scenario = Scenario::new(
            ScenarioId::new("broken"),
            "Broken",
            "",
            geometry(),
            roster(),
            script,
            Duration::from_secs(1),
        );
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::UnknownScriptAgent {
                index: 0,
                agent: AgentId::new("ghost"),
            })
        );
    }

    #[test]
    fn validate_rejects_unsorted_script() {
        let script = vec![
            ScriptEvent::new(
                Duration::from_secs(5),
                ScriptAction::PhaseChange {
                    phase: FirePhase::Ignition,
                    intensity: FireIntensity::new(0.4),
                },
            ),
            ScriptEvent::new(
                Duration::from_secs(2),
                ScriptAction::Log {
                    text: "out of order".to_owned(),
                },
            ),
        ];
        let scenario = Scenario::new(
            ScenarioId::new("broken"),
            "Broken",
            "",
            geometry(),
            roster(),
            script,
            Duration::from_secs(1),
        );
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::UnsortedScript { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_non_positive_speed() {
        let agents = vec![AgentSpec::new(
            AgentId::new("unit1"),
            "Unit 1",
            AgentCategory::Ground,
            Position::new(0.0, 0.0),
        )
        .with_speed(0.0)];
        let scenario = Scenario::new(
            ScenarioId::new("broken"),
            "Broken",
            "",
            geometry(),
            agents,
            Vec::new(),
            Duration::from_secs(1),
        );
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::InvalidSpeed { .. })
        ));
    }

    #[test]
    fn insert_replaces_scenario_with_same_id() {
        let mut catalog = Catalog::builtin();
        let replacement = Scenario::new(
            ScenarioId::new("kitchen"),
            "Kitchen (rehearsal)",
            "",
            geometry(),
            roster(),
            Vec::new(),
            Duration::from_secs(1),
        );
        catalog.insert(replacement);
        let kitchen = catalog
            .get(&ScenarioId::new("kitchen"))
            .expect("kitchen still registered");
        assert_eq!(kitchen.name(), "Kitchen (rehearsal)");
        assert_eq!(catalog.iter().count(), 2);
    }

    #[test]
    fn empty_script_completes_after_settle_alone() {
        let scenario = Scenario::new(
            ScenarioId::new("drill"),
            "Drill",
            "",
            geometry(),
            roster(),
            Vec::new(),
            Duration::from_secs(3),
        );
        assert_eq!(scenario.completion_guard(), Duration::from_secs(3));
    }
}
