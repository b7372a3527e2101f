//! Versioned TOML manifests for externally authored scenarios.
//!
//! Manifests carry the same data as a built-in [`Scenario`](crate::Scenario)
//! but in a lenient form: each `[[events]]` entry is parsed individually, and
//! an entry with an unknown `kind` or a missing required field is dropped
//! with a typed warning instead of failing the whole manifest. A corrupt
//! event must never take the mission catalog down with it.

use std::time::Duration;

use rescue_orch_core::{
    AgentCategory, AgentId, AgentTask, FirePhase, FireIntensity, Position, ScenarioId,
    ScriptAction, ScriptEvent,
};
use serde::Deserialize;
use thiserror::Error;

use crate::{AgentSpec, MapBounds, Scenario, ScenarioError, SiteGeometry};

/// Manifest schema version this loader understands.
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

const DEFAULT_SETTLE_SECS: f32 = 1.0;

/// Result of loading a scenario manifest.
#[derive(Clone, Debug)]
pub struct LoadedScenario {
    /// The validated scenario record.
    pub scenario: Scenario,
    /// Events that were dropped from the script, in manifest order.
    pub dropped: Vec<DroppedEvent>,
}

/// A manifest event that could not be converted into a script event.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedEvent {
    /// Zero-based index of the event within the manifest.
    pub index: usize,
    /// Specific defect that caused the drop.
    pub reason: EventDefect,
}

/// Defects that cause an individual manifest event to be dropped.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EventDefect {
    /// The event carried a `kind` tag this loader does not understand.
    #[error("unknown event kind '{kind}'")]
    UnknownKind {
        /// The unrecognized tag.
        kind: String,
    },
    /// The event omitted a field its kind requires.
    #[error("event kind '{kind}' is missing required field '{field}'")]
    MissingField {
        /// Kind of the offending event.
        kind: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The trigger time was negative or non-finite.
    #[error("trigger time {at} is not a finite, non-negative second count")]
    InvalidTrigger {
        /// The rejected trigger value.
        at: f32,
    },
}

/// Errors that fail manifest loading as a whole.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The TOML document could not be parsed.
    #[error("could not parse scenario manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a schema version this loader does not support.
    #[error("manifest version {found} is not supported (expected {SUPPORTED_MANIFEST_VERSION})")]
    UnsupportedVersion {
        /// The declared version.
        found: u32,
    },
    /// The assembled scenario failed structural validation.
    #[error(transparent)]
    Invalid(#[from] ScenarioError),
}

/// Loads a scenario from TOML manifest source text.
pub fn load_scenario_str(source: &str) -> Result<LoadedScenario, ManifestError> {
    let manifest: Manifest = toml::from_str(source)?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(ManifestError::UnsupportedVersion {
            found: manifest.version,
        });
    }

    let agents: Vec<AgentSpec> = manifest.agents.into_iter().map(convert_agent).collect();

    let mut script = Vec::new();
    let mut dropped = Vec::new();
    for (index, event) in manifest.events.into_iter().enumerate() {
        match convert_event(event) {
            Ok(converted) => script.push(converted),
            Err(reason) => dropped.push(DroppedEvent { index, reason }),
        }
    }

    let meta = manifest.scenario;
    let geometry = SiteGeometry::new(
        MapBounds::new(meta.map_width, meta.map_height),
        meta.floorplan,
        point(meta.fire_origin),
        point(meta.victim),
    );
    let settle = seconds(meta.settle_secs)
        .unwrap_or_else(|| Duration::from_secs_f32(DEFAULT_SETTLE_SECS));

    let scenario = Scenario::new(
        ScenarioId::new(meta.id),
        meta.name,
        meta.briefing,
        geometry,
        agents,
        script,
        settle,
    );
    scenario.validate()?;

    Ok(LoadedScenario { scenario, dropped })
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    scenario: ManifestScenario,
    #[serde(default)]
    agents: Vec<ManifestAgent>,
    #[serde(default)]
    events: Vec<ManifestEvent>,
}

#[derive(Debug, Deserialize)]
struct ManifestScenario {
    id: String,
    name: String,
    #[serde(default)]
    briefing: String,
    #[serde(default)]
    floorplan: String,
    map_width: f32,
    map_height: f32,
    fire_origin: [f32; 2],
    victim: [f32; 2],
    #[serde(default = "default_settle_secs")]
    settle_secs: f32,
}

#[derive(Debug, Deserialize)]
struct ManifestAgent {
    id: String,
    #[serde(default)]
    label: Option<String>,
    category: AgentCategory,
    #[serde(default)]
    speed: Option<f32>,
    start: [f32; 2],
}

#[derive(Debug, Deserialize)]
struct ManifestEvent {
    at: f32,
    kind: String,
    #[serde(default)]
    phase: Option<FirePhase>,
    #[serde(default)]
    intensity: Option<f32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    target: Option<[f32; 2]>,
    #[serde(default)]
    task: Option<AgentTask>,
}

fn default_settle_secs() -> f32 {
    DEFAULT_SETTLE_SECS
}

fn convert_agent(raw: ManifestAgent) -> AgentSpec {
    let label = raw.label.unwrap_or_else(|| raw.id.clone());
    let spec = AgentSpec::new(AgentId::new(raw.id), label, raw.category, point(raw.start));
    match raw.speed {
        Some(speed) => spec.with_speed(speed),
        None => spec,
    }
}

fn convert_event(raw: ManifestEvent) -> Result<ScriptEvent, EventDefect> {
    let Some(at) = seconds(raw.at) else {
        return Err(EventDefect::InvalidTrigger { at: raw.at });
    };

    let action = match raw.kind.as_str() {
        "phase" => ScriptAction::PhaseChange {
            phase: raw.phase.ok_or(EventDefect::MissingField {
                kind: "phase",
                field: "phase",
            })?,
            intensity: FireIntensity::new(raw.intensity.ok_or(EventDefect::MissingField {
                kind: "phase",
                field: "intensity",
            })?),
        },
        "log" => ScriptAction::Log {
            text: raw.text.ok_or(EventDefect::MissingField {
                kind: "log",
                field: "text",
            })?,
        },
        "decision" => ScriptAction::Decision {
            text: raw.text.ok_or(EventDefect::MissingField {
                kind: "decision",
                field: "text",
            })?,
        },
        "move" => ScriptAction::MoveOrder {
            agent: AgentId::new(raw.agent.ok_or(EventDefect::MissingField {
                kind: "move",
                field: "agent",
            })?),
            target: point(raw.target.ok_or(EventDefect::MissingField {
                kind: "move",
                field: "target",
            })?),
        },
        "task" => ScriptAction::TaskAssignment {
            agent: AgentId::new(raw.agent.ok_or(EventDefect::MissingField {
                kind: "task",
                field: "agent",
            })?),
            task: raw.task.ok_or(EventDefect::MissingField {
                kind: "task",
                field: "task",
            })?,
        },
        "rescued" => ScriptAction::RescueFlagSet,
        other => {
            return Err(EventDefect::UnknownKind {
                kind: other.to_owned(),
            });
        }
    };

    Ok(ScriptEvent::new(at, action))
}

fn point(raw: [f32; 2]) -> Position {
    Position::new(raw[0], raw[1]).sanitized()
}

fn seconds(raw: f32) -> Option<Duration> {
    if raw.is_finite() && raw >= 0.0 {
        Some(Duration::from_secs_f32(raw))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        version = 1

        [scenario]
        id = "warehouse"
        name = "Warehouse Fire"
        briefing = "Pallet rack fire with one trapped picker."
        map_width = 30.0
        map_height = 18.0
        fire_origin = [25.0, 4.0]
        victim = [27.0, 15.0]
        settle_secs = 2.0

        [[agents]]
        id = "tiago9"
        label = "TIAGo Unit 9"
        category = "ground"
        speed = 0.7
        start = [1.0, 1.0]

        [[agents]]
        id = "mavic9"
        category = "aerial"
        start = [0.5, 0.5]

        [[events]]
        at = 1.0
        kind = "phase"
        phase = "GAS_LEAK"
        intensity = 0.2

        [[events]]
        at = 3.0
        kind = "decision"
        text = "Dispatching scout."

        [[events]]
        at = 4.0
        kind = "task"
        agent = "mavic9"
        task = "scout"

        [[events]]
        at = 4.0
        kind = "move"
        agent = "mavic9"
        target = [25.0, 4.0]

        [[events]]
        at = 20.0
        kind = "rescued"
    "#;

    #[test]
    fn loads_complete_manifest() {
        let loaded = load_scenario_str(MANIFEST).expect("manifest loads");
        assert!(loaded.dropped.is_empty());

        let scenario = loaded.scenario;
        assert_eq!(scenario.id(), &ScenarioId::new("warehouse"));
        assert_eq!(scenario.agents().len(), 2);
        assert_eq!(scenario.script().len(), 5);
        assert_eq!(
            scenario.completion_guard(),
            Duration::from_secs(20) + Duration::from_secs(2)
        );

        let drone = scenario
            .agent(&AgentId::new("mavic9"))
            .expect("drone registered");
        assert_eq!(drone.label(), "mavic9");
        assert_eq!(drone.speed(), crate::DEFAULT_NOMINAL_SPEED);
    }

    #[test]
    fn drops_event_with_unknown_kind() {
        let source = MANIFEST.replace("kind = \"rescued\"", "kind = \"teleport\"");
        let loaded = load_scenario_str(&source).expect("manifest loads");
        assert_eq!(loaded.scenario.script().len(), 4);
        assert_eq!(
            loaded.dropped,
            vec![DroppedEvent {
                index: 4,
                reason: EventDefect::UnknownKind {
                    kind: "teleport".to_owned(),
                },
            }]
        );
    }

    #[test]
    fn drops_event_missing_required_field() {
        let source = MANIFEST.replace("text = \"Dispatching scout.\"", "");
        let loaded = load_scenario_str(&source).expect("manifest loads");
        assert_eq!(
            loaded.dropped,
            vec![DroppedEvent {
                index: 1,
                reason: EventDefect::MissingField {
                    kind: "decision",
                    field: "text",
                },
            }]
        );
    }

    #[test]
    fn drops_event_with_negative_trigger() {
        let source = MANIFEST.replace("at = 20.0", "at = -3.0");
        let loaded = load_scenario_str(&source).expect("manifest loads");
        assert_eq!(
            loaded.dropped,
            vec![DroppedEvent {
                index: 4,
                reason: EventDefect::InvalidTrigger { at: -3.0 },
            }]
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        let source = MANIFEST.replace("version = 1", "version = 9");
        assert!(matches!(
            load_scenario_str(&source),
            Err(ManifestError::UnsupportedVersion { found: 9 })
        ));
    }

    #[test]
    fn rejects_script_referencing_unknown_agent() {
        let source = MANIFEST.replace("agent = \"mavic9\"", "agent = \"ghost\"");
        assert!(matches!(
            load_scenario_str(&source),
            Err(ManifestError::Invalid(_))
        ));
    }

    #[test]
    fn sanitizes_non_finite_coordinates() {
        let source = MANIFEST.replace("target = [25.0, 4.0]", "target = [nan, 4.0]");
        let loaded = load_scenario_str(&source).expect("manifest loads");
        let target = loaded
            .scenario
            .script()
            .iter()
            .find_map(|event| match event.action() {
                ScriptAction::MoveOrder { target, .. } => Some(*target),
                _ => None,
            })
            .expect("move order present");
        assert_eq!(target, Position::new(0.0, 4.0));
    }
}
