#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the RescuOrch mission timeline engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative mission engine, and the scenario catalog. Adapters submit
//! [`Command`] values describing control transitions and tick advances, the
//! engine executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing every mutation it performed.
//! Scenario scripts are expressed with the closed [`ScriptAction`] variant so
//! that malformed payloads are a construction-time concern rather than a
//! runtime tag dispatch.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Identifier of a scenario held by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a new scenario identifier from the provided name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a simulated agent within a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new agent identifier from the provided name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position on the scenario map expressed in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from the provided coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in metres.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in metres.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns a copy with non-finite components coerced to zero.
    ///
    /// Externally supplied coordinates (manifest files, manual move orders)
    /// may carry NaN or infinite values; the engine treats those as the map
    /// origin instead of propagating them into motion math.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clamp = |value: f32| if value.is_finite() { value } else { 0.0 };
        Self::new(clamp(self.x), clamp(self.y))
    }

    /// Computes the straight-line distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Macro-state of the simulated fire incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirePhase {
    /// No incident is in progress.
    Idle,
    /// Combustible gas is accumulating but has not ignited.
    GasLeak,
    /// The leak has ignited at the fire origin.
    Ignition,
    /// Flames are spreading beyond the origin.
    FireSpread,
    /// The fire has been put out.
    Extinguished,
}

/// Fire intensity constrained to the unit interval.
///
/// Construction clamps the raw value into `[0, 1]` and maps non-finite input
/// to zero, so every observable intensity satisfies the invariant regardless
/// of where the value originated.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct FireIntensity(f32);

impl FireIntensity {
    /// Intensity of a dormant site.
    pub const ZERO: Self = Self(0.0);

    /// Creates a new intensity, clamping the raw value into `[0, 1]`.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Retrieves the intensity as a fraction in `[0, 1]`.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }
}

impl From<f32> for FireIntensity {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<FireIntensity> for f32 {
    fn from(value: FireIntensity) -> Self {
        value.0
    }
}

/// Task currently assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTask {
    /// The agent is idle and awaiting orders.
    Standby,
    /// The agent is surveying the incident site.
    Scout,
    /// The agent is suppressing the fire.
    Extinguish,
    /// The agent is extracting the victim.
    Rescue,
}

/// Broad category of a simulated agent, used for display metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    /// Wheeled or legged robot operating on the floor.
    Ground,
    /// Drone operating above the site.
    Aerial,
}

/// Single timestamped line recorded in a mission log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Simulated time at which the line was emitted.
    #[serde(with = "serde_secs")]
    pub at: Duration,
    /// Text of the log line.
    pub text: String,
}

/// Scripted action applied to mission state when its trigger time is reached.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptAction {
    /// Overwrites the fire phase and intensity.
    PhaseChange {
        /// Phase the incident transitions into.
        phase: FirePhase,
        /// Intensity observed at the transition.
        intensity: FireIntensity,
    },
    /// Appends a line to the system log.
    Log {
        /// Text of the log line.
        text: String,
    },
    /// Appends a line to the decision log emitted by the planning core.
    Decision {
        /// Text of the decision line.
        text: String,
    },
    /// Orders an agent to move toward a target point.
    MoveOrder {
        /// Agent receiving the order.
        agent: AgentId,
        /// Point the agent should approach.
        target: Position,
    },
    /// Assigns a task to an agent without affecting its motion.
    TaskAssignment {
        /// Agent receiving the assignment.
        agent: AgentId,
        /// Task the agent should adopt.
        task: AgentTask,
    },
    /// Marks the victim as rescued; idempotent once set.
    RescueFlagSet,
}

/// Scripted event pairing a trigger time with exactly one action.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptEvent {
    at: Duration,
    action: ScriptAction,
}

impl ScriptEvent {
    /// Creates a new script event triggering at the provided simulated time.
    #[must_use]
    pub const fn new(at: Duration, action: ScriptAction) -> Self {
        Self { at, action }
    }

    /// Simulated time at which the event becomes due.
    #[must_use]
    pub const fn at(&self) -> Duration {
        self.at
    }

    /// Action applied when the event becomes due.
    #[must_use]
    pub const fn action(&self) -> &ScriptAction {
        &self.action
    }
}

/// Commands that express all permissible engine transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Selects the active scenario, discarding all previous mission state.
    SelectScenario {
        /// Identifier of the scenario to activate.
        scenario: ScenarioId,
    },
    /// Performs a full reset and begins ticking; a no-op while running.
    Start,
    /// Stops ticking; a no-op while already stopped.
    Stop,
    /// Reinitializes mission state without starting a run.
    Reset,
    /// Advances simulated time by the provided delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the engine after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a scenario became active after a full reset.
    ScenarioSelected {
        /// Identifier of the scenario that became active.
        scenario: ScenarioId,
    },
    /// Reports that a scenario selection named an unknown identifier.
    ///
    /// The command is dropped and the previously active scenario keeps
    /// running untouched.
    ScenarioUnknown {
        /// Identifier that the catalog does not hold.
        scenario: ScenarioId,
    },
    /// Announces that the engine transitioned between stopped and running.
    RunStateChanged {
        /// Whether a run is active after processing the command.
        running: bool,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the fire phase and intensity were overwritten.
    PhaseChanged {
        /// Phase the incident transitioned into.
        phase: FirePhase,
        /// Intensity observed at the transition.
        intensity: FireIntensity,
    },
    /// Confirms that a line was appended to the system log.
    LogRecorded {
        /// The appended line.
        entry: LogEntry,
    },
    /// Confirms that a line was appended to the decision log.
    DecisionRecorded {
        /// The appended line.
        entry: LogEntry,
    },
    /// Confirms that an agent received a new target point.
    MoveOrdered {
        /// Agent that received the order.
        agent: AgentId,
        /// Sanitized target the agent will approach.
        target: Position,
    },
    /// Confirms that an agent received a new task.
    TaskAssigned {
        /// Agent that received the assignment.
        agent: AgentId,
        /// Task the agent adopted.
        task: AgentTask,
    },
    /// Reports that a scripted order was dropped instead of applied.
    OrderDropped {
        /// Agent the order named.
        agent: AgentId,
        /// Specific reason the order could not be applied.
        reason: DropReason,
    },
    /// Announces that the victim-rescued flag transitioned to true.
    VictimRescued {
        /// Simulated time of the scripted rescue.
        at: Duration,
    },
    /// Confirms that an agent moved during motion interpolation.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Position before the motion step.
        from: Position,
        /// Position after the motion step.
        to: Position,
    },
    /// Announces that the mission completed and the run stopped.
    MissionCompleted {
        /// Simulated time at which completion was detected.
        at: Duration,
    },
}

/// Reasons a scripted order may be dropped by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The order named an agent the active scenario does not define.
    UnknownAgent,
}

/// Serialization of [`Duration`] values as fractional seconds.
///
/// The display layer consumes snapshots as JSON where timestamps are plain
/// numbers; this module keeps the engine-side types on [`Duration`] while
/// presenting seconds at the serialization boundary.
pub mod serde_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serializes the duration as an `f64` count of seconds.
    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Deserializes a finite, non-negative `f64` count of seconds.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(de::Error::custom(
                "duration seconds must be finite and non-negative",
            ));
        }
        Ok(Duration::from_secs_f64(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn fire_intensity_clamps_into_unit_interval() {
        assert_eq!(FireIntensity::new(-0.5).get(), 0.0);
        assert_eq!(FireIntensity::new(0.35).get(), 0.35);
        assert_eq!(FireIntensity::new(7.0).get(), 1.0);
    }

    #[test]
    fn fire_intensity_maps_non_finite_to_zero() {
        assert_eq!(FireIntensity::new(f32::NAN).get(), 0.0);
        assert_eq!(FireIntensity::new(f32::INFINITY).get(), 0.0);
        assert_eq!(FireIntensity::new(f32::NEG_INFINITY).get(), 0.0);
    }

    #[test]
    fn position_sanitizes_non_finite_components() {
        let position = Position::new(f32::NAN, 3.5).sanitized();
        assert_eq!(position.x(), 0.0);
        assert_eq!(position.y(), 3.5);

        let untouched = Position::new(1.0, 2.0).sanitized();
        assert_eq!(untouched, Position::new(1.0, 2.0));
    }

    #[test]
    fn position_distance_is_symmetric() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn agent_id_round_trips_through_bincode() {
        assert_round_trip(&AgentId::new("tiago1"));
    }

    #[test]
    fn fire_phase_round_trips_through_bincode() {
        assert_round_trip(&FirePhase::FireSpread);
    }

    #[test]
    fn log_entry_round_trips_through_bincode() {
        let entry = LogEntry {
            at: Duration::from_millis(3_400),
            text: "Ignition detected at the stove".to_owned(),
        };
        assert_round_trip(&entry);
    }

    #[test]
    fn fire_intensity_deserialization_funnels_through_clamp() {
        let raw = bincode::serialize(&2.5_f32).expect("serialize raw");
        let intensity: FireIntensity = bincode::deserialize(&raw).expect("deserialize");
        assert_eq!(intensity.get(), 1.0);
    }
}
