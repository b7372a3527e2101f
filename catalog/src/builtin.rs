//! Built-in demo scenarios shipped with the catalog.

use std::time::Duration;

use rescue_orch_core::{
    AgentCategory, AgentId, AgentTask, FirePhase, FireIntensity, Position, ScenarioId,
    ScriptAction, ScriptEvent,
};

use crate::{AgentSpec, MapBounds, Scenario, SiteGeometry};

const KITCHEN_FIRE_ORIGIN: Position = Position::new(6.5, 1.5);
const KITCHEN_VICTIM: Position = Position::new(1.0, 4.5);
const KITCHEN_DOOR: Position = Position::new(0.5, 0.5);

const FACTORY_FIRE_ORIGIN: Position = Position::new(16.0, 3.0);
const FACTORY_VICTIM: Position = Position::new(14.0, 8.0);

/// The apartment-kitchen fire used for the primary demo reel.
pub(crate) fn kitchen() -> Scenario {
    let geometry = SiteGeometry::new(
        MapBounds::new(8.0, 6.0),
        "kitchen-floorplan",
        KITCHEN_FIRE_ORIGIN,
        KITCHEN_VICTIM,
    );

    let agents = vec![
        AgentSpec::new(
            AgentId::new("tiago1"),
            "TIAGo Unit 1",
            AgentCategory::Ground,
            KITCHEN_DOOR,
        )
        .with_speed(0.6),
        AgentSpec::new(
            AgentId::new("tiago2"),
            "TIAGo Unit 2",
            AgentCategory::Ground,
            Position::new(0.5, 1.2),
        )
        .with_speed(0.55),
        AgentSpec::new(
            AgentId::new("mavic"),
            "Mavic Drone",
            AgentCategory::Aerial,
            Position::new(0.2, 0.2),
        )
        .with_speed(1.4),
    ];

    let script = vec![
        log(0.0, "Mission control online; telemetry nominal."),
        phase(1.0, FirePhase::GasLeak, 0.10),
        log(1.0, "Gas concentration rising near the stove line."),
        phase(3.0, FirePhase::Ignition, 0.35),
        log(3.0, "Ignition detected at the stove; alarm raised."),
        decision(
            4.0,
            "Thermal anomaly confirmed. Dispatching aerial scout to the seat of the fire.",
        ),
        task(5.0, "mavic", AgentTask::Scout),
        move_order(5.0, "mavic", KITCHEN_FIRE_ORIGIN),
        phase(7.0, FirePhase::FireSpread, 0.80),
        log(7.0, "Flames spreading along the counter."),
        decision(8.0, "Spread rate exceeds threshold. Assigning tiago1 to suppression."),
        task(9.0, "tiago1", AgentTask::Extinguish),
        move_order(9.0, "tiago1", KITCHEN_FIRE_ORIGIN),
        log(12.0, "mavic on station; streaming overhead imagery."),
        decision(
            14.0,
            "Heat signature consistent with a trapped person. Tasking tiago2 with extraction.",
        ),
        task(15.0, "tiago2", AgentTask::Rescue),
        move_order(15.0, "tiago2", KITCHEN_VICTIM),
        log(19.0, "tiago1 applying suppressant at the stove."),
        log(22.0, "tiago2 reached the victim; beginning extraction."),
        phase(24.0, FirePhase::FireSpread, 0.55),
        decision(26.0, "Extraction corridor is clear. Proceed to the service door."),
        move_order(26.0, "tiago2", KITCHEN_DOOR),
        rescued(28.0),
        log(28.0, "Victim extracted through the service door."),
        phase(29.0, FirePhase::Extinguished, 0.0),
        log(29.0, "Fire knocked down; site secure."),
        task(29.0, "tiago1", AgentTask::Standby),
        task(29.0, "tiago2", AgentTask::Standby),
        task(29.0, "mavic", AgentTask::Standby),
        move_order(29.0, "tiago1", KITCHEN_DOOR),
        move_order(29.0, "mavic", Position::new(0.2, 0.2)),
    ];

    Scenario::new(
        ScenarioId::new("kitchen"),
        "Kitchen Fire",
        "Gas leak ignition in an apartment kitchen with one trapped resident.",
        geometry,
        agents,
        script,
        Duration::from_secs(1),
    )
}

/// The press-line factory fire with a worker near the loading dock.
pub(crate) fn factory() -> Scenario {
    let geometry = SiteGeometry::new(
        MapBounds::new(20.0, 12.0),
        "factory-floorplan",
        FACTORY_FIRE_ORIGIN,
        FACTORY_VICTIM,
    );

    let agents = vec![
        AgentSpec::new(
            AgentId::new("tiago3"),
            "TIAGo Unit 3",
            AgentCategory::Ground,
            Position::new(1.0, 1.0),
        )
        .with_speed(0.8),
        AgentSpec::new(
            AgentId::new("husky1"),
            "Husky Carrier",
            AgentCategory::Ground,
            Position::new(1.0, 2.0),
        )
        .with_speed(0.9),
        AgentSpec::new(
            AgentId::new("mavic2"),
            "Mavic Drone 2",
            AgentCategory::Aerial,
            Position::new(0.5, 0.5),
        )
        .with_speed(1.5),
    ];

    let script = vec![
        log(0.0, "Factory telemetry online; all cells nominal."),
        phase(2.0, FirePhase::GasLeak, 0.15),
        log(2.0, "Solvent vapour accumulating near the press line."),
        phase(5.0, FirePhase::Ignition, 0.40),
        log(5.0, "Flash ignition at press cell 3."),
        decision(6.0, "Vapour ignition confirmed. Sending mavic2 for an overhead sweep."),
        task(7.0, "mavic2", AgentTask::Scout),
        move_order(7.0, "mavic2", FACTORY_FIRE_ORIGIN),
        phase(10.0, FirePhase::FireSpread, 0.90),
        log(10.0, "Fire advancing along the conveyor."),
        decision(
            11.0,
            "Conveyor spread exceeds containment. Tasking husky1 with suppression.",
        ),
        task(12.0, "husky1", AgentTask::Extinguish),
        move_order(12.0, "husky1", FACTORY_FIRE_ORIGIN),
        decision(
            16.0,
            "Worker badge pings near the loading dock. Tasking tiago3 with extraction.",
        ),
        task(17.0, "tiago3", AgentTask::Rescue),
        move_order(17.0, "tiago3", FACTORY_VICTIM),
        log(18.0, "mavic2 on station; thermal overlay streaming."),
        log(29.0, "husky1 laying foam across the press line."),
        rescued(36.0),
        log(36.0, "Worker clear of the structure."),
        move_order(36.0, "tiago3", Position::new(1.0, 1.0)),
        phase(38.0, FirePhase::Extinguished, 0.0),
        log(38.0, "Press line fire extinguished."),
        task(40.0, "tiago3", AgentTask::Standby),
        task(40.0, "husky1", AgentTask::Standby),
        task(40.0, "mavic2", AgentTask::Standby),
        move_order(40.0, "husky1", Position::new(1.0, 2.0)),
        move_order(40.0, "mavic2", Position::new(0.5, 0.5)),
    ];

    Scenario::new(
        ScenarioId::new("factory"),
        "Factory Fire",
        "Solvent vapour flash over a press line with a worker near the dock.",
        geometry,
        agents,
        script,
        Duration::from_secs(2),
    )
}

fn at(seconds: f32) -> Duration {
    Duration::from_secs_f32(seconds)
}

fn phase(seconds: f32, phase: FirePhase, intensity: f32) -> ScriptEvent {
    ScriptEvent::new(
        at(seconds),
        ScriptAction::PhaseChange {
            phase,
            intensity: FireIntensity::new(intensity),
        },
    )
}

fn log(seconds: f32, text: &str) -> ScriptEvent {
    ScriptEvent::new(
        at(seconds),
        ScriptAction::Log {
            text: text.to_owned(),
        },
    )
}

fn decision(seconds: f32, text: &str) -> ScriptEvent {
    ScriptEvent::new(
        at(seconds),
        ScriptAction::Decision {
            text: text.to_owned(),
        },
    )
}

fn move_order(seconds: f32, agent: &str, target: Position) -> ScriptEvent {
    ScriptEvent::new(
        at(seconds),
        ScriptAction::MoveOrder {
            agent: AgentId::new(agent),
            target,
        },
    )
}

fn task(seconds: f32, agent: &str, task: AgentTask) -> ScriptEvent {
    ScriptEvent::new(
        at(seconds),
        ScriptAction::TaskAssignment {
            agent: AgentId::new(agent),
            task,
        },
    )
}

fn rescued(seconds: f32) -> ScriptEvent {
    ScriptEvent::new(at(seconds), ScriptAction::RescueFlagSet)
}
