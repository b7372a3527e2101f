//! Straight-line motion interpolation towards per-agent targets.

use std::time::Duration;

use rescue_orch_core::Event;

use crate::{position_of, MissionState};

/// Distance in metres under which an agent snaps onto its target.
pub const ARRIVAL_EPSILON: f32 = 0.05;

/// Moves every agent towards its target by at most `speed * dt`.
///
/// Agents already on target do not move and emit nothing. An agent within
/// [`ARRIVAL_EPSILON`] of its target snaps onto it so positions settle to
/// exact coordinates instead of oscillating around them.
pub(crate) fn integrate(state: &mut MissionState, dt: Duration, out_events: &mut Vec<Event>) {
    for agent in &mut state.agents {
        let to_target = agent.target - agent.position;
        let distance = to_target.length();
        if distance == 0.0 {
            continue;
        }

        let from = agent.position;
        if distance <= ARRIVAL_EPSILON {
            agent.position = agent.target;
        } else {
            let step = (agent.speed * dt.as_secs_f32()).min(distance);
            if step <= 0.0 {
                continue;
            }
            agent.position += to_target / distance * step;
        }

        out_events.push(Event::AgentMoved {
            agent: agent.id.clone(),
            from: position_of(from),
            to: position_of(agent.position),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use rescue_orch_core::{
        AgentCategory, AgentId, AgentTask, Event, FireIntensity, FirePhase,
    };

    use super::{integrate, ARRIVAL_EPSILON};
    use crate::{AgentRuntime, MissionState};

    fn state_with_agent(position: Vec2, target: Vec2, speed: f32) -> MissionState {
        MissionState {
            elapsed: Duration::ZERO,
            phase: FirePhase::Idle,
            intensity: FireIntensity::ZERO,
            agents: vec![AgentRuntime {
                id: AgentId::new("unit"),
                label: "Unit".to_owned(),
                category: AgentCategory::Ground,
                speed,
                position,
                target,
                task: AgentTask::Standby,
            }],
            log: Vec::new(),
            decisions: Vec::new(),
            victim_rescued: false,
            mission_complete: false,
            running: true,
        }
    }

    #[test]
    fn step_never_overshoots_the_target() {
        let mut state = state_with_agent(Vec2::ZERO, Vec2::new(0.3, 0.0), 2.0);
        let mut events = Vec::new();

        integrate(&mut state, Duration::from_secs(1), &mut events);

        assert_eq!(state.agents[0].position, Vec2::new(0.3, 0.0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn agent_inside_epsilon_snaps_onto_target() {
        let target = Vec2::new(5.0, 5.0);
        let start = Vec2::new(5.0 - ARRIVAL_EPSILON * 0.5, 5.0);
        let mut state = state_with_agent(start, target, 0.0);
        let mut events = Vec::new();

        integrate(&mut state, Duration::from_millis(200), &mut events);

        assert_eq!(state.agents[0].position, target);
        assert!(matches!(events.as_slice(), [Event::AgentMoved { .. }]));
    }

    #[test]
    fn agent_on_target_stays_put_and_emits_nothing() {
        let spot = Vec2::new(2.0, 3.0);
        let mut state = state_with_agent(spot, spot, 1.0);
        let mut events = Vec::new();

        integrate(&mut state, Duration::from_millis(200), &mut events);

        assert_eq!(state.agents[0].position, spot);
        assert!(events.is_empty());
    }

    #[test]
    fn zero_dt_moves_nobody() {
        let mut state = state_with_agent(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0);
        let mut events = Vec::new();

        integrate(&mut state, Duration::ZERO, &mut events);

        assert_eq!(state.agents[0].position, Vec2::ZERO);
        assert!(events.is_empty());
    }

    #[test]
    fn partial_step_moves_along_the_straight_line() {
        let mut state = state_with_agent(Vec2::ZERO, Vec2::new(3.0, 4.0), 1.0);
        let mut events = Vec::new();

        integrate(&mut state, Duration::from_secs(1), &mut events);

        let position = state.agents[0].position;
        assert!((position.length() - 1.0).abs() < 1e-5);
        assert!((position.x / position.y - 0.75).abs() < 1e-5);
    }
}
