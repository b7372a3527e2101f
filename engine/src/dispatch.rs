//! Applies due script events to the mission state.

use rescue_orch_core::{DropReason, Event, LogEntry, ScriptAction, ScriptEvent};

use crate::{vec_of, MissionState};

/// Applies a batch of due events in declaration order.
///
/// Log and decision entries are stamped with the event's trigger time rather
/// than the tick's elapsed time, so a coarse tick that releases several
/// events still records them at their authored timestamps. Orders naming an
/// agent the scenario does not define are dropped with a warning instead of
/// aborting the run.
pub(crate) fn apply_due(
    state: &mut MissionState,
    due: &[ScriptEvent],
    out_events: &mut Vec<Event>,
) {
    for event in due {
        let at = event.at();
        match event.action() {
            ScriptAction::PhaseChange { phase, intensity } => {
                state.phase = *phase;
                state.intensity = *intensity;
                out_events.push(Event::PhaseChanged {
                    phase: *phase,
                    intensity: *intensity,
                });
            }
            ScriptAction::Log { text } => {
                let entry = LogEntry {
                    at,
                    text: text.clone(),
                };
                state.log.push(entry.clone());
                out_events.push(Event::LogRecorded { entry });
            }
            ScriptAction::Decision { text } => {
                let entry = LogEntry {
                    at,
                    text: text.clone(),
                };
                state.decisions.push(entry.clone());
                out_events.push(Event::DecisionRecorded { entry });
            }
            ScriptAction::MoveOrder { agent, target } => {
                let target = target.sanitized();
                match state.agent_mut(agent) {
                    Some(runtime) => {
                        runtime.target = vec_of(target);
                        out_events.push(Event::MoveOrdered {
                            agent: agent.clone(),
                            target,
                        });
                    }
                    None => out_events.push(Event::OrderDropped {
                        agent: agent.clone(),
                        reason: DropReason::UnknownAgent,
                    }),
                }
            }
            ScriptAction::TaskAssignment { agent, task } => match state.agent_mut(agent) {
                Some(runtime) => {
                    runtime.task = *task;
                    out_events.push(Event::TaskAssigned {
                        agent: agent.clone(),
                        task: *task,
                    });
                }
                None => out_events.push(Event::OrderDropped {
                    agent: agent.clone(),
                    reason: DropReason::UnknownAgent,
                }),
            },
            ScriptAction::RescueFlagSet => {
                // The flag latches; a duplicate rescue beat in a script must
                // not produce a second announcement.
                if !state.victim_rescued {
                    state.victim_rescued = true;
                    out_events.push(Event::VictimRescued { at });
                }
            }
        }
    }
}
