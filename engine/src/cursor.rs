//! Monotone cursor over a scenario's sorted event script.

use std::time::Duration;

use rescue_orch_core::ScriptEvent;

/// Tracks how far into the script the replay has progressed.
///
/// The cursor only ever moves forward; rewinding is an explicit whole-run
/// reset. Because the script is sorted by trigger time, each tick hands out
/// the contiguous slice of newly due events exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ScriptCursor {
    next_index: usize,
}

impl ScriptCursor {
    /// Returns every event whose trigger time has been reached since the
    /// previous call, in declaration order, and advances past them.
    pub(crate) fn advance_to<'a>(
        &mut self,
        script: &'a [ScriptEvent],
        elapsed: Duration,
    ) -> &'a [ScriptEvent] {
        let start = self.next_index;
        let mut end = start;
        while end < script.len() && script[end].at() <= elapsed {
            end += 1;
        }
        self.next_index = end;
        &script[start..end]
    }

    /// Moves the cursor back to the start of the script.
    pub(crate) fn rewind(&mut self) {
        self.next_index = 0;
    }

    /// Reports whether every event in the script has been handed out.
    pub(crate) fn is_exhausted(&self, script: &[ScriptEvent]) -> bool {
        self.next_index >= script.len()
    }
}
