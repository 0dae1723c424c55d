use tracing::trace;

use super::TargetBehavior;
use crate::{io::sink::PropertySink, math::clamp_toward_target};

/// Tolerance for "this renderable has arrived".
const SINGLE_PRECISION: i32 = 2;

impl TargetBehavior {
    /// One tick of the non-array loop. Returns `true` once the goal is reached.
    pub(super) fn step_single(&mut self, sink: &mut impl PropertySink) -> bool {
        if self.on_lock && self.off_lock {
            trace!(target_index = self.index, "converting release into attack");
            self.redirect_on(sink);
        }

        let current = sink.color(self.renderables[0]);
        if current.approx_eq(&self.goal, SINGLE_PRECISION) {
            self.write(sink, 0, self.goal);
            return true;
        }

        let next = clamp_toward_target(current, self.goal, self.steps[0]);
        if next.approx_eq(&self.goal, SINGLE_PRECISION) {
            self.write(sink, 0, self.goal);
            return true;
        }

        self.write(sink, 0, next);
        self.iteration += 1;
        false
    }
}
