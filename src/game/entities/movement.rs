use std::collections::VecDeque;

use crate::game::types::Point;

/// Movement state of a movable entity.
///
/// A queued step is consumed only once `timer` is back at zero; a successful
/// step sets `timer` to `cooldown` again.
#[derive(Debug, Clone, Default)]
pub struct Motion {
    pub queue: VecDeque<Point>,
    pub cooldown: u32,
    pub timer: u32,
    /// Last committed step, used to interpolate the displayed position.
    pub last_step: Point,
}

impl Motion {
    pub fn new(cooldown: u32) -> Self {
        Self { cooldown, ..Self::default() }
    }

    pub fn with_queue(cooldown: u32, queue: impl IntoIterator<Item = Point>) -> Self {
        Self { queue: queue.into_iter().collect(), ..Self::new(cooldown) }
    }

    pub fn tick(&mut self) {
        self.timer = self.timer.saturating_sub(1);
    }

    /// Whether a queued step may be taken this tick.
    pub fn ready(&self) -> bool {
        self.timer == 0 && !self.queue.is_empty()
    }

    /// Nothing queued and no step in progress.
    pub fn settled(&self) -> bool {
        self.timer == 0 && self.queue.is_empty()
    }

    pub fn busy(&self) -> bool {
        !self.settled()
    }

    pub fn commit(&mut self, step: Point) {
        self.last_step = step;
        self.timer = self.cooldown;
    }

    pub fn stop(&mut self) {
        self.queue.clear();
        self.timer = 0;
    }

    /// Fraction of the last step still to be covered, in `[0, 1]`.
    pub fn lag(&self) -> f32 {
        if self.cooldown == 0 {
            0.0
        } else {
            self.timer as f32 / self.cooldown as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_waits_for_timer() {
        let mut motion = Motion::with_queue(2, [Point::new(1, 0)]);
        motion.timer = 1;
        assert!(!motion.ready());
        motion.tick();
        assert!(motion.ready());

        let step = motion.queue.pop_front().unwrap_or_default();
        motion.commit(step);
        assert!(motion.busy());
        motion.tick();
        motion.tick();
        assert!(motion.settled());
    }
}
