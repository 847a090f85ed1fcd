//! Sprite animation state. Only drives what clients display.

use serde::Serialize;

use crate::config::entities::FRAME_DURATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    Idle,
    Starting,
    Moving,
    Ending,
}

impl AnimationState {
    fn looping(self) -> bool {
        matches!(self, AnimationState::Idle | AnimationState::Moving)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Animation {
    pub state: AnimationState,
    pub frame: u32,
    /// Frames per state before a non-looping state ends.
    #[serde(skip)]
    frames: u32,
    #[serde(skip)]
    frame_duration: u32,
    #[serde(skip)]
    timer: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(4, FRAME_DURATION)
    }
}

impl Animation {
    pub fn new(frames: u32, frame_duration: u32) -> Self {
        Self {
            state: AnimationState::Idle,
            frame: 0,
            frames: frames.max(1),
            frame_duration: frame_duration.max(1),
            timer: 0,
        }
    }

    fn enter(&mut self, state: AnimationState) {
        self.state = state;
        self.frame = 0;
        self.timer = 0;
    }

    /// Advance one tick. `moving` tells whether the entity still has movement
    /// pending.
    pub fn update(&mut self, moving: bool) {
        match (self.state, moving) {
            (AnimationState::Idle, true) => return self.enter(AnimationState::Starting),
            (AnimationState::Moving, false) => return self.enter(AnimationState::Ending),
            _ => {}
        }

        self.timer += 1;
        if self.timer < self.frame_duration {
            return;
        }
        self.timer = 0;
        self.frame += 1;
        if self.frame < self.frames {
            return;
        }

        if self.state.looping() {
            self.frame = 0;
            return;
        }
        match self.state {
            AnimationState::Starting if moving => self.enter(AnimationState::Moving),
            AnimationState::Starting => self.enter(AnimationState::Ending),
            _ => self.enter(AnimationState::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(animation: &mut Animation, moving: bool, ticks: u32) {
        for _ in 0..ticks {
            animation.update(moving);
        }
    }

    #[test]
    fn walks_through_the_movement_cycle() {
        let mut animation = Animation::new(2, 1);
        animation.update(true);
        assert_eq!(animation.state, AnimationState::Starting);

        run(&mut animation, true, 2);
        assert_eq!(animation.state, AnimationState::Moving);

        run(&mut animation, true, 10);
        assert_eq!(animation.state, AnimationState::Moving);

        animation.update(false);
        assert_eq!(animation.state, AnimationState::Ending);

        run(&mut animation, false, 2);
        assert_eq!(animation.state, AnimationState::Idle);
    }

    #[test]
    fn idle_stays_idle() {
        let mut animation = Animation::default();
        run(&mut animation, false, 50);
        assert_eq!(animation.state, AnimationState::Idle);
    }
}
