//! Per-actor movement and ramp state machine.

use std::time::Duration;

use glam::Vec2;
use hostage_rescue_core::{MovementState, RampId, RampOrientation, RampState, LEVEL_HEIGHT};

/// Forward walking speed in world units per second.
pub(crate) const WALK_SPEED: f32 = 1.0;
const RAMP_CLIMB_RATIO: f32 = 1.0 / 3.0;
const RAMP_TILT_DEGREES: f32 = 30.0;
const TILT_RATE: f32 = 5.0;
const RESCUE_SPEED_MULTIPLIER: f32 = 4.0;
const MIN_RESCUE_SCALE: f32 = 0.4;
const ARRIVAL_EPSILON: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tilt {
    from: f32,
    to: f32,
    progress: f32,
}

impl Tilt {
    const fn settled(angle: f32) -> Self {
        Self {
            from: angle,
            to: angle,
            progress: 1.0,
        }
    }

    fn toward(current: f32, target: f32) -> Self {
        Self {
            from: current,
            to: target,
            progress: 0.0,
        }
    }

    fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    fn advance(&mut self, dt: f32) -> f32 {
        self.progress = (self.progress + TILT_RATE * dt).min(1.0);
        self.from + (self.to - self.from) * self.progress
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rescue {
    destination: Vec2,
    initial_distance: f32,
}

/// Observable consequences of a single integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct StepOutcome {
    /// Walking height the actor snapped to after leaving a ramp.
    pub(crate) settled_at: Option<f32>,
    /// Whether a hostage reached its rescue slot during the step.
    pub(crate) arrived: bool,
}

/// Movement axis crossed with the ramp axis.
///
/// The ramp axis only carries meaning while moving and is forced back to
/// [`RampState::None`] whenever the movement axis leaves [`MovementState::Moving`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Locomotion {
    position: Vec2,
    track_height: f32,
    rotation: f32,
    scale: f32,
    movement: MovementState,
    ramp: RampState,
    tilt: Tilt,
    last_ramp: Option<RampId>,
    pending_exit: bool,
    rescue: Option<Rescue>,
}

impl Locomotion {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            track_height: position.y,
            rotation: 0.0,
            scale: 1.0,
            movement: MovementState::Moving,
            ramp: RampState::None,
            tilt: Tilt::settled(0.0),
            last_ramp: None,
            pending_exit: false,
            rescue: None,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn track_height(&self) -> f32 {
        self.track_height
    }

    pub(crate) fn rotation(&self) -> f32 {
        self.rotation
    }

    pub(crate) fn scale(&self) -> f32 {
        self.scale
    }

    pub(crate) fn movement(&self) -> MovementState {
        self.movement
    }

    pub(crate) fn ramp(&self) -> RampState {
        self.ramp
    }

    pub(crate) fn destination(&self) -> Option<Vec2> {
        self.rescue.map(|rescue| rescue.destination)
    }

    /// Whether shots and zone overlaps still affect the actor.
    pub(crate) fn is_active(&self) -> bool {
        self.movement == MovementState::Moving
    }

    /// Mounts a ramp, returning the ramp sub-state that was entered.
    ///
    /// Only the ramp used last is refused. Mounting another ramp mid-slope
    /// stacks its level shift on top of the current track height.
    pub(crate) fn enter_ramp(
        &mut self,
        ramp: RampId,
        orientation: RampOrientation,
    ) -> Option<RampState> {
        if !self.is_active() || self.last_ramp == Some(ramp) {
            return None;
        }
        if self.ramp == RampState::Settling {
            self.settle();
        }

        let (state, shift, angle) = match orientation {
            RampOrientation::East => (RampState::Descending, -LEVEL_HEIGHT, -RAMP_TILT_DEGREES),
            RampOrientation::West => (RampState::Ascending, LEVEL_HEIGHT, RAMP_TILT_DEGREES),
        };
        self.ramp = state;
        self.track_height += shift;
        self.tilt = Tilt::toward(self.rotation, angle);
        self.last_ramp = Some(ramp);
        self.pending_exit = false;
        Some(state)
    }

    /// Leaves the ramp zone, returning whether settling begins right away.
    ///
    /// An exit observed mid-tilt is held until the tilt completes.
    pub(crate) fn exit_ramp(&mut self, ramp: RampId) -> bool {
        if !self.on_slope() || self.last_ramp != Some(ramp) {
            return false;
        }
        if self.tilt.is_complete() {
            self.ramp = RampState::Settling;
            true
        } else {
            self.pending_exit = true;
            false
        }
    }

    /// Turns a walking hostage toward its rescue slot.
    pub(crate) fn begin_rescue(&mut self, destination: Vec2) -> bool {
        if !self.is_active() {
            return false;
        }
        self.movement = MovementState::Saving;
        self.ramp = RampState::None;
        self.pending_exit = false;
        self.rotation = 0.0;
        self.tilt = Tilt::settled(0.0);
        self.rescue = Some(Rescue {
            destination,
            initial_distance: self.position.distance(destination),
        });
        true
    }

    /// Stops the actor for good; returns whether it was walking.
    pub(crate) fn kill(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.movement = MovementState::Dead;
        self.ramp = RampState::None;
        self.pending_exit = false;
        true
    }

    /// Integrates one fixed step.
    pub(crate) fn step(&mut self, dt: Duration) -> StepOutcome {
        let dt = dt.as_secs_f32();
        let mut outcome = StepOutcome::default();
        match self.movement {
            MovementState::Moving => {
                if self.ramp == RampState::Settling {
                    self.settle();
                    outcome.settled_at = Some(self.track_height);
                }
                self.walk(dt);
            }
            MovementState::Saving => outcome.arrived = self.travel(dt),
            MovementState::Saved | MovementState::Dead => {}
        }
        outcome
    }

    fn on_slope(&self) -> bool {
        matches!(self.ramp, RampState::Ascending | RampState::Descending)
    }

    fn settle(&mut self) {
        self.position.y = self.track_height;
        self.ramp = RampState::None;
        self.tilt = Tilt::toward(self.rotation, 0.0);
    }

    fn walk(&mut self, dt: f32) {
        let climb = match self.ramp {
            RampState::Ascending => WALK_SPEED * RAMP_CLIMB_RATIO,
            RampState::Descending => -WALK_SPEED * RAMP_CLIMB_RATIO,
            RampState::None | RampState::Settling => 0.0,
        };
        self.position += Vec2::new(WALK_SPEED, climb) * dt;
        self.rotation = self.tilt.advance(dt);

        if self.pending_exit && self.tilt.is_complete() {
            self.pending_exit = false;
            self.ramp = RampState::Settling;
        }
    }

    fn travel(&mut self, dt: f32) -> bool {
        let Some(rescue) = self.rescue else {
            return false;
        };
        let offset = rescue.destination - self.position;
        let distance = offset.length();
        let step = WALK_SPEED * RESCUE_SPEED_MULTIPLIER * dt;

        if distance <= ARRIVAL_EPSILON || distance <= step {
            self.position = rescue.destination;
            self.scale = MIN_RESCUE_SCALE;
            self.movement = MovementState::Saved;
            return true;
        }

        self.position += offset / distance * step;
        let remaining = self.position.distance(rescue.destination);
        let fraction = if rescue.initial_distance > ARRIVAL_EPSILON {
            (remaining / rescue.initial_distance).min(1.0)
        } else {
            0.0
        };
        self.scale = MIN_RESCUE_SCALE + (1.0 - MIN_RESCUE_SCALE) * fraction;
        false
    }
}
