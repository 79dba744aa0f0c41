use serde::{Deserialize, Serialize};

use crate::bounds::{PHASE_CEIL, PHASE_FLOOR};
use crate::Vec3;

/// A spline path an entity moves along, plus its phase clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<Vec3>,
    /// Position along the path in [0, 1].
    pub phase: f32,
    /// Signed movement speed in [-100, 100]; zero means the phase is edited directly.
    pub speed: f32,
    /// Speed stashed while the phase is being edited by hand.
    #[serde(default)]
    pub saved_speed: Option<f32>,
}

impl Trajectory {
    pub fn new(points: Vec<Vec3>, speed: f32) -> Self {
        Self {
            points,
            phase: 0.0,
            speed,
            saved_speed: None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.speed != 0.0
    }
}

/// Replace the exact boundary values 0 and 1 with 0.01 and 0.99 so the path
/// parameterization never degenerates.
pub fn substitute_phase(phase: f32) -> f32 {
    if phase <= 0.0 {
        PHASE_FLOOR
    } else if phase >= 1.0 {
        PHASE_CEIL
    } else {
        phase
    }
}
