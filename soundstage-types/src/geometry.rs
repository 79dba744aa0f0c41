use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// A point in scene space. `y` is altitude; the floor plane is `x`/`z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn component_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!({ "x": self.x, "y": self.y, "z": self.z })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Wrap an angle in radians into (-π, π].
pub fn wrap_rotation(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_rotation_stays_in_half_open_range() {
        for deg in [-720.0_f32, -540.0, -181.0, -180.0, 0.0, 179.0, 180.0, 181.0, 900.0] {
            let r = wrap_rotation(deg.to_radians());
            assert!(r > -PI - 1e-5 && r <= PI + 1e-5, "{} -> {}", deg, r);
        }
    }

    #[test]
    fn wrap_rotation_maps_minus_pi_to_pi() {
        assert!((wrap_rotation(-PI) - PI).abs() < 1e-5);
    }

    #[test]
    fn wrap_rotation_crossing_pi() {
        let r = wrap_rotation(190.0_f32.to_radians());
        assert!((r - (-170.0_f32).to_radians()).abs() < 1e-4);
    }

    #[test]
    fn component_mut_writes_axis() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        *v.component_mut(Axis::Z) += 4.0;
        assert_eq!(v.get(Axis::Z), 7.0);
        assert_eq!(v.get(Axis::X), 1.0);
    }
}
