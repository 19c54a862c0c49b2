use crate::all::*;

use nalgebra::Rotation2;

// Translate by the motion in the source frame, then rotate by its yaw. The
// same convention `relative_motion_between` derives motions with.
pub fn transform_point(p: &Vector2d, motion: &RelativeMotion) -> Vector2d {
  Rotation2::new(motion.yaw) * (p + motion.translation())
}

pub fn transform_shape(shape: &Shape, motion: &RelativeMotion) -> Shape {
  shape.map_vertices(|p| transform_point(p, motion))
}

// Id, confidence and attributes are preserved.
pub fn transform_detection(detection: &Detection, motion: &RelativeMotion) -> Detection {
  detection.with_shape(transform_shape(&detection.shape, motion))
}

impl RelativeMotion {
  // Undoes `transform_point`: p = R(-yaw) q - t = R(-yaw) (q - R(yaw) t).
  pub fn inverse(&self) -> RelativeMotion {
    let t = -(Rotation2::new(self.yaw) * self.translation());
    RelativeMotion {
      longitudinal: t[0],
      lateral: t[1],
      yaw: -self.yaw,
    }
  }
}

// Ego pose in a UTM-style world frame with a compass heading, as delivered
// alongside surveyed ground truth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmPose {
  pub x: f64,
  pub y: f64,
  pub heading_deg: f64,
}

impl UtmPose {
  // East-counter-clockwise radians.
  pub fn heading(&self) -> f64 {
    heading_from_compass(self.heading_deg)
  }
}

pub fn world_to_vehicle(p_world: &Vector2d, ego: &UtmPose) -> Vector2d {
  Rotation2::new(-ego.heading()) * (p_world - Vector2d::new(ego.x, ego.y))
}

pub fn shape_world_to_vehicle(shape: &Shape, ego: &UtmPose) -> Shape {
  shape.map_vertices(|p| world_to_vehicle(p, ego))
}
