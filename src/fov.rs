use crate::all::*;

// Square region around the vehicle origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
  pub half_extent: f64,
}

impl FieldOfView {
  pub fn new(half_extent: f64) -> FieldOfView {
    FieldOfView { half_extent }
  }

  pub fn contains_point(&self, p: &Vector2d) -> bool {
    p[0].abs() <= self.half_extent && p[1].abs() <= self.half_extent
  }

  // Every vertex has to be inside.
  pub fn contains(&self, shape: &Shape) -> bool {
    shape.vertices().iter().all(|p| self.contains_point(p))
  }

  // Indices of detections inside the field of view, in input order.
  pub fn filter_indices(&self, detections: &[Detection]) -> Vec<usize> {
    detections.iter()
      .enumerate()
      .filter(|(_, d)| self.contains(&d.shape))
      .map(|(i, _)| i)
      .collect()
  }
}

// With no field of view every index is kept.
pub fn visible_indices(fov: Option<FieldOfView>, detections: &[Detection]) -> Vec<usize> {
  match fov {
    Some(fov) => fov.filter_indices(detections),
    None => (0..detections.len()).collect(),
  }
}
