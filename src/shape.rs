use crate::all::*;

use std::collections::BTreeMap;

// What the fusion stack reports. Only used for parameter presets and evidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ArgEnum)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
  ParkingSlot,
  ParkingDelimiter,
  WheelStopper,
  WheelLocker,
  StopLine,
  PedestrianCrossing,
  StaticObject,
}

// Which point of a shape stands in for it when measuring distances. Nearest
// and farthest are relative to the vehicle origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ArgEnum)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
  Centroid,
  Nearest,
  Farthest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
  // Delimiters, wheel stoppers, wheel lockers, stop lines.
  Polyline { start: Vector2d, end: Vector2d },
  // Parking slots (four corners) and static object outlines.
  Polygon { corners: Vec<Vector2d> },
  // Pedestrian crossing quadrilaterals.
  PointSet { corners: Vec<Vector2d> },
}

impl Shape {
  pub fn vertices(&self) -> Vec<Vector2d> {
    match self {
      Shape::Polyline { start, end } => vec![*start, *end],
      Shape::Polygon { corners } | Shape::PointSet { corners } => corners.clone(),
    }
  }

  // Same variant with every vertex passed through `f`.
  pub fn map_vertices<F: Fn(&Vector2d) -> Vector2d>(&self, f: F) -> Shape {
    match self {
      Shape::Polyline { start, end } => Shape::Polyline { start: f(start), end: f(end) },
      Shape::Polygon { corners } => Shape::Polygon { corners: corners.iter().map(&f).collect() },
      Shape::PointSet { corners } => Shape::PointSet { corners: corners.iter().map(&f).collect() },
    }
  }

  pub fn centroid(&self) -> Vector2d {
    match self {
      Shape::Polyline { start, end } => 0.5 * (start + end),
      Shape::Polygon { corners } | Shape::PointSet { corners } => centroid(corners),
    }
  }

  pub fn representative_point(&self, anchor: Anchor) -> Vector2d {
    let vertices = self.vertices();
    // Equally distant vertices resolve to the first one in input order.
    let mut picked: Option<&Vector2d> = None;
    for v in &vertices {
      let better = match (anchor, picked) {
        (Anchor::Centroid, _) => return self.centroid(),
        (_, None) => true,
        (Anchor::Nearest, Some(p)) => v.norm_squared() < p.norm_squared(),
        (Anchor::Farthest, Some(p)) => v.norm_squared() > p.norm_squared(),
      };
      if better { picked = Some(v) }
    }
    picked.copied().unwrap_or_else(|| self.centroid())
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionAttributes {
  #[serde(default)]
  pub kind: Option<ObjectKind>,
  // Any further per-detection signals, carried through to evidence.
  #[serde(default)]
  pub fields: BTreeMap<String, f64>,
}

fn full_confidence() -> f64 { 1. }

// `id` is `None` for raw sensor detections that fusion has not labeled yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  #[serde(default)]
  pub id: Option<u32>,
  pub shape: Shape,
  #[serde(default = "full_confidence")]
  pub confidence: f64,
  #[serde(default)]
  pub extra: DetectionAttributes,
}

impl Detection {
  pub fn new(id: Option<u32>, shape: Shape) -> Detection {
    Detection {
      id,
      shape,
      confidence: full_confidence(),
      extra: DetectionAttributes::default(),
    }
  }

  pub fn with_shape(&self, shape: Shape) -> Detection {
    Detection { shape, ..self.clone() }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
  pub timestamp: i64,
  pub detections: Vec<Detection>,
}
