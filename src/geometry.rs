// Polygon predicates on ordered vertex lists.
//
// Polygons are closed implicitly: the last vertex connects back to the first.
// Zero-length edges make the normalized tests divide by zero. Callers reject
// such input with `validate_polygon` first; the predicates do not check.

use crate::all::*;

pub const CONVEXITY_EPS: f64 = 1e-3;
pub const MIN_EDGE_LENGTH: f64 = 1e-6;

fn edges(vertices: &[Vector2d]) -> impl Iterator<Item = (Vector2d, Vector2d)> + '_ {
  let n = vertices.len();
  (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

// No vertex may lie more than `eps` outside any edge's outward normal. The
// distance is normalized by the edge length so `eps` is in metres.
pub fn is_convex_ccw(vertices: &[Vector2d], eps: f64) -> bool {
  for (v1, v2) in edges(vertices) {
    let edge = v2 - v1;
    let normal = right_normal(&edge);
    let length = edge.norm();
    for v in vertices {
      if (v - v1).dot(&normal) / length > eps { return false }
    }
  }
  true
}

// Accepts either winding order.
pub fn is_convex(vertices: &[Vector2d], eps: f64) -> bool {
  if is_convex_ccw(vertices, eps) { return true }
  let reversed: Vec<Vector2d> = vertices.iter().rev().copied().collect();
  is_convex_ccw(&reversed, eps)
}

// Only meaningful once the polygon is known to be convex.
pub fn is_ccw_assuming_convex(vertices: &[Vector2d], eps: f64) -> bool {
  let n = vertices.len();
  for i in 0..n {
    let a = vertices[i];
    let b = vertices[(i + 1) % n];
    let c = vertices[(i + 2) % n];
    let ab = b - a;
    let bc = c - b;
    if cross(&ab, &bc) / (ab.norm() * bc.norm()) < -eps { return false }
  }
  true
}

// Vertices must be CCW. Points on the boundary count as inside.
pub fn point_in_polygon(p: &Vector2d, vertices: &[Vector2d]) -> bool {
  for (v1, v2) in edges(vertices) {
    let normal = right_normal(&(v2 - v1));
    if (p - v1).dot(&normal) > 0. { return false }
  }
  true
}

pub fn distance_point_edge(p: &Vector2d, v1: &Vector2d, v2: &Vector2d) -> f64 {
  let edge = v2 - v1;
  let t = ((p - v1).dot(&edge) / edge.norm_squared()).clamp(0., 1.);
  (v1 + t * edge - p).norm()
}

pub fn distance_point_polygon(p: &Vector2d, vertices: &[Vector2d]) -> f64 {
  if point_in_polygon(p, vertices) { return 0. }
  distance_point_outline(p, vertices)
}

// Even-odd crossing test. Works for concave outlines and either winding.
pub fn point_in_simple_polygon(p: &Vector2d, vertices: &[Vector2d]) -> bool {
  let mut inside = false;
  for (v1, v2) in edges(vertices) {
    if (v1[1] > p[1]) != (v2[1] > p[1]) {
      let x = v1[0] + (p[1] - v1[1]) / (v2[1] - v1[1]) * (v2[0] - v1[0]);
      if p[0] < x { inside = !inside }
    }
  }
  inside
}

// Distance to the closed outline, ignoring the interior.
pub fn distance_point_outline(p: &Vector2d, vertices: &[Vector2d]) -> f64 {
  edges(vertices)
    .map(|(v1, v2)| distance_point_edge(p, &v1, &v2))
    .fold(f64::INFINITY, f64::min)
}

// Vertex mean. Inside any convex polygon.
pub fn centroid(vertices: &[Vector2d]) -> Vector2d {
  if vertices.is_empty() { return Vector2d::zeros() }
  vertices.iter().sum::<Vector2d>() / vertices.len() as f64
}

pub fn validate_polygon(vertices: &[Vector2d]) -> EngineResult<()> {
  if vertices.len() < 3 {
    return Err(EngineError::DegenerateGeometry(
      format!("Polygon needs at least 3 vertices, got {}.", vertices.len())));
  }
  for (i, (v1, v2)) in edges(vertices).enumerate() {
    if (v2 - v1).norm() < MIN_EDGE_LENGTH {
      return Err(EngineError::DegenerateGeometry(format!("Edge {} has zero length.", i)));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use rand::{Rng, SeedableRng};
  use rand_xoshiro::Xoshiro256PlusPlus;

  fn square() -> Vec<Vector2d> {
    vec![
      Vector2d::new(0., 0.),
      Vector2d::new(2., 0.),
      Vector2d::new(2., 2.),
      Vector2d::new(0., 2.),
    ]
  }

  fn arrow() -> Vec<Vector2d> {
    vec![
      Vector2d::new(0., 0.),
      Vector2d::new(4., 0.),
      Vector2d::new(1., 1.),
      Vector2d::new(0., 4.),
    ]
  }

  fn reversed(v: &[Vector2d]) -> Vec<Vector2d> {
    v.iter().rev().copied().collect()
  }

  #[test]
  fn test_convexity() {
    assert!(is_convex_ccw(&square(), CONVEXITY_EPS));
    assert!(!is_convex_ccw(&reversed(&square()), CONVEXITY_EPS));
    assert!(is_convex(&reversed(&square()), CONVEXITY_EPS));
    assert!(!is_convex(&arrow(), CONVEXITY_EPS));

    for polygon in [square(), arrow(), reversed(&arrow())] {
      assert_eq!(
        is_convex(&polygon, CONVEXITY_EPS),
        is_convex(&reversed(&polygon), CONVEXITY_EPS),
      );
    }
  }

  #[test]
  fn test_convexity_tolerance_is_in_metres() {
    // A dent of 0.2 mm is still accepted, 1 cm is not.
    let mut nearly = square();
    nearly.insert(1, Vector2d::new(1., 0.0002));
    assert!(is_convex(&nearly, CONVEXITY_EPS));
    nearly[1] = Vector2d::new(1., 0.01);
    assert!(!is_convex(&nearly, CONVEXITY_EPS));
  }

  #[test]
  fn test_ccw_assuming_convex() {
    assert!(is_ccw_assuming_convex(&square(), CONVEXITY_EPS));
    assert!(!is_ccw_assuming_convex(&reversed(&square()), CONVEXITY_EPS));
  }

  #[test]
  fn test_point_in_polygon() {
    let s = square();
    assert!(point_in_polygon(&centroid(&s), &s));
    assert!(point_in_polygon(&Vector2d::new(2., 1.), &s));
    assert!(point_in_polygon(&Vector2d::new(0., 0.), &s));
    assert!(!point_in_polygon(&Vector2d::new(2.1, 1.), &s));
    assert!(!point_in_polygon(&Vector2d::new(-1., -1.), &s));
  }

  #[test]
  fn test_centroid_inside_random_convex_polygons() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
    for _ in 0..200 {
      // Points on a circle in angle order, at least a fifth of a sector apart.
      let n = rng.gen_range(3..9);
      let sector = 2. * std::f64::consts::PI / n as f64;
      let center = Vector2d::new(rng.gen_range(-50. ..50.), rng.gen_range(-50. ..50.));
      let radius = rng.gen_range(0.5..10.);
      let polygon: Vec<Vector2d> = (0..n)
        .map(|k| {
          let a = k as f64 * sector + rng.gen_range(0. ..0.8 * sector);
          center + radius * Vector2d::new(a.cos(), a.sin())
        })
        .collect();
      assert!(validate_polygon(&polygon).is_ok());
      assert!(is_convex(&polygon, CONVEXITY_EPS));
      assert!(is_ccw_assuming_convex(&polygon, CONVEXITY_EPS));
      let c = centroid(&polygon);
      assert!(point_in_polygon(&c, &polygon));
      assert!(point_in_simple_polygon(&c, &polygon));
      assert!(point_in_simple_polygon(&c, &reversed(&polygon)));
      assert_eq!(distance_point_polygon(&c, &polygon), 0.);
    }
  }

  #[test]
  fn test_concave_outline() {
    let a = arrow();
    let interior = Vector2d::new(2., 0.3);
    let notch = Vector2d::new(2., 2.);
    assert!(point_in_simple_polygon(&interior, &a));
    assert!(point_in_simple_polygon(&interior, &reversed(&a)));
    assert!(!point_in_simple_polygon(&notch, &a));
    assert_relative_eq!(distance_point_outline(&interior, &a), 0.3, epsilon = 1e-12);
    assert_relative_eq!(distance_point_outline(&notch, &a), 1.6f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn test_distances() {
    let a = Vector2d::new(0., 0.);
    let b = Vector2d::new(2., 0.);
    assert_relative_eq!(distance_point_edge(&Vector2d::new(1., 3.), &a, &b), 3.);
    assert_relative_eq!(distance_point_edge(&Vector2d::new(-3., 4.), &a, &b), 5.);
    assert_relative_eq!(distance_point_edge(&Vector2d::new(5., 4.), &a, &b), 5.);

    let s = square();
    assert_eq!(distance_point_polygon(&Vector2d::new(1., 1.), &s), 0.);
    assert_relative_eq!(distance_point_polygon(&Vector2d::new(1., 3.5), &s), 1.5);
    assert_relative_eq!(distance_point_polygon(&Vector2d::new(5., 6.), &s), 5.);
  }

  #[test]
  fn test_validate_polygon() {
    assert!(validate_polygon(&square()).is_ok());
    let mut degenerate = square();
    degenerate[1] = degenerate[0];
    assert!(matches!(validate_polygon(&degenerate), Err(EngineError::DegenerateGeometry(_))));
    assert!(validate_polygon(&square()[..2]).is_err());
  }
}
