// Eigen-like aliases.
pub type Vector2d = nalgebra::Vector2::<f64>;

// Points in a vehicle or world frame share the vector type.
pub type Point2D = Vector2d;

// 2D cross product (z component of the 3D one).
pub fn cross(a: &Vector2d, b: &Vector2d) -> f64 {
  a[0] * b[1] - a[1] * b[0]
}

// Right-hand rotation, i.e. the outward normal of a CCW polygon edge.
pub fn right_normal(v: &Vector2d) -> Vector2d {
  Vector2d::new(v[1], -v[0])
}
