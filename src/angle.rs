// All angles are radians, counter-clockwise positive, x-forward y-left.

use std::f64::consts::PI;

const TWO_PI: f64 = 2. * PI;

// Wrap to [-π, π).
pub fn normalize_angle(angle: f64) -> f64 {
  let mut a = angle % TWO_PI;
  if a >= PI {
    a -= TWO_PI;
  }
  else if a < -PI {
    a += TWO_PI;
  }
  a
}

// Phase unwrapping: removes jumps larger than π between consecutive values
// by adding multiples of 2π, so that linear interpolation never crosses the
// ±π seam the long way round.
pub fn unwrap_angles(angles: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(angles.len());
  let mut correction = 0.;
  for (i, &a) in angles.iter().enumerate() {
    if i > 0 {
      let d = a - angles[i - 1];
      let mut dd = (d + PI).rem_euclid(TWO_PI) - PI;
      // Keep the sign of a jump of exactly π.
      if dd == -PI && d > 0. { dd = PI }
      if d.abs() >= PI {
        correction += dd - d;
      }
    }
    out.push(a + correction);
  }
  out
}

// Compass heading (degrees, clockwise from north) to east-counter-clockwise
// radians.
pub fn heading_from_compass(heading_deg: f64) -> f64 {
  (90. - heading_deg).to_radians()
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn test_normalize_angle() {
    assert_relative_eq!(normalize_angle(0.5), 0.5);
    assert_relative_eq!(normalize_angle(0.5 + TWO_PI), 0.5, epsilon = 1e-12);
    assert_relative_eq!(normalize_angle(-0.5 - 2. * TWO_PI), -0.5, epsilon = 1e-12);
    assert!(normalize_angle(3. * PI).abs() - PI < 1e-9);
  }

  #[test]
  fn test_unwrap_crossing_seam() {
    let raw = [3.0, -3.0, -2.9];
    let unwrapped = unwrap_angles(&raw);
    assert_relative_eq!(unwrapped[0], 3.0);
    assert_relative_eq!(unwrapped[1], -3.0 + TWO_PI, epsilon = 1e-12);
    assert_relative_eq!(unwrapped[2], -2.9 + TWO_PI, epsilon = 1e-12);
    // Consecutive steps stay small.
    for w in unwrapped.windows(2) {
      assert!((w[1] - w[0]).abs() < PI);
    }
  }

  #[test]
  fn test_unwrap_keeps_small_steps() {
    let raw = [0., 0.5, 1.0, 0.2];
    assert_eq!(unwrap_angles(&raw), raw.to_vec());
    assert!(unwrap_angles(&[]).is_empty());
  }

  #[test]
  fn test_heading_from_compass() {
    // North is +y, east is +x.
    assert_relative_eq!(heading_from_compass(0.), PI / 2.);
    assert_relative_eq!(heading_from_compass(90.), 0.);
    assert_relative_eq!(heading_from_compass(180.), -PI / 2.);
  }
}
