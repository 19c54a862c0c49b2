// Nearest-neighbour association between a "previous" and a "current" set.
//
// Greedy and local on purpose: every current item picks its closest previous
// item inside the radius, then each previous item keeps only its closest
// claimant. Losing claimants stay unmatched, they do not fall back to their
// second choice. Ties go to the earlier index on both sides. KPI baselines
// depend on exactly this behaviour, so it must not be replaced by an optimal
// assignment.

use crate::all::*;

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ArgEnum)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
  Representative,
  CornerAveraged,
  CentroidToOutline,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistanceMetric {
  // Euclidean distance between the anchor points of both shapes.
  Representative(Anchor),
  // Mean of the centroid distance and the index-wise corner distances. With
  // four corners this is the sum divided by 5.
  CornerAveraged,
  // Distance from the centroid of the first shape to the outline of the
  // second, zero when inside.
  CentroidToOutline,
}

impl DistanceMetric {
  pub fn new(kind: MetricKind, anchor: Anchor) -> DistanceMetric {
    match kind {
      MetricKind::Representative => DistanceMetric::Representative(anchor),
      MetricKind::CornerAveraged => DistanceMetric::CornerAveraged,
      MetricKind::CentroidToOutline => DistanceMetric::CentroidToOutline,
    }
  }

  pub fn distance(&self, a: &Shape, b: &Shape) -> f64 {
    match self {
      DistanceMetric::Representative(anchor) => {
        (a.representative_point(*anchor) - b.representative_point(*anchor)).norm()
      },
      DistanceMetric::CornerAveraged => corner_averaged_distance(a, b),
      DistanceMetric::CentroidToOutline => centroid_to_outline_distance(a, b),
    }
  }
}

fn corner_averaged_distance(a: &Shape, b: &Shape) -> f64 {
  let (va, vb) = (a.vertices(), b.vertices());
  let corners: f64 = va.iter().zip(vb.iter()).map(|(p, q)| (p - q).norm()).sum();
  let n = va.len().min(vb.len());
  ((a.centroid() - b.centroid()).norm() + corners) / (n + 1) as f64
}

fn centroid_to_outline_distance(a: &Shape, b: &Shape) -> f64 {
  let p = a.centroid();
  match b {
    Shape::Polyline { start, end } => distance_point_edge(&p, start, end),
    Shape::Polygon { corners } | Shape::PointSet { corners } => {
      if validate_polygon(corners).is_err() { return (p - b.centroid()).norm() }
      if !is_convex(corners, CONVEXITY_EPS) {
        if point_in_simple_polygon(&p, corners) { return 0. }
        return distance_point_outline(&p, corners);
      }
      if is_ccw_assuming_convex(corners, CONVEXITY_EPS) {
        distance_point_polygon(&p, corners)
      }
      else {
        let ccw: Vec<Vector2d> = corners.iter().rev().copied().collect();
        distance_point_polygon(&p, &ccw)
      }
    },
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Match {
  pub previous: usize,
  pub current: usize,
  pub distance: f64,
}

// Partial mapping previous index -> current index, injective both ways.
// Matches are ordered by previous index.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Association {
  matches: Vec<Match>,
}

impl Association {
  pub fn matches(&self) -> &[Match] {
    &self.matches
  }

  pub fn len(&self) -> usize {
    self.matches.len()
  }

  pub fn is_empty(&self) -> bool {
    self.matches.is_empty()
  }

  // (previous, current) pairs.
  pub fn pairs(&self) -> Vec<(usize, usize)> {
    self.matches.iter().map(|m| (m.previous, m.current)).collect()
  }

  // (current, previous) pairs, ordered by current index.
  pub fn inverse_pairs(&self) -> Vec<(usize, usize)> {
    let mut pairs: Vec<_> = self.matches.iter().map(|m| (m.current, m.previous)).collect();
    pairs.sort_unstable();
    pairs
  }

  pub fn current_of(&self, previous: usize) -> Option<usize> {
    self.matches.iter().find(|m| m.previous == previous).map(|m| m.current)
  }

  pub fn previous_of(&self, current: usize) -> Option<usize> {
    self.matches.iter().find(|m| m.current == current).map(|m| m.previous)
  }

  pub fn unmatched_previous(&self, n_previous: usize) -> Vec<usize> {
    unmatched(n_previous, self.matches.iter().map(|m| m.previous))
  }

  pub fn unmatched_current(&self, n_current: usize) -> Vec<usize> {
    unmatched(n_current, self.matches.iter().map(|m| m.current))
  }

  pub fn is_injective(&self) -> bool {
    let mut previous: Vec<usize> = self.matches.iter().map(|m| m.previous).collect();
    let mut current: Vec<usize> = self.matches.iter().map(|m| m.current).collect();
    previous.sort_unstable();
    current.sort_unstable();
    previous.windows(2).all(|w| w[0] != w[1]) && current.windows(2).all(|w| w[0] != w[1])
  }

  // Re-indexes through lookup tables, e.g. after field-of-view filtering.
  pub fn remap(&self, previous: &[usize], current: &[usize]) -> Association {
    Association {
      matches: self.matches.iter()
        .map(|m| Match { previous: previous[m.previous], current: current[m.current], distance: m.distance })
        .collect(),
    }
  }
}

fn unmatched<I: Iterator<Item = usize>>(total: usize, matched: I) -> Vec<usize> {
  let mut is_matched = vec![false; total];
  for i in matched {
    is_matched[i] = true;
  }
  (0..total).filter(|&i| !is_matched[i]).collect()
}

// Core of the association on indices. `distance(previous, current)` is
// evaluated for every pair; only values strictly below `radius` count.
pub fn associate_by<F>(n_previous: usize, n_current: usize, radius: f64, distance: F) -> Association
where
  F: Fn(usize, usize) -> f64,
{
  // previous -> (current, distance) of the best claimant so far.
  let mut claims: BTreeMap<usize, (usize, f64)> = BTreeMap::new();
  for current in 0..n_current {
    let mut best: Option<(usize, f64)> = None;
    for previous in 0..n_previous {
      let d = distance(previous, current);
      if !(d < radius) { continue }
      if best.map_or(true, |(_, best_d)| d < best_d) {
        best = Some((previous, d));
      }
    }
    if let Some((previous, d)) = best {
      match claims.get(&previous) {
        Some(&(_, held)) if held <= d => {},
        _ => { claims.insert(previous, (current, d)); },
      }
    }
  }
  Association {
    matches: claims.into_iter()
      .map(|(previous, (current, distance))| Match { previous, current, distance })
      .collect(),
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectAssociator {
  pub radius: f64,
  pub metric: DistanceMetric,
}

impl ObjectAssociator {
  pub fn new(radius: f64, metric: DistanceMetric) -> ObjectAssociator {
    ObjectAssociator { radius, metric }
  }

  pub fn from_parameters(p: &ParameterSet) -> ObjectAssociator {
    ObjectAssociator::new(p.association_radius, DistanceMetric::new(p.metric, p.anchor))
  }

  pub fn associate(&self, previous: &[Shape], current: &[Shape]) -> Association {
    associate_by(previous.len(), current.len(), self.radius, |j, i| {
      self.metric.distance(&current[i], &previous[j])
    })
  }

  pub fn associate_detections(&self, previous: &[Detection], current: &[Detection]) -> Association {
    associate_by(previous.len(), current.len(), self.radius, |j, i| {
      self.metric.distance(&current[i].shape, &previous[j].shape)
    })
  }

  // Associates only the listed indices of each side, e.g. the detections
  // inside the field of view. The result refers to the full slices.
  pub fn associate_subsets(
    &self,
    previous: &[Detection],
    previous_indices: &[usize],
    current: &[Detection],
    current_indices: &[usize],
  ) -> Association {
    associate_by(previous_indices.len(), current_indices.len(), self.radius, |j, i| {
      self.metric.distance(&current[current_indices[i]].shape, &previous[previous_indices[j]].shape)
    }).remap(previous_indices, current_indices)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{Rng, SeedableRng};
  use rand_xoshiro::Xoshiro256PlusPlus;

  fn point(x: f64, y: f64) -> Shape {
    Shape::PointSet { corners: vec![Vector2d::new(x, y)] }
  }

  fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::Polygon {
      corners: vec![
        Vector2d::new(x, y),
        Vector2d::new(x + w, y),
        Vector2d::new(x + w, y + h),
        Vector2d::new(x, y + h),
      ],
    }
  }

  fn centroid_associator(radius: f64) -> ObjectAssociator {
    ObjectAssociator::new(radius, DistanceMetric::Representative(Anchor::Centroid))
  }

  #[test]
  fn test_simple_matches() {
    let previous = vec![point(0., 0.), point(10., 0.), point(20., 0.)];
    let current = vec![point(10.5, 0.), point(0.3, 0.), point(50., 0.)];
    let a = centroid_associator(2.).associate(&previous, &current);
    assert_eq!(a.pairs(), vec![(0, 1), (1, 0)]);
    assert_eq!(a.inverse_pairs(), vec![(0, 1), (1, 0)]);
    assert_eq!(a.current_of(1), Some(0));
    assert_eq!(a.previous_of(2), None);
    assert_eq!(a.unmatched_previous(3), vec![2]);
    assert_eq!(a.unmatched_current(3), vec![2]);
  }

  #[test]
  fn test_radius_is_exclusive() {
    let a = centroid_associator(1.).associate(&[point(0., 0.)], &[point(1., 0.)]);
    assert!(a.is_empty());
  }

  #[test]
  fn test_conflict_keeps_closest_and_drops_loser() {
    // Both current items are closest to previous 0. Current 1 wins; current 0
    // is left unmatched even though previous 1 is within the radius.
    let previous = vec![point(0., 0.), point(1.5, 0.)];
    let current = vec![point(0.7, 0.), point(0.1, 0.)];
    let a = centroid_associator(2.).associate(&previous, &current);
    assert_eq!(a.pairs(), vec![(0, 1)]);
    assert_eq!(a.unmatched_previous(2), vec![1]);
  }

  #[test]
  fn test_ties_go_to_input_order() {
    let previous = vec![point(-1., 0.), point(1., 0.)];
    let current = vec![point(0., 0.)];
    assert_eq!(centroid_associator(2.).associate(&previous, &current).pairs(), vec![(0, 0)]);

    let previous = vec![point(0., 0.)];
    let current = vec![point(-1., 0.), point(1., 0.)];
    assert_eq!(centroid_associator(2.).associate(&previous, &current).pairs(), vec![(0, 0)]);
  }

  #[test]
  fn test_nan_distance_never_matches() {
    let a = associate_by(2, 2, 10., |_, _| f64::NAN);
    assert!(a.is_empty());
  }

  #[test]
  fn test_corner_averaged_distance() {
    let a = rectangle(0., 0., 2., 4.);
    let b = rectangle(1., 0., 2., 4.);
    // Centroid and all four corners are 1 m apart.
    assert!((DistanceMetric::CornerAveraged.distance(&a, &b) - 1.).abs() < 1e-12);

    // Same centroid, corners rotated by one index.
    let rotated = Shape::Polygon { corners: vec![
      Vector2d::new(2., 0.), Vector2d::new(2., 4.), Vector2d::new(0., 4.), Vector2d::new(0., 0.),
    ] };
    let expected = (0. + 2. + 4. + 2. + 4.) / 5.;
    assert!((DistanceMetric::CornerAveraged.distance(&a, &rotated) - expected).abs() < 1e-12);
  }

  #[test]
  fn test_centroid_to_outline_distance() {
    let slot = rectangle(0., 0., 2., 2.);
    let inside = point(1.5, 1.5);
    let outside = point(1., 5.);
    assert_eq!(DistanceMetric::CentroidToOutline.distance(&inside, &slot), 0.);
    assert!((DistanceMetric::CentroidToOutline.distance(&outside, &slot) - 3.).abs() < 1e-12);

    // Winding of the outline does not matter.
    let cw = Shape::Polygon { corners: slot.vertices().into_iter().rev().collect() };
    assert_eq!(DistanceMetric::CentroidToOutline.distance(&inside, &cw), 0.);
  }

  #[test]
  fn test_centroid_to_concave_outline() {
    let outline = Shape::Polygon { corners: vec![
      Vector2d::new(0., 0.), Vector2d::new(4., 0.), Vector2d::new(1., 1.), Vector2d::new(0., 4.),
    ] };
    let metric = DistanceMetric::CentroidToOutline;
    assert_eq!(metric.distance(&point(2., 0.3), &outline), 0.);
    assert!((metric.distance(&point(2., 2.), &outline) - 1.6f64.sqrt()).abs() < 1e-12);

    let cw = Shape::Polygon { corners: outline.vertices().into_iter().rev().collect() };
    assert_eq!(metric.distance(&point(2., 0.3), &cw), 0.);
  }

  #[test]
  fn test_centroid_to_degenerate_outline() {
    // Coincident corners fall back to centroid distance.
    let collapsed = Shape::Polygon { corners: vec![
      Vector2d::new(0., 0.), Vector2d::new(0., 0.), Vector2d::new(2., 0.), Vector2d::new(2., 2.),
    ] };
    let expected = (Vector2d::new(5., 0.) - collapsed.centroid()).norm();
    assert_eq!(DistanceMetric::CentroidToOutline.distance(&point(5., 0.), &collapsed), expected);
  }

  #[test]
  fn test_injective_for_random_sets() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let metrics = [
      DistanceMetric::Representative(Anchor::Centroid),
      DistanceMetric::Representative(Anchor::Nearest),
      DistanceMetric::Representative(Anchor::Farthest),
      DistanceMetric::CornerAveraged,
      DistanceMetric::CentroidToOutline,
    ];
    for _ in 0..200 {
      let mut random_set = |n: usize| -> Vec<Shape> {
        (0..n).map(|_| rectangle(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), 1., 2.)).collect()
      };
      let previous = random_set(12);
      let current = random_set(9);
      for metric in metrics {
        for radius in [0.2, 0.5, 2.0, 100.] {
          let a = ObjectAssociator::new(radius, metric).associate(&previous, &current);
          assert!(a.is_injective());
          assert!(a.matches().iter().all(|m| m.distance < radius));
        }
      }
    }
  }

  #[test]
  fn test_remap() {
    let a = associate_by(2, 2, 1., |j, i| if i == j { 0. } else { 5. });
    let remapped = a.remap(&[3, 7], &[1, 4]);
    assert_eq!(remapped.pairs(), vec![(3, 1), (7, 4)]);
  }

  #[test]
  fn test_associate_subsets() {
    let previous: Vec<Detection> = [0., 10., 20.].iter()
      .map(|&x| Detection::new(None, point(x, 0.)))
      .collect();
    let current: Vec<Detection> = [20.1, 0.1].iter()
      .map(|&x| Detection::new(None, point(x, 0.)))
      .collect();
    // Previous 0 is left out, so current 1 has nothing to match.
    let a = centroid_associator(2.).associate_subsets(&previous, &[1, 2], &current, &[0, 1]);
    assert_eq!(a.pairs(), vec![(2, 0)]);
  }
}
