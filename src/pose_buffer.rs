use crate::all::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
  pub timestamp: i64,
  pub x: f64,
  pub y: f64,
  pub yaw: f64,
}

impl PoseSample {
  pub fn position(&self) -> Vector2d {
    Vector2d::new(self.x, self.y)
  }
}

// Rigid transform taking geometry from the vehicle frame at `t1` into the
// vehicle frame at `t2`, applied as translate-then-rotate by
// `transform_point`. This is the motion of the world as seen from the
// vehicle, so it is the negation of the ego displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeMotion {
  pub lateral: f64,
  pub longitudinal: f64,
  pub yaw: f64,
}

impl RelativeMotion {
  pub fn translation(&self) -> Vector2d {
    Vector2d::new(self.longitudinal, self.lateral)
  }
}

// What to do when a timestamp falls outside the sampled pose range. There is
// no global default: every KPI states its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ArgEnum)]
#[serde(rename_all = "camelCase")]
pub enum OutOfRangePolicy {
  // The whole evaluation cannot be assessed.
  Strict,
  // Skip the affected cycle and continue.
  Lenient,
}

// Piecewise-linear over strictly increasing knots.
#[derive(Clone, Debug)]
pub struct Interpolator {
  times: Vec<i64>,
  values: Vec<f64>,
}

impl Interpolator {
  fn new(times: Vec<i64>, values: Vec<f64>) -> Interpolator {
    debug_assert_eq!(times.len(), values.len());
    Interpolator { times, values }
  }

  // `None` outside of the knot range.
  pub fn at(&self, t: i64) -> Option<f64> {
    let first = *self.times.first()?;
    let last = *self.times.last()?;
    if t < first || t > last { return None }
    let i = self.times.partition_point(|&k| k < t);
    if self.times[i] == t { return Some(self.values[i]) }
    let (t0, t1) = (self.times[i - 1], self.times[i]);
    let (v0, v1) = (self.values[i - 1], self.values[i]);
    let s = (t - t0) as f64 / (t1 - t0) as f64;
    Some(v0 + s * (v1 - v0))
  }
}

pub struct PoseBuffer {
  samples: Vec<PoseSample>,
  x: Interpolator,
  y: Interpolator,
  yaw: Interpolator,
}

impl PoseBuffer {
  // Samples must be in increasing timestamp order. Repeated timestamps keep
  // the first sample, anything going backwards in time is dropped.
  pub fn new(samples: &[PoseSample]) -> EngineResult<PoseBuffer> {
    let samples = dedup_by_timestamp(samples, |s| s.timestamp);
    if samples.len() < 2 {
      return Err(EngineError::InputMissing(
        format!("Pose buffer needs at least 2 samples, got {}.", samples.len())));
    }
    let times: Vec<i64> = samples.iter().map(|s| s.timestamp).collect();
    let raw_yaw: Vec<f64> = samples.iter().map(|s| s.yaw).collect();
    Ok(PoseBuffer {
      x: Interpolator::new(times.clone(), samples.iter().map(|s| s.x).collect()),
      y: Interpolator::new(times.clone(), samples.iter().map(|s| s.y).collect()),
      yaw: Interpolator::new(times, unwrap_angles(&raw_yaw)),
      samples,
    })
  }

  pub fn first_timestamp(&self) -> i64 {
    self.samples[0].timestamp
  }

  pub fn last_timestamp(&self) -> i64 {
    self.samples[self.samples.len() - 1].timestamp
  }

  pub fn contains(&self, t: i64) -> bool {
    t >= self.first_timestamp() && t <= self.last_timestamp()
  }

  // Sampled knots are returned exactly as recorded. Interpolated yaw is
  // wrapped back to [-π, π).
  pub fn estimate_pose(&self, t: i64) -> EngineResult<PoseSample> {
    if !self.contains(t) {
      return Err(EngineError::OutOfRange {
        t,
        first: self.first_timestamp(),
        last: self.last_timestamp(),
      });
    }
    let i = self.samples.partition_point(|s| s.timestamp < t);
    if self.samples[i].timestamp == t { return Ok(self.samples[i]) }
    let out_of_range = || EngineError::OutOfRange {
      t,
      first: self.first_timestamp(),
      last: self.last_timestamp(),
    };
    Ok(PoseSample {
      timestamp: t,
      x: self.x.at(t).ok_or_else(out_of_range)?,
      y: self.y.at(t).ok_or_else(out_of_range)?,
      yaw: normalize_angle(self.yaw.at(t).ok_or_else(out_of_range)?),
    })
  }

  // Lenient variant of `estimate_pose`.
  pub fn try_estimate_pose(&self, t: i64) -> Option<PoseSample> {
    self.estimate_pose(t).ok()
  }

  pub fn relative_motion(&self, t1: i64, t2: i64) -> EngineResult<RelativeMotion> {
    let p1 = self.estimate_pose(t1)?;
    let p2 = self.estimate_pose(t2)?;
    Ok(relative_motion_between(&p1, &p2))
  }

  // `Ok(None)` when the policy says to skip this cycle.
  pub fn relative_motion_with(
    &self,
    t1: i64,
    t2: i64,
    policy: OutOfRangePolicy,
  ) -> EngineResult<Option<RelativeMotion>> {
    match (self.relative_motion(t1, t2), policy) {
      (Ok(motion), _) => Ok(Some(motion)),
      (Err(EngineError::OutOfRange { t, .. }), OutOfRangePolicy::Lenient) => {
        debug!("No pose for {}, skipping cycle.", t);
        Ok(None)
      },
      (Err(err), _) => Err(err),
    }
  }
}

// World displacement from `p2` back to `p1`, expressed in the heading frame
// of `p1`, together with the heading change in the same sense.
pub fn relative_motion_between(p1: &PoseSample, p2: &PoseSample) -> RelativeMotion {
  let d = p1.position() - p2.position();
  let (sin, cos) = p1.yaw.sin_cos();
  RelativeMotion {
    longitudinal: cos * d[0] + sin * d[1],
    lateral: -sin * d[0] + cos * d[1],
    yaw: normalize_angle(p1.yaw - p2.yaw),
  }
}

// Keep-first deduplication of an ordered sequence. Samples whose timestamp
// goes backwards are dropped with a warning.
pub fn dedup_by_timestamp<T: Clone, F: Fn(&T) -> i64>(items: &[T], timestamp: F) -> Vec<T> {
  let mut out: Vec<T> = Vec::with_capacity(items.len());
  let mut last: Option<i64> = None;
  let mut duplicates = 0;
  for item in items {
    let t = timestamp(item);
    if let Some(last) = last {
      if t == last {
        duplicates += 1;
        continue;
      }
      if t < last {
        warn!("Ignoring unordered sample at {} (previous {}).", t, last);
        continue;
      }
    }
    last = Some(t);
    out.push(item.clone());
  }
  if duplicates > 0 {
    debug!("Dropped {} samples with repeated timestamps.", duplicates);
  }
  out
}
