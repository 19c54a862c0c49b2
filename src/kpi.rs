// KPI evaluators. Each call builds its own pose buffer and tracker and
// returns a verdict plus evidence; nothing is kept between calls.

use crate::all::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
  Pass,
  Fail,
  // The required frames or poses were not there at all. Never a failure.
  InputMissing,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Evidence {
  Identity(IdentityViolation),
  Accuracy(AccuracyRecord),
}

impl std::fmt::Display for Evidence {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Evidence::Identity(v) => write!(f, "{:?}: {}", v.kind, v),
      Evidence::Accuracy(r) => write!(f, "{}", r),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KpiReport {
  pub name: String,
  pub verdict: Verdict,
  // Frames or frame pairs that were actually checked.
  pub evaluated: usize,
  // Cycles skipped under the lenient pose policy.
  pub skipped: usize,
  pub reason: Option<String>,
  pub evidence: Vec<Evidence>,
  // Evidence rows that fail the KPI. The others are informational.
  #[serde(skip)]
  failures: usize,
}

impl KpiReport {
  pub fn new(name: &str) -> KpiReport {
    KpiReport {
      name: name.to_string(),
      verdict: Verdict::Pass,
      evaluated: 0,
      skipped: 0,
      reason: None,
      evidence: vec![],
      failures: 0,
    }
  }

  pub fn input_missing(name: &str, reason: impl Into<String>) -> KpiReport {
    let reason = reason.into();
    warn!("{}: cannot evaluate. {}", name, reason);
    KpiReport {
      verdict: Verdict::InputMissing,
      reason: Some(reason),
      ..KpiReport::new(name)
    }
  }

  pub fn push_failure(&mut self, evidence: Evidence) {
    self.failures += 1;
    self.evidence.push(evidence);
  }

  pub fn push_note(&mut self, evidence: Evidence) {
    self.evidence.push(evidence);
  }

  pub fn push_violations(&mut self, violations: Vec<IdentityViolation>) {
    for v in violations {
      self.push_failure(Evidence::Identity(v));
    }
  }

  pub fn violations(&self) -> impl Iterator<Item = &IdentityViolation> {
    self.evidence.iter().filter_map(|e| match e {
      Evidence::Identity(v) => Some(v),
      _ => None,
    })
  }

  pub(crate) fn finish(mut self) -> KpiReport {
    if self.evaluated == 0 {
      let mut report = KpiReport::input_missing(&self.name,
        format!("Nothing evaluated, {} cycles skipped.", self.skipped));
      report.skipped = self.skipped;
      return report;
    }
    self.verdict = if self.failures == 0 { Verdict::Pass } else { Verdict::Fail };
    info!("{}: {:?} ({} evaluated, {} skipped, {} evidence rows)",
      self.name, self.verdict, self.evaluated, self.skipped, self.evidence.len());
    self
  }
}

// The input of one evaluation as handed over by the frame reader.
#[derive(Clone, Debug, Default)]
pub struct Recording {
  pub frames: Vec<Frame>,
  pub poses: Vec<PoseSample>,
  pub ground_truth: Vec<GroundTruthFrame>,
}

impl Recording {
  // Applies the ingestion contract: keep-first on repeated timestamps and
  // dropping anything that goes back in time.
  pub fn new(
    frames: Vec<Frame>,
    poses: Vec<PoseSample>,
    ground_truth: Vec<GroundTruthFrame>,
  ) -> Recording {
    Recording {
      frames: dedup_by_timestamp(&frames, |f| f.timestamp),
      poses: dedup_by_timestamp(&poses, |p| p.timestamp),
      ground_truth: dedup_by_timestamp(&ground_truth, |g| g.timestamp),
    }
  }

  pub fn frame_at(&self, timestamp: i64) -> Option<&Frame> {
    self.frames.binary_search_by_key(&timestamp, |f| f.timestamp)
      .ok()
      .map(|i| &self.frames[i])
  }
}

pub const ID_MAINTENANCE: &str = "id_maintenance";
pub const ID_UNIQUENESS: &str = "id_uniqueness";
pub const ID_REUSE: &str = "id_reuse";

// Previous frame moved into the current vehicle frame, both sides optionally
// restricted to the field of view, associated, then ids compared.
pub fn evaluate_id_maintenance(recording: &Recording, p: &ParameterSet) -> KpiReport {
  if recording.frames.len() < 2 {
    return KpiReport::input_missing(ID_MAINTENANCE,
      format!("Need at least 2 frames, got {}.", recording.frames.len()));
  }
  let poses = match PoseBuffer::new(&recording.poses) {
    Ok(poses) => poses,
    Err(err) => return KpiReport::input_missing(ID_MAINTENANCE, err.to_string()),
  };
  let associator = ObjectAssociator::from_parameters(p);
  let fov = p.field_of_view();

  let mut report = KpiReport::new(ID_MAINTENANCE);
  for (k, pair) in recording.frames.windows(2).enumerate() {
    let (prev, cur) = (&pair[0], &pair[1]);
    let motion = match poses.relative_motion_with(prev.timestamp, cur.timestamp, p.pose_policy) {
      Ok(Some(motion)) => motion,
      Ok(None) => {
        report.skipped += 1;
        continue;
      },
      Err(err) => return KpiReport::input_missing(ID_MAINTENANCE, err.to_string()),
    };
    let moved: Vec<Detection> = prev.detections.iter()
      .map(|d| transform_detection(d, &motion))
      .collect();
    let association = associator.associate_subsets(
      &moved,
      &visible_indices(fov, &moved),
      &cur.detections,
      &visible_indices(fov, &cur.detections),
    );
    debug!("{} -> {}: {} of {}/{} associated", prev.timestamp, cur.timestamp,
      association.len(), prev.detections.len(), cur.detections.len());
    report.push_violations(check_id_maintained(&association, prev, cur, k + 1));
    report.evaluated += 1;
  }
  report.finish()
}

pub fn evaluate_id_uniqueness(recording: &Recording) -> KpiReport {
  if recording.frames.is_empty() {
    return KpiReport::input_missing(ID_UNIQUENESS, "No frames.");
  }
  let mut report = KpiReport::new(ID_UNIQUENESS);
  for (i, frame) in recording.frames.iter().enumerate() {
    report.push_violations(check_unique_within_frame(frame, i));
    report.evaluated += 1;
  }
  report.finish()
}

pub fn evaluate_id_reuse(recording: &Recording, p: &ParameterSet) -> KpiReport {
  if recording.frames.is_empty() {
    return KpiReport::input_missing(ID_REUSE, "No frames.");
  }
  let mut report = KpiReport::new(ID_REUSE);
  report.push_violations(check_no_premature_reuse(&recording.frames, p.reuse_limit));
  report.evaluated = recording.frames.len();
  report.finish()
}
