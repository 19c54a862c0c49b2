use crate::all::*;

use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
  Duplicate,
  Reused,
  NotMaintained,
}

// One failure instance, enough to render a row of evidence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentityViolation {
  pub kind: ViolationKind,
  pub frame_index: usize,
  pub timestamp: i64,
  pub detection_id: u32,
  pub detail: ViolationDetail,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ViolationDetail {
  Duplicate {
    occurrences: usize,
    detection_indices: Vec<usize>,
  },
  Reused {
    last_seen_frame: usize,
    gap: usize,
  },
  NotMaintained {
    previous_timestamp: i64,
    previous_id: Option<u32>,
    current_id: Option<u32>,
  },
}

impl std::fmt::Display for IdentityViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "frame {} (t={}) id {}: ", self.frame_index, self.timestamp, self.detection_id)?;
    match &self.detail {
      ViolationDetail::Duplicate { occurrences, detection_indices } => {
        write!(f, "appears {} times at indices {:?}", occurrences, detection_indices)
      },
      ViolationDetail::Reused { last_seen_frame, gap } => {
        write!(f, "reused after {} frames, last seen in frame {}", gap, last_seen_frame)
      },
      ViolationDetail::NotMaintained { previous_timestamp, previous_id, current_id } => {
        write!(f, "id changed from {} (t={}) to {}",
          format_id(*previous_id), previous_timestamp, format_id(*current_id))
      },
    }
  }
}

fn format_id(id: Option<u32>) -> String {
  id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

// Associated detections must keep their id. Pairs where neither side has an
// id carry no identity and are skipped; losing or gaining an id counts.
pub fn check_id_maintained(
  association: &Association,
  prev_frame: &Frame,
  cur_frame: &Frame,
  frame_index: usize,
) -> Vec<IdentityViolation> {
  let mut violations = vec![];
  for (j, i) in association.pairs() {
    let previous_id = prev_frame.detections[j].id;
    let current_id = cur_frame.detections[i].id;
    if previous_id == current_id { continue }
    let detection_id = match previous_id.or(current_id) {
      Some(id) => id,
      None => continue,
    };
    violations.push(IdentityViolation {
      kind: ViolationKind::NotMaintained,
      frame_index,
      timestamp: cur_frame.timestamp,
      detection_id,
      detail: ViolationDetail::NotMaintained {
        previous_timestamp: prev_frame.timestamp,
        previous_id,
        current_id,
      },
    });
  }
  violations
}

// One violation per duplicated id, however often it repeats.
pub fn check_unique_within_frame(frame: &Frame, frame_index: usize) -> Vec<IdentityViolation> {
  let mut indices: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
  for (i, detection) in frame.detections.iter().enumerate() {
    if let Some(id) = detection.id {
      indices.entry(id).or_default().push(i);
    }
  }
  indices.into_iter()
    .filter(|(_, v)| v.len() > 1)
    .map(|(id, detection_indices)| IdentityViolation {
      kind: ViolationKind::Duplicate,
      frame_index,
      timestamp: frame.timestamp,
      detection_id: id,
      detail: ViolationDetail::Duplicate {
        occurrences: detection_indices.len(),
        detection_indices,
      },
    })
    .collect()
}

// Remembers the frame index each id was last observed in. Scoped to one
// evaluation run.
#[derive(Debug, Default)]
pub struct IdentityTracker {
  last_seen: HashMap<u32, usize>,
  reuse_limit: usize,
}

impl IdentityTracker {
  pub fn new(reuse_limit: usize) -> IdentityTracker {
    IdentityTracker {
      last_seen: HashMap::new(),
      reuse_limit,
    }
  }

  pub fn reset(&mut self) {
    self.last_seen.clear();
  }

  pub fn last_seen(&self, id: u32) -> Option<usize> {
    self.last_seen.get(&id).copied()
  }

  // Flags ids that come back after a gap of more than `reuse_limit` frames.
  // Frames must be observed in increasing index order.
  pub fn observe(&mut self, frame_index: usize, frame: &Frame) -> Vec<IdentityViolation> {
    let mut violations = vec![];
    let mut seen_here: Vec<u32> = vec![];
    for id in frame.detections.iter().filter_map(|d| d.id) {
      if seen_here.contains(&id) { continue }
      seen_here.push(id);
      if let Some(last) = self.last_seen.insert(id, frame_index) {
        let gap = frame_index.saturating_sub(last);
        if last + 1 != frame_index && gap > self.reuse_limit {
          violations.push(IdentityViolation {
            kind: ViolationKind::Reused,
            frame_index,
            timestamp: frame.timestamp,
            detection_id: id,
            detail: ViolationDetail::Reused { last_seen_frame: last, gap },
          });
        }
      }
    }
    violations
  }
}

pub fn check_no_premature_reuse(history: &[Frame], reuse_limit: usize) -> Vec<IdentityViolation> {
  let mut tracker = IdentityTracker::new(reuse_limit);
  history.iter()
    .enumerate()
    .flat_map(|(i, frame)| tracker.observe(i, frame))
    .collect()
}
