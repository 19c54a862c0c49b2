// Scoring fused output against surveyed ground truth. Ground truth arrives in
// a UTM frame together with the ego pose it was referenced against.

use crate::all::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthFrame {
  pub timestamp: i64,
  pub ego: UtmPose,
  pub objects: Vec<Detection>,
}

impl GroundTruthFrame {
  pub fn in_vehicle_frame(&self) -> Vec<Detection> {
    self.objects.iter()
      .map(|o| o.with_shape(shape_world_to_vehicle(&o.shape, &self.ego)))
      .collect()
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AccuracyRecord {
  Matched {
    timestamp: i64,
    ground_truth_index: usize,
    detection_index: usize,
    detection_id: Option<u32>,
    distance: f64,
    within_tolerance: bool,
  },
  // Ground truth without any detection inside the association radius.
  Missed {
    timestamp: i64,
    ground_truth_index: usize,
  },
  // Detection without ground truth. Reported, does not fail the KPI.
  Unmatched {
    timestamp: i64,
    detection_index: usize,
    detection_id: Option<u32>,
  },
}

impl AccuracyRecord {
  pub fn is_failure(&self) -> bool {
    match self {
      AccuracyRecord::Matched { within_tolerance, .. } => !within_tolerance,
      AccuracyRecord::Missed { .. } => true,
      AccuracyRecord::Unmatched { .. } => false,
    }
  }
}

impl std::fmt::Display for AccuracyRecord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AccuracyRecord::Matched { timestamp, ground_truth_index, detection_index, distance, within_tolerance, .. } => {
        write!(f, "t={} ground truth {} ~ detection {}: {:.3} m{}", timestamp, ground_truth_index,
          detection_index, distance, if *within_tolerance { "" } else { " (out of tolerance)" })
      },
      AccuracyRecord::Missed { timestamp, ground_truth_index } => {
        write!(f, "t={} ground truth {} missed", timestamp, ground_truth_index)
      },
      AccuracyRecord::Unmatched { timestamp, detection_index, detection_id } => {
        write!(f, "t={} detection {} (id {:?}) has no ground truth", timestamp, detection_index, detection_id)
      },
    }
  }
}

// Ground truth plays the "previous" side of the association.
pub fn score_frame(
  ground_truth: &GroundTruthFrame,
  frame: &Frame,
  associator: &ObjectAssociator,
  fov: Option<FieldOfView>,
  tolerance: f64,
) -> Vec<AccuracyRecord> {
  let truth = ground_truth.in_vehicle_frame();
  let truth_visible = visible_indices(fov, &truth);
  let detections_visible = visible_indices(fov, &frame.detections);
  let association = associator.associate_subsets(
    &truth, &truth_visible, &frame.detections, &detections_visible);

  let timestamp = frame.timestamp;
  let mut records = vec![];
  for &g in &truth_visible {
    records.push(match association.matches().iter().find(|m| m.previous == g) {
      Some(m) => AccuracyRecord::Matched {
        timestamp,
        ground_truth_index: g,
        detection_index: m.current,
        detection_id: frame.detections[m.current].id,
        distance: m.distance,
        within_tolerance: m.distance <= tolerance,
      },
      None => AccuracyRecord::Missed { timestamp, ground_truth_index: g },
    });
  }
  for &d in &detections_visible {
    if association.previous_of(d).is_none() {
      records.push(AccuracyRecord::Unmatched {
        timestamp,
        detection_index: d,
        detection_id: frame.detections[d].id,
      });
    }
  }
  records
}

pub const ACCURACY: &str = "accuracy";

pub fn evaluate_accuracy(recording: &Recording, p: &ParameterSet) -> KpiReport {
  if recording.ground_truth.is_empty() {
    return KpiReport::input_missing(ACCURACY, "No ground truth.");
  }
  let associator = ObjectAssociator::from_parameters(p);
  let mut report = KpiReport::new(ACCURACY);
  for ground_truth in &recording.ground_truth {
    let frame = match recording.frame_at(ground_truth.timestamp) {
      Some(frame) => frame,
      None => {
        debug!("No detections at ground truth time {}.", ground_truth.timestamp);
        report.skipped += 1;
        continue;
      },
    };
    for record in score_frame(ground_truth, frame, &associator, p.field_of_view(), p.accuracy_tolerance) {
      if record.is_failure() {
        report.push_failure(Evidence::Accuracy(record));
      }
      else {
        report.push_note(Evidence::Accuracy(record));
      }
    }
    report.evaluated += 1;
  }
  report.finish()
}
