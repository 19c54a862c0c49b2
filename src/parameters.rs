use crate::all::*;

// Per-KPI thresholds. Each evaluation gets its own copy; there is no shared
// parameter state.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[derive(clap::Parser)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterSet {
  // Association, metres. Strictly-less-than comparison.
  #[clap(long, default_value = "2.0")]
  pub association_radius: f64,
  #[clap(long, arg_enum, default_value = "representative")]
  pub metric: MetricKind,
  #[clap(long, arg_enum, default_value = "centroid")]
  pub anchor: Anchor,

  // Identity, in cycles rather than time.
  #[clap(long, default_value = "5")]
  pub reuse_limit: usize,

  // Square field of view, metres from the vehicle origin.
  #[clap(long)]
  pub fov_half_extent: Option<f64>,

  #[clap(long, arg_enum, default_value = "strict")]
  pub pose_policy: OutOfRangePolicy,

  // Ground truth matching, metres.
  #[clap(long, default_value = "0.5")]
  pub accuracy_tolerance: f64,
}

impl Default for ParameterSet {
  fn default() -> ParameterSet {
    ParameterSet {
      association_radius: 2.,
      metric: MetricKind::Representative,
      anchor: Anchor::Centroid,
      reuse_limit: 5,
      fov_half_extent: None,
      pose_policy: OutOfRangePolicy::Strict,
      accuracy_tolerance: 0.5,
    }
  }
}

impl ParameterSet {
  pub fn for_kind(kind: ObjectKind) -> ParameterSet {
    let d = ParameterSet::default();
    match kind {
      ObjectKind::ParkingSlot | ObjectKind::StaticObject => d,
      ObjectKind::WheelStopper | ObjectKind::WheelLocker => ParameterSet {
        association_radius: 0.2,
        accuracy_tolerance: 0.1,
        ..d
      },
      ObjectKind::ParkingDelimiter | ObjectKind::StopLine => ParameterSet {
        association_radius: 0.5,
        anchor: Anchor::Nearest,
        ..d
      },
      ObjectKind::PedestrianCrossing => ParameterSet {
        metric: MetricKind::CornerAveraged,
        ..d
      },
    }
  }

  pub fn from_json_file(path: &Path) -> Result<ParameterSet> {
    let s = std::fs::read_to_string(path)
      .context(format!("Failed to read file {}.", path.display()))?;
    let p: ParameterSet = serde_json::from_str(&s)
      .context(format!("Failed to parse {}.", path.display()))?;
    p.validate()?;
    Ok(p)
  }

  pub fn validate(&self) -> Result<()> {
    if !(self.association_radius > 0.) {
      bail!("Association radius must be positive, got {}.", self.association_radius);
    }
    if let Some(h) = self.fov_half_extent {
      if !(h > 0.) { bail!("Field of view half extent must be positive, got {}.", h) }
    }
    if !(self.accuracy_tolerance >= 0.) {
      bail!("Accuracy tolerance must not be negative, got {}.", self.accuracy_tolerance);
    }
    Ok(())
  }

  pub fn field_of_view(&self) -> Option<FieldOfView> {
    self.fov_half_extent.map(FieldOfView::new)
  }
}
