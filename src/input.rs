// JSONL recording reader. One record per line:
//
//   {"time": 100, "pose": {"x": 1.0, "y": 2.0, "yaw": 0.1}}
//   {"time": 100, "detections": [{"id": 3, "shape": {"polygon": {"corners": [[0, 0], ...]}}}]}
//   {"time": 100, "groundTruth": {"ego": {"x": .., "y": .., "headingDeg": ..}, "objects": [...]}}

use crate::all::*;

pub struct Input {
  reader: BufReader<File>,
  line: String,
  line_number: usize,
}

pub enum InputData {
  Pose(PoseSample),
  Frame(Frame),
  GroundTruth(GroundTruthFrame),
}

#[derive(Deserialize)]
struct PoseValues {
  x: f64,
  y: f64,
  yaw: f64,
}

#[derive(Deserialize)]
struct GroundTruthValues {
  ego: UtmPose,
  objects: Vec<Detection>,
}

impl Input {
  pub fn new(path: &Path) -> Result<Input> {
    let file = File::open(path)
      .context(format!("Failed to open {}.", path.display()))?;
    Ok(Input {
      reader: BufReader::new(file),
      line: String::new(),
      line_number: 0,
    })
  }

  // Not using `impl Iterator` to allow returning `Result`.
  // End of data is signaled by `Result::Ok(Option::None)`.
  pub fn next(&mut self) -> Result<Option<InputData>> {
    loop {
      self.line.clear();
      self.line_number += 1;
      match self.reader.read_line(&mut self.line) {
        Ok(0) => return Ok(None),
        Err(err) => bail!("Failed to read line {}. {}", self.line_number, err),
        _ => {},
      }
      if self.line.trim().is_empty() { continue }
      if let Some(data) = parse_line(&self.line)
        .context(format!("Input::next failed on line {}: {}", self.line_number, self.line.trim()))?
      {
        return Ok(Some(data));
      }
    }
  }
}

// `Ok(None)` for well-formed lines carrying nothing the engine uses.
fn parse_line(line: &str) -> Result<Option<InputData>> {
  let value: serde_json::Value = serde_json::from_str(line)
    .context("JSON deserialization failed.")?;
  let value = value.as_object()
    .ok_or(anyhow!("JSONL line is not a map."))?;
  let time = value.get("time")
    .and_then(|t| t.as_i64())
    .ok_or(anyhow!("Time is not an integer."))?;

  if let Some(pose) = value.get("pose") {
    let p: PoseValues = serde_json::from_value(pose.clone()).context("Bad pose.")?;
    Ok(Some(InputData::Pose(PoseSample { timestamp: time, x: p.x, y: p.y, yaw: p.yaw })))
  }
  else if let Some(detections) = value.get("detections") {
    let detections: Vec<Detection> = serde_json::from_value(detections.clone())
      .context("Bad detections.")?;
    Ok(Some(InputData::Frame(Frame { timestamp: time, detections })))
  }
  else if let Some(ground_truth) = value.get("groundTruth") {
    let g: GroundTruthValues = serde_json::from_value(ground_truth.clone())
      .context("Bad ground truth.")?;
    Ok(Some(InputData::GroundTruth(GroundTruthFrame { timestamp: time, ego: g.ego, objects: g.objects })))
  }
  else {
    warn!("Unrecognized data: {}", line.trim());
    Ok(None)
  }
}

pub fn read_recording(path: &Path) -> Result<Recording> {
  let mut input = Input::new(path)?;
  let (mut frames, mut poses, mut ground_truth) = (vec![], vec![], vec![]);
  while let Some(data) = input.next()? {
    match data {
      InputData::Pose(p) => poses.push(p),
      InputData::Frame(f) => frames.push(f),
      InputData::GroundTruth(g) => ground_truth.push(g),
    }
  }
  info!("Read {} frames, {} poses and {} ground truth frames from {}.",
    frames.len(), poses.len(), ground_truth.len(), path.display());
  Ok(Recording::new(frames, poses, ground_truth))
}
