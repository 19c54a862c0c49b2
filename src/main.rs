use fusion_kpi::all::*;

use clap::Parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ArgEnum)]
enum KpiSelection {
  All,
  Maintenance,
  Uniqueness,
  Reuse,
  Accuracy,
}

#[derive(Parser)]
struct Args {
  #[clap(short)]
  input: String,
  // JSON parameter file. Replaces the parameter flags below when given.
  #[clap(long)]
  config: Option<String>,
  // Start from the preset of an object kind instead of the flags.
  #[clap(long, arg_enum)]
  kind: Option<ObjectKind>,
  #[clap(long, arg_enum, default_value = "all")]
  kpi: KpiSelection,
  // Print reports as JSON instead of text.
  #[clap(long)]
  json: bool,
  #[clap(long, default_value = "info")]
  log_level: LevelFilter,
  #[clap(flatten)]
  parameters: ParameterSet,
}

fn handle_error(err: &anyhow::Error) {
  for (i, e) in err.chain().enumerate() {
    println!("  {}: {}", i + 1, e);
  }
}

fn main() {
  if let Err(err) = run() {
    handle_error(&err);
    std::process::exit(1);
  }
}

fn parameters(args: &Args) -> Result<ParameterSet> {
  let p = if let Some(config) = &args.config {
    ParameterSet::from_json_file(Path::new(config))?
  }
  else if let Some(kind) = args.kind {
    ParameterSet::for_kind(kind)
  }
  else {
    args.parameters.clone()
  };
  p.validate()?;
  Ok(p)
}

fn run() -> Result<()> {
  let args = Args::parse();
  init_logging(args.log_level);

  let p = parameters(&args)?;
  debug!("{:?}", p);
  let recording = read_recording(Path::new(&args.input))?;

  let mut reports = vec![];
  let all = args.kpi == KpiSelection::All;
  if all || args.kpi == KpiSelection::Maintenance {
    reports.push(evaluate_id_maintenance(&recording, &p));
  }
  if all || args.kpi == KpiSelection::Uniqueness {
    reports.push(evaluate_id_uniqueness(&recording));
  }
  if all || args.kpi == KpiSelection::Reuse {
    reports.push(evaluate_id_reuse(&recording, &p));
  }
  // Only part of "all" when the recording has ground truth.
  if args.kpi == KpiSelection::Accuracy || (all && !recording.ground_truth.is_empty()) {
    reports.push(evaluate_accuracy(&recording, &p));
  }

  if args.json {
    println!("{}", serde_json::to_string_pretty(&reports).context("Failed to serialize reports.")?);
    return Ok(());
  }
  for report in &reports {
    println!("{}: {:?} ({} evaluated, {} skipped)", report.name, report.verdict, report.evaluated, report.skipped);
    if let Some(reason) = &report.reason {
      println!("  {}", reason);
    }
    for evidence in &report.evidence {
      println!("  {}", evidence);
    }
  }
  Ok(())
}
