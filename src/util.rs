// `accuracy:129` for records from this crate, the full module path otherwise.
fn log_location(record: &log::Record) -> String {
  let module = record.module_path().unwrap_or("?");
  let module = module.strip_prefix("fusion_kpi::").unwrap_or(module);
  format!("{}:{}", module, record.line().unwrap_or(0))
}

pub fn format_log(
  buf: &mut env_logger::fmt::Formatter,
  record: &log::Record,
) -> std::io::Result<()> {
  use std::io::Write;
  use env_logger::fmt::Color::*;
  use log::Level::*;
  let mut style = buf.style();
  style.set_color(match record.level() {
    Error => Red,
    Warn => Yellow,
    Info => Green,
    Debug | Trace => Magenta,
  });
  writeln!(buf, "{}", style.value(format!("{:5} {:24}{}", record.level(), log_location(record), record.args())))
}

pub fn init_logging(level: log::LevelFilter) {
  env_logger::Builder::new()
    .filter_level(level)
    .format(format_log)
    .init();
}
