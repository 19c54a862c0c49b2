// NOTE This kind of import-all file isn't a common Rust idiom.

pub use crate::{
  accuracy::*,
  angle::*,
  association::*,
  error::*,
  fov::*,
  geometry::*,
  identity::*,
  input::*,
  kpi::*,
  parameters::*,
  pose_buffer::*,
  shape::*,
  transform::*,
  types::*,
  util::*,
};

pub use {
  std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
  },
  log::{debug, error, info, warn, LevelFilter},
  serde::{Deserialize, Serialize},
  anyhow::{anyhow, bail, Context as AnyhowContext, Result},
};
