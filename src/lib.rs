// Cross-frame association and identity checks for evaluating the output of an
// environment fusion stack: ego pose buffering, rigid transforms between
// vehicle frames, polygon geometry, nearest-neighbour association and the
// KPIs built on top of them.

pub mod all;

pub mod accuracy;
pub mod angle;
pub mod association;
pub mod error;
pub mod fov;
pub mod geometry;
pub mod identity;
pub mod input;
pub mod kpi;
pub mod parameters;
pub mod pose_buffer;
pub mod shape;
pub mod transform;
pub mod types;
pub mod util;
