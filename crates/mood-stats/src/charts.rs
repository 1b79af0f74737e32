//! SVG-ready bar geometry. Builders return pixel coordinates only; colours and
//! markup belong to whoever renders them.

pub mod distribution;
pub mod history;
