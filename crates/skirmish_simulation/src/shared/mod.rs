//! Shared domain: cross-cutting утилиты
//!
//! - geometry: повороты, перпендикуляры, OrientedBox (используется sweep, steering, nav)

pub mod geometry;

pub use geometry::*;
