//! Navigation domain: статическая сетка препятствий и запросы к ней
//!
//! - obstacle_map: ObstacleMap (строится один раз, дальше read-only)
//! - spatial: ObstacleProbe (circle cast, LOS, clearance)
//! - pathfinder: GridPathfinder (bounded BFS, one-shot)
//!
//! Никаких writer'ов после построения: блокировки не нужны,
//! все агенты читают одну и ту же сетку.

pub mod obstacle_map;
pub mod pathfinder;
pub mod spatial;


pub use obstacle_map::{CellBounds, MapError, ObstacleMap, OccupancySource, TileLayer};
pub use pathfinder::{GridPathfinder, PathError, DEFAULT_MAX_SEARCH};
pub use spatial::{AgentSense, CastHit, ObstacleProbe, OpenField, ProbeSense};
