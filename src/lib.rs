pub use cgmath;
pub use barrier::{Barrier, Lane, PassabilityField, TileBarrierCache};
pub use course::{Course, CourseInput, CoursePlanner, CourseTier};
pub use graph::{NodeId, TileGraph};
pub use obstacle::{DynamicEntity, EntityKind, Footprint};
pub use planner::{
    Plan, Planner, PlannerAttributes, RebuildReason, Strategy, Track, VehicleState,
};
pub use tile::{Side, TileGrid, TilePos, TileType};
pub use util::Interval;

pub mod barrier;
pub mod course;
mod debug;
pub mod graph;
pub mod math;
pub mod obstacle;
mod planner;
pub mod route;
pub mod tile;
mod util;
