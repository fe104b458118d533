//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
pub use circle::Circle;
pub use line::LineSegment2d;
pub use polyline::Polyline;
pub use rect::{OutCode, Rectangle};
pub use util::*;

mod circle;
mod line;
mod polyline;
mod rect;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
