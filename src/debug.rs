//! Drawing of planner internals for offline inspection.
//!
//! With the `debug` feature enabled, every call records a primitive into a
//! thread-local frame which the planner collects at the end of each tick.
//! Without it the calls compile to nothing.

use crate::math::{Point2d, Vector2d};
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[allow(unused)]
pub fn debug_line(name: &str, p1: Point2d, p2: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "line",
            "name": name,
            "p1": [p1.x, p1.y],
            "p2": [p2.x, p2.y],
        }))
    })
}

#[allow(unused)]
pub fn debug_ray(name: &str, origin: Point2d, vec: Vector2d) {
    debug_line(name, origin, origin + vec);
}

#[allow(unused)]
pub fn debug_circle(name: &str, centre: Point2d, radius: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "circle",
            "name": name,
            "centre": [centre.x, centre.y],
            "radius": radius
        }))
    })
}

#[allow(unused)]
pub fn debug_path(name: &str, points: &[Point2d]) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "path",
            "name": name,
            "points": points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
        }))
    })
}

/// Takes everything drawn since the last call.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}

#[cfg(all(test, feature = "debug"))]
mod test {
    use super::*;

    #[test]
    fn frame_is_drained() {
        debug_circle("post", Point2d::new(1.0, 2.0), 3.0);
        debug_ray("course", Point2d::new(0.0, 0.0), Vector2d::new(1.0, 0.0));
        let frame = take_debug_frame();
        assert_eq!(frame.as_array().map(|a| a.len()), Some(2));
        assert_eq!(frame[0]["type"], "circle");
        assert_eq!(frame[1]["p2"][0], 1.0);
        assert_eq!(take_debug_frame().as_array().map(|a| a.len()), Some(0));
    }
}
