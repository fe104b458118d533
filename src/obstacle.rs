use crate::barrier::Barrier;
use crate::math::{cos_between, Circle, Point2d, Vector2d};
use cgmath::InnerSpace;

/// Other vehicles are only avoided when we are this many times faster than them,
/// unless they are heading towards us.
const OVERTAKE_SPEED_FACTOR: f64 = 1.1;

/// The outline of a dynamic entity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Footprint {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
}

/// What a dynamic entity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// A vehicle, including our own.
    Vehicle { id: u64 },
    /// A thrown or fired object.
    Projectile,
    /// A hazard left on the track, such as an oil slick.
    Hazard,
}

/// Represents another vehicle, projectile or hazard
/// which our vehicle should steer around.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicEntity {
    /// What the entity is.
    pub kind: EntityKind,
    /// The world space coordinates of the entity's centre.
    pub position: Point2d,
    /// The velocity of the entity per tick.
    pub velocity: Vector2d,
    /// The outline of the entity.
    pub footprint: Footprint,
}

impl DynamicEntity {
    /// The radius of the disc used to represent the entity.
    /// Rectangles are represented by their inscribed circle.
    pub fn radius(&self) -> f64 {
        match self.footprint {
            Footprint::Circle { radius } => radius,
            Footprint::Rectangle { width, height } => 0.5 * f64::min(width, height),
        }
    }

    /// Converts the entity into a movable barrier.
    pub fn barrier(&self) -> Barrier {
        Barrier::Movable(Circle::new(self.position, self.radius()))
    }

    /// Whether a vehicle with the given ID and velocity should steer around this entity.
    pub fn is_relevant_to(&self, own_id: u64, own_velocity: Vector2d) -> bool {
        match self.kind {
            EntityKind::Vehicle { id } => {
                if id == own_id {
                    return false;
                }
                let own_speed = own_velocity.magnitude();
                let speed = self.velocity.magnitude();
                own_speed > OVERTAKE_SPEED_FACTOR * speed
                    || (own_speed > 0.0
                        && speed > 0.0
                        && cos_between(own_velocity, self.velocity) < 0.0)
            }
            EntityKind::Projectile | EntityKind::Hazard => true,
        }
    }
}

/// Builds the barriers for all entities a vehicle should steer around.
pub fn entity_barriers(
    entities: &[DynamicEntity],
    own_id: u64,
    own_velocity: Vector2d,
) -> Vec<Barrier> {
    entities
        .iter()
        .filter(|e| e.is_relevant_to(own_id, own_velocity))
        .map(DynamicEntity::barrier)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn car(id: u64, velocity: Vector2d) -> DynamicEntity {
        DynamicEntity {
            kind: EntityKind::Vehicle { id },
            position: Point2d::new(0.0, 0.0),
            velocity,
            footprint: Footprint::Rectangle {
                width: 140.0,
                height: 210.0,
            },
        }
    }

    #[test]
    fn rectangles_become_inscribed_discs() {
        assert_eq!(car(1, Vector2d::new(0.0, 0.0)).radius(), 70.0);
    }

    #[test]
    fn vehicle_relevance() {
        let own = Vector2d::new(10.0, 0.0);
        assert!(!car(7, own).is_relevant_to(7, own));
        assert!(car(1, Vector2d::new(5.0, 0.0)).is_relevant_to(7, own));
        assert!(!car(1, Vector2d::new(9.5, 0.0)).is_relevant_to(7, own));
        assert!(car(1, Vector2d::new(-12.0, 0.0)).is_relevant_to(7, own));
        assert!(!car(1, Vector2d::new(0.0, 0.0)).is_relevant_to(7, Vector2d::new(0.0, 0.0)));
    }

    #[test]
    fn hazards_are_always_relevant() {
        let slick = DynamicEntity {
            kind: EntityKind::Hazard,
            position: Point2d::new(5.0, 5.0),
            velocity: Vector2d::new(0.0, 0.0),
            footprint: Footprint::Circle { radius: 150.0 },
        };
        let barriers = entity_barriers(&[slick, car(7, Vector2d::new(0.0, 0.0))], 7, Vector2d::new(0.0, 0.0));
        assert_eq!(barriers, vec![Barrier::Movable(Circle::new(Point2d::new(5.0, 5.0), 150.0))]);
    }
}
