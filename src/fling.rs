//! Deciding where a released handle goes.

use crate::axis::{AxisModel, Target};

/// Initial conditions for the release animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fling {
    pub target: Target,
    /// Initial velocity along the axis, pixels per second.
    pub velocity: f64,
    /// Constant acceleration along the axis, pixels per second squared.
    pub acceleration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingDecision {
    pub tap_threshold: i32,
    pub maximum_major_velocity: f64,
    pub maximum_acceleration: f64,
}

impl FlingDecision {
    /// Decides between committing to the opposite state and rolling back.
    ///
    /// The drawer commits when the release was auto-animated, fast enough towards the
    /// opposite state, or past the rollback point. Acceleration always points at the chosen
    /// target, and an initial velocity pointing away from it is dropped.
    pub fn decide(
        &self,
        axis: &AxisModel,
        position: i32,
        velocity: f64,
        expanded: bool,
        auto_animated: bool,
    ) -> Fling {
        let away = if expanded { Target::Closed } else { Target::Open };
        let away_direction = axis.direction(away);

        let will_fling = velocity * away_direction > self.maximum_major_velocity;
        let critical = axis.rollback_point(expanded);
        let will_rollback = f64::from(position - critical) * away_direction < 0.;

        let target = if auto_animated || will_fling || !will_rollback {
            away
        } else {
            away.opposite()
        };

        let direction = axis.direction(target);
        let velocity = if velocity * direction < 0. { 0. } else { velocity };

        Fling {
            target,
            velocity,
            acceleration: direction * self.maximum_acceleration,
        }
    }

    /// Auto-animated motion towards the target, starting at full acceleration speed.
    pub fn animate_to(&self, axis: &AxisModel, position: i32, target: Target) -> Fling {
        let velocity = axis.direction(target) * self.maximum_acceleration;
        self.decide(axis, position, velocity, target == Target::Closed, true)
    }

    /// Whether a release at this offset counts as a tap on the handle.
    pub fn is_single_tap(&self, axis: &AxisModel, offset: i32, expanded: bool) -> bool {
        (offset - axis.bound_for(expanded)).abs() <= self.tap_threshold
    }
}

#[cfg(test)]
mod tests {
    use sliding_drawer_config::Orientation;

    use super::*;
    use crate::axis::EdgeOffsets;
    use crate::geometry::Size;

    const DECISION: FlingDecision = FlingDecision {
        tap_threshold: 6,
        maximum_major_velocity: 200.,
        maximum_acceleration: 2000.,
    };

    fn make_axis(orientation: Orientation) -> AxisModel {
        AxisModel::new(
            orientation,
            Size::new(400, 400),
            Size::new(40, 40),
            EdgeOffsets::default(),
        )
    }

    fn is_inverted(orientation: Orientation) -> bool {
        matches!(orientation, Orientation::TopDown | Orientation::LeftToRight)
    }

    /// (expanded, inverted, commits) → (acceleration sign, velocity sign that gets dropped)
    const SIGN_TABLE: [((bool, bool, bool), (f64, f64)); 8] = [
        ((true, true, true), (-1., 1.)),
        ((true, false, true), (1., -1.)),
        ((true, true, false), (1., -1.)),
        ((true, false, false), (-1., 1.)),
        ((false, false, true), (-1., 1.)),
        ((false, true, true), (1., -1.)),
        ((false, false, false), (1., -1.)),
        ((false, true, false), (-1., 1.)),
    ];

    /// Why a release ends up where it does.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Reason {
        PastRollbackPoint,
        Fling,
        AutoAnimated,
        RollBack,
    }

    #[test]
    fn sign_table() {
        let reasons = [
            Reason::PastRollbackPoint,
            Reason::Fling,
            Reason::AutoAnimated,
            Reason::RollBack,
        ];

        for orientation in Orientation::ALL {
            let axis = make_axis(orientation);
            let inverted = is_inverted(orientation);

            for expanded in [true, false] {
                // Pixels per second pointing towards the opposite state.
                let away_sign = if expanded == inverted { -1. } else { 1. };

                for reason in reasons {
                    // Critical points sit at 100 and 300.
                    let position = match reason {
                        Reason::PastRollbackPoint => 200,
                        _ if expanded == inverted => 340,
                        _ => 20,
                    };
                    let speed = if reason == Reason::Fling { 500. } else { 50. };

                    for sign in [-1., 1.] {
                        let velocity = sign * speed;
                        let auto_animated = reason == Reason::AutoAnimated;
                        let fling =
                            DECISION.decide(&axis, position, velocity, expanded, auto_animated);
                        let msg = format!(
                            "{orientation} expanded={expanded} {reason:?} v={velocity}"
                        );

                        let commits = match reason {
                            Reason::PastRollbackPoint | Reason::AutoAnimated => true,
                            Reason::Fling => sign == away_sign,
                            Reason::RollBack => false,
                        };
                        let &(_, (accel_sign, dropped_sign)) = SIGN_TABLE
                            .iter()
                            .find(|(key, _)| *key == (expanded, inverted, commits))
                            .unwrap();

                        let target = if expanded == commits {
                            Target::Closed
                        } else {
                            Target::Open
                        };
                        assert_eq!(fling.target, target, "{msg}");
                        assert_eq!(fling.acceleration, accel_sign * 2000., "{msg}");

                        let expected_velocity = if sign == dropped_sign { 0. } else { velocity };
                        assert_eq!(fling.velocity, expected_velocity, "{msg}");
                    }
                }
            }
        }
    }

    #[test]
    fn fast_release_commits_before_rollback_point() {
        // Collapsed left-to-right, barely moved but flung open.
        let axis = make_axis(Orientation::LeftToRight);
        let fling = DECISION.decide(&axis, 20, 201., false, false);
        assert_eq!(fling.target, Target::Open);
        assert_eq!(fling.velocity, 201.);

        // Exactly at the velocity cap is not a fling.
        let fling = DECISION.decide(&axis, 20, 200., false, false);
        assert_eq!(fling.target, Target::Closed);
        assert_eq!(fling.velocity, 0.);
    }

    #[test]
    fn past_rollback_point_commits_despite_backward_fling() {
        // Expanded bottom-up, dragged past the rollback point, flung back open.
        let axis = make_axis(Orientation::BottomUp);
        let fling = DECISION.decide(&axis, 200, -900., true, false);
        assert_eq!(fling.target, Target::Closed);
        assert_eq!(fling.velocity, 0.);
        assert_eq!(fling.acceleration, 2000.);
    }

    #[test]
    fn rollback_point_itself_commits() {
        let axis = make_axis(Orientation::RightToLeft);
        let fling = DECISION.decide(&axis, axis.rollback_point(false), 0., false, false);
        assert_eq!(fling.target, Target::Open);
    }

    #[test]
    fn auto_animated_always_commits() {
        for orientation in Orientation::ALL {
            let axis = make_axis(orientation);
            let closed = axis.bound_for(false);
            let fling = DECISION.animate_to(&axis, closed, Target::Open);
            assert_eq!(fling.target, Target::Open);
            assert_eq!(fling.velocity, axis.direction(Target::Open) * 2000.);
            assert_eq!(fling.acceleration, fling.velocity);

            let open = axis.bound_for(true);
            let fling = DECISION.animate_to(&axis, open, Target::Closed);
            assert_eq!(fling.target, Target::Closed);
            assert_eq!(fling.acceleration, axis.direction(Target::Closed) * 2000.);
        }
    }

    #[test]
    fn single_tap() {
        let axis = make_axis(Orientation::LeftToRight);
        assert!(DECISION.is_single_tap(&axis, 0, false));
        assert!(DECISION.is_single_tap(&axis, 6, false));
        assert!(!DECISION.is_single_tap(&axis, 7, false));
        assert!(DECISION.is_single_tap(&axis, 354, true));
        assert!(!DECISION.is_single_tap(&axis, 353, true));

        let axis = make_axis(Orientation::BottomUp);
        assert!(DECISION.is_single_tap(&axis, 356, false));
        assert!(DECISION.is_single_tap(&axis, 4, true));
        assert!(!DECISION.is_single_tap(&axis, 360 - 7, false));
    }
}
