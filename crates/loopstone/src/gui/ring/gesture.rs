use super::layout::{DragSession, RingLayout};
use beadstock::design::{BeadId, PlacedBead};
use beadstock::geom::{Point, wrap_delta};

/// One pointer sequence drives exactly one of these; a second press while a
/// gesture is live is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DragBead {
        session: DragSession,
    },
    SpinRing {
        last_angle: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureUpdate {
    Drag(DragSession),
    Spin { delta_deg: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Removed(BeadId),
    Reordered { from: usize, to: usize },
}

/// Classifies pointer input as bead-drag or ring-spin and folds samples into
/// the transient drag/spin state. The ring center is captured once per
/// gesture and held until the gesture ends, so mid-gesture layout wobble
/// cannot leak into the polar math.
#[derive(Debug, Default)]
pub struct GestureController {
    center: Option<Point>,
    gesture: Gesture,
}

impl GestureController {
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.gesture {
            Gesture::DragBead { session } => Some(session),
            _ => None,
        }
    }

    /// Pointer-down on a placed bead. Returns the opening drag session, or
    /// `None` if another gesture already owns the pointer.
    pub fn begin_bead_drag(
        &mut self,
        center: Point,
        bead: BeadId,
        pointer: Point,
    ) -> Option<DragSession> {
        if self.is_active() {
            return None;
        }
        let session = DragSession {
            bead,
            pointer_angle: center.angle_to(pointer),
            pointer_distance: center.distance_to(pointer),
        };
        self.center = Some(center);
        self.gesture = Gesture::DragBead {
            session: session.clone(),
        };
        Some(session)
    }

    /// Pointer-down on the ring background.
    pub fn begin_ring_spin(&mut self, center: Point, pointer: Point) -> bool {
        if self.is_active() {
            return false;
        }
        self.center = Some(center);
        self.gesture = Gesture::SpinRing {
            last_angle: center.angle_to(pointer),
        };
        true
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<GestureUpdate> {
        let center = self.center?;
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::DragBead { session } => {
                session.pointer_angle = center.angle_to(pointer);
                session.pointer_distance = center.distance_to(pointer);
                Some(GestureUpdate::Drag(session.clone()))
            }
            Gesture::SpinRing { last_angle } => {
                let angle = center.angle_to(pointer);
                // Only the small sample-to-sample arc is summed, normalized
                // across the -PI/PI seam, so the accumulated rotation stays
                // continuous over any number of revolutions.
                let delta_deg = wrap_delta(*last_angle, angle).to_degrees();
                *last_angle = angle;
                Some(GestureUpdate::Spin { delta_deg })
            }
        }
    }

    /// Pointer-up or pointer-leave: resolve the gesture against the layout it
    /// produced. Always returns to `Idle` and drops the cached center.
    pub fn finish(&mut self, beads: &[PlacedBead], layout: &RingLayout) -> Option<GestureOutcome> {
        let gesture = std::mem::take(&mut self.gesture);
        self.center = None;

        let Gesture::DragBead { session } = gesture else {
            return None;
        };
        let from = beads.iter().position(|b| b.unique_id == session.bead)?;

        if layout.will_remove {
            Some(GestureOutcome::Removed(session.bead))
        } else {
            layout
                .insertion_slot
                .map(|to| GestureOutcome::Reordered { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::ring::RingMetrics;
    use crate::gui::ring::layout::compute_placements;
    use beadstock::catalog::builtin_products;

    const CENTER: Point = Point { x: 300.0, y: 300.0 };

    fn beads(n: usize) -> Vec<PlacedBead> {
        builtin_products()
            .into_iter()
            .cycle()
            .take(n)
            .map(|p| PlacedBead::new(p, BeadId::generate()))
            .collect()
    }

    fn at_angle(deg: f64, distance: f64) -> Point {
        CENTER.translated(Point::polar(deg.to_radians(), distance))
    }

    #[test]
    fn spin_accumulates_signed_sample_deltas() {
        let mut ctl = GestureController::default();
        assert!(ctl.begin_ring_spin(CENTER, at_angle(10.0, 100.0)));

        let mut total = 0.0;
        for deg in [15.0, 13.0, 16.0] {
            match ctl.pointer_move(at_angle(deg, 100.0)) {
                Some(GestureUpdate::Spin { delta_deg }) => total += delta_deg,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!((total - 6.0).abs() < 1e-9);
    }

    #[test]
    fn spin_stays_continuous_across_the_seam() {
        let mut ctl = GestureController::default();
        assert!(ctl.begin_ring_spin(CENTER, at_angle(179.0, 100.0)));

        match ctl.pointer_move(at_angle(181.0, 100.0)) {
            Some(GestureUpdate::Spin { delta_deg }) => {
                assert!((delta_deg - 2.0).abs() < 1e-9)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn drag_updates_polar_coordinates() {
        let beads = beads(3);
        let mut ctl = GestureController::default();
        ctl.begin_bead_drag(CENTER, beads[1].unique_id.clone(), at_angle(0.0, 130.0))
            .unwrap();

        match ctl.pointer_move(at_angle(90.0, 250.0)) {
            Some(GestureUpdate::Drag(session)) => {
                assert!((session.pointer_angle.to_degrees() - 90.0).abs() < 1e-9);
                assert!((session.pointer_distance - 250.0).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn second_press_is_ignored_while_a_gesture_is_live() {
        let beads = beads(2);
        let mut ctl = GestureController::default();
        assert!(ctl.begin_ring_spin(CENTER, at_angle(0.0, 80.0)));

        assert!(
            ctl.begin_bead_drag(CENTER, beads[0].unique_id.clone(), at_angle(0.0, 130.0))
                .is_none()
        );
        assert!(!ctl.begin_ring_spin(CENTER, at_angle(45.0, 80.0)));
    }

    #[test]
    fn far_release_removes_the_dragged_bead() {
        let metrics = RingMetrics::default();
        let beads = beads(3);
        let mut ctl = GestureController::default();

        ctl.begin_bead_drag(CENTER, beads[1].unique_id.clone(), at_angle(0.0, 130.0))
            .unwrap();
        ctl.pointer_move(at_angle(0.0, 250.0));

        let layout = compute_placements(&metrics, &beads, 0.0, ctl.session(), false);
        assert!(layout.will_remove);

        let outcome = ctl.finish(&beads, &layout);
        assert_eq!(outcome, Some(GestureOutcome::Removed(beads[1].unique_id.clone())));
        assert!(!ctl.is_active());
    }

    #[test]
    fn near_release_reorders_to_the_resolved_slot() {
        let metrics = RingMetrics::default();
        let beads = beads(4);
        let mut ctl = GestureController::default();

        // Grab the top bead and carry it to the bottom slot.
        ctl.begin_bead_drag(CENTER, beads[0].unique_id.clone(), at_angle(-90.0, 130.0))
            .unwrap();
        ctl.pointer_move(at_angle(90.0, 130.0));

        let layout = compute_placements(&metrics, &beads, 0.0, ctl.session(), false);
        let outcome = ctl.finish(&beads, &layout);
        assert_eq!(outcome, Some(GestureOutcome::Reordered { from: 0, to: 2 }));
    }

    #[test]
    fn spin_release_commits_nothing() {
        let metrics = RingMetrics::default();
        let beads = beads(3);
        let mut ctl = GestureController::default();

        ctl.begin_ring_spin(CENTER, at_angle(0.0, 60.0));
        ctl.pointer_move(at_angle(30.0, 60.0));

        let layout = compute_placements(&metrics, &beads, 30.0, ctl.session(), false);
        assert_eq!(ctl.finish(&beads, &layout), None);
        assert!(!ctl.is_active());
    }

    #[test]
    fn finish_resets_even_when_the_bead_vanished() {
        let metrics = RingMetrics::default();
        let beads = beads(2);
        let mut ctl = GestureController::default();

        ctl.begin_bead_drag(CENTER, beads[0].unique_id.clone(), at_angle(0.0, 130.0))
            .unwrap();
        let layout = compute_placements(&metrics, &beads, 0.0, ctl.session(), false);

        // The bead was removed behind our back; release must be a no-op.
        let remaining = vec![beads[1].clone()];
        assert_eq!(ctl.finish(&remaining, &layout), None);
        assert!(!ctl.is_active());
        assert!(ctl.pointer_move(at_angle(10.0, 100.0)).is_none());
    }
}
