use super::gesture::{GestureController, GestureOutcome, GestureUpdate};
use super::layout::{RingLayout, compute_placements};
use super::{DRAG_SCALE, RingMetrics};
use beadstock::design::{BeadId, DesignStore, PlacedBead};
use beadstock::geom::Point;

/// The authoritative designer state: the ordered bead sequence, the ring's
/// accumulated rotation, and the transient gesture feeding the layout pass.
/// Sequence order IS angular order; everything else is derived.
pub struct State {
    pub beads: Vec<PlacedBead>,
    /// Unbounded accumulating degrees, never wrapped here.
    pub rotation_deg: f64,
    pub metrics: RingMetrics,
    pub controller: GestureController,
    pub layout: RingLayout,
    /// An entrance flight is about to append a bead; the ring already opens
    /// the extra slot so the newcomer has somewhere to land.
    pub insertion_pending: bool,
}

impl State {
    pub fn new(beads: Vec<PlacedBead>, metrics: RingMetrics) -> Self {
        let mut state = Self {
            beads,
            rotation_deg: 0.0,
            metrics,
            controller: GestureController::default(),
            layout: RingLayout::default(),
            insertion_pending: false,
        };
        state.relayout();
        state
    }

    pub fn relayout(&mut self) {
        self.layout = compute_placements(
            &self.metrics,
            &self.beads,
            self.rotation_deg,
            self.controller.session(),
            self.insertion_pending,
        );
    }

    /// Single splice-move; out-of-range `from` is a no-op, `to` clamps to the
    /// end (the pending slot resolves there once the sequence shrank by one).
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.beads.len() {
            return;
        }
        let bead = self.beads.remove(from);
        let to = to.min(self.beads.len());
        self.beads.insert(to, bead);
        self.relayout();
    }

    /// No-match is a no-op: a release can race a concurrent removal.
    pub fn remove(&mut self, id: &BeadId) {
        self.beads.retain(|b| &b.unique_id != id);
        self.relayout();
    }

    pub fn push(&mut self, bead: PlacedBead) {
        self.beads.push(bead);
        self.relayout();
    }

    pub fn clear(&mut self) {
        self.beads.clear();
        self.rotation_deg = 0.0;
        self.relayout();
    }

    pub fn rotate_by(&mut self, delta_deg: f64) {
        self.rotation_deg += delta_deg;
        self.relayout();
    }

    /// Screen position of a laid-out bead: local offset spun by the current
    /// rotation, then translated to the ring center.
    pub fn to_screen(&self, center: Point, offset: Point) -> Point {
        center.translated(offset.rotated(self.rotation_deg.to_radians()))
    }

    /// The topmost bead under the pointer, honoring the dragged bead's larger
    /// footprint. Iterates back-to-front so later (higher-drawn) beads win.
    pub fn bead_at(&self, center: Point, pointer: Point) -> Option<BeadId> {
        self.beads
            .iter()
            .rev()
            .find(|bead| {
                let Some(placement) = self.layout.get(&bead.unique_id) else {
                    return false;
                };
                let mut radius = self.metrics.bead_radius(bead.product.size_mm);
                if placement.is_dragging {
                    radius *= DRAG_SCALE;
                }
                let at = self.to_screen(center, placement.offset);
                at.distance_to(pointer) <= radius
            })
            .map(|bead| bead.unique_id.clone())
    }

    pub fn begin_gesture(&mut self, center: Point, pointer: Point) {
        match self.bead_at(center, pointer) {
            Some(id) => {
                self.controller.begin_bead_drag(center, id, pointer);
            }
            None => {
                self.controller.begin_ring_spin(center, pointer);
            }
        }
        self.relayout();
    }

    pub fn move_gesture(&mut self, pointer: Point) {
        match self.controller.pointer_move(pointer) {
            Some(GestureUpdate::Drag(_)) => self.relayout(),
            Some(GestureUpdate::Spin { delta_deg }) => self.rotate_by(delta_deg),
            None => {}
        }
    }

    /// Resolve and commit the active gesture (pointer-up and pointer-leave
    /// both land here).
    pub fn end_gesture(&mut self) {
        match self.controller.finish(&self.beads, &self.layout) {
            Some(GestureOutcome::Removed(id)) => self.remove(&id),
            Some(GestureOutcome::Reordered { from, to }) => self.reorder(from, to),
            None => self.relayout(),
        }
    }
}

/// Persists the design unless it is empty; the returned notice is what the
/// user sees either way.
pub fn save_design(beads: &[PlacedBead], store: &DesignStore) -> &'static str {
    if beads.is_empty() {
        return "Design is empty!";
    }
    match store.save(beads) {
        Ok(()) => "Design Saved!",
        Err(e) => {
            log::error!("Failed to save design: {}", e);
            "Save failed"
        }
    }
}

/// Empties the design and drops the saved snapshot; already-empty is a safe
/// no-op with its own notice.
pub fn clear_design(state: &mut State, store: &DesignStore) -> &'static str {
    if state.beads.is_empty() {
        return "Design is already empty";
    }
    state.clear();
    if let Err(e) = store.clear() {
        log::error!("Failed to clear saved design: {}", e);
    }
    "Design Cleared"
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadstock::catalog::builtin_products;

    const CENTER: Point = Point { x: 300.0, y: 300.0 };

    fn state_with(n: usize) -> State {
        let beads = builtin_products()
            .into_iter()
            .cycle()
            .take(n)
            .map(|p| PlacedBead::new(p, BeadId::generate()))
            .collect();
        State::new(beads, RingMetrics::default())
    }

    fn ids(state: &State) -> Vec<BeadId> {
        state.beads.iter().map(|b| b.unique_id.clone()).collect()
    }

    #[test]
    fn splice_move_and_back_restores_order() {
        let mut state = state_with(3);
        let [a, b, c] = ids(&state).try_into().unwrap();

        state.reorder(0, 2);
        assert_eq!(ids(&state), vec![b.clone(), c.clone(), a.clone()]);

        state.reorder(2, 0);
        assert_eq!(ids(&state), vec![a, b, c]);
    }

    #[test]
    fn reorder_clamps_the_pending_slot_to_the_end() {
        let mut state = state_with(3);
        let first = state.beads[0].unique_id.clone();

        // Slot index 3 only exists while an insertion is pending.
        state.reorder(0, 3);
        assert_eq!(state.beads[2].unique_id, first);
    }

    #[test]
    fn reorder_out_of_range_is_a_no_op() {
        let mut state = state_with(2);
        let before = ids(&state);
        state.reorder(5, 0);
        assert_eq!(ids(&state), before);
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut state = state_with(2);
        state.remove(&BeadId::generate());
        assert_eq!(state.beads.len(), 2);
    }

    #[test]
    fn clear_resets_rotation() {
        let mut state = state_with(2);
        state.rotate_by(123.0);
        state.clear();
        assert!(state.beads.is_empty());
        assert_eq!(state.rotation_deg, 0.0);
        assert!(state.layout.placements.is_empty());
    }

    #[test]
    fn rotation_accumulates_unbounded() {
        let mut state = state_with(1);
        for _ in 0..10 {
            state.rotate_by(100.0);
        }
        assert_eq!(state.rotation_deg, 1000.0);
    }

    #[test]
    fn hit_test_finds_the_bead_under_the_pointer() {
        let state = state_with(3);
        let top = &state.beads[0];
        let placement = state.layout.get(&top.unique_id).unwrap();
        let at = state.to_screen(CENTER, placement.offset);

        assert_eq!(state.bead_at(CENTER, at), Some(top.unique_id.clone()));
        assert_eq!(state.bead_at(CENTER, CENTER), None);
    }

    #[test]
    fn hit_test_tracks_the_ring_spin() {
        let mut state = state_with(4);
        state.rotate_by(90.0);

        let top = &state.beads[0].unique_id.clone();
        let placement = state.layout.get(top).unwrap();
        let spun = state.to_screen(CENTER, placement.offset);

        assert_eq!(state.bead_at(CENTER, spun), Some(top.clone()));
    }

    #[test]
    fn removal_scenario_shrinks_state_by_one() {
        let mut state = state_with(3);
        let [a, b, c] = ids(&state).try_into().unwrap();
        let grab = state.to_screen(CENTER, state.layout.get(&b).unwrap().offset);

        state.begin_gesture(CENTER, grab);
        assert!(state.controller.is_active());

        // 250 px from center, past the 220 px threshold.
        state.move_gesture(CENTER.translated(Point::new(250.0, 0.0)));
        assert!(state.layout.will_remove);

        state.end_gesture();
        assert_eq!(ids(&state), vec![a, c]);
        assert!(!state.controller.is_active());
    }

    #[test]
    fn background_press_spins_instead_of_dragging() {
        let mut state = state_with(3);
        state.begin_gesture(CENTER, CENTER.translated(Point::new(20.0, 0.0)));

        assert!(state.controller.is_active());
        assert!(state.controller.session().is_none());

        let before = state.rotation_deg;
        state.move_gesture(CENTER.translated(Point::new(20.0, 5.0)));
        assert!(state.rotation_deg != before);

        state.end_gesture();
        assert_eq!(ids(&state).len(), 3);
    }

    #[test]
    fn save_scenario_rejects_empty_then_persists_one_bead() {
        let dir = std::env::temp_dir().join(format!("loopstone-save-{}", std::process::id()));
        let store = DesignStore::at(dir.join("design.json"));
        let mut state = state_with(0);

        assert_eq!(save_design(&state.beads, &store), "Design is empty!");
        assert_eq!(store.load(), None);

        let product = builtin_products().remove(0);
        state.push(PlacedBead::new(product, BeadId::generate()));
        assert_eq!(save_design(&state.beads, &store), "Design Saved!");
        assert_eq!(store.load(), Some(state.beads.clone()));

        store.clear().unwrap();
    }

    #[test]
    fn clear_scenario_notices_and_resets() {
        let dir = std::env::temp_dir().join(format!("loopstone-clear-{}", std::process::id()));
        let store = DesignStore::at(dir.join("design.json"));

        let mut empty = state_with(0);
        assert_eq!(clear_design(&mut empty, &store), "Design is already empty");

        let mut state = state_with(2);
        state.rotate_by(45.0);
        save_design(&state.beads, &store);

        assert_eq!(clear_design(&mut state, &store), "Design Cleared");
        assert!(state.beads.is_empty());
        assert_eq!(state.rotation_deg, 0.0);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn steady_layout_reduces_to_the_slot_formula_after_release() {
        let mut state = state_with(4);
        let grab = state.to_screen(CENTER, state.layout.get(&state.beads[1].unique_id).unwrap().offset);

        state.begin_gesture(CENTER, grab);
        state.move_gesture(CENTER.translated(Point::new(0.0, 100.0)));
        state.end_gesture();

        let steady = compute_placements(&state.metrics, &state.beads, state.rotation_deg, None, false);
        assert_eq!(state.layout, steady);
    }
}
