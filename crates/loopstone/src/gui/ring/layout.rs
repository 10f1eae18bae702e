use super::{RingMetrics, START_OFFSET};
use beadstock::design::{BeadId, PlacedBead};
use beadstock::geom::{Point, normalize_angle};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Transient drag input: which bead the pointer holds, and the pointer's
/// polar coordinates around the ring center, in the SCREEN frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub bead: BeadId,
    pub pointer_angle: f64,
    pub pointer_distance: f64,
}

/// Where one bead sits this frame. Offsets are in the ring's LOCAL
/// (unrotated) frame; the renderer applies the ring rotation around the
/// center before using them.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub offset: Point,
    /// The bead's own orientation, degrees; keeps the string-hole axis
    /// tangent to the ring.
    pub rotation_deg: f64,
    pub is_dragging: bool,
    pub will_be_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RingLayout {
    /// One entry per placed bead, in sequence order.
    pub placements: Vec<(BeadId, Placement)>,
    /// The slot the dragged bead would occupy on release.
    pub insertion_slot: Option<usize>,
    /// Releasing now deletes the dragged bead.
    pub will_remove: bool,
}

impl RingLayout {
    pub fn get(&self, id: &BeadId) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|(bead, _)| bead == id)
            .map(|(_, p)| p)
    }
}

/// Steady-state angle of slot `index` out of `n`, local frame. Slot 0 is at
/// the top; indices increase clockwise.
pub fn slot_angle(index: usize, n: usize) -> f64 {
    (index as f64 / n as f64) * TAU + START_OFFSET
}

fn bead_rotation_deg(angle: f64) -> f64 {
    angle.to_degrees() + 90.0
}

/// The whole-ring placement pass: pure, run on every pointer move.
///
/// `insertion_pending` opens one extra slot at the end of the sequence while
/// an entrance flight is aiming for it.
pub fn compute_placements(
    metrics: &RingMetrics,
    beads: &[PlacedBead],
    rotation_deg: f64,
    drag: Option<&DragSession>,
    insertion_pending: bool,
) -> RingLayout {
    let effective = beads.len() + usize::from(insertion_pending);
    if effective == 0 {
        return RingLayout::default();
    }

    let rotation_rad = rotation_deg.to_radians();
    let drag_index = drag.and_then(|d| beads.iter().position(|b| b.unique_id == d.bead));

    let mut insertion_slot = None;
    let mut will_remove = false;
    if let (Some(d), Some(_)) = (drag, drag_index) {
        if d.pointer_distance > metrics.remove_threshold {
            will_remove = true;
        } else {
            // Slot math happens in the ring's own frame: undo the spin first,
            // then shift so slot 0 maps to a zero turn fraction.
            let local_angle = d.pointer_angle - rotation_rad;
            let turn = normalize_angle(local_angle + FRAC_PI_2) / TAU;
            insertion_slot = Some((turn * effective as f64).round() as usize % effective);
        }
    }

    let placements = beads
        .iter()
        .enumerate()
        .map(|(index, bead)| {
            let placement = match (drag, drag_index) {
                (Some(d), Some(from)) if index == from => {
                    dragged_placement(d, rotation_rad, will_remove)
                }
                _ => {
                    let visual = shifted_index(index, drag_index, insertion_slot);
                    steady_placement(metrics, visual, effective)
                }
            };
            (bead.unique_id.clone(), placement)
        })
        .collect();

    RingLayout {
        placements,
        insertion_slot,
        will_remove,
    }
}

fn steady_placement(metrics: &RingMetrics, index: usize, n: usize) -> Placement {
    let angle = slot_angle(index, n);
    Placement {
        offset: Point::polar(angle, metrics.radius),
        rotation_deg: bead_rotation_deg(angle),
        is_dragging: false,
        will_be_removed: false,
    }
}

/// The dragged bead tracks the raw pointer, never a slot.
fn dragged_placement(drag: &DragSession, rotation_rad: f64, will_remove: bool) -> Placement {
    let local_angle = drag.pointer_angle - rotation_rad;
    Placement {
        offset: Point::polar(local_angle, drag.pointer_distance),
        rotation_deg: bead_rotation_deg(local_angle),
        is_dragging: true,
        will_be_removed: will_remove,
    }
}

/// Preview shift for non-dragged beads: everything strictly between the
/// dragged bead's slot and the insertion slot slides by exactly one position
/// toward the vacated slot.
fn shifted_index(original: usize, dragged: Option<usize>, slot: Option<usize>) -> usize {
    match (dragged, slot) {
        (Some(from), Some(to)) if from < to && original > from && original <= to => original - 1,
        (Some(from), Some(to)) if from > to && original >= to && original < from => original + 1,
        _ => original,
    }
}

/// Screen-frame flight destination for a product about to join the ring: the
/// provisional last slot once the ring grows by one.
pub fn flight_target(metrics: &RingMetrics, count: usize, rotation_deg: f64) -> (Point, f64) {
    let n = count + 1;
    let final_angle = slot_angle(n - 1, n) + rotation_deg.to_radians();
    (
        Point::polar(final_angle, metrics.radius),
        bead_rotation_deg(final_angle),
    )
}
