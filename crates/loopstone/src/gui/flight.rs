use beadstock::catalog::BeadProduct;
use beadstock::geom::Point;

pub const FLIGHT_MS: f64 = 600.0;
const START_SCALE: f64 = 0.5;
const START_ALPHA: f64 = 0.8;

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// The entrance tween: a just-selected product flying from the catalog grid
/// to the ring slot it will occupy. Pure presentation; the bead joins the
/// sequence only once the flight lands.
#[derive(Debug, Clone)]
pub struct Flight {
    pub product: BeadProduct,
    from: Point,
    to: Point,
    to_rotation_deg: f64,
    elapsed_ms: f64,
}

impl Flight {
    pub fn new(product: BeadProduct, from: Point, to: Point, to_rotation_deg: f64) -> Self {
        Self {
            product,
            from,
            to,
            to_rotation_deg,
            elapsed_ms: 0.0,
        }
    }

    /// Advances by a frame delta; returns true once the flight has landed.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(FLIGHT_MS);
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= FLIGHT_MS
    }

    fn progress(&self) -> f64 {
        ease_out_cubic(self.elapsed_ms / FLIGHT_MS)
    }

    pub fn position(&self) -> Point {
        let t = self.progress();
        Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        )
    }

    pub fn scale(&self) -> f64 {
        START_SCALE + (1.0 - START_SCALE) * self.progress()
    }

    pub fn alpha(&self) -> f64 {
        START_ALPHA + (1.0 - START_ALPHA) * self.progress()
    }

    pub fn rotation_deg(&self) -> f64 {
        self.to_rotation_deg * self.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadstock::catalog::builtin_products;

    fn flight() -> Flight {
        Flight::new(
            builtin_products().remove(0),
            Point::new(100.0, 700.0),
            Point::new(240.0, 170.0),
            45.0,
        )
    }

    #[test]
    fn starts_at_the_selector_and_lands_on_the_slot() {
        let mut f = flight();
        assert_eq!(f.position(), Point::new(100.0, 700.0));
        assert_eq!(f.scale(), 0.5);

        assert!(f.advance(FLIGHT_MS));
        assert_eq!(f.position(), Point::new(240.0, 170.0));
        assert_eq!(f.scale(), 1.0);
        assert_eq!(f.alpha(), 1.0);
        assert_eq!(f.rotation_deg(), 45.0);
    }

    #[test]
    fn lands_exactly_once_despite_oversized_frames() {
        let mut f = flight();
        assert!(!f.advance(FLIGHT_MS / 2.0));
        assert!(f.advance(FLIGHT_MS * 10.0));
        assert!(f.is_done());
        assert_eq!(f.position(), Point::new(240.0, 170.0));
    }

    #[test]
    fn progress_is_monotonic() {
        let mut f = flight();
        let mut last = 0.0;
        while !f.advance(16.0) {
            let t = f.progress();
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn negative_frame_deltas_do_not_rewind() {
        let mut f = flight();
        f.advance(100.0);
        let before = f.position();
        f.advance(-50.0);
        assert_eq!(f.position(), before);
    }
}
