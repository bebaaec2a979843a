//! Directional attachment sites.
//!
//! A [`Port`] marks where a structure may be docked to another one. Its frame is the position
//! `anchor + offset` together with an orientation vector that points away from the anchor,
//! along the bond that the port stands for. Ports reference their anchor particle by id and
//! never own it.

use super::types::{NodeId, Point, Vector};

/// Anchored directional frame with a one-way consumed flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    /// Particle the port is attached to, if any.
    pub anchor: Option<NodeId>,
    /// Offset from the anchor position, or the absolute position when unanchored.
    pub offset: Vector,
    orientation: Vector,
    consumed: bool,
}

impl Port {
    /// Creates an open port sitting on `anchor` and pointing along +y.
    pub fn anchored(anchor: NodeId) -> Self {
        Self {
            anchor: Some(anchor),
            offset: Vector::zeros(),
            orientation: Vector::y(),
            consumed: false,
        }
    }

    /// Creates an open, unanchored port at an absolute position, pointing along +y.
    pub fn free(position: Point) -> Self {
        Self {
            anchor: None,
            offset: position.coords,
            orientation: Vector::y(),
            consumed: false,
        }
    }

    /// Creates a port on `anchor` that points along `direction` and sits `separation`
    /// nanometres away from the anchor in that direction.
    ///
    /// A zero `direction` leaves the port on the anchor with a degenerate orientation, which
    /// the docking engine rejects.
    pub fn toward(anchor: NodeId, direction: Vector, separation: f64) -> Self {
        let unit = direction.try_normalize(f64::EPSILON).unwrap_or_else(Vector::zeros);
        Self {
            anchor: Some(anchor),
            offset: unit * separation,
            orientation: direction,
            consumed: false,
        }
    }

    pub fn with_offset(mut self, offset: Vector) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_orientation(mut self, orientation: Vector) -> Self {
        self.orientation = orientation;
        self
    }

    /// Orientation vector of the port frame.
    pub fn orientation(&self) -> Vector {
        self.orientation
    }

    /// Absolute position of the frame given the current anchor position.
    ///
    /// `anchor_pos` must be the position of [`Port::anchor`]; it is ignored for unanchored
    /// ports.
    pub fn position(&self, anchor_pos: Option<Point>) -> Point {
        match (self.anchor, anchor_pos) {
            (Some(_), Some(base)) => base + self.offset,
            _ => Point::from(self.offset),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.consumed
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Marks the port as used. There is no way back.
    pub(crate) fn consume(&mut self) {
        self.consumed = true;
    }

    /// Stores a new absolute frame, re-expressing it relative to the anchor.
    pub(crate) fn set_frame(&mut self, position: Point, orientation: Vector, anchor_pos: Option<Point>) {
        self.offset = match (self.anchor, anchor_pos) {
            (Some(_), Some(base)) => position - base,
            _ => position.coords,
        };
        self.orientation = orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn some_id() -> NodeId {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        map.insert(())
    }

    #[test]
    fn anchored_port_starts_open_on_its_anchor() {
        let anchor = some_id();
        let port = Port::anchored(anchor);

        assert_eq!(port.anchor, Some(anchor));
        assert!(port.is_open());
        assert_eq!(port.orientation(), Vector::y());
        assert_eq!(port.position(Some(Point::new(1.0, 2.0, 3.0))), Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn toward_places_port_along_direction() {
        let port = Port::toward(some_id(), Vector::new(0.0, 0.0, 2.0), 0.07);

        let pos = port.position(Some(Point::origin()));
        assert!((pos - Point::new(0.0, 0.0, 0.07)).norm() < 1e-12);
        assert_eq!(port.orientation(), Vector::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn free_port_position_is_absolute() {
        let port = Port::free(Point::new(4.0, 5.0, 6.0));

        assert_eq!(port.position(None), Point::new(4.0, 5.0, 6.0));
        assert_eq!(port.position(Some(Point::new(1.0, 1.0, 1.0))), Point::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn consume_is_one_way() {
        let mut port = Port::anchored(some_id());

        port.consume();
        port.consume();

        assert!(port.is_consumed());
        assert!(!port.is_open());
    }

    #[test]
    fn set_frame_reexpresses_offset_relative_to_anchor() {
        let mut port = Port::anchored(some_id());

        port.set_frame(
            Point::new(1.0, 1.0, 0.0),
            Vector::x(),
            Some(Point::new(1.0, 0.0, 0.0)),
        );

        assert!((port.offset - Vector::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        assert_eq!(port.orientation(), Vector::x());
    }
}
