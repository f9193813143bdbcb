//! Strongly-typed identifiers, block faces, and the [`Position`] type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a channel within a network controller.
///
/// A controller multiplexes several channels; each channel schedules one
/// resource kind independently of the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChannelId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a connector block within a network.
///
/// Consumer IDs are allocated by the network and resolved to a world
/// position through [`ControllerContext::resolve_position`](crate::ControllerContext::resolve_position).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerId(pub u32);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ConsumerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a kind of resource (a gas, a fluid, an energy form).
///
/// Stacks are only compatible with each other when their types are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceType(pub u32);

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ResourceType {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// One of the six faces of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Negative Y.
    Down,
    /// Positive Y.
    Up,
    /// Negative Z.
    North,
    /// Positive Z.
    South,
    /// Negative X.
    West,
    /// Positive X.
    East,
}

impl Side {
    /// All six faces in ordinal order.
    pub const ALL: [Side; 6] = [
        Side::Down,
        Side::Up,
        Side::North,
        Side::South,
        Side::West,
        Side::East,
    ];

    /// The face pointing the other way.
    pub fn opposite(self) -> Side {
        match self {
            Side::Down => Side::Up,
            Side::Up => Side::Down,
            Side::North => Side::South,
            Side::South => Side::North,
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }

    /// Unit step `(dx, dy, dz)` taken when moving through this face.
    pub fn step(self) -> (i32, i32, i32) {
        match self {
            Side::Down => (0, -1, 0),
            Side::Up => (0, 1, 0),
            Side::North => (0, 0, -1),
            Side::South => (0, 0, 1),
            Side::West => (-1, 0, 0),
            Side::East => (1, 0, 0),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Down => "down",
            Side::Up => "up",
            Side::North => "north",
            Side::South => "south",
            Side::West => "west",
            Side::East => "east",
        };
        f.write_str(name)
    }
}

/// An integer block position in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl Position {
    /// Construct a position from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighbouring position through `side`.
    pub fn offset(self, side: Side) -> Position {
        let (dx, dy, dz) = side.step();
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Identifies one connector face: the connector block and the side of it
/// that touches the addressed handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointRef {
    /// The connector block.
    pub consumer: ConsumerId,
    /// The side of the connector facing the handler.
    pub side: Side,
}

impl EndpointRef {
    /// Construct an endpoint reference.
    pub const fn new(consumer: ConsumerId, side: Side) -> Self {
        Self { consumer, side }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.consumer, self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_back_is_identity() {
        let p = Position::new(3, 64, -7);
        for side in Side::ALL {
            assert_eq!(p.offset(side).offset(side.opposite()), p);
        }
    }

    #[test]
    fn offset_moves_one_block() {
        let p = Position::new(0, 0, 0);
        assert_eq!(p.offset(Side::East), Position::new(1, 0, 0));
        assert_eq!(p.offset(Side::Down), Position::new(0, -1, 0));
        assert_eq!(p.offset(Side::North), Position::new(0, 0, -1));
    }

    #[test]
    fn endpoint_display() {
        let e = EndpointRef::new(ConsumerId(12), Side::West);
        assert_eq!(e.to_string(), "12@west");
    }
}
