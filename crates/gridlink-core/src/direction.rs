//! Spatial directions, direction sets, and block positions.

use std::fmt;

use crate::id::WorldId;

/// One of the six axis-aligned sides of a block.
///
/// The discriminant is the side's ordinal; it is used as the bit index
/// in [`DirectionSet`] and in the packed connection criteria.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    /// Negative y.
    Down = 0,
    /// Positive y.
    Up = 1,
    /// Negative z.
    North = 2,
    /// Positive z.
    South = 3,
    /// Negative x.
    West = 4,
    /// Positive x.
    East = 5,
}

impl Direction {
    /// All six sides in ordinal order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Ordinal index in `0..6`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The side facing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Unit offset `(dx, dy, dz)` for this side.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        f.write_str(name)
    }
}

/// A set of [`Direction`]s stored as a 6-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// No sides.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All six sides.
    pub const fn all() -> Self {
        Self(0b11_1111)
    }

    /// Raw 6-bit mask.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build a set from a raw mask; bits above 5 are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11_1111)
    }

    /// Add a side.
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    /// Remove a side.
    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    /// Whether `dir` is in the set.
    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    /// Whether the set has no sides.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of sides in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the contained sides in ordinal order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::empty();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

/// Integer block position inside a world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl Position {
    /// Construct a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent position on side `dir`.
    pub fn offset(self, dir: Direction) -> Position {
        let (dx, dy, dz) = dir.offset();
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A position qualified by the world it lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Owning world.
    pub world: WorldId,
    /// Block position within the world.
    pub position: Position,
}

impl Location {
    /// Construct a location.
    pub const fn new(world: WorldId, position: Position) -> Self {
        Self { world, position }
    }
}
