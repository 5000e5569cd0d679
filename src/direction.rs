use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl From<Direction> for Point {
    fn from(direction: Direction) -> Point {
        match direction {
            Direction::Up => Point { row: -1, col: 0 },
            Direction::Down => Point { row: 1, col: 0 },
            Direction::Left => Point { row: 0, col: -1 },
            Direction::Right => Point { row: 0, col: 1 },
        }
    }
}

// Only unit steps name a direction
impl From<Point> for Direction {
    fn from(point: Point) -> Direction {
        match point {
            Point { row: -1, col: 0 } => Direction::Up,
            Point { row: 1, col: 0 } => Direction::Down,
            Point { row: 0, col: -1 } => Direction::Left,
            Point { row: 0, col: 1 } => Direction::Right,
            _ => panic!("Invalid point: {:?}", point),
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = Error;

    fn try_from(value: char) -> Result<Self> {
        match value {
            'U' | 'u' | '^' | '↑' => Ok(Direction::Up),
            'D' | 'd' | 'v' | '↓' => Ok(Direction::Down),
            'L' | 'l' | '<' | '←' => Ok(Direction::Left),
            'R' | 'r' | '>' | '→' => Ok(Direction::Right),
            _ => Err(Error::InvalidDirection(value)),
        }
    }
}

impl From<Direction> for char {
    fn from(direction: Direction) -> char {
        match direction {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn flip(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    // Counter-clockwise quarter turn
    pub fn rotate_left(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    // Clockwise quarter turn
    pub fn rotate_right(&self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn delta(&self) -> Point {
        Point::from(*self)
    }

    // Arrow used when drawing the agent after it moved this way
    pub fn arrow(&self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flip_is_opposite_delta() {
        for d in Direction::ALL {
            assert_eq!(d.delta() + d.flip().delta(), Point::new(0, 0));
            assert_eq!(d.flip().flip(), d);
        }
    }

    #[test]
    fn test_rotations() {
        for d in Direction::ALL {
            assert_eq!(d.rotate_left().rotate_right(), d);
            assert_eq!(d.rotate_right().rotate_right(), d.flip());
            assert_eq!(d.rotate_left().delta().manhattan_distance(d.delta()), 2);
        }
        assert_eq!(Direction::Up.rotate_right(), Direction::Right);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Direction::try_from('u').unwrap(), Direction::Up);
        assert_eq!(Direction::try_from('R').unwrap(), Direction::Right);
        assert_eq!(Direction::try_from('←').unwrap(), Direction::Left);
        assert!(Direction::try_from('x').is_err());
        assert_eq!(char::from(Direction::Down), 'D');
    }
}
