use std::error;
use std::fmt::{self, Display, Formatter};

use crate::direction::Direction;
use crate::heap::Handle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    MalformedPuzzle { boxes: usize, goals: usize },
    MissingAgent,
    AmbiguousAgent { count: usize },
    UnknownTile { tile: char, row: usize, col: usize },
    InvalidDirection(char),
    IllegalMove { step: usize, direction: Direction },
    InvalidHandle(Handle),
    NoSolutionFound,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedPuzzle { boxes, goals } => write!(
                f,
                "Different numbers of boxes and goals ({boxes} boxes, {goals} goals)"
            ),
            Error::MissingAgent => write!(
                f,
                "Player position not found, please indicate the player with an 'S'"
            ),
            Error::AmbiguousAgent { count } => write!(
                f,
                "Too many player positions ({count}), there should only be one 'S'"
            ),
            Error::UnknownTile { tile, row, col } => {
                write!(f, "Invalid character {tile:?} at row {row}, column {col}")
            }
            Error::InvalidDirection(c) => write!(f, "Invalid direction: {c:?}"),
            Error::IllegalMove { step, direction } => {
                write!(f, "Illegal move {direction} at step {step}")
            }
            Error::InvalidHandle(handle) => {
                write!(f, "Heap handle {handle} is not currently in use")
            }
            Error::NoSolutionFound => write!(f, "No solution found"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
