use std::ops::{Add, Mul, Sub};

use serde::Serialize;

// A cell on the grid, rows grow downwards and columns to the right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    pub row: isize,
    pub col: isize,
}

impl Point {
    pub const fn new(row: isize, col: isize) -> Point {
        Point { row, col }
    }

    pub fn manhattan_distance(&self, other: Point) -> isize {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl Add<Point> for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            row: self.row + other.row,
            col: self.col + other.col,
        }
    }
}

impl Sub<Point> for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            row: self.row - other.row,
            col: self.col - other.col,
        }
    }
}

impl Mul<isize> for Point {
    type Output = Point;

    fn mul(self, other: isize) -> Point {
        Point {
            row: self.row * other,
            col: self.col * other,
        }
    }
}
