//! Cheap tests for box placements that can never be solved.
//!
//! All of these are sound but incomplete: a rejected placement is always hopeless, but plenty of
//! hopeless placements get through and are left for the search to exhaust.

use crate::board::Board;
use crate::direction::Direction;
use crate::point::Point;

// A box off-goal with a wall on one vertical side and one horizontal side can never move again
pub fn is_cornered(board: &Board, cell: Point) -> bool {
    if board.is_goal(cell) {
        return false;
    }

    let wall = |direction: Direction| board.is_wall(cell + direction.delta());

    (wall(Direction::Up) || wall(Direction::Down))
        && (wall(Direction::Left) || wall(Direction::Right))
}

// No sequence of pushes gets a box from here onto any goal
pub fn is_dead_cell(board: &Board, cell: Point) -> bool {
    !board.can_reach_goal(cell)
}

/// A box just pushed to `cell` in `direction` that ran up against a wall or box forms a 2x2
/// block with its perpendicular neighbors. If every cell of that block is wall or box, none of
/// those boxes can ever move, so any of them off-goal is fatal.
///
/// `is_box` must describe the layout after the push.
pub fn is_frozen<F>(board: &Board, is_box: F, cell: Point, direction: Direction) -> bool
where
    F: Fn(Point) -> bool,
{
    let blocked = |p: Point| board.is_wall(p) || is_box(p);

    let ahead = cell + direction.delta();
    if !blocked(ahead) {
        return false;
    }

    [direction.rotate_left(), direction.rotate_right()]
        .iter()
        .any(|side| {
            let block = [cell, ahead, cell + side.delta(), ahead + side.delta()];

            block.iter().all(|p| blocked(*p))
                && block.iter().any(|p| is_box(*p) && !board.is_goal(*p))
        })
}

/// Checked before a successor is built: may a box be pushed onto `cell` going `direction`?
pub fn is_deadlock<F>(board: &Board, is_box: F, cell: Point, direction: Direction) -> bool
where
    F: Fn(Point) -> bool,
{
    if is_dead_cell(board, cell) {
        log::trace!("{cell:?} cannot reach a goal");
        return true;
    }

    if is_cornered(board, cell) {
        log::trace!("{cell:?} is a corner");
        return true;
    }

    if is_frozen(board, is_box, cell, direction) {
        log::trace!("{cell:?} is frozen pushing {direction}");
        return true;
    }

    false
}
