use std::collections::VecDeque;

use crate::board::Board;
use crate::direction::Direction;
use crate::point::Point;

// Every cell the agent can walk to without pushing anything
#[derive(Debug, Clone)]
pub struct Reach {
    origin: Point,
    width: usize,
    // Per cell: steps from the origin and the direction of the last step taken to get there
    cells: Vec<Option<(usize, Option<Direction>)>>,
}

impl Reach {
    // Breadth first from the agent, so the first visit to a cell is along a shortest path
    // `boxes` must be sorted
    pub fn new(board: &Board, agent: Point, boxes: &[Point]) -> Reach {
        let mut cells = vec![None; board.width() * board.height()];

        if let Some(index) = board.index(agent) {
            cells[index] = Some((0, None));
        }

        let mut queue = VecDeque::from([(agent, 0)]);
        while let Some((p, distance)) = queue.pop_front() {
            for next in board.neighbors(p) {
                let Some(index) = board.index(*next) else { continue };
                if cells[index].is_some() || boxes.binary_search(next).is_ok() {
                    continue;
                }

                cells[index] = Some((distance + 1, Some(Direction::from(*next - p))));
                queue.push_back((*next, distance + 1));
            }
        }

        Reach {
            origin: agent,
            width: board.width(),
            cells,
        }
    }

    fn cell(&self, p: Point) -> Option<(usize, Option<Direction>)> {
        if p.row < 0 || p.col < 0 || p.col as usize >= self.width {
            return None;
        }

        self.cells
            .get(p.row as usize * self.width + p.col as usize)
            .copied()
            .flatten()
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn contains(&self, p: Point) -> bool {
        self.cell(p).is_some()
    }

    pub fn distance(&self, p: Point) -> Option<usize> {
        self.cell(p).map(|(distance, _)| distance)
    }

    // One shortest walk from the origin to `p`
    pub fn path(&self, p: Point) -> Option<Vec<Direction>> {
        let (distance, _) = self.cell(p)?;
        let mut path = Vec::with_capacity(distance);

        let mut current = p;
        while let Some((_, Some(direction))) = self.cell(current) {
            path.push(direction);
            current = current - direction.delta();
        }

        path.reverse();
        Some(path)
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
