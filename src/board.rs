use std::collections::VecDeque;

use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::point::Point;
use crate::sokoban::Configuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Goal,
}

// The static part of a puzzle: walls and goals never move, so everything here is computed once
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    goals: Vec<Point>,

    // Per cell: open neighbors one agent step away, and the cells that list this one as a neighbor
    // Only cells connected to the starting position have entries
    neighbors: Vec<Vec<Point>>,
    reverse_neighbors: Vec<Vec<Point>>,

    // Per cell: a box standing here could still be pushed onto at least one goal
    goal_reachable: Vec<bool>,
}

impl Board {
    /// Parse a puzzle, returning the static board and the starting configuration.
    ///
    /// Rows shorter than the widest are padded with floor. Parsing stops at the first empty line.
    pub fn parse(input: &str) -> Result<(Board, Configuration)> {
        let lines = input
            .lines()
            .take_while(|line| !line.is_empty())
            .map(|line| line.chars().collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let height = lines.len();
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);

        let mut tiles = Vec::with_capacity(width * height);
        let mut goals = Vec::new();
        let mut boxes = Vec::new();
        let mut agents = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            for col in 0..width {
                let p = Point::new(row as isize, col as isize);
                let c = line.get(col).copied().unwrap_or(' ');

                tiles.push(match c {
                    '#' => Tile::Wall,
                    ' ' => Tile::Floor,
                    '.' => Tile::Goal,
                    'b' => {
                        boxes.push(p);
                        Tile::Floor
                    }
                    'B' => {
                        boxes.push(p);
                        Tile::Goal
                    }
                    'S' => {
                        agents.push(p);
                        Tile::Floor
                    }
                    _ => return Err(Error::UnknownTile { tile: c, row, col }),
                });

                if tiles[tiles.len() - 1] == Tile::Goal {
                    goals.push(p);
                }
            }
        }

        if boxes.len() != goals.len() {
            return Err(Error::MalformedPuzzle {
                boxes: boxes.len(),
                goals: goals.len(),
            });
        }

        let agent = match agents.as_slice() {
            [] => return Err(Error::MissingAgent),
            [agent] => *agent,
            _ => {
                return Err(Error::AmbiguousAgent {
                    count: agents.len(),
                })
            }
        };

        let mut board = Board {
            width,
            height,
            tiles,
            goals,
            neighbors: vec![Vec::new(); width * height],
            reverse_neighbors: vec![Vec::new(); width * height],
            goal_reachable: vec![false; width * height],
        };
        board.build_adjacency(agent);
        board.build_goal_reachable();

        log::debug!(
            "Parsed {}x{} board with {} goals, agent at {:?}",
            width,
            height,
            board.goals.len(),
            agent
        );

        Ok((board, Configuration::new(agent, boxes)))
    }

    // Explore everything the agent could ever stand on, treating boxes as floor
    fn build_adjacency(&mut self, start: Point) {
        let mut visited = vec![false; self.width * self.height];
        let mut to_check = vec![start];

        while let Some(p) = to_check.pop() {
            let Some(index) = self.index(p) else { continue };
            if visited[index] {
                continue;
            }
            visited[index] = true;

            for direction in Direction::ALL {
                let next = p + direction.delta();
                if self.is_wall(next) || self.is_wall(next + direction.flip().delta()) {
                    continue;
                }

                self.neighbors[index].push(next);
                if let Some(next_index) = self.index(next) {
                    self.reverse_neighbors[next_index].push(p);
                }
                to_check.push(next);
            }
        }
    }

    // Flood backwards from every goal: a box at `p` can be pushed onto `next` when the agent
    // has somewhere to stand behind it
    fn build_goal_reachable(&mut self) {
        let mut queue = VecDeque::new();

        for goal in self.goals.iter() {
            if let Some(index) = self.index(*goal) {
                self.goal_reachable[index] = true;
                queue.push_back(*goal);
            }
        }

        while let Some(next) = queue.pop_front() {
            let Some(next_index) = self.index(next) else { continue };

            for p in self.reverse_neighbors[next_index].clone() {
                let behind = p + (p - next);
                let Some(index) = self.index(p) else { continue };

                if self.goal_reachable[index] || self.is_wall(behind) {
                    continue;
                }

                self.goal_reachable[index] = true;
                queue.push_back(p);
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn goals(&self) -> &[Point] {
        &self.goals
    }

    pub fn index(&self, p: Point) -> Option<usize> {
        if p.row < 0 || p.col < 0 || p.row as usize >= self.height || p.col as usize >= self.width
        {
            return None;
        }

        Some(p.row as usize * self.width + p.col as usize)
    }

    // Anything off the grid counts as wall
    pub fn tile(&self, p: Point) -> Tile {
        match self.index(p) {
            Some(index) => self.tiles[index],
            None => Tile::Wall,
        }
    }

    pub fn is_wall(&self, p: Point) -> bool {
        self.tile(p) == Tile::Wall
    }

    pub fn is_goal(&self, p: Point) -> bool {
        self.tile(p) == Tile::Goal
    }

    pub fn neighbors(&self, p: Point) -> &[Point] {
        match self.index(p) {
            Some(index) => &self.neighbors[index],
            None => &[],
        }
    }

    pub fn reverse_neighbors(&self, p: Point) -> &[Point] {
        match self.index(p) {
            Some(index) => &self.reverse_neighbors[index],
            None => &[],
        }
    }

    pub fn can_reach_goal(&self, p: Point) -> bool {
        match self.index(p) {
            Some(index) => self.goal_reachable[index],
            None => false,
        }
    }

    /// Returns (sum over goals of the distance to the nearest box,
    /// sum over boxes of the distance to the nearest goal), ignoring walls.
    pub fn heuristic_sums(&self, boxes: &[Point]) -> (isize, isize) {
        let goal_to_box = self
            .goals
            .iter()
            .map(|goal| {
                boxes
                    .iter()
                    .map(|b| goal.manhattan_distance(*b))
                    .min()
                    .unwrap_or(0)
            })
            .sum::<isize>();

        let box_to_goal = boxes
            .iter()
            .map(|b| {
                self.goals
                    .iter()
                    .map(|goal| b.manhattan_distance(*goal))
                    .min()
                    .unwrap_or(0)
            })
            .sum::<isize>();

        (goal_to_box, box_to_goal)
    }

    // Each sum alone bounds the remaining pushes from below, so their mean does too
    pub fn heuristic(&self, boxes: &[Point]) -> i64 {
        let (goal_to_box, box_to_goal) = self.heuristic_sums(boxes);
        ((goal_to_box + box_to_goal) / 2) as i64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SMALL: &str = "\
######
#Sb .#
##  ##
 # B#
 ####";

    #[test]
    fn test_parse_small() {
        let (board, initial) = Board::parse(SMALL).unwrap();

        assert_eq!(board.width(), 6);
        assert_eq!(board.height(), 5);
        assert_eq!(board.goals(), &[Point::new(1, 4), Point::new(3, 3)]);
        assert_eq!(initial.agent, Point::new(1, 1));
        assert_eq!(initial.boxes, vec![Point::new(1, 2), Point::new(3, 3)]);

        // Short rows are padded with floor
        assert_eq!(board.tile(Point::new(3, 5)), Tile::Floor);
        assert_eq!(board.tile(Point::new(3, 3)), Tile::Goal);
        assert!(board.is_wall(Point::new(-1, 0)));
        assert!(board.is_wall(Point::new(0, 6)));
    }

    #[test]
    fn test_adjacency() {
        let (board, _) = Board::parse(SMALL).unwrap();

        // Box cells are still floor for the agent graph
        let mut start = board.neighbors(Point::new(1, 1)).to_vec();
        start.sort();
        assert_eq!(start, vec![Point::new(1, 2)]);

        let mut middle = board.neighbors(Point::new(2, 2)).to_vec();
        middle.sort();
        assert_eq!(
            middle,
            vec![Point::new(1, 2), Point::new(2, 3), Point::new(3, 2)]
        );

        let mut incoming = board.reverse_neighbors(Point::new(1, 2)).to_vec();
        incoming.sort();
        assert_eq!(
            incoming,
            vec![Point::new(1, 1), Point::new(1, 3), Point::new(2, 2)]
        );

        // Padding outside the walls is never visited
        assert!(board.neighbors(Point::new(3, 5)).is_empty());
        assert!(board.neighbors(Point::new(3, 0)).is_empty());
    }

    #[test]
    fn test_goal_reachable() {
        let (board, _) = Board::parse(SMALL).unwrap();

        assert!(board.can_reach_goal(Point::new(1, 4)));
        assert!(board.can_reach_goal(Point::new(1, 3)));
        assert!(board.can_reach_goal(Point::new(1, 2)));
        assert!(board.can_reach_goal(Point::new(2, 3)));

        // Dead corners and unreachable padding
        assert!(!board.can_reach_goal(Point::new(1, 1)));
        assert!(!board.can_reach_goal(Point::new(3, 2)));
        assert!(!board.can_reach_goal(Point::new(3, 5)));
    }

    #[test]
    fn test_heuristic() {
        let (board, initial) = Board::parse(SMALL).unwrap();

        assert_eq!(board.heuristic_sums(&initial.boxes), (2, 2));
        assert_eq!(board.heuristic(&initial.boxes), 2);

        let solved = [Point::new(1, 4), Point::new(3, 3)];
        assert_eq!(board.heuristic(&solved), 0);
        assert_eq!(board.heuristic(&[]), 0);
    }

    #[test]
    fn test_mismatched_counts() {
        let input = "\
#####
#Sbb#
#  .#
#####";
        assert_eq!(
            Board::parse(input).unwrap_err(),
            Error::MalformedPuzzle { boxes: 2, goals: 1 }
        );

        // Box on goal counts as both
        assert!(Board::parse("#####\n#SBb#\n#. .#\n#####").is_err());
        assert!(Board::parse("#####\n#SBb#\n#  .#\n#####").is_ok());
    }

    #[test]
    fn test_agent_errors() {
        assert_eq!(
            Board::parse("#####\n# b #\n# . #\n#####").unwrap_err(),
            Error::MissingAgent
        );
        assert_eq!(
            Board::parse("#####\n#Sb #\n#S. #\n#####").unwrap_err(),
            Error::AmbiguousAgent { count: 2 }
        );
    }

    #[test]
    fn test_unknown_tile() {
        assert_eq!(
            Board::parse("#####\n#S?.#\n#####").unwrap_err(),
            Error::UnknownTile {
                tile: '?',
                row: 1,
                col: 2
            }
        );
    }

    #[test]
    fn test_stops_at_empty_line() {
        let input = "#####\n#S  #\n#####\n\n17\n";
        let (board, initial) = Board::parse(input).unwrap();

        assert_eq!(board.height(), 3);
        assert!(board.goals().is_empty());
        assert!(initial.boxes.is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let (board, _) = Board::parse("#####\r\n#Sb.#\r\n#####\r\n").unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.goals(), &[Point::new(1, 3)]);
    }
}
