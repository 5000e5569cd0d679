use std::fmt;

use serde::Serialize;

use crate::board::{Board, Tile};
use crate::deadlock;
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::point::Point;
use crate::reach::Reach;
use crate::solver::Solver;
use crate::State;

// Where the agent stands and where the boxes are
// Boxes are kept sorted so equal layouts hash the same
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Configuration {
    pub agent: Point,
    pub boxes: Vec<Point>,
}

/// One push, along with the walk the agent needed to line up behind the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Push {
    pub walk: Vec<Direction>,
    pub direction: Direction,
    #[serde(rename = "box")]
    pub from: Point,
}

impl Push {
    // Primitive moves, the push included
    pub fn moves(&self) -> Vec<Direction> {
        let mut moves = self.walk.clone();
        moves.push(self.direction);
        moves
    }
}

impl fmt::Display for Push {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for direction in self.moves() {
            write!(f, "{direction}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub moves: usize,
    pub pushes: Vec<Push>,
}

impl Solution {
    pub fn push_count(&self) -> usize {
        self.pushes.len()
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.pushes.iter().flat_map(|push| push.moves()).collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pushes = self
            .pushes
            .iter()
            .map(|push| push.to_string())
            .collect::<Vec<_>>();

        write!(f, "{}", pushes.join(", "))
    }
}

impl Configuration {
    pub fn new(agent: Point, mut boxes: Vec<Point>) -> Configuration {
        boxes.sort();
        Configuration { agent, boxes }
    }

    pub fn has_box(&self, p: Point) -> bool {
        self.boxes.binary_search(&p).is_ok()
    }

    /// Take one primitive step, pushing a box if one is in the way.
    pub fn step(&self, board: &Board, direction: Direction) -> Option<Configuration> {
        let target = self.agent + direction.delta();
        if board.is_wall(target) {
            return None;
        }

        if !self.has_box(target) {
            return Some(Configuration {
                agent: target,
                boxes: self.boxes.clone(),
            });
        }

        let beyond = target + direction.delta();
        if board.is_wall(beyond) || self.has_box(beyond) {
            return None;
        }

        let boxes = self
            .boxes
            .iter()
            .map(|b| if *b == target { beyond } else { *b })
            .collect();

        Some(Configuration::new(target, boxes))
    }

    /// Apply a sequence of primitive moves, failing on the first one that is not possible.
    pub fn replay(&self, board: &Board, moves: &[Direction]) -> Result<Configuration> {
        let mut current = self.clone();

        for (step, direction) in moves.iter().enumerate() {
            current = current
                .step(board, *direction)
                .ok_or(Error::IllegalMove {
                    step,
                    direction: *direction,
                })?;
        }

        Ok(current)
    }

    // Draw the grid with `agent` as the glyph for the agent
    pub fn draw(&self, board: &Board, agent: char) -> String {
        let mut output = String::new();

        for row in 0..board.height() {
            for col in 0..board.width() {
                let p = Point::new(row as isize, col as isize);

                output.push(if p == self.agent {
                    agent
                } else {
                    match (board.tile(p), self.has_box(p)) {
                        (Tile::Wall, _) => '#',
                        (Tile::Goal, true) => 'B',
                        (Tile::Goal, false) => '.',
                        (Tile::Floor, true) => 'b',
                        (Tile::Floor, false) => ' ',
                    }
                });
            }
            output.push('\n');
        }

        output
    }
}

impl State<Board, Push> for Configuration {
    // A box stranded where it can never reach a goal is hopeless from the start
    fn is_valid(&self, board: &Board) -> bool {
        self.boxes.iter().all(|b| board.can_reach_goal(*b))
    }

    fn is_solved(&self, board: &Board) -> bool {
        board.goals().iter().all(|goal| self.has_box(*goal))
    }

    fn next_states(&self, board: &Board) -> Option<Vec<(i64, Push, Configuration)>> {
        let reach = Reach::new(board, self.agent, &self.boxes);
        let mut next_states = Vec::new();

        for (index, b) in self.boxes.iter().enumerate() {
            for direction in Direction::ALL {
                let target = *b + direction.delta();
                let access = *b - direction.delta();

                if board.is_wall(target) || self.has_box(target) {
                    continue;
                }

                // Layout after the push, without building it yet
                let is_box = |p: Point| p == target || (p != *b && self.has_box(p));
                if deadlock::is_deadlock(board, is_box, target, direction) {
                    continue;
                }

                let Some(walk) = reach.path(access) else {
                    continue;
                };

                let mut boxes = self.boxes.clone();
                boxes[index] = target;
                let next = Configuration::new(*b, boxes);

                let push = Push {
                    walk,
                    direction,
                    from: *b,
                };
                next_states.push(((push.walk.len() + 1) as i64, push, next));
            }
        }

        if next_states.is_empty() {
            return None;
        }
        Some(next_states)
    }

    fn heuristic(&self, board: &Board) -> i64 {
        board.heuristic(&self.boxes)
    }

    fn stringify(&self, board: &Board) -> String {
        self.draw(board, 'S')
    }
}

/// Search for a shortest solution, running until solved or out of states.
pub fn solve(board: &Board, initial: &Configuration) -> Result<Solution> {
    let mut solver: Solver<Board, Configuration, Push> =
        Solver::new(board.clone(), initial.clone());
    solver.run()?;

    let moves = solver.cost()? as usize;
    let pushes = solver.path()?;

    log::info!(
        "Solved in {moves} moves ({} pushes) after {} states in {} seconds",
        pushes.len(),
        solver.states_checked(),
        solver.time_spent()
    );

    Ok(Solution { moves, pushes })
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;

    use fxhash::FxHashSet;

    use super::*;

    const SMALL: &str = "\
######
#Sb .#
##  ##
 # B#
 ####";

    // Two boxes pinned to the top wall with only one goal up there
    const PINNED: &str = "\
#######
#.b b #
#S   .#
#######";

    // Shortest solution by brute force over primitive moves
    fn breadth_first(board: &Board, initial: &Configuration) -> Option<usize> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([(initial.clone(), 0)]);
        seen.insert(initial.clone());

        while let Some((current, moves)) = queue.pop_front() {
            if current.is_solved(board) {
                return Some(moves);
            }

            for direction in Direction::ALL {
                if let Some(next) = current.step(board, direction) {
                    if seen.insert(next.clone()) {
                        queue.push_back((next, moves + 1));
                    }
                }
            }
        }

        None
    }

    fn check_solution(input: &str) -> Solution {
        let (board, initial) = Board::parse(input).unwrap();
        let solution = solve(&board, &initial).unwrap();

        let moves = solution.directions();
        assert_eq!(moves.len(), solution.moves);

        let last = initial.replay(&board, &moves).unwrap();
        assert!(last.is_solved(&board), "{}", last.draw(&board, 'S'));

        solution
    }

    #[test]
    fn test_small() {
        let solution = check_solution(SMALL);

        assert_eq!(solution.moves, 2);
        assert_eq!(solution.push_count(), 2);
        assert_eq!(solution.to_string(), "R, R");
    }

    #[test]
    fn test_cornered_box_has_no_solution() {
        let input = "\
#####
#b  #
#  .#
# S #
#####";
        let (board, initial) = Board::parse(input).unwrap();
        assert_eq!(solve(&board, &initial), Err(Error::NoSolutionFound));
    }

    #[test]
    fn test_exhausts_pinned_boxes() {
        let (board, initial) = Board::parse(PINNED).unwrap();
        assert!(initial.is_valid(&board));

        let mut solver: Solver<Board, Configuration, Push> =
            Solver::new(board.clone(), initial.clone());
        assert_eq!(solver.run(), Err(Error::NoSolutionFound));
        assert!(solver.states_checked() > 1);
        assert_eq!(breadth_first(&board, &initial), None);
    }

    #[test]
    fn test_no_boxes() {
        let input = "\
#####
#S  #
#####";
        let solution = check_solution(input);

        assert_eq!(solution.moves, 0);
        assert_eq!(solution.push_count(), 0);
        assert_eq!(solution.to_string(), "");
    }

    #[test]
    fn test_walk_before_push() {
        let input = "\
#######
#S    #
# ### #
# b  .#
#     #
#######";
        let solution = check_solution(input);

        assert_eq!(solution.moves, 5);
        assert_eq!(solution.push_count(), 3);
        assert_eq!(
            solution.pushes[0].walk,
            vec![Direction::Down, Direction::Down]
        );
        assert_eq!(solution.pushes[0].from, Point::new(3, 2));
        assert_eq!(solution.to_string(), "DDR, R, R");
    }

    #[test]
    fn test_matches_breadth_first() {
        let boards = [
            SMALL,
            "\
######
#    #
# bb #
#. .S#
######",
            "\
#######
#     #
# .b  #
#  bS #
# .   #
#######",
            "\
######
#.  .#
#  b #
# b  #
#S   #
######",
            "\
########
#   #  #
# b   .#
#  S#  #
########",
        ];

        for input in boards {
            let (board, initial) = Board::parse(input).unwrap();
            let expected = breadth_first(&board, &initial).expect("board should be solvable");

            let solution = check_solution(input);
            assert_eq!(solution.moves, expected, "\n{input}");
        }
    }

    #[test]
    fn test_tight_corners_are_not_pruned() {
        // The box has to be pushed into a goal corner and along walls to get there
        let input = "\
#######
#.    #
#   # #
#  b  #
##   S#
 ######";
        let solution = check_solution(input);
        let (board, initial) = Board::parse(input).unwrap();

        assert_eq!(Some(solution.moves), breadth_first(&board, &initial));
    }

    #[test]
    fn test_idempotent() {
        let input = "\
#######
#     #
# .b  #
#  bS #
# .   #
#######";
        let (board, initial) = Board::parse(input).unwrap();

        let first = solve(&board, &initial).unwrap();
        let second = solve(&board, &initial).unwrap();

        assert_eq!(first.moves, second.moves);
        assert_eq!(first.push_count(), second.push_count());
    }

    #[test]
    fn test_next_states() {
        let (board, initial) = Board::parse(SMALL).unwrap();
        let next_states = initial.next_states(&board).unwrap();

        // Only the loose box can move, and only to the right; the box on the goal could only
        // be pushed up from inside the wall below it
        assert_eq!(next_states.len(), 1);

        let (cost, push, next) = &next_states[0];
        assert_eq!(*cost, 1);
        assert_eq!(push.direction, Direction::Right);
        assert_eq!(next.agent, Point::new(1, 2));
        assert_eq!(next.boxes, vec![Point::new(1, 3), Point::new(3, 3)]);
    }

    #[test]
    fn test_replay_rejects_illegal_moves() {
        let (board, initial) = Board::parse(SMALL).unwrap();

        assert_eq!(
            initial.replay(&board, &[Direction::Up]),
            Err(Error::IllegalMove {
                step: 0,
                direction: Direction::Up
            })
        );

        let pushed = initial
            .replay(&board, &[Direction::Right, Direction::Right])
            .unwrap();
        assert!(pushed.is_solved(&board));

        // Box against the wall cannot go further
        assert!(pushed.step(&board, Direction::Right).is_none());
    }

    #[test]
    fn test_draw() {
        let (board, initial) = Board::parse(SMALL).unwrap();

        assert_eq!(
            initial.stringify(&board),
            "######\n#Sb .#\n##  ##\n # B# \n #### \n"
        );
        assert_eq!(initial.draw(&board, '→').lines().nth(1), Some("#→b .#"));
    }

    #[test]
    fn test_solution_json() {
        let solution = check_solution(SMALL);
        let json = serde_json::to_value(&solution).unwrap();

        assert_eq!(json["moves"], 2);
        assert_eq!(json["pushes"][0]["direction"], "Right");
        assert_eq!(json["pushes"][0]["box"]["col"], 2);
    }
}
