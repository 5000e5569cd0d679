use std::hash::Hash;

pub mod board;
pub mod deadlock;
pub mod direction;
pub mod error;
pub mod heap;
pub mod point;
pub mod reach;
pub mod sokoban;
pub mod solver;

pub use board::{Board, Tile};
pub use direction::Direction;
pub use error::{Error, Result};
pub use heap::{Handle, IndexedHeap};
pub use point::Point;
pub use sokoban::{solve, Configuration, Push, Solution};
pub use solver::{Solver, Status};

// A puzzle state searched by the solver
// G is whatever never changes between states, M labels the step that produced a state
pub trait State<G, M>: Clone + Eq + Hash {
    // Successors as (step cost, step, state), or None for a dead end
    fn next_states(&self, global: &G) -> Option<Vec<(i64, M, Self)>>
    where
        Self: Sized;

    // Estimated remaining cost, should not overestimate
    fn heuristic(&self, global: &G) -> i64;

    fn is_valid(&self, global: &G) -> bool;
    fn is_solved(&self, global: &G) -> bool;

    fn stringify(&self, global: &G) -> String;
}
