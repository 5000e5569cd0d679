use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;

use fxhash::FxHashMap;

use crate::error::{Error, Result};
use crate::heap::{Handle, IndexedHeap};
use crate::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Initializing,
    Searching,
    Solved,
    Exhausted,
}

// Everything ever queued is kept so a solution can be walked back to the start
#[derive(Debug)]
struct Node<S, M> {
    state: S,
    parent: Option<usize>,
    step: Option<M>,
}

// Queue entry, ordered by priority alone
#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: i64,
    cost: i64,
    node: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Queued(Handle),
    Finalized,
}

// Best known cost per distinct state
#[derive(Debug, Clone, Copy)]
struct Seen {
    cost: i64,
    record: Record,
}

/// Best-first (A*) search over any [`State`].
///
/// The solver is an iterator: each call to `next` finalizes one state and yields it, so callers
/// can log progress or stop early. Once it returns `None` the search is either solved or
/// exhausted, see [`Solver::status`].
#[derive(Debug)]
pub struct Solver<G, S, M>
where
    S: State<G, M>,
{
    global: G,
    nodes: Vec<Node<S, M>>,
    seen: FxHashMap<S, Seen>,
    queue: IndexedHeap<Entry>,
    status: Status,
    solution: Option<(usize, i64)>,
    states_checked: usize,
    states_reopened: usize,
    time_spent: f32,
}

impl<G, S, M> Solver<G, S, M>
where
    S: State<G, M>,
    M: Clone,
{
    pub fn new(global: G, initial_state: S) -> Solver<G, S, M> {
        Solver {
            global,
            nodes: vec![Node {
                state: initial_state,
                parent: None,
                step: None,
            }],
            seen: FxHashMap::default(),
            queue: IndexedHeap::new(),
            status: Status::Initializing,
            solution: None,
            states_checked: 0,
            states_reopened: 0,
            time_spent: 0 as f32,
        }
    }

    pub fn global(&self) -> &G {
        &self.global
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn states_checked(&self) -> usize {
        self.states_checked
    }

    pub fn states_seen(&self) -> usize {
        self.seen.len()
    }

    pub fn states_queued(&self) -> usize {
        self.queue.len()
    }

    pub fn states_reopened(&self) -> usize {
        self.states_reopened
    }

    pub fn time_spent(&self) -> f32 {
        self.time_spent
    }

    /// The solved state, once the search has found one.
    pub fn solution(&self) -> Result<&S> {
        match self.solution {
            Some((node, _)) => Ok(&self.nodes[node].state),
            None => Err(Error::NoSolutionFound),
        }
    }

    /// Total cost of the solution.
    pub fn cost(&self) -> Result<i64> {
        match self.solution {
            Some((_, cost)) => Ok(cost),
            None => Err(Error::NoSolutionFound),
        }
    }

    /// Steps from the initial state to the solution, in order.
    pub fn path(&self) -> Result<Vec<M>> {
        let (mut node, _) = self.solution.ok_or(Error::NoSolutionFound)?;

        let mut steps = Vec::new();
        while let Some(parent) = self.nodes[node].parent {
            if let Some(step) = &self.nodes[node].step {
                steps.push(step.clone());
            }
            node = parent;
        }

        steps.reverse();
        Ok(steps)
    }

    /// Run to completion and return the solved state.
    pub fn run(&mut self) -> Result<&S> {
        while let Some(state) = self.next() {
            state?;
        }
        self.solution()
    }

    fn start(&mut self) {
        let initial = &self.nodes[0].state;

        if !initial.is_valid(&self.global) {
            log::debug!("Initial state is invalid");
            self.status = Status::Exhausted;
            return;
        }

        let entry = Entry {
            priority: initial.heuristic(&self.global),
            cost: 0,
            node: 0,
        };
        let handle = self.queue.push(entry);
        self.seen.insert(
            initial.clone(),
            Seen {
                cost: 0,
                record: Record::Queued(handle),
            },
        );

        self.status = Status::Searching;
    }

    // Queue a successor, or improve the queued copy of it, unless it is no better than known
    fn relax(&mut self, parent: usize, cost: i64, step: M, state: S) -> Result<()> {
        let seen = self.seen.get(&state).copied();
        if let Some(seen) = seen {
            if seen.cost <= cost {
                return Ok(());
            }
        }

        let entry = Entry {
            priority: cost + state.heuristic(&self.global),
            cost,
            node: self.nodes.len(),
        };
        self.nodes.push(Node {
            state: state.clone(),
            parent: Some(parent),
            step: Some(step),
        });

        let record = match seen {
            Some(Seen {
                record: Record::Queued(handle),
                ..
            }) => {
                self.queue.update(handle, entry)?;
                Record::Queued(handle)
            }
            Some(Seen {
                record: Record::Finalized,
                ..
            }) => {
                self.states_reopened += 1;
                Record::Queued(self.queue.push(entry))
            }
            None => Record::Queued(self.queue.push(entry)),
        };

        self.seen.insert(state, Seen { cost, record });
        Ok(())
    }

    fn step(&mut self) -> Option<Result<S>> {
        let entry = match self.queue.pop() {
            Some(entry) => entry,
            None => {
                self.status = Status::Exhausted;
                return None;
            }
        };

        let state = self.nodes[entry.node].state.clone();
        if let Some(seen) = self.seen.get_mut(&state) {
            seen.record = Record::Finalized;
        }
        self.states_checked += 1;

        if state.is_solved(&self.global) {
            self.status = Status::Solved;
            self.solution = Some((entry.node, entry.cost));
            return Some(Ok(state));
        }

        if let Some(next_states) = state.next_states(&self.global) {
            for (step_cost, step, next_state) in next_states {
                if !next_state.is_valid(&self.global) {
                    continue;
                }

                if let Err(error) = self.relax(entry.node, entry.cost + step_cost, step, next_state)
                {
                    log::error!("Search aborted: {error}");
                    self.status = Status::Exhausted;
                    return Some(Err(error));
                }
            }
        }

        Some(Ok(state))
    }
}

// Each item is one finalized state; the last one is the solution if the search succeeded
impl<G, S, M> Iterator for Solver<G, S, M>
where
    S: State<G, M>,
    M: Clone,
{
    type Item = Result<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = Instant::now();

        if self.status == Status::Initializing {
            self.start();
        }

        let result = match self.status {
            Status::Searching => self.step(),
            _ => None,
        };

        if self.states_checked % 1000 == 0 && self.status == Status::Searching {
            tracing::debug!(
                "iter: {}, queue: {}, seen: {}, time: {}",
                self.states_checked,
                self.queue.len(),
                self.seen.len(),
                self.time_spent
            );
        }

        self.time_spent += start.elapsed().as_secs_f32();
        result
    }
}

impl<G, S, M> fmt::Display for Solver<G, S, M>
where
    S: State<G, M>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solver<{:?}, {} checked, {} queued, {} seen, {} reopened, {:.3}s>",
            self.status,
            self.states_checked,
            self.queue.len(),
            self.seen.len(),
            self.states_reopened,
            self.time_spent
        )
    }
}
