use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use std::io::Read;

use sokoban::{Board, Configuration, Direction, Push, Solution, Solver, State, Status};

lazy_static! {
    // Give up after this many states, which is not the same as proving there is no solution
    static ref MAX_STATES: Option<usize> = std::env::var("SOKOBAN_MAX_STATES")
        .ok()
        .and_then(|s| s.parse().ok());

    static ref JSON_OUTPUT: bool = std::env::var("SOKOBAN_JSON").is_ok();
}

// Anything after the first empty line is a known optimal move count
fn known_moves(input: &str) -> Option<usize> {
    input
        .lines()
        .skip_while(|line| !line.is_empty())
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.trim().parse().ok())
}

fn parse_instructions(instructions: &str) -> Result<Vec<Direction>> {
    instructions
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| Direction::try_from(c).map_err(|e| anyhow!(e)))
        .collect()
}

fn solve(
    board: &Board,
    initial: &Configuration,
    max_states: Option<usize>,
) -> Result<Option<Solution>> {
    let mut solver: Solver<Board, Configuration, Push> =
        Solver::new(board.clone(), initial.clone());

    while let Some(state) = solver.next() {
        let state = state?;

        if max_states.map_or(false, |max| solver.states_checked() >= max)
            && solver.status() == Status::Searching
        {
            log::warn!(
                "Gave up after {} states in {} seconds",
                solver.states_checked(),
                solver.time_spent()
            );
            return Ok(None);
        }

        if solver.states_checked() % 100000 != 0 {
            continue;
        }
        log::info!("{solver}, state:\n{}", state.stringify(board));
    }

    if solver.status() != Status::Solved {
        log::error!(
            "No solution found after {} states in {} seconds",
            solver.states_checked(),
            solver.time_spent(),
        );
        return Err(anyhow!(sokoban::Error::NoSolutionFound));
    }

    let solution = Solution {
        moves: solver.cost()? as usize,
        pushes: solver.path()?,
    };

    log::info!(
        "Solved after {} states in {} seconds:\n{}",
        solver.states_checked(),
        solver.time_spent(),
        solver.solution()?.stringify(board),
    );

    Ok(Some(solution))
}

// Every grid along the way, the agent drawn as an arrow of its last move
fn stringify_solution(
    board: &Board,
    initial: &Configuration,
    solution: &Solution,
) -> Result<String> {
    let mut output = format!("FOUND SOLUTION! {} moves\n", solution.moves);
    output.push_str(&initial.draw(board, 'S'));

    let mut current = initial.clone();
    for push in solution.pushes.iter() {
        current = current.replay(board, &push.moves())?;
        output.push('\n');
        output.push_str(&current.draw(board, push.direction.arrow()));
    }

    output.push_str(&format!("\nDirections: {solution}\n"));
    Ok(output)
}

fn replay(board: &Board, initial: &Configuration, instructions: &str) -> Result<()> {
    let mut current = initial.clone();

    for (step, direction) in parse_instructions(instructions)?.into_iter().enumerate() {
        println!("\n=== Step {}: {} ===", step, direction);

        current = current
            .step(board, direction)
            .ok_or_else(|| anyhow!("Cannot move {direction} at step {step}"))?;

        println!("{}", current.draw(board, direction.arrow()));
    }

    println!("Is solved? {}", current.is_solved(board));
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);

    let mut input = String::new();
    match args.next() {
        Some(path) if path != "-" => {
            input = std::fs::read_to_string(&path)
                .map_err(|e| anyhow!("Error reading {path:?}: {e}"))?;
        }
        _ => {
            std::io::stdin().read_to_string(&mut input)?;
        }
    }

    let (board, initial) = Board::parse(&input)?;
    log::info!("Initial state:\n{}", initial.stringify(&board));

    // If there are more args, assume they're moves to replay
    let instructions = args.collect::<Vec<_>>();
    if !instructions.is_empty() {
        for instructions in instructions.iter() {
            replay(&board, &initial, instructions)?;
        }
        return Ok(());
    }

    // Otherwise, try to find a new solution
    let solution = match solve(&board, &initial, *MAX_STATES)? {
        Some(solution) => solution,
        None => return Err(anyhow!("No solution found within budget")),
    };

    if *JSON_OUTPUT {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        print!("{}", stringify_solution(&board, &initial, &solution)?);
    }

    // Check against known solutions
    if let Some(expected) = known_moves(&input) {
        if expected != solution.moves {
            log::warn!(
                "Solution takes {} moves, expected {expected}",
                solution.moves
            )
        }
    }

    Ok(())
}
