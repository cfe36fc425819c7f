use std::time::Instant;

use super::Position;

/// Prints a perft at the specified depth.
///
/// If `split` is `true`, this will perform a `splitperft`, printing every legal move of `position`
/// followed by how many nodes were reached after each of those moves.
pub fn print_perft(position: &Position, depth: usize, split: bool) -> u64 {
    println!("Computing PERFT({depth}) of the following position:\n{position:?}\n");

    let now = Instant::now();
    let mut total_nodes = 0;
    if split && depth > 0 {
        for mv in position.legal_moves() {
            let nodes = perft(&position.with_move_made(mv), depth - 1);

            println!("{mv:>9} {nodes:>width$}", width = depth * 2 + 1);
            total_nodes += nodes;
        }
        println!(); // Empty line between last splitperft and total_nodes
    } else {
        total_nodes = perft(position, depth);
    }
    let elapsed = now.elapsed();

    let nps = total_nodes as f32 / elapsed.as_secs_f32();
    println!("Elapsed Time:          {elapsed:.1?}");
    println!("Total Nodes:           {total_nodes}");
    println!("Nodes / Sec:           {nps:.0}");

    total_nodes
}

/// Counts the leaf nodes of the tree of legal moves rooted at `position`, `depth` plies deep.
///
/// # Example
/// ```
/// # use xiangqi::{perft, Position};
/// assert_eq!(perft(&Position::default(), 1), 44);
/// ```
pub fn perft(position: &Position, depth: usize) -> u64 {
    // Recursion limit; return 1, since we're fathoming this node.
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();

    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mv| perft(&position.with_move_made(mv), depth - 1))
        .sum()
}
