pub use types::*;

/// A game of Xiangqi as a player interacts with it: selection, captured pieces, history and notifications.
///
/// You probably want to look here.
pub mod game;
/// Pseudo-legal and legal move generation for every piece kind, and threat detection.
pub mod movegen;
/// A struct for modeling the movement of a piece on a Xiangqi board.
pub mod moves;
/// Utility function for performance testing.
pub mod perft;
/// A Xiangqi board, the side to move, and the FEN codec.
pub mod position;

pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use position::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::game::*;
    pub use crate::movegen::*;
    pub use crate::moves::*;
    pub use crate::perft::*;
    pub use crate::position::*;
    pub use types::prelude::*;
}
