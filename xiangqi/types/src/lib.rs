/// A set of squares on a Xiangqi board, packed into a single integer.
pub mod bitboard;
/// Enums for sides and piece kinds, and a struct for a Xiangqi piece.
pub mod piece;
/// Squares (intersections) on a Xiangqi board, addressed by row and column.
pub mod square;
/// Misc constants shared by the move generator and the FEN codec.
pub mod utils;

pub use bitboard::*;
pub use piece::*;
pub use square::*;
pub use utils::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::bitboard::*;
    pub use crate::piece::*;
    pub use crate::square::*;
    pub use crate::utils::*;
}
