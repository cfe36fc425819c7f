use clap::Parser;

/// A text console for playing Xiangqi.
///
/// Logging is controlled through the `RUST_LOG` environment variable.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// FEN string of the position to start from, instead of the opening position
    #[arg(short, long)]
    pub fen: Option<String>,

    /// Show the board from Black's point of view
    #[arg(long)]
    pub flipped: bool,
}
