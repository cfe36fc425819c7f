use std::{
    io,
    sync::{
        mpsc::{self, Sender},
        LazyLock,
    },
};

use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};
use log::{error, info, warn};
use threadpool::ThreadPool;
use xiangqi::{print_perft, Cell, Click, Game, Side, Square, FEN_STARTPOS};

use crate::Config;

/// Threadpool from which to spawn the thread that reads user input.
pub static POOL: LazyLock<ThreadPool> = LazyLock::new(|| ThreadPool::new(1));

/// Reads commands from `stdin` and applies them, one at a time, to the [`Game`] it owns.
///
/// Input is read on a separate thread and forwarded over a channel, so the main loop is the only
/// place the game is ever touched.
#[derive(Debug, Default)]
pub struct Engine {
    game: Game,
}

impl Engine {
    /// Construct a new [`Engine`] at the opening position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a new [`Engine`] from the command-line flags.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut game = match &config.fen {
            Some(fen) => Game::from_fen(fen).context("Invalid --fen")?,
            None => Game::default(),
        };

        if config.flipped {
            game.flip_board();
        }

        Ok(Self { game })
    }

    /// The game this engine drives.
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Main entrypoint of the engine.
    ///
    /// This function launches the engine and awaits user input via `stdin`.
    pub fn run(&mut self) -> Result<()> {
        let name = env!("CARGO_PKG_NAME");
        let version = env!("CARGO_PKG_VERSION");
        println!("{name} {version} (type `help` for a list of commands)");

        let (sender, receiver) = mpsc::channel();

        // Spin up a thread for handling user input
        POOL.execute(move || {
            if let Err(err) = Self::user_input_handler(sender) {
                error!("{err}");
            }
        });

        for cmd in receiver {
            if cmd == EngineCommand::Exit {
                break;
            }

            if let Err(err) = self.execute(cmd) {
                eprintln!("{err}");
            }
            self.notifications();
        }

        info!("Exiting");
        Ok(())
    }

    /// Enter a perpetual loop to handle input over `stdin`.
    ///
    /// This function only exits if an error occurs or it receives `quit`.
    fn user_input_handler(sender: Sender<EngineCommand>) -> Result<()> {
        let mut buffer = String::with_capacity(256);

        loop {
            buffer.clear();
            let bytes = io::stdin()
                .read_line(&mut buffer)
                .context("Failed to read line from stdin")?;
            let buf = buffer.trim();

            // For ctrl + d
            if 0 == bytes {
                warn!("Received input of 0 bytes; quitting");
                sender
                    .send(EngineCommand::Exit)
                    .context("Failed to send exit command")?;
                return Ok(());
            }

            if buf.is_empty() {
                continue;
            }

            let cmd = match Self::parse_command(buf) {
                Ok(cmd) => cmd,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };

            let exit = cmd == EngineCommand::Exit;
            sender
                .send(cmd)
                .with_context(|| format!("Failed to send command {buf:?} to engine"))?;
            if exit {
                return Ok(());
            }
        }
    }

    /// Applies a single command to the game.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Help => self.help(),
            EngineCommand::Show => self.show(),
            EngineCommand::Fen(fen) => self.fen(fen)?,
            EngineCommand::Click(square) => self.click(square),
            EngineCommand::MakeMove(from, to) => self.make_move(from, to)?,
            EngineCommand::Moves(from) => self.moves(from),
            EngineCommand::Captured => self.captured(),
            EngineCommand::History => self.history(),
            EngineCommand::Flip => self.flip(),
            EngineCommand::NewGame => self.new_game(),
            EngineCommand::Perft { depth, split } => self.perft(depth, split),
            EngineCommand::Dismiss => self.game.dismiss_notification(),
            EngineCommand::Exit => {}
        }

        Ok(())
    }

    /// Parses an input string a yields an [`EngineCommand`], if possible.
    pub fn parse_command(input: &str) -> Result<EngineCommand> {
        let (cmd, rest) = input.trim().split_once(' ').unwrap_or((input.trim(), ""));
        let rest = rest.trim();

        match cmd {
            "help" => Ok(EngineCommand::Help),
            "show" | "d" => Ok(EngineCommand::Show),
            "fen" => Self::parse_fen_command(rest),
            "click" => Self::parse_click_command(rest),
            "move" => Self::parse_move_command(rest),
            "moves" => Self::parse_moves_command(rest),
            "captured" => Ok(EngineCommand::Captured),
            "history" => Ok(EngineCommand::History),
            "flip" => Ok(EngineCommand::Flip),
            "new" => Ok(EngineCommand::NewGame),
            "perft" => Self::parse_perft_command(rest),
            "dismiss" => Ok(EngineCommand::Dismiss),
            "quit" | "exit" => Ok(EngineCommand::Exit),
            _ => bail!("Unknown command {cmd:?}. Type `help` for a list of commands."),
        }
    }

    /// Parses the `fen` command. The whole remainder of the line is the FEN string, since it contains a space.
    fn parse_fen_command(rest: &str) -> Result<EngineCommand> {
        let fen = match rest {
            "" => None,
            "startpos" => Some(FEN_STARTPOS.to_string()),
            fen => Some(fen.to_string()),
        };

        Ok(EngineCommand::Fen(fen))
    }

    /// Parses the `click` command
    fn parse_click_command(rest: &str) -> Result<EngineCommand> {
        let Ok(square) = rest.parse::<Square>() else {
            bail!("usage: click <row-column>");
        };

        Ok(EngineCommand::Click(square))
    }

    /// Parses the `move` command
    fn parse_move_command(rest: &str) -> Result<EngineCommand> {
        let mut args = rest.split_ascii_whitespace();
        let (Some(from), Some(to), None) = (args.next(), args.next(), args.next()) else {
            bail!("usage: move <row-column> <row-column>");
        };

        let (Ok(from), Ok(to)) = (from.parse::<Square>(), to.parse::<Square>()) else {
            bail!("usage: move <row-column> <row-column>");
        };

        Ok(EngineCommand::MakeMove(from, to))
    }

    /// Parses the `moves` command
    fn parse_moves_command(rest: &str) -> Result<EngineCommand> {
        if rest.is_empty() {
            return Ok(EngineCommand::Moves(None));
        }

        let Ok(from) = rest.parse::<Square>() else {
            bail!("usage: moves [row-column]");
        };

        Ok(EngineCommand::Moves(Some(from)))
    }

    /// Parses the `perft` command
    fn parse_perft_command(rest: &str) -> Result<EngineCommand> {
        let mut args = rest.split_ascii_whitespace();

        let Some(Ok(depth)) = args.next().map(str::parse::<usize>) else {
            bail!("usage: perft <depth> [split]");
        };

        let split = args.any(|arg| arg.eq_ignore_ascii_case("split"));

        Ok(EngineCommand::Perft { depth, split })
    }

    /// Executes the `help` command, displaying a list of available commands.
    fn help(&self) {
        println!("available commands:");
        println!("  help                     show this list");
        println!("  show                     draw the board");
        println!("  fen [FEN|startpos]       load a position, or print the current FEN");
        println!("  click <r-c>              click a square (select, move or cancel)");
        println!("  move <r-c> <r-c>         move a piece");
        println!("  moves [r-c]              list legal moves, optionally from one square");
        println!("  captured                 list captured pieces");
        println!("  history                  list moves made so far");
        println!("  flip                     flip the board");
        println!("  new                      start a new game");
        println!("  perft <depth> [split]    count move paths");
        println!("  dismiss                  dismiss the current notification");
        println!("  quit                     exit");
    }

    /// Executes the `show` command, printing the board with the selection and last move highlighted.
    fn show(&self) {
        println!("{}", render(&self.game));
        println!("FEN: {}", self.game.current_fen());
        println!("{} to move", self.game.side_to_move().name());
    }

    /// Executes the `fen` command, loading a position and displaying the current state as a FEN string.
    fn fen(&mut self, fen: Option<String>) -> Result<()> {
        if let Some(fen) = fen {
            self.game.load_position(&fen)?;
        }

        println!("{}", self.game.current_fen());
        Ok(())
    }

    /// Executes the `click` command.
    fn click(&mut self, square: Square) {
        match self.game.handle_click(square) {
            Click::Ignored => println!("nothing to select on {square}"),
            Click::Selected { from, targets } => {
                let targets = targets.iter().map(|sq| sq.to_string()).collect::<Vec<_>>();
                println!("selected {from}: {}", targets.join(" "));
            }
            Click::Cancelled => println!("selection cancelled"),
            Click::Moved(mv) => println!("{}", mv.describe()),
        }
    }

    /// Executes the `move` command.
    fn make_move(&mut self, from: Square, to: Square) -> Result<()> {
        let mv = self.game.play(from, to)?;
        println!("{}", mv.describe());
        Ok(())
    }

    /// Executes the `moves` command, displaying the legal moves of the side to move.
    fn moves(&self, from: Option<Square>) {
        if let Some(from) = from {
            println!("{:?}", self.game.legal_targets(from));
        } else {
            let moves = self
                .game
                .legal_moves()
                .into_iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>();
            println!("{}", moves.join(" "));
        }
    }

    /// Executes the `captured` command.
    fn captured(&self) {
        let pieces = self
            .game
            .captured_pieces()
            .iter()
            .map(|piece| glyph(piece.side(), piece.as_str()).to_string())
            .collect::<Vec<_>>();
        println!("{}", pieces.join(" "));
    }

    /// Executes the `history` command, printing all moves made in this game.
    fn history(&self) {
        println!(
            "{}",
            self.game
                .history()
                .iter()
                .enumerate()
                .map(|(i, m)| format!("{}) {}", i + 1, m.describe()))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    /// Executes the `flip` command.
    fn flip(&mut self) {
        self.game.flip_board();
        self.show();
    }

    /// Executes the `new` command.
    fn new_game(&mut self) {
        self.game.reset();
        self.show();
    }

    /// Executes the `perft` command, performing `perft(depth)` for benchmarking and testing.
    fn perft(&self, depth: usize, split: bool) {
        print_perft(self.game.position(), depth, split);
    }

    /// Prints any pending notifications.
    fn notifications(&self) {
        if self.game.error() {
            println!("{}", "invalid FEN string (`dismiss` to clear)".yellow());
        } else if self.game.game_over() {
            let winner = self.game.winner().map(|side| side.name()).unwrap_or("nobody");
            println!("{}", format!("game over: {winner} wins (`dismiss` to clear)").green());
        }
    }
}

/// Colors a piece glyph by side.
fn glyph(side: Side, text: &str) -> ColoredString {
    match side {
        Side::Red => text.red().bold(),
        Side::Black => text.bold(),
    }
}

/// Draws a single cell.
fn render_cell(cell: &Cell) -> ColoredString {
    let mut text = match cell.piece {
        Some(piece) => glyph(piece.side(), piece.as_str()),
        None if cell.available => "*".green(),
        None => ".".dimmed(),
    };

    if cell.selected {
        text = text.on_yellow();
    } else if cell.available {
        text = text.on_green();
    } else if cell.just_moved || cell.previously_moved {
        text = text.underline();
    }

    text
}

/// Draws the board in display order, with row and column labels.
fn render(game: &Game) -> String {
    let cells = game.cells();
    let mut board = String::with_capacity(1024);

    for row in cells.chunks(Square::COLUMNS as usize) {
        let label = row.first().map(|cell| cell.square.row()).unwrap_or_default();
        board += &format!("{label:>2}| ");
        for cell in row {
            board += &format!("{} ", render_cell(cell));
        }
        board += "\n";
    }

    board += "  +";
    board += &"--".repeat(Square::COLUMNS as usize);
    board += "\n    ";
    let columns = cells
        .iter()
        .take(Square::COLUMNS as usize)
        .map(|cell| cell.square.column().to_string())
        .collect::<Vec<_>>();
    board += &columns.join(" ");

    board
}

/// Represents a command that can be sent to this engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    /// For displaying the list of available commands.
    Help,

    /// Pretty-print the current state of the board.
    Show,

    /// Load a position, then show the current FEN.
    Fen(Option<String>),

    /// Click a square.
    Click(Square),

    /// Move a piece between two squares.
    MakeMove(Square, Square),

    /// Show legal moves, either all of them or those from one square.
    Moves(Option<Square>),

    /// List captured pieces.
    Captured,

    /// Display the moves made during this game.
    History,

    /// Flip the board.
    Flip,

    /// Start over from the opening position.
    NewGame,

    /// Run a perft at the provided depth.
    Perft { depth: usize, split: bool },

    /// Dismiss the current notification.
    Dismiss,

    /// Exit the engine.
    Exit,
}
