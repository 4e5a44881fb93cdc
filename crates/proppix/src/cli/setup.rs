use clap::{Parser, Subcommand, ValueEnum};
use proppixapp::session::Direction;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "proppix",
    bin_name = "proppix",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Manage the photos of real-estate listings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the photo table, the bucket and proppix.toml
    #[arg(long, global = true, env = "PROPPIX_DATA", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a property's photos in display order
    #[command(alias = "ls")]
    List { property: Uuid },

    /// Upload files and append them after the existing photos
    Add {
        property: Uuid,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Move a photo one position up or down
    #[command(name = "move", alias = "mv")]
    Move {
        property: Uuid,
        /// Position as shown by `list` (1 is the primary photo)
        position: usize,
        direction: MoveDirection,
    },

    /// Make a photo the primary one
    Promote { property: Uuid, position: usize },

    /// Delete a photo
    #[command(alias = "rm")]
    Remove { property: Uuid, position: usize },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(d: MoveDirection) -> Self {
        match d {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}
