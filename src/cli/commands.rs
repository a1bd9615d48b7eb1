use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "notewall")]
#[command(version, about = "Task-list notes exported as phone wallpapers")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new notewall project in the current directory
    Init,

    /// Create a note
    Add {
        /// Note title
        title: Option<String>,

        /// Task line (can be specified multiple times)
        #[arg(long = "task", short = 't')]
        tasks: Vec<String>,

        /// Background colour: hex value or palette name
        #[arg(long = "bg")]
        background: Option<String>,

        /// Text colour: hex value or palette name
        #[arg(long = "text")]
        text: Option<String>,

        /// Background kind (color, gradient, image)
        #[arg(long = "background-type")]
        background_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes in the gallery
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Show {
        /// Note ID (position like "2", full id, or id prefix like "a1b2c")
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// Note ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Replace all tasks (can be specified multiple times)
        #[arg(long = "task", short = 't')]
        tasks: Vec<String>,

        /// Set task N to TEXT, as "N=TEXT"; an empty TEXT removes the task
        #[arg(long = "set-task", value_name = "N=TEXT")]
        set_tasks: Vec<String>,

        /// Append a task (can be specified multiple times)
        #[arg(long = "add-task", short = 'a')]
        add_tasks: Vec<String>,

        /// Remove task at 1-based position N (can be specified multiple times)
        #[arg(long = "remove-task", value_name = "N")]
        remove_tasks: Vec<usize>,

        /// Background colour: hex value or palette name
        #[arg(long = "bg")]
        background: Option<String>,

        /// Text colour: hex value or palette name
        #[arg(long = "text")]
        text: Option<String>,

        /// Background kind (color, gradient, image)
        #[arg(long = "background-type")]
        background_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Make a note the current one for export
    Select {
        /// Note ID
        #[arg(required_unless_present = "clear")]
        id: Option<String>,

        /// Clear the current selection instead
        #[arg(long, conflicts_with = "id")]
        clear: bool,
    },

    /// Export a note as a PNG wallpaper
    Export {
        /// Note ID (defaults to the current note, then the first note)
        id: Option<String>,

        /// Save into the output directory
        #[arg(long, conflicts_with = "open")]
        download: bool,

        /// Save and open in an image viewer
        #[arg(long, conflicts_with = "download")]
        open: bool,

        /// Directory to save the wallpaper in
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output scale factor
        #[arg(long)]
        scale: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Page through wallpapers one note at a time
    Browse {
        /// Start at this note instead of the current one
        id: Option<String>,

        /// Move to the next note
        #[arg(long, conflicts_with = "prev")]
        next: bool,

        /// Move to the previous note
        #[arg(long, conflicts_with = "next")]
        prev: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the colour palettes
    Palette {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
