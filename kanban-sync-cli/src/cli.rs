use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kanban-sync")]
#[command(version)]
#[command(about = "Drive a kanban board backend from the command line")]
#[command(long_about = "
kanban-sync talks to a kanban board REST backend through the same reconciler
a dashboard uses: moves are applied locally, persisted, and the board is
refetched when the backend refuses them.

Configuration is read from defaults, then --config, then KANBAN_SYNC_*
environment variables, then flags.

Example usage:
  kanban-sync show b1
  kanban-sync move-card b1 c7 --from todo --to doing --before c3
  kanban-sync move-list b1 done --onto todo
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show detailed information
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the lists and cards of a board
    Show { board: String },

    /// Move a card to a list, optionally in front of another card
    MoveCard {
        board: String,
        card: String,
        /// List the card currently sits in
        #[arg(long)]
        from: String,
        /// List to drop the card on
        #[arg(long)]
        to: String,
        /// Card to land in front of; the end of the list when omitted
        #[arg(long)]
        before: Option<String>,
    },

    /// Move a list into the slot of another list
    MoveList {
        board: String,
        list: String,
        #[arg(long)]
        onto: String,
    },

    /// Create a list at the end of a board
    AddList { board: String, title: String },

    /// Create a card at the end of a list
    AddCard {
        board: String,
        list: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Archive a card
    Archive { board: String, card: String },

    /// Show archived cards of a board
    Archived { board: String },

    /// Restore an archived card
    Restore { board: String, card: String },

    /// Permanently delete an archived card
    Delete { board: String, card: String },
}

impl Commands {
    /// Board every command operates on
    pub fn board(&self) -> &str {
        match self {
            Self::Show { board }
            | Self::MoveCard { board, .. }
            | Self::MoveList { board, .. }
            | Self::AddList { board, .. }
            | Self::AddCard { board, .. }
            | Self::Archive { board, .. }
            | Self::Archived { board }
            | Self::Restore { board, .. }
            | Self::Delete { board, .. } => board,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_card() {
        let cli = Cli::try_parse_from([
            "kanban-sync",
            "move-card",
            "b1",
            "c7",
            "--from",
            "todo",
            "--to",
            "doing",
            "--before",
            "c3",
        ])
        .unwrap();

        match cli.command {
            Commands::MoveCard {
                ref card,
                ref before,
                ..
            } => {
                assert_eq!(card, "c7");
                assert_eq!(before.as_deref(), Some("c3"));
            }
            ref other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.command.board(), "b1");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kanban-sync", "show", "b1", "--json", "--base-url", "http://x/"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.base_url.as_deref(), Some("http://x/"));
    }

    #[test]
    fn test_move_list_requires_target() {
        assert!(Cli::try_parse_from(["kanban-sync", "move-list", "b1", "l1"]).is_err());
    }
}
