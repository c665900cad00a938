use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::models::{BookId, RecordId};

/// track reading sessions with a countdown timer, a calendar and your book list
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Cli {
    /// settings file to use instead of the platform default
    #[clap(long, global = true)]
    pub settings: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// start a reading timer and record the session when it finishes
    Timer {
        /// minutes to read (defaults to the configured duration)
        #[clap(short, long)]
        minutes: Option<u32>,

        /// id of the book being read
        #[clap(short, long)]
        book: Option<BookId>,
    },

    /// search and manage books
    Books {
        #[clap(subcommand)]
        command: BooksCommand,
    },

    /// show the reading calendar for a month
    Calendar {
        #[clap(short, long, requires = "month")]
        year: Option<i32>,

        #[clap(short, long)]
        month: Option<u32>,

        /// months relative to the chosen one, e.g. -1 for the month before
        #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,

        /// list one day's sessions and notes instead of the month grid (YYYY-MM-DD)
        #[clap(long, conflicts_with_all = ["year", "month", "offset"])]
        day: Option<NaiveDate>,
    },

    /// manage the books on your reading shelf
    Shelf {
        #[clap(subcommand)]
        command: ShelfCommand,
    },

    /// list shared reading groups
    Groups,

    /// show or change settings
    Config {
        #[clap(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum BooksCommand {
    /// search books by title or author
    Search { query: String },

    /// show one book and its related titles
    Show { id: BookId },

    /// list popular books
    Popular,

    /// add a book to the catalogue
    Add {
        #[clap(long)]
        title: String,

        #[clap(long)]
        author: String,

        #[clap(long, default_value = "")]
        description: String,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShelfCommand {
    /// list shelved books
    List,

    /// put a book on the shelf
    Add { book_id: BookId },

    /// take a record off the shelf
    Remove { id: RecordId },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommand {
    /// print the effective settings
    Show,

    /// change stored settings
    Set {
        #[clap(long)]
        api_url: Option<String>,

        #[clap(long, conflicts_with = "clear_token")]
        token: Option<String>,

        /// forget the stored api token
        #[clap(long)]
        clear_token: bool,

        #[clap(long)]
        default_minutes: Option<u32>,
    },
}
