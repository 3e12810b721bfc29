//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use orange_core::models::StudentSortColumn;

#[derive(Debug, Parser)]
#[command(name = "orange", version, about = "Manage library records from the terminal")]
pub struct Cli {
    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Keep the session in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Read the password from the environment instead of prompting
        #[arg(long, env = "ORANGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session tokens
    Logout,
    /// Check the stored session and show the reachable screens
    Status,
    #[command(subcommand)]
    Books(BookCommand),
    #[command(subcommand)]
    Librarians(LibrarianCommand),
    #[command(subcommand)]
    Members(MemberCommand),
    #[command(subcommand)]
    Students(StudentCommand),
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    /// List all books
    List,
    /// Add a book
    Add(BookArgs),
    /// Change fields of an existing book
    Edit {
        id: i64,
        #[command(flatten)]
        fields: BookArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum LibrarianCommand {
    /// List all librarians
    List,
    /// Add a librarian
    Add(LibrarianArgs),
    /// Change fields of an existing librarian
    Edit {
        id: i64,
        #[command(flatten)]
        fields: LibrarianArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List all members
    List,
    /// Add a member
    Add(MemberArgs),
    /// Change fields of an existing member
    Edit {
        id: i64,
        #[command(flatten)]
        fields: MemberArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// List students in the chosen order
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Id)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
    },
    /// Register a new student
    Add(StudentArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: StudentArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Id,
    Name,
    Program,
}

impl From<SortArg> for StudentSortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => StudentSortColumn::Id,
            SortArg::Name => StudentSortColumn::Name,
            SortArg::Program => StudentSortColumn::Program,
        }
    }
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    /// Id of the cataloguing librarian
    #[arg(long)]
    pub librarian: Option<i64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub publication_date: Option<String>,
}

#[derive(Debug, Args)]
pub struct LibrarianArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub hire_date: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct MemberArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone_number: Option<String>,
    #[arg(long)]
    pub membership_date: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Photo to upload
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StudentArgs {
    #[arg(long)]
    pub firstname: Option<String>,
    #[arg(long)]
    pub lastname: Option<String>,
    #[arg(long)]
    pub admissiondate: Option<String>,
    #[arg(long)]
    pub program: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Photo to upload
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}
