use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kodegen-stash")]
#[command(about = "Save web pages for offline reading and keep them in sync")]
#[command(version)]
pub struct Cli {
    /// Data directory holding the catalog and snapshots
    #[arg(long, global = true, env = "STASH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the saved-articles API
    #[arg(
        long,
        global = true,
        env = "STASH_API_URL",
        default_value = "http://localhost:8080/api/v1/"
    )]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Capture a page and add it to the library
    Save(SaveArgs),

    /// Pull the server's list and capture anything missing locally
    Sync,

    /// List saved pages
    List(ListArgs),

    /// Move a page to the archive
    Archive(PageArgs),

    /// Move a page out of the archive
    Unarchive(PageArgs),

    /// Mark a page as favorite
    Favorite(PageArgs),

    /// Clear the favorite mark
    Unfavorite(PageArgs),

    /// Delete a page and its snapshot
    Delete(PageArgs),

    /// Print the snapshot location of a page
    Open(PageArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "STASH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct SaveArgs {
    pub url: String,

    /// Save as favorite
    #[arg(long, default_value_t = false)]
    pub favorite: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show archived pages instead of active ones
    #[arg(long, default_value_t = false)]
    pub archived: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct PageArgs {
    /// Local id, or a unique prefix of it
    pub id: String,
}
