//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Operations on the managed binary and the remote document tree.
#[derive(Subcommand)]
pub enum Commands {
    /// Download and install rmapi if it is not installed yet
    Setup,

    /// Show whether rmapi is installed and which release it is
    Status,

    /// Show resolved paths for the binary, install record and config
    Paths,

    /// Create /papers/<classification> and any missing parents
    Mkdir {
        /// Classification folder under /papers (e.g. "research")
        classification: String,
    },

    /// Upload a local file into an existing remote directory
    Put {
        /// Local file to upload
        file: PathBuf,
        /// Remote directory under /papers (e.g. "/papers/research")
        directory: String,
        /// Document name on the device (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List a remote directory
    Ls {
        /// Remote directory to list
        #[arg(default_value = "/")]
        path: String,
    },

    /// Move or rename an entry under /papers
    Mv {
        /// Current remote path
        from: String,
        /// New remote path
        to: String,
    },
}
