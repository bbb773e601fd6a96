use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line client for the Yookye travel-planning service.
#[derive(Parser)]
#[command(name = "yookye", version, about = "Yookye travel-planning client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account (logs you in on success).
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
    },

    /// Log out. The local session is cleared even if the server call fails.
    Logout,

    /// Show the current profile (also verifies the stored session).
    Profile,

    /// Update profile fields.
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },

    /// List available destinations.
    Destinations,

    /// Show the account dashboard (profile, statistics, recent travels).
    Dashboard,

    /// Export all account data as JSON.
    ExportData,

    /// List your submitted travel requests.
    Travels,

    /// Submit a trip-preference form from a JSON file and watch the
    /// recommendation job until it finishes.
    Submit {
        /// Path to the JSON form file.
        file: PathBuf,

        /// Submit only; do not wait for the recommendation job.
        #[arg(long)]
        no_watch: bool,
    },

    /// Watch an already-launched recommendation job.
    Watch {
        job_id: String,
    },

    /// Print version.
    Version,
}
