use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        password: String,
    },

    /// Create a new account
    Signup {
        email: String,
        password: String,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Exchange the refresh token for a fresh session
    Refresh,

    /// Show the current session and profile state
    Status,

    /// Profile operations
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Check whether a nickname is still available
    Nickname {
        candidate: String,
    },

    /// Recover the account email for a name + phone pair
    FindEmail {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },

    /// Send a password-reset email
    ResetPassword {
        email: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ProfileCommands {
    /// Print the current profile
    Show,

    /// Update profile fields (only the supplied ones change)
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        /// Free-text phone number; formatted as NNN-NNNN-NNNN
        #[arg(long)]
        phone: Option<String>,
        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_day: Option<String>,
    },
}
