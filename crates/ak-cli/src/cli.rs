use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "ak")]
#[command(about = "Account client: sign in, manage your profile, recover access")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}
