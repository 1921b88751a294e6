use clap::{Parser, Subcommand};
use url::Url;

use crate::ops::{ContentCmd, SpaceCmd, TaskCmd};

#[derive(Parser, Debug)]
#[command(name = "silo", version, about = "Command-line client for silo content stores")]
pub struct Args {
    /// Remote store URL (overrides SILO_REMOTE)
    #[arg(long)]
    pub remote: Option<Url>,

    /// Storage provider id, sent as the storeID parameter
    #[arg(long)]
    pub store_id: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Space operations
    #[command(subcommand)]
    Space(SpaceCmd),
    /// Content operations
    #[command(subcommand)]
    Content(ContentCmd),
    /// Remote task operations
    #[command(subcommand)]
    Task(TaskCmd),
}
