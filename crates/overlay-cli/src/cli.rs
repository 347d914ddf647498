use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use overlay_query::SqlDialect;
use overlay_resolver::Inheritance;
use overlay_types::{BranchId, ObjectType};

#[derive(Parser)]
#[command(
    name = "overlay",
    about = "Effective object listings over base data and branch deltas",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Resolver settings (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the effective objects of a category
    List(ListArgs),
    /// Print the listing query as SQL
    Sql(SqlArgs),
    /// Show known categories
    Categories,
}

/// What to list, shared by `list` and `sql`.
#[derive(Args, Clone, Debug)]
pub struct ListingArgs {
    pub category: String,

    /// Overlay the deltas of this branch
    #[arg(long)]
    pub branch: Option<BranchId>,

    #[arg(short, long)]
    pub search: Option<String>,

    /// Only objects below this template
    #[arg(long)]
    pub template: Option<String>,

    #[arg(long, default_value = "direct", requires = "template")]
    pub inherit: Inheritance,

    #[arg(long = "type", default_value = "object")]
    pub object_type: ObjectType,

    /// Principal from the fixture to list as
    #[arg(short, long)]
    pub user: Option<String>,

    /// Only these columns, besides the mandatory ones
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    /// Fixture with tables and principals (TOML)
    #[arg(short, long)]
    pub data: PathBuf,
}

#[derive(Args)]
pub struct SqlArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    /// Fixture, needed for templates and hostgroup restrictions
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Overrides the configured dialect
    #[arg(long)]
    pub dialect: Option<SqlDialect>,

    /// Inline parameters instead of listing them
    #[arg(long)]
    pub inline: bool,
}
