use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use plumes::actions::{TweetActions, UserActions};
use plumes::audit::{MatchMode, TweetCriteria, UserCriteria};
use plumes::client::{AccountClient, TwitterClient};
use plumes::commands::{self, AuditOutcome, SnapshotKind};
use plumes::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plumes")]
#[command(about = "Snapshot and audit a Twitter account's friends, followers and tweets", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a custom config file (default: ~/.plumes.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot the accounts a user follows
    Friends(FetchArgs),

    /// Snapshot the accounts following a user
    Followers(FetchArgs),

    /// Snapshot a user's timeline
    Tweets(FetchArgs),

    /// Identify users in a friends/followers snapshot and optionally act on them
    AuditUsers {
        /// Snapshot produced by `friends` or `followers`
        path: PathBuf,

        #[command(flatten)]
        criteria: UserCriteria,

        /// Require all criteria to match, or any one of them
        #[arg(long = "match", value_enum, default_value_t = MatchMode::All)]
        match_mode: MatchMode,

        /// Unfollow identified users
        #[arg(long)]
        prune: bool,

        /// Follow identified users
        #[arg(long)]
        befriend: bool,

        /// Perform the actions; without this only a dry run is logged
        #[arg(long)]
        execute: bool,
    },

    /// Identify tweets in a timeline snapshot and optionally act on them
    AuditTweets {
        /// Snapshot produced by `tweets`
        path: PathBuf,

        #[command(flatten)]
        criteria: TweetCriteria,

        /// Require all criteria to match, or any one of them
        #[arg(long = "match", value_enum, default_value_t = MatchMode::All)]
        match_mode: MatchMode,

        /// Delete identified tweets
        #[arg(long)]
        prune: bool,

        /// Like identified tweets
        #[arg(long)]
        favorite: bool,

        /// Perform the actions; without this only a dry run is logged
        #[arg(long)]
        execute: bool,
    },

    /// Print an account's raw profile as JSON
    ViewUser {
        screen_name: String,
    },

    /// Inspect or create the credentials config
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct FetchArgs {
    /// Target account (default: the authenticated account)
    screen_name: Option<String>,

    /// Maximum number of records to fetch (default: all the account has)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output file or directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Verify the credentials against the API
    Check,

    /// Print the resolved settings with secrets masked
    View,

    /// Write a template config file
    Init {
        /// Where to write it (default: ~/.plumes.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.command {
        Commands::Config(ConfigCommand::Init { .. }) => Settings::default(),
        _ => Settings::load(cli.config.as_deref())?,
    };
    init_tracing(&settings.log_level);

    run(cli, settings).await
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("PLUMES_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Friends(args) => fetch(&settings, SnapshotKind::Friends, args, &cwd).await,
        Commands::Followers(args) => fetch(&settings, SnapshotKind::Followers, args, &cwd).await,
        Commands::Tweets(args) => fetch(&settings, SnapshotKind::Tweets, args, &cwd).await,
        Commands::AuditUsers {
            path,
            criteria,
            match_mode,
            prune,
            befriend,
            execute,
        } => {
            let client = if execute {
                Some(TwitterClient::new(&settings)?)
            } else {
                None
            };
            let outcome = commands::audit_users(
                &path,
                &criteria,
                match_mode,
                today,
                client.as_ref().map(|c| c as &dyn AccountClient),
                UserActions { prune, befriend },
            )
            .await?;
            report(&outcome, "users");
            Ok(())
        }
        Commands::AuditTweets {
            path,
            criteria,
            match_mode,
            prune,
            favorite,
            execute,
        } => {
            let client = if execute {
                Some(TwitterClient::new(&settings)?)
            } else {
                None
            };
            let outcome = commands::audit_tweets(
                &path,
                &criteria,
                match_mode,
                today,
                client.as_ref().map(|c| c as &dyn AccountClient),
                TweetActions { prune, favorite },
            )
            .await?;
            report(&outcome, "tweets");
            Ok(())
        }
        Commands::ViewUser { screen_name } => {
            let client = TwitterClient::new(&settings)?;
            println!("{}", commands::view_user(&client, &screen_name).await?);
            Ok(())
        }
        Commands::Config(ConfigCommand::Check) => {
            let client = TwitterClient::new(&settings)?;
            let me = commands::resolve_account(&client, None).await?;
            println!("Authenticated as @{}", me.screen_name);
            Ok(())
        }
        Commands::Config(ConfigCommand::View) => {
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
            Ok(())
        }
        Commands::Config(ConfigCommand::Init { path, force }) => {
            let path = path
                .or(cli.config)
                .or_else(Settings::default_path)
                .context("could not determine the home directory; pass --path")?;
            Settings::init(&path, force)?;
            println!("Wrote config template to {}", path.display());
            Ok(())
        }
    }
}

async fn fetch(
    settings: &Settings,
    kind: SnapshotKind,
    args: FetchArgs,
    cwd: &std::path::Path,
) -> Result<()> {
    let client = TwitterClient::new(settings)?;
    let path = commands::fetch(
        &client,
        kind,
        args.screen_name.as_deref(),
        args.limit,
        args.output.as_deref(),
        cwd,
    )
    .await?;
    println!("Wrote {} to {}", kind.label(), path.display());
    Ok(())
}

fn report(outcome: &AuditOutcome, noun: &str) {
    for id in &outcome.identified {
        println!("{}", id);
    }
    println!("Identified {} {}", outcome.identified.len(), noun);
    let summary = outcome.summary;
    if summary.pruned + summary.befriended + summary.favorited > 0 {
        println!(
            "Pruned {}, followed {}, liked {}",
            summary.pruned, summary.befriended, summary.favorited
        );
    }
}
