//! The work behind each CLI subcommand, written against [`AccountClient`]
//! so it can run with any client implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::actions::{self, ActionSummary, TweetActions, UserActions};
use crate::audit::{self, IdentifiedSet, MatchMode, TweetCriteria, UserCriteria};
use crate::client::{self, AccountClient};
use crate::records::{TweetRecord, UserRecord};
use crate::snapshot;

/// Records between two progress lines while fetching.
const PROGRESS_EVERY: usize = 200;

/// Which list a fetch command snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Friends,
    Followers,
    Tweets,
}

impl SnapshotKind {
    pub fn label(self) -> &'static str {
        match self {
            SnapshotKind::Friends => "friends",
            SnapshotKind::Followers => "followers",
            SnapshotKind::Tweets => "tweets",
        }
    }

    /// How many records the account says it has of this kind.
    fn available(self, account: &UserRecord) -> u64 {
        match self {
            SnapshotKind::Friends => account.friends_count,
            SnapshotKind::Followers => account.followers_count,
            SnapshotKind::Tweets => account.statuses_count,
        }
    }
}

/// The named account, or the authenticated one.
pub async fn resolve_account(
    client: &dyn AccountClient,
    screen_name: Option<&str>,
) -> Result<UserRecord> {
    let account = match screen_name {
        Some(name) => client
            .get_account(name)
            .await
            .with_context(|| format!("failed to look up @{}", name))?,
        None => client
            .get_current_account()
            .await
            .context("failed to look up the authenticated account")?,
    };
    Ok(account)
}

/// Fetch a friends, followers or tweets snapshot and write it to disk.
/// Returns the path written.
pub async fn fetch(
    client: &dyn AccountClient,
    kind: SnapshotKind,
    screen_name: Option<&str>,
    limit: Option<usize>,
    output: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf> {
    let source = resolve_account(client, screen_name).await?;
    let limit = limit
        .unwrap_or_else(|| usize::try_from(kind.available(&source)).unwrap_or(usize::MAX));

    let file_name = format!("{}-{}.json", source.screen_name, kind.label());
    let path = snapshot::resolve_output(&file_name, output, cwd);
    info!("Output path: {}", path.display());
    info!("Fetching {} {} of @{}", limit, kind.label(), source.screen_name);

    let account = source.screen_name.as_str();
    let label = kind.label();
    match kind {
        SnapshotKind::Friends => {
            let users = collect(client.fetch_friends(account, limit), limit, label).await?;
            snapshot::save(&users, &path)?;
        }
        SnapshotKind::Followers => {
            let users = collect(client.fetch_followers(account, limit), limit, label).await?;
            snapshot::save(&users, &path)?;
        }
        SnapshotKind::Tweets => {
            let tweets = collect(client.fetch_timeline(account, limit), limit, label).await?;
            snapshot::save(&tweets, &path)?;
        }
    }

    Ok(path)
}

/// Drain a fetch stream, logging progress every [`PROGRESS_EVERY`] records.
async fn collect<T>(
    mut records: BoxStream<'_, client::Result<T>>,
    limit: usize,
    label: &str,
) -> Result<Vec<T>> {
    let mut fetched = Vec::new();
    while let Some(record) = records.try_next().await? {
        fetched.push(record);
        if fetched.len() % PROGRESS_EVERY == 0 {
            info!("Fetched {}/{} {}", fetched.len(), limit, label);
        }
    }
    info!("Fetched {} {} in total", fetched.len(), label);
    Ok(fetched)
}

/// Outcome of an audit command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutcome {
    pub identified: IdentifiedSet,
    pub summary: ActionSummary,
}

/// Identify users in a snapshot, then act on them. The whole snapshot is
/// evaluated before the first action. `client == None` is a dry run.
pub async fn audit_users(
    path: &Path,
    criteria: &UserCriteria,
    mode: MatchMode,
    today: NaiveDate,
    client: Option<&dyn AccountClient>,
    actions: UserActions,
) -> Result<AuditOutcome> {
    let users: Vec<UserRecord> = snapshot::load(path)?;
    let identified = audit::identify(criteria, &users, mode, today);
    info!("Identified {} prunable users", identified.len());

    let summary = actions::act_on_users(client, &identified, actions).await?;
    Ok(AuditOutcome {
        identified,
        summary,
    })
}

/// Identify tweets in a snapshot, then act on them.
pub async fn audit_tweets(
    path: &Path,
    criteria: &TweetCriteria,
    mode: MatchMode,
    today: NaiveDate,
    client: Option<&dyn AccountClient>,
    actions: TweetActions,
) -> Result<AuditOutcome> {
    let tweets: Vec<TweetRecord> = snapshot::load(path)?;
    let identified = audit::identify(criteria, &tweets, mode, today);
    info!("Identified {} prunable tweets", identified.len());

    let summary = actions::act_on_tweets(client, &identified, actions).await?;
    Ok(AuditOutcome {
        identified,
        summary,
    })
}

/// Raw profile of one account, pretty-printed.
pub async fn view_user(client: &dyn AccountClient, screen_name: &str) -> Result<String> {
    let user = resolve_account(client, Some(screen_name)).await?;
    serde_json::to_string_pretty(&user).context("failed to render profile")
}
