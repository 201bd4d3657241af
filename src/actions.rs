use tracing::info;

use crate::audit::IdentifiedSet;
use crate::client::{AccountClient, Result};

/// What to do with identified friends or followers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserActions {
    /// Unfollow.
    pub prune: bool,
    /// Follow.
    pub befriend: bool,
}

/// What to do with identified tweets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TweetActions {
    /// Delete.
    pub prune: bool,
    /// Like.
    pub favorite: bool,
}

/// Calls actually made against the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub pruned: usize,
    pub befriended: usize,
    pub favorited: usize,
}

/// Apply `actions` to every identified user. Without a client this is a dry
/// run that only logs what would happen. The first failing call aborts the
/// rest.
pub async fn act_on_users(
    client: Option<&dyn AccountClient>,
    identified: &IdentifiedSet,
    actions: UserActions,
) -> Result<ActionSummary> {
    let mut summary = ActionSummary::default();

    for screen_name in identified {
        if actions.prune {
            match client {
                Some(client) => {
                    client.unfollow(screen_name).await?;
                    summary.pruned += 1;
                }
                None => info!("[dry run] would unfollow {}", screen_name),
            }
        }
        if actions.befriend {
            match client {
                Some(client) => {
                    client.follow(screen_name).await?;
                    summary.befriended += 1;
                }
                None => info!("[dry run] would follow {}", screen_name),
            }
        }
    }

    Ok(summary)
}

/// Tweet counterpart of [`act_on_users`].
pub async fn act_on_tweets(
    client: Option<&dyn AccountClient>,
    identified: &IdentifiedSet,
    actions: TweetActions,
) -> Result<ActionSummary> {
    let mut summary = ActionSummary::default();

    for id in identified {
        if actions.prune {
            match client {
                Some(client) => {
                    client.delete_tweet(id).await?;
                    summary.pruned += 1;
                }
                None => info!("[dry run] would delete tweet {}", id),
            }
        }
        if actions.favorite {
            match client {
                Some(client) => {
                    client.like_tweet(id).await?;
                    summary.favorited += 1;
                }
                None => info!("[dry run] would like tweet {}", id),
            }
        }
    }

    Ok(summary)
}
