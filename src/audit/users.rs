use chrono::NaiveDate;
use clap::Args;

use super::{ratio, Criteria, Flags};
use crate::records::UserRecord;

/// Thresholds for auditing friends or followers. Unset thresholds do not
/// take part in the decision.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct UserCriteria {
    /// Match users with fewer followers than this
    #[arg(long)]
    pub min_followers: Option<u64>,

    /// Match users with more followers than this
    #[arg(long)]
    pub max_followers: Option<u64>,

    /// Match users following fewer accounts than this
    #[arg(long)]
    pub min_friends: Option<u64>,

    /// Match users following more accounts than this
    #[arg(long)]
    pub max_friends: Option<u64>,

    /// Match users with fewer tweets than this
    #[arg(long)]
    pub min_tweets: Option<u64>,

    /// Match users with more tweets than this
    #[arg(long)]
    pub max_tweets: Option<u64>,

    /// Match users who liked fewer tweets than this
    #[arg(long)]
    pub min_favourites: Option<u64>,

    /// Match users who liked more tweets than this
    #[arg(long)]
    pub max_favourites: Option<u64>,

    /// Match users whose follower/friend (TFF) ratio is below this
    #[arg(long)]
    pub min_ratio: Option<f64>,

    /// Match users whose follower/friend (TFF) ratio is above this
    #[arg(long)]
    pub max_ratio: Option<f64>,

    /// Match users whose last tweet is older than this many days
    #[arg(long)]
    pub days: Option<u32>,
}

impl Criteria for UserCriteria {
    type Record = UserRecord;

    fn evaluate(&self, user: &UserRecord, today: NaiveDate) -> Vec<bool> {
        let mut flags = Flags::new(&user.screen_name);

        flags.below("followers", user.followers_count, self.min_followers);
        flags.above("followers", user.followers_count, self.max_followers);
        flags.below("friends", user.friends_count, self.min_friends);
        flags.above("friends", user.friends_count, self.max_friends);
        flags.below("tweets", user.statuses_count, self.min_tweets);
        flags.above("tweets", user.statuses_count, self.max_tweets);
        flags.below("favourites", user.favourites_count, self.min_favourites);
        flags.above("favourites", user.favourites_count, self.max_favourites);

        let tff = ratio(user.followers_count, user.friends_count);
        flags.below("TFF ratio", tff, self.min_ratio);
        flags.above("TFF ratio", tff, self.max_ratio);

        flags.older_than("last tweet", user.last_active(), self.days, today);

        flags.finish()
    }
}
