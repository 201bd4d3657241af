use chrono::NaiveDate;
use clap::Args;

use super::{ratio, Criteria, Flags};
use crate::records::TweetRecord;

/// Thresholds for auditing a timeline snapshot.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TweetCriteria {
    /// Match tweets older than this many days
    #[arg(long)]
    pub days: Option<u32>,

    /// Match tweets with fewer likes than this
    #[arg(long)]
    pub min_likes: Option<u64>,

    /// Match tweets with more likes than this
    #[arg(long)]
    pub max_likes: Option<u64>,

    /// Match tweets with fewer retweets than this
    #[arg(long)]
    pub min_retweets: Option<u64>,

    /// Match tweets with more retweets than this
    #[arg(long)]
    pub max_retweets: Option<u64>,

    /// Match tweets whose like/retweet (TLR) ratio is below this
    #[arg(long)]
    pub min_ratio: Option<f64>,

    /// Match tweets whose like/retweet (TLR) ratio is above this
    #[arg(long)]
    pub max_ratio: Option<f64>,

    /// Match tweets the account has (true) or has not (false) liked itself
    #[arg(long)]
    pub self_favorited: Option<bool>,
}

impl Criteria for TweetCriteria {
    type Record = TweetRecord;

    fn evaluate(&self, tweet: &TweetRecord, today: NaiveDate) -> Vec<bool> {
        let mut flags = Flags::new(&tweet.id_str);

        flags.older_than("creation", tweet.created(), self.days, today);
        flags.below("likes", tweet.favorite_count, self.min_likes);
        flags.above("likes", tweet.favorite_count, self.max_likes);
        flags.below("retweets", tweet.retweet_count, self.min_retweets);
        flags.above("retweets", tweet.retweet_count, self.max_retweets);

        let tlr = ratio(tweet.favorite_count, tweet.retweet_count);
        flags.below("TLR ratio", tlr, self.min_ratio);
        flags.above("TLR ratio", tlr, self.max_ratio);

        flags.equals("self-favorited", tweet.favorited, self.self_favorited);

        flags.finish()
    }
}
