//! Bootstrap record set written by `Registry::seed` at first start.

use crate::record::{Owner, Record, SocialPlatform};

/// The two records a fresh registry is populated with.
pub fn bootstrap_records() -> Vec<Record> {
    vec![
        Record::new("JD2020230001", Owner::new("John", "Doe"), "SuperUser")
            .with_handle(SocialPlatform::Twitter, "TwitterID39")
            .with_handle(SocialPlatform::Discord, "DiscordID92")
            .with_handle(SocialPlatform::Instagram, "InstagramID02")
            .with_handle(SocialPlatform::Twitch, "SKDIAS")
            .with_validated(true),
        Record::new("OD2020230001", Owner::new("Oliver", "Tree"), "Pwned")
            .with_handle(SocialPlatform::Twitter, "TwitterIDF39")
            .with_handle(SocialPlatform::Discord, "DiscordID03")
            .with_handle(SocialPlatform::Instagram, "InstagramID32")
            .with_handle(SocialPlatform::Twitch, "SKDSSAS")
            .with_validated(false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Condition;

    #[test]
    fn bootstrap_ids_are_unique_and_unused() {
        let records = bootstrap_records();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);
        assert!(records.iter().all(|r| r.condition == Condition::Unused));
        assert!(records.iter().all(|r| r.social_handles.len() == SocialPlatform::ALL.len()));
    }
}
