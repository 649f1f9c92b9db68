//! Presence record model and its persisted JSON encoding.
//!
//! A [`Record`] is stored as a self-describing JSON object:
//!
//! ```json
//! {
//!   "id": "JD2020230001",
//!   "owner": { "name": "John", "surname": "Doe" },
//!   "nameTag": "SuperUser",
//!   "socialHandles": { "discord": "DiscordID92", "twitch": "SKDIAS" },
//!   "validated": true,
//!   "condition": "UNUSED"
//! }
//! ```
//!
//! Only `id` is required on decode. Any other missing field decodes to its
//! zero value (empty string, empty map, `false`, `UNUSED`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform name → handle.
///
/// A `BTreeMap` keeps the encoded key order stable across writes.
pub type SocialHandles = BTreeMap<String, String>;

/// Identity of the record owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl Owner {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }
}

/// Whether a record has received at least one field update since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    #[default]
    Unused,
    Used,
}

impl Condition {
    /// Move to `Used`. Never moves back.
    pub fn mark_used(&mut self) {
        *self = Self::Used;
    }

    pub fn is_used(&self) -> bool {
        matches!(self, Self::Used)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unused => f.write_str("UNUSED"),
            Self::Used => f.write_str("USED"),
        }
    }
}

/// Social platforms the registry knows about.
///
/// The handle map itself is open; these are the keys the registry writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Twitter,
    Discord,
    Instagram,
    Twitch,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 4] = [
        SocialPlatform::Twitter,
        SocialPlatform::Discord,
        SocialPlatform::Instagram,
        SocialPlatform::Twitch,
    ];

    /// Key used in the `socialHandles` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Discord => "discord",
            Self::Instagram => "instagram",
            Self::Twitch => "twitch",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitter" => Ok(Self::Twitter),
            "discord" => Ok(Self::Discord),
            "instagram" => Ok(Self::Instagram),
            "twitch" => Ok(Self::Twitch),
            other => Err(format!("unknown social platform: {other}")),
        }
    }
}

/// An identity/presence record, stored under its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Primary key. Assigned at creation, never reassigned.
    pub id: String,
    #[serde(default)]
    pub owner: Owner,
    /// Mutable display label.
    #[serde(default)]
    pub name_tag: String,
    #[serde(default)]
    pub social_handles: SocialHandles,
    /// Whether the owner's identity was externally confirmed.
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub condition: Condition,
}

impl Record {
    /// A fresh, unvalidated record with no handles and `condition = UNUSED`.
    pub fn new(id: impl Into<String>, owner: Owner, name_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner,
            name_tag: name_tag.into(),
            social_handles: SocialHandles::new(),
            validated: false,
            condition: Condition::Unused,
        }
    }

    pub fn with_handle(mut self, platform: SocialPlatform, handle: impl Into<String>) -> Self {
        self.social_handles
            .insert(platform.as_str().to_string(), handle.into());
        self
    }

    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    /// The handle stored for `platform`, if any.
    pub fn handle(&self, platform: SocialPlatform) -> Option<&str> {
        self.social_handles.get(platform.as_str()).map(String::as_str)
    }

    /// Encode to the persisted JSON form.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the persisted JSON form.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Arguments for creating a record. The registry fills in `condition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub id: String,
    pub owner: Owner,
    pub name_tag: String,
    pub social_handles: SocialHandles,
    pub validated: bool,
}

impl NewRecord {
    pub fn new(id: impl Into<String>, owner: Owner, name_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner,
            name_tag: name_tag.into(),
            social_handles: SocialHandles::new(),
            validated: false,
        }
    }

    pub fn with_handle(mut self, platform: SocialPlatform, handle: impl Into<String>) -> Self {
        self.social_handles
            .insert(platform.as_str().to_string(), handle.into());
        self
    }

    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    pub(crate) fn into_record(self) -> Record {
        Record {
            id: self.id,
            owner: self.owner,
            name_tag: self.name_tag,
            social_handles: self.social_handles,
            validated: self.validated,
            condition: Condition::Unused,
        }
    }
}

/// A single-field mutation applied by [`Registry::update_field`](crate::registry::Registry::update_field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Replace the display label.
    NameTag(String),
    /// Replace (or add) the handle for one platform.
    SocialHandle {
        platform: SocialPlatform,
        handle: String,
    },
}

impl FieldUpdate {
    /// Field name as it appears in the encoded record, for logs.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::NameTag(_) => "nameTag",
            Self::SocialHandle { .. } => "socialHandles",
        }
    }

    pub(crate) fn apply(self, record: &mut Record) {
        match self {
            Self::NameTag(value) => record.name_tag = value,
            Self::SocialHandle { platform, handle } => {
                record
                    .social_handles
                    .insert(platform.as_str().to_string(), handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new("A1", Owner::new("John", "Doe"), "Tag1")
            .with_handle(SocialPlatform::Twitter, "t1")
            .with_handle(SocialPlatform::Discord, "")
            .with_validated(true)
    }

    #[test]
    fn encode_uses_wire_field_names() {
        let json: serde_json::Value =
            serde_json::from_slice(&sample().encode().unwrap()).unwrap();
        assert_eq!(json["id"], "A1");
        assert_eq!(json["owner"]["name"], "John");
        assert_eq!(json["owner"]["surname"], "Doe");
        assert_eq!(json["nameTag"], "Tag1");
        assert_eq!(json["socialHandles"]["twitter"], "t1");
        assert_eq!(json["validated"], true);
        assert_eq!(json["condition"], "UNUSED");
    }

    #[test]
    fn decode_restores_encoded_record() {
        let mut record = sample();
        record.condition.mark_used();
        let decoded = Record::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.handle(SocialPlatform::Discord), Some(""));
    }

    #[test]
    fn missing_optional_fields_decode_to_zero_values() {
        let decoded = Record::decode(br#"{"id":"B7"}"#).unwrap();
        assert_eq!(decoded.id, "B7");
        assert_eq!(decoded.owner, Owner::default());
        assert_eq!(decoded.name_tag, "");
        assert!(decoded.social_handles.is_empty());
        assert!(!decoded.validated);
        assert_eq!(decoded.condition, Condition::Unused);

        let partial = Record::decode(br#"{"id":"B8","owner":{"name":"Ann"}}"#).unwrap();
        assert_eq!(partial.owner.name, "Ann");
        assert_eq!(partial.owner.surname, "");
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(Record::decode(br#"{"nameTag":"x"}"#).is_err());
        assert!(Record::decode(b"").is_err());
        assert!(Record::decode(b"not json").is_err());
    }

    #[test]
    fn unknown_platform_keys_survive_decode() {
        let decoded =
            Record::decode(br#"{"id":"C1","socialHandles":{"mastodon":"@c1"}}"#).unwrap();
        assert_eq!(decoded.social_handles.get("mastodon").unwrap(), "@c1");
    }

    #[test]
    fn mark_used_is_idempotent() {
        let mut condition = Condition::default();
        assert!(!condition.is_used());
        condition.mark_used();
        condition.mark_used();
        assert_eq!(condition, Condition::Used);
        assert_eq!(condition.to_string(), "USED");
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("Twitch".parse::<SocialPlatform>().unwrap(), SocialPlatform::Twitch);
        assert!("myspace".parse::<SocialPlatform>().is_err());
        for p in SocialPlatform::ALL {
            assert_eq!(p.as_str().parse::<SocialPlatform>().unwrap(), p);
        }
    }

    #[test]
    fn field_update_touches_one_field() {
        let mut record = sample();
        FieldUpdate::SocialHandle {
            platform: SocialPlatform::Twitter,
            handle: "t2".into(),
        }
        .apply(&mut record);
        assert_eq!(record.handle(SocialPlatform::Twitter), Some("t2"));
        assert_eq!(record.name_tag, "Tag1");
        assert_eq!(record.condition, Condition::Unused);
    }
}
