//! Domain DTOs and option payloads for the Buffer API.
//!
//! # Design
//! Response types default every field so that partial payloads (and fields
//! the service adds later) decode cleanly. Timestamps travel as unix seconds.
//! List options describe their query parameters through [`QueryOptions`];
//! POST options are serialized as JSON bodies with zero values skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::options::{Param, ParamValue, QueryOptions};

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// The authenticated Buffer user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub activity_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub plan: String,
    pub timezone: String,
}

/// A posting schedule: the days and times updates go out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub days: Vec<String>,
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub followers: i64,
}

/// A social media account connected to Buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub avatar: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub default: bool,
    pub formatted_username: String,
    pub id: String,
    pub schedules: Vec<Schedule>,
    pub service: String,
    pub service_id: String,
    pub service_username: String,
    pub statistics: Statistics,
    pub team_members: Vec<String>,
    pub timezone: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateStats {
    pub reach: i64,
    pub clicks: i64,
    pub retweets: i64,
    pub favourites: i64,
    pub mentions: i64,
}

/// A single post to a single social media account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Update {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub day: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub due_at: Option<DateTime<Utc>>,
    pub due_time: String,
    pub profile_id: String,
    pub profile_service: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub sent_at: Option<DateTime<Utc>>,
    pub service_update_id: String,
    pub statistics: UpdateStats,
    pub status: String,
    pub text: String,
    pub text_formatted: String,
    pub user_id: String,
    pub via: String,
}

/// A page of updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateList {
    pub total: i64,
    pub updates: Vec<Update>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionUser {
    pub username: String,
    pub followers: i64,
    pub avatar: String,
}

/// A retweet, favorite, mention, like or comment on a sent update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub event: String,
    pub interaction_id: String,
    pub user: InteractionUser,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionList {
    pub total: i64,
    pub interactions: Vec<Interaction>,
}

/// Media attached to an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Query options for the pending and sent update lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateListOptions {
    pub page: i64,
    pub count: i64,
    pub since: Option<DateTime<Utc>>,
    pub utc: bool,
}

impl QueryOptions for UpdateListOptions {
    fn params(&self) -> Vec<Param<'_>> {
        vec![
            Param::new("page", ParamValue::Int(self.page)).omit_empty(),
            Param::new("count", ParamValue::Int(self.count)).omit_empty(),
            Param::new("since", ParamValue::Time(self.since)).omit_empty(),
            Param::new("utc", ParamValue::Bool(self.utc)).omit_empty(),
        ]
    }
}

/// Query options for an update's interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionListOptions {
    /// `retweet`, `favorite`, `mention`, `like`, `comment`, ...
    pub event: String,
    pub page: i64,
    pub count: i64,
}

impl QueryOptions for InteractionListOptions {
    fn params(&self) -> Vec<Param<'_>> {
        vec![
            Param::new("event", ParamValue::Str(&self.event)).omit_empty(),
            Param::new("page", ParamValue::Int(self.page)).omit_empty(),
            Param::new("count", ParamValue::Int(self.count)).omit_empty(),
        ]
    }
}

/// Body for reordering a profile's pending updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReorderOptions {
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub utc: bool,
}

/// Body for shuffling a profile's pending updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateShuffleOptions {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub utc: bool,
}

/// Body for creating an update on one or more profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCreateOptions {
    pub profile_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub shorten: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub now: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub top: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub attachment: bool,
}

/// Body for editing a buffered update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEditOptions {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub now: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub utc: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateEnvelope {
    pub update: Update,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdatesEnvelope {
    pub updates: Vec<Update>,
}
