//! Request and response types for the Plurk API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlurkError;

// ---------- Users ----------

/// Public profile snapshot of a user, as embedded in friend lists and alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "uid")]
    pub id: u64,
    pub nick_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub karma: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar: Option<i64>,
    #[serde(default)]
    pub has_profile_image: Option<u8>,
}

impl UserProfile {
    /// Display name when the user set one, nick name otherwise.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.nick_name)
    }
}

/// User lists arrive either as an array or as an object keyed by user id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserList {
    List(Vec<UserProfile>),
    Map(BTreeMap<String, UserProfile>),
}

impl Default for UserList {
    fn default() -> Self {
        UserList::List(Vec::new())
    }
}

impl UserList {
    /// Array order is kept; keyed objects come back sorted by user id.
    pub(crate) fn into_users(self) -> Vec<UserProfile> {
        match self {
            UserList::List(users) => users,
            UserList::Map(map) => {
                let mut users: Vec<UserProfile> = map.into_values().collect();
                users.sort_by_key(|u| u.id);
                users
            }
        }
    }
}

/// Response from `/API/Users/login`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub user_info: UserProfile,
    #[serde(default)]
    pub friends: Option<UserList>,
}

/// Friends/fans listing: a bare list, or wrapped in `friends`/`fans`/`users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum UsersResponse {
    Users(UserList),
    Wrapped {
        #[serde(default, alias = "fans", alias = "users")]
        friends: Option<UserList>,
    },
}

impl UsersResponse {
    pub(crate) fn into_users(self) -> Vec<UserProfile> {
        match self {
            UsersResponse::Users(list) => list.into_users(),
            UsersResponse::Wrapped { friends } => {
                friends.map(UserList::into_users).unwrap_or_default()
            }
        }
    }
}

/// Offset/limit paging for friend and fan listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

// ---------- Alerts ----------

/// What an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Someone asked to become the owner's friend; answer with `befriend`.
    FriendshipRequest,
    /// The owner's own request is waiting on the other user.
    FriendshipPending,
    NewFan,
    FriendshipAccepted,
    NewFriend,
    #[serde(other)]
    Other,
}

/// A pending notification for the session owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// The other party of the alert. Kinds this client does not know may
    /// carry no user it can find.
    #[serde(
        default,
        alias = "new_fan",
        alias = "friend_info",
        alias = "new_friend",
        alias = "to_user",
        alias = "owner"
    )]
    pub from_user: Option<UserProfile>,
    #[serde(default, with = "timestamp::option")]
    pub posted: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_friend_request(&self) -> bool {
        self.kind == AlertKind::FriendshipRequest
    }

    pub fn user_id(&self) -> Option<u64> {
        self.from_user.as_ref().map(|u| u.id)
    }
}

/// Outcome of accepting or denying one alert.
#[derive(Debug)]
pub struct BefriendOutcome {
    /// `None` when the alert named no user.
    pub user_id: Option<u64>,
    pub result: Result<(), PlurkError>,
}

impl BefriendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-alert results of a `befriend` batch, in input order.
#[derive(Debug, Default)]
pub struct BefriendReport {
    pub outcomes: Vec<BefriendOutcome>,
    /// Set when the batch stopped early on cancellation; alerts after the
    /// last outcome were never sent.
    pub cancelled: bool,
}

impl BefriendReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BefriendOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BefriendOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.outcomes.iter().all(BefriendOutcome::is_success)
    }
}

// ---------- Plurks ----------

/// A status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub plurk_id: u64,
    #[serde(alias = "user_id")]
    pub owner_id: u64,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub qualifier: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_raw: Option<String>,
    #[serde(with = "timestamp")]
    pub posted: DateTime<Utc>,
    #[serde(default)]
    pub response_count: u32,
    #[serde(default, with = "timestamp::option")]
    pub last_edited: Option<DateTime<Utc>>,
    #[serde(default)]
    pub no_comments: u8,
    #[serde(default)]
    pub is_unread: u8,
}

impl Post {
    /// When the plurk last changed: its last edit, or its creation.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_edited.unwrap_or(self.posted)
    }

    /// The text as typed by the author, falling back to the rendered content.
    pub fn text(&self) -> &str {
        self.content_raw.as_deref().unwrap_or(&self.content)
    }

    pub fn permalink(&self) -> String {
        crate::permalink::plurk_id_to_permalink(self.plurk_id)
    }
}

/// Timeline listing (`getPlurks`, `getUnreadPlurks`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PlurksResponse {
    List(Vec<Post>),
    Wrapped {
        #[serde(default)]
        plurks: Vec<Post>,
    },
}

impl PlurksResponse {
    pub(crate) fn into_posts(self) -> Vec<Post> {
        match self {
            PlurksResponse::List(posts) => posts,
            PlurksResponse::Wrapped { plurks } => plurks,
        }
    }
}

/// Inclusive time window for `get_plurks`. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// No bounds: the service's default page of most recent plurks.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// An inverted window (`to < from`) matches nothing.
    pub fn is_empty(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if to < from)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Who may respond to a new plurk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentPolicy {
    #[default]
    Open,
    Disabled,
    FriendsOnly,
}

impl CommentPolicy {
    pub fn as_i64(self) -> i64 {
        match self {
            CommentPolicy::Open => 0,
            CommentPolicy::Disabled => 1,
            CommentPolicy::FriendsOnly => 2,
        }
    }
}

/// A plurk to publish with `add_plurk_with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlurk {
    pub lang: String,
    pub qualifier: String,
    pub content: String,
    /// Restrict visibility to these user ids; empty means public.
    pub limited_to: Vec<u64>,
    pub no_comments: CommentPolicy,
}

impl NewPlurk {
    pub fn new(
        lang: impl Into<String>,
        qualifier: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            lang: lang.into(),
            qualifier: qualifier.into(),
            content: content.into(),
            limited_to: Vec::new(),
            no_comments: CommentPolicy::Open,
        }
    }

    pub fn limited_to(mut self, user_ids: impl IntoIterator<Item = u64>) -> Self {
        self.limited_to = user_ids.into_iter().collect();
        self
    }

    pub fn no_comments(mut self, policy: CommentPolicy) -> Self {
        self.no_comments = policy;
        self
    }
}

// ---------- Responses ----------

/// A reply attached to a plurk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub plurk_id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub qualifier: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_raw: Option<String>,
    #[serde(with = "timestamp")]
    pub posted: DateTime<Utc>,
}

/// Response from `/API/Responses/get`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponsesResponse {
    #[serde(default)]
    pub responses: Vec<Response>,
}

// ---------- API envelope ----------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error_text: Option<String>,
}

/// Timestamps in the formats the service has used over time.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::params::TIMESTAMP_FORMAT;

    /// RFC 2822 (`Fri, 05 Jun 2009 23:07:13 GMT`), RFC 3339, or a naive
    /// `2009-06-05T23:07:13` taken as UTC.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                    .ok()
                    .map(|t| t.and_utc())
            })
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc2822())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp {raw:?}")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("unrecognized timestamp {raw:?}"))
                }),
            }
        }
    }
}
