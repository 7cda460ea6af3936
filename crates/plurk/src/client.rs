//! HTTP client for the Plurk API.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PlurkConfig;
use crate::cookie::CookieJar;
use crate::endpoints::Endpoint;
use crate::error::{PlurkError, Result};
use crate::params::Params;
use crate::transport::{Auth, Transport};
use crate::types::*;

/// Plurk API client.
///
/// Everything except [`PlurkClient::login`] needs a session; without one,
/// calls fail with [`PlurkError::AuthRequired`] before touching the network.
/// Clones share the same session and cookies.
#[derive(Clone)]
pub struct PlurkClient {
    transport: Arc<Transport>,
}

impl PlurkClient {
    /// Create a client; nothing is sent until the first call.
    pub fn new(config: PlurkConfig) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(Transport::new(config)?),
        })
    }

    /// Create a client from the `PLURK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PlurkConfig::from_env()?)
    }

    pub fn config(&self) -> &PlurkConfig {
        self.transport.config()
    }

    /// Snapshot of the session cookies.
    pub fn cookies(&self) -> CookieJar {
        self.transport.cookies()
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    // ---------- Friends / fans ----------

    /// Friends of `user_id`, or of the logged-in user when `None`.
    pub async fn get_friends(&self, user_id: Option<u64>, page: Page) -> Result<Vec<UserProfile>> {
        self.list_users(Endpoint::GetFriends, user_id, page).await
    }

    /// Fans of `user_id`, or of the logged-in user when `None`.
    pub async fn get_fans(&self, user_id: Option<u64>, page: Page) -> Result<Vec<UserProfile>> {
        self.list_users(Endpoint::GetFans, user_id, page).await
    }

    async fn list_users(
        &self,
        endpoint: Endpoint,
        user_id: Option<u64>,
        page: Page,
    ) -> Result<Vec<UserProfile>> {
        let session = self.require_session()?;
        let params = Params::new()
            .set("user_id", user_id.unwrap_or(session.uid()))
            .set_opt("offset", page.offset)
            .set_opt("limit", page.limit);
        let body: Option<UsersResponse> = self.transport.call(endpoint, params, Auth::Required).await?;
        Ok(body.map(UsersResponse::into_users).unwrap_or_default())
    }

    // ---------- Alerts ----------

    /// Pending alerts of the logged-in user.
    pub async fn get_alerts(&self) -> Result<Vec<Alert>> {
        self.require_session()?;
        let alerts: Option<Vec<Alert>> = self
            .transport
            .call(Endpoint::GetAlerts, Params::new(), Auth::Required)
            .await?;
        Ok(alerts.unwrap_or_default())
    }

    /// Accept (`accept == true`) or deny every friend request in `alerts`.
    ///
    /// Each alert is answered with its own call and fails on its own: one
    /// error never stops the rest. Alerts that are not friend requests are
    /// reported as [`PlurkError::Validation`] without a call, as are requests
    /// that name no user. Only a missing session fails the whole batch.
    pub async fn befriend(&self, alerts: &[Alert], accept: bool) -> Result<BefriendReport> {
        self.befriend_until(alerts, accept, &CancellationToken::new())
            .await
    }

    /// Like [`PlurkClient::befriend`], but stops issuing calls once `cancel`
    /// fires. Answers already sent stay sent.
    pub async fn befriend_until(
        &self,
        alerts: &[Alert],
        accept: bool,
        cancel: &CancellationToken,
    ) -> Result<BefriendReport> {
        self.require_session()?;
        let endpoint = if accept {
            Endpoint::AddAsFriend
        } else {
            Endpoint::DenyFriendship
        };

        let mut report = BefriendReport::default();
        for alert in alerts {
            if cancel.is_cancelled() {
                debug!(answered = report.outcomes.len(), "befriend cancelled");
                report.cancelled = true;
                break;
            }
            let user_id = alert.user_id();
            let result = match user_id {
                Some(user_id) if alert.is_friend_request() => {
                    let params = Params::new().set("user_id", user_id);
                    self.transport
                        .call::<serde_json::Value>(endpoint, params, Auth::Required)
                        .await
                        .map(|_| ())
                }
                Some(user_id) => Err(PlurkError::Validation {
                    message: format!(
                        "alert from user {user_id} is {:?}, not a friend request",
                        alert.kind
                    ),
                }),
                None => Err(PlurkError::Validation {
                    message: format!("{:?} alert names no user", alert.kind),
                }),
            };
            if let Err(e) = &result {
                warn!(?user_id, accept, error = %e, "befriend failed for alert");
            }
            report.outcomes.push(BefriendOutcome { user_id, result });
        }
        Ok(report)
    }

    // ---------- Plurks ----------

    /// Unread plurks of the logged-in user's timeline, newest first.
    ///
    /// With `include_childless == false`, plurks nobody has responded to yet
    /// are left out.
    pub async fn get_unread_plurks(&self, include_childless: bool) -> Result<Vec<Post>> {
        self.require_session()?;
        let body: Option<PlurksResponse> = self
            .transport
            .call(Endpoint::GetUnreadPlurks, Params::new(), Auth::Required)
            .await?;
        let mut posts = body.map(PlurksResponse::into_posts).unwrap_or_default();
        if !include_childless {
            posts.retain(|p| p.response_count > 0);
        }
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    /// Plurks on `user_id`'s timeline whose activity falls within `window`
    /// (both bounds inclusive), newest first.
    ///
    /// An inverted window returns an empty list without a request. `from` is
    /// the earlier bound: a call shaped like `getPlurks(uid, later, earlier)`
    /// must swap its timestamps or it matches nothing.
    pub async fn get_plurks(&self, user_id: u64, window: TimeWindow) -> Result<Vec<Post>> {
        self.require_session()?;
        if window.is_empty() {
            debug!(user_id, ?window, "empty plurk window");
            return Ok(Vec::new());
        }
        let params = Params::new()
            .set("user_id", user_id)
            .set_opt("offset", window.from)
            .set_opt("limit", window.to);
        let body: Option<PlurksResponse> = self
            .transport
            .call(Endpoint::GetPlurks, params, Auth::Required)
            .await?;
        let mut posts = body.map(PlurksResponse::into_posts).unwrap_or_default();
        posts.retain(|p| window.contains(p.activity_at()));
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    /// Publish a plurk as the logged-in user.
    pub async fn add_plurk(&self, lang: &str, qualifier: &str, content: &str) -> Result<Post> {
        self.add_plurk_with(NewPlurk::new(lang, qualifier, content))
            .await
    }

    /// Publish a plurk with audience and comment settings.
    pub async fn add_plurk_with(&self, plurk: NewPlurk) -> Result<Post> {
        self.require_session()?;
        let mut params = Params::new()
            .set("content", plurk.content)
            .set("qualifier", plurk.qualifier)
            .set("lang", plurk.lang)
            .set("no_comments", plurk.no_comments.as_i64());
        if !plurk.limited_to.is_empty() {
            params.insert("limited_to", plurk.limited_to);
        }
        let post: Post = self
            .transport
            .call(Endpoint::PlurkAdd, params, Auth::Required)
            .await?;
        debug!(plurk_id = post.plurk_id, "plurk added");
        Ok(post)
    }

    // ---------- Responses ----------

    /// Respond to a plurk as the logged-in user.
    pub async fn respond_to_plurk(
        &self,
        plurk_id: u64,
        lang: &str,
        qualifier: &str,
        content: &str,
    ) -> Result<Response> {
        self.require_session()?;
        let params = Params::new()
            .set("plurk_id", plurk_id)
            .set("content", content)
            .set("qualifier", qualifier)
            .set("lang", lang);
        let response: Response = self
            .transport
            .call(Endpoint::ResponseAdd, params, Auth::Required)
            .await?;
        debug!(plurk_id, response_id = response.id, "response added");
        Ok(response)
    }

    /// Responses to a plurk, oldest first. Responses posted in the same
    /// second are ordered by id.
    pub async fn get_responses(&self, plurk_id: u64) -> Result<Vec<Response>> {
        self.require_session()?;
        let params = Params::new()
            .set("plurk_id", plurk_id)
            .set("from_response", 0u32);
        let body: Option<ResponsesResponse> = self
            .transport
            .call(Endpoint::GetResponses, params, Auth::Required)
            .await?;
        let mut responses = body.map(|b| b.responses).unwrap_or_default();
        responses.sort_by_key(|r| (r.posted, r.id));
        Ok(responses)
    }
}

fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.posted.cmp(&a.posted));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_defaults() {
        let client = PlurkClient::new(PlurkConfig::default()).expect("client");
        assert!(!client.is_logged_in());
        assert_eq!(client.uid(), None);
        assert!(client.friends().is_empty());
        assert!(client.cookies().is_empty());
    }

    #[test]
    fn client_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PlurkClient>();
    }

    #[test]
    fn client_rejects_invalid_config() {
        let err = PlurkClient::new(PlurkConfig::new().base_url("nope")).err().expect("error");
        assert!(matches!(err, PlurkError::Config { .. }));
    }

    #[tokio::test]
    async fn endpoints_require_a_session() {
        let client = PlurkClient::new(PlurkConfig::default()).expect("client");
        assert!(matches!(
            client.get_friends(None, Page::default()).await,
            Err(PlurkError::AuthRequired)
        ));
        assert!(matches!(client.get_alerts().await, Err(PlurkError::AuthRequired)));
        assert!(matches!(
            client.get_plurks(1, TimeWindow::all()).await,
            Err(PlurkError::AuthRequired)
        ));
        // Logging out without a session is a no-op.
        assert!(client.logout().await.is_ok());
    }
}
