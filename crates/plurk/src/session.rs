//! Login, logout and the logged-in identity.

use tracing::{info, warn};

use crate::client::PlurkClient;
use crate::config::Credentials;
use crate::endpoints::Endpoint;
use crate::error::{PlurkError, Result};
use crate::params::Params;
use crate::transport::Auth;
use crate::types::{LoginResponse, UserProfile};

/// State established by a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The logged-in user.
    pub owner: UserProfile,
    /// The owner's friends as returned inline by the login call.
    pub friends: Vec<UserProfile>,
}

impl Session {
    pub fn uid(&self) -> u64 {
        self.owner.id
    }
}

impl PlurkClient {
    /// Log in and remember the session for later calls.
    ///
    /// On success the owner's profile and friend list are available through
    /// [`PlurkClient::owner`] and [`PlurkClient::friends`]. Any previous
    /// session is replaced. On failure the client is left logged out: it
    /// never keeps a half-populated session.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        let transport = self.transport();
        // Old cookies must not leak into a login for a different account.
        transport.clear_session();

        let params = Params::new()
            .set("nick_name", credentials.nick_name.as_str())
            .set("password", credentials.password());
        let response: LoginResponse = match transport
            .call(Endpoint::Login, params, Auth::Anonymous)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                transport.clear_session();
                let e = match e {
                    // "Requires login" on the login endpoint is still a rejection.
                    PlurkError::AuthRequired => PlurkError::Authentication {
                        message: "login rejected".to_string(),
                    },
                    other => other,
                };
                warn!(nick_name = %credentials.nick_name, error = %e, "plurk login failed");
                return Err(e);
            }
        };

        let owner = response.user_info;
        let mut friends = response
            .friends
            .map(|list| list.into_users())
            .unwrap_or_default();
        friends.sort_by_key(|f| f.id);
        info!(
            uid = owner.id,
            nick_name = %owner.nick_name,
            friends = friends.len(),
            "plurk login succeeded"
        );
        transport.set_session(Session {
            owner: owner.clone(),
            friends,
        });
        Ok(owner)
    }

    /// End the session.
    ///
    /// The local session is dropped even when the remote logout call fails;
    /// that failure is still returned. Without a session this does nothing.
    pub async fn logout(&self) -> Result<()> {
        let transport = self.transport();
        let Some(session) = transport.session() else {
            return Ok(());
        };
        let result: Result<serde_json::Value> = transport
            .call(Endpoint::Logout, Params::new(), Auth::Required)
            .await;
        transport.clear_session();
        info!(uid = session.uid(), "plurk logout");
        result.map(|_| ())
    }

    pub fn is_logged_in(&self) -> bool {
        self.transport().has_session()
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.transport().session()
    }

    /// Id of the logged-in user.
    pub fn uid(&self) -> Option<u64> {
        self.session().map(|s| s.uid())
    }

    pub fn owner(&self) -> Option<UserProfile> {
        self.session().map(|s| s.owner)
    }

    /// Friends returned with the login response; empty when logged out.
    pub fn friends(&self) -> Vec<UserProfile> {
        self.session().map(|s| s.friends).unwrap_or_default()
    }

    pub(crate) fn require_session(&self) -> Result<Session> {
        self.session().ok_or(PlurkError::AuthRequired)
    }
}
