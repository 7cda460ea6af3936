//! Operation paths of the remote API.

/// One remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Logout,
    GetFriends,
    GetFans,
    GetAlerts,
    AddAsFriend,
    DenyFriendship,
    GetPlurks,
    GetUnreadPlurks,
    PlurkAdd,
    ResponseAdd,
    GetResponses,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/API/Users/login",
            Endpoint::Logout => "/API/Users/logout",
            Endpoint::GetFriends => "/API/FriendsFans/getFriendsByOffset",
            Endpoint::GetFans => "/API/FriendsFans/getFansByOffset",
            Endpoint::GetAlerts => "/API/Alerts/getActive",
            Endpoint::AddAsFriend => "/API/Alerts/addAsFriend",
            Endpoint::DenyFriendship => "/API/Alerts/denyFriendship",
            Endpoint::GetPlurks => "/API/Timeline/getPlurks",
            Endpoint::GetUnreadPlurks => "/API/Timeline/getUnreadPlurks",
            Endpoint::PlurkAdd => "/API/Timeline/plurkAdd",
            Endpoint::ResponseAdd => "/API/Responses/responseAdd",
            Endpoint::GetResponses => "/API/Responses/get",
        }
    }

    /// Whether a rejection from this endpoint means bad credentials.
    pub fn is_login(self) -> bool {
        self == Endpoint::Login
    }
}
