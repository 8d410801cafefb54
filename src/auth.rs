//! Credentials and the session access token.

use crate::{api, api::WorkClient, error::WorkError};
use serde::{Deserialize, Serialize};

/// The enterprise credentials supplied at construction. `corp_id` names the
/// enterprise account; `secret` authorises the application within it.
pub struct Credentials {
    pub corp_id: String,
    pub secret: String,
}

/// A newtype wrapper around the session access token.
///
/// Fetched exactly once per client lifetime and attached to every onward
/// call as a query parameter; never cleared or refreshed.
#[derive(Clone)]
pub struct AccessToken(pub String);

/// A newtype wrapper around the application (agent) id, required on every
/// authenticated call and on every message body.
// The API documents the id as an integer but tolerates a string, and the
// configuration surface hands us a string; it's carried verbatim.
#[derive(Clone, Serialize)]
pub struct AgentId(pub String);

/// <https://developer.work.weixin.qq.com/document/path/91039>
#[derive(Serialize)]
struct TokenRequest<'a> {
    corpid: &'a str,
    corpsecret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    access_token: String,
}

impl WorkClient {
    /// Fetch a session token for the given credentials and store it for all
    /// onward calls.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), WorkError> {
        let res: TokenResponse = api::dispatch(self.get("/cgi-bin/gettoken").query(
            &TokenRequest {
                corpid: &credentials.corp_id,
                corpsecret: &credentials.secret,
            },
        ))
        .await?;

        self.session = Some(AccessToken(res.access_token));

        Ok(())
    }
}
