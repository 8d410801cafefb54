//! Type definitions and helpers for the WeCom HTTP API.
//!
//! Every endpoint answers with the same JSON envelope: `errcode` and
//! `errmsg` alongside the endpoint-specific fields. An `errcode` of zero is
//! success; anything else is a domain error.

use crate::{
    auth::{AccessToken, AgentId, Credentials},
    directory::Directory,
    error::WorkError,
};
use serde::{de::DeserializeOwned, Deserialize};

/// The base URL of the WeCom API.
pub const API_BASE: &str = "https://qyapi.weixin.qq.com";

/// A client for the WeCom API, holding a connection pool internally as per
/// [reqwest::Client].
///
/// The base URL is injectable so that tests can point the client at a local
/// mock server.
pub struct WorkClient {
    http: reqwest::Client,
    base_url: String,
    pub(crate) agent_id: AgentId,
    pub(crate) session: Option<AccessToken>,
    pub(crate) directory: Directory,
}

impl WorkClient {
    /// Create an unauthenticated client against the given base URL.
    pub fn new(base_url: String, agent_id: AgentId) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            agent_id,
            session: None,
            directory: Directory::default(),
        }
    }

    /// Create a fully-initialised client: authenticate, then snapshot the
    /// organisational directory. Any failure along the way aborts
    /// construction.
    pub async fn connect(
        base_url: String,
        agent_id: AgentId,
        credentials: &Credentials,
    ) -> Result<Self, WorkError> {
        let mut client = Self::new(base_url, agent_id);

        client.authenticate(credentials).await?;
        client.directory = client.fetch_directory().await?;

        Ok(client)
    }

    /// Create a GET request to any WeCom API endpoint, handling
    /// authentication.
    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authenticated(self.http.get(self.base_url.clone() + path))
    }

    /// Create a POST request to any WeCom API endpoint, handling
    /// authentication.
    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authenticated(self.http.post(self.base_url.clone() + path))
    }

    /// Attach the session token and agent id as the leading query pairs.
    ///
    /// Before authentication there is no session and the request goes out
    /// bare, which is exactly what the token fetch itself needs.
    fn authenticated(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(token) => req.query(&[
                ("access_token", token.0.as_str()),
                ("agentid", self.agent_id.0.as_str()),
            ]),
            None => req,
        }
    }
}

/// Send a request and interpret the response envelope.
///
/// Fail states are kept apart so that callers can pattern-match: transport
/// errors, non-2xx statuses, bodies that aren't the envelope at all, and
/// envelopes with a nonzero `errcode` each map to their own [WorkError]
/// variant. There are no retries; the first failure propagates.
pub(crate) async fn dispatch<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, WorkError> {
    let res = req.send().await?;

    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(WorkError::BadStatus(status, text));
    }

    match serde_json::from_str(&text) {
        Ok(APIResult::Ok(x)) => Ok(x),
        Ok(APIResult::Err(e)) => Err(WorkError::Api {
            code: e.errcode,
            message: e.errmsg,
        }),
        Err(_) => Err(WorkError::MalformedResponse(text)),
    }
}

/// The API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "errcode": 0,
///     "errmsg": "ok",
///     "access_token": "accesstoken000001"
/// }
/// ```
///
/// ```json
/// {
///     "errcode": 40013,
///     "errmsg": "invalid corpid"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum APIResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

/// The universal response in case of an unsuccessful request.
// The `errcode` field is checked here, and should be checked on responses
// too, primarily to ensure appropriate deserialization behaviour in case of
// an otherwise empty successful response.
//
// Ideally we'd be able to use `errcode` as a tag, rather than defining
// `APIResult` as untagged. See:
//   <https://github.com/serde-rs/serde/issues/745#issuecomment-294314786>
#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(deserialize_with = "crate::de::nonzero")]
    pub errcode: i64,
    pub errmsg: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[derive(Deserialize)]
    struct Pong {
        #[allow(dead_code)]
        #[serde(deserialize_with = "crate::de::zero")]
        errcode: i64,
        value: String,
    }

    fn client(base_url: String) -> WorkClient {
        WorkClient::new(base_url, AgentId("1000002".to_owned()))
    }

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut srv = server().await;

        let mock = srv
            .mock("GET", "/ping")
            .with_body(r#"{"errcode": 0, "errmsg": "ok", "value": "pong"}"#)
            .create_async()
            .await;

        let res: Pong = dispatch(client(srv.url()).get("/ping")).await.unwrap();

        mock.assert_async().await;

        assert_eq!(res.value, "pong");
    }

    #[tokio::test]
    async fn test_dispatch_api_error() {
        let mut srv = server().await;

        let mock = srv
            .mock("GET", "/ping")
            .with_body(r#"{"errcode": 40013, "errmsg": "invalid corpid"}"#)
            .create_async()
            .await;

        let res = dispatch::<Pong>(client(srv.url()).get("/ping")).await;

        mock.assert_async().await;

        match res {
            Err(WorkError::Api { code, message }) => {
                assert_eq!(code, 40013);
                assert_eq!(message, "invalid corpid");
            }
            _ => panic!("expected an API error"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_malformed_response() {
        let mut srv = server().await;

        let mock = srv
            .mock("GET", "/ping")
            .with_body("<html>definitely not the envelope</html>")
            .create_async()
            .await;

        let res = dispatch::<Pong>(client(srv.url()).get("/ping")).await;

        mock.assert_async().await;

        match res {
            Err(WorkError::MalformedResponse(text)) => {
                assert_eq!(text, "<html>definitely not the envelope</html>");
            }
            _ => panic!("expected a malformed response error"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_bad_status() {
        let mut srv = server().await;

        let mock = srv
            .mock("GET", "/ping")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let res = dispatch::<Pong>(client(srv.url()).get("/ping")).await;

        mock.assert_async().await;

        match res {
            Err(WorkError::BadStatus(status, body)) => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(body, "Bad Gateway");
            }
            _ => panic!("expected a bad status error"),
        }
    }

    #[tokio::test]
    async fn test_session_attached_once_present() {
        let mut srv = server().await;

        let mock = srv
            .mock("GET", "/ping")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "accesstoken000001".into()),
                Matcher::UrlEncoded("agentid".into(), "1000002".into()),
            ]))
            .with_body(r#"{"errcode": 0, "errmsg": "ok", "value": "pong"}"#)
            .create_async()
            .await;

        let mut client = client(srv.url());
        client.session = Some(AccessToken("accesstoken000001".to_owned()));

        let res: Pong = dispatch(client.get("/ping")).await.unwrap();

        mock.assert_async().await;

        assert_eq!(res.value, "pong");
    }

    #[tokio::test]
    async fn test_connect_fetches_token_then_directory() {
        let mut srv = server().await;

        let token_mock = srv
            .mock("GET", "/cgi-bin/gettoken")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("corpid".into(), "wwcorp".into()),
                Matcher::UrlEncoded("corpsecret".into(), "hunter2".into()),
            ]))
            .with_body(
                r#"{"errcode": 0, "errmsg": "ok", "access_token": "accesstoken000001", "expires_in": 7200}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let department_mock = srv
            .mock("GET", "/cgi-bin/department/list")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "accesstoken000001".into()),
                Matcher::UrlEncoded("agentid".into(), "1000002".into()),
            ]))
            .with_body(
                r#"{
                    "errcode": 0,
                    "errmsg": "ok",
                    "department": [
                        {"id": 2, "name": "Finance", "parentid": 1, "order": 10},
                        {"id": 3, "name": "Research", "parentid": 1, "order": 20}
                    ]
                }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let users_2_mock = srv
            .mock("GET", "/cgi-bin/user/simplelist")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "accesstoken000001".into()),
                Matcher::UrlEncoded("department_id".into(), "2".into()),
            ]))
            .with_body(
                r#"{
                    "errcode": 0,
                    "errmsg": "ok",
                    "userlist": [{"userid": "zhangsan", "name": "Zhang San", "department": [2]}]
                }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let users_3_mock = srv
            .mock("GET", "/cgi-bin/user/simplelist")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "accesstoken000001".into()),
                Matcher::UrlEncoded("department_id".into(), "3".into()),
            ]))
            .with_body(
                r#"{
                    "errcode": 0,
                    "errmsg": "ok",
                    "userlist": [{"userid": "lisi", "name": "Li Si", "department": [3]}]
                }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = WorkClient::connect(
            srv.url(),
            AgentId("1000002".to_owned()),
            &Credentials {
                corp_id: "wwcorp".to_owned(),
                secret: "hunter2".to_owned(),
            },
        )
        .await
        .unwrap();

        token_mock.assert_async().await;
        department_mock.assert_async().await;
        users_2_mock.assert_async().await;
        users_3_mock.assert_async().await;

        assert_eq!(client.departments().len(), 2);
        assert_eq!(client.users().len(), 2);
    }

    #[tokio::test]
    async fn test_connect_aborts_on_directory_failure() {
        let mut srv = server().await;

        let token_mock = srv
            .mock("GET", "/cgi-bin/gettoken")
            .match_query(Matcher::Any)
            .with_body(r#"{"errcode": 0, "errmsg": "ok", "access_token": "accesstoken000001"}"#)
            .create_async()
            .await;

        let department_mock = srv
            .mock("GET", "/cgi-bin/department/list")
            .match_query(Matcher::Any)
            .with_body(r#"{"errcode": 60011, "errmsg": "no privilege to access/modify contact/party/agent"}"#)
            .create_async()
            .await;

        let res = WorkClient::connect(
            srv.url(),
            AgentId("1000002".to_owned()),
            &Credentials {
                corp_id: "wwcorp".to_owned(),
                secret: "hunter2".to_owned(),
            },
        )
        .await;

        token_mock.assert_async().await;
        department_mock.assert_async().await;

        match res {
            Err(WorkError::Api { code, .. }) => assert_eq!(code, 60011),
            _ => panic!("expected construction to abort"),
        }
    }
}
