//! Subsonic REST API client.
//!
//! Thin typed wrapper over `reqwest` for the two endpoints the sync needs:
//! `getStarred.view` and `download.view`. Token authentication parameters
//! are attached to every request; responses use the JSON `subsonic-response`
//! envelope described at <http://www.subsonic.org/pages/api.jsp>.

pub mod error;
pub mod responses;

pub use error::SubsonicError;
pub use responses::StarredSong;

use responses::Envelope;

/// Subsonic REST API version this client speaks.
const API_VERSION: &str = "1.14.0";

/// Client name reported to the server via the `c` parameter.
const CLIENT_NAME: &str = "starsystem-rs";

/// Token authentication credentials.
///
/// `token` is `md5(password + salt)` as described in the Subsonic API docs;
/// this client never sees the password itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
    pub salt: String,
}

/// HTTP client bound to one Subsonic server.
pub struct SubsonicClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl SubsonicClient {
    /// Build a client for the given server.
    ///
    /// `insecure` disables TLS certificate verification, matching the
    /// original tool's `-I` flag for servers with self-signed certificates.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        insecure: bool,
    ) -> Result<Self, SubsonicError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| SubsonicError::Http {
                op: "client setup",
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/rest/{}.view", self.base_url, name)
    }

    /// Common query parameters attached to every request.
    fn auth_params(&self) -> [(&'static str, &str); 6] {
        [
            ("u", self.credentials.username.as_str()),
            ("t", self.credentials.token.as_str()),
            ("s", self.credentials.salt.as_str()),
            ("c", CLIENT_NAME),
            ("f", "json"),
            ("v", API_VERSION),
        ]
    }

    /// Fetch the user's starred songs.
    ///
    /// A missing `starred` or `song` section is an empty list, not an error;
    /// an `error` object inside a 2xx body is surfaced as [`SubsonicError::Api`].
    pub async fn get_starred(&self) -> Result<Vec<StarredSong>, SubsonicError> {
        const OP: &str = "getStarred";
        let response = self
            .http
            .get(self.endpoint(OP))
            .query(&self.auth_params())
            .send()
            .await
            .map_err(|e| SubsonicError::Http { op: OP, source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubsonicError::Status {
                op: OP,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| SubsonicError::Malformed { op: OP, source: e })?;

        if let Some(err) = envelope.subsonic_response.error {
            return Err(SubsonicError::Api {
                code: err.code,
                message: err.message,
            });
        }

        Ok(envelope
            .subsonic_response
            .starred
            .map(|s| s.song)
            .unwrap_or_default())
    }

    /// Start downloading a song's bytes.
    ///
    /// Only the HTTP status is validated; the body is raw media, not a JSON
    /// envelope, so there is no application-level error check here.
    pub async fn download(&self, id: &str) -> Result<reqwest::Response, SubsonicError> {
        const OP: &str = "download";
        let mut params: Vec<(&str, &str)> = self.auth_params().to_vec();
        params.push(("id", id));

        let response = self
            .http
            .get(self.endpoint(OP))
            .query(&params)
            .send()
            .await
            .map_err(|e| SubsonicError::Http { op: OP, source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubsonicError::Status {
                op: OP,
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
