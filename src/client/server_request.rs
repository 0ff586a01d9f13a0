// Sending requests to the contest site.

use log::{debug, warn};
use snafu::prelude::*;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use std::sync::Arc;
use std::thread;

use crate::client::config_reader::ClientConfig;
use crate::client::*;

pub const CONTEST_INFO: &str = "/contest-info";
pub const USER_STATE: &str = "/user-state";
pub const LOGOUT: &str = "/logout";
pub const NOMINEE_INFO: &str = "/nominee-info";
pub const NOMINEE_VOTE: &str = "/nominee-vote";
pub const NOMINEE_TWEET: &str = "/nominee-tweet";
pub const PUBLIC_NOMINEE_LIST: &str = "/public-nominee-list";
pub const NOMINEE_FORM_METADATA: &str = "/nominee-form-metadata";
pub const NOMINEE_FORM_SUBMIT: &str = "/nominee-form-submit";
pub const JUDGING: &str = "/judging";
pub const JUDGE_RANKING: &str = "/judge-ranking";
pub const FINALIST_LIST: &str = "/finalist-list";
pub const EVENT_VOTE: &str = "/event-vote";
pub const ADMIN_REVIEW_NOMINEES: &str = "/admin-review-nominees";
pub const ADMIN_REVIEW_JUDGES: &str = "/admin-review-judges";
pub const ADMIN_REVIEW_SCORES: &str = "/admin-review-scores";
pub const ADMIN_REVIEW_VOTES: &str = "/admin-review-votes";
pub const ADMIN_SET_NOMINEE_VISIBILITY: &str = "/admin-set-nominee-visibility";
pub const ADMIN_SET_VOTE_STATUS: &str = "/admin-set-vote-status";

/// Posts a JSON document and returns the decoded JSON answer.
///
/// `path` is the absolute path on the site. An empty answer is read as `null`.
pub trait Transport: Send + Sync {
    fn post_json(&self, path: &str, body: &JSValue) -> ClientResult<JSValue>;
}

/// The transport over HTTP.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<HttpTransport> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .whatever_context::<_, ClientError>("invalid session cookie")?;
            headers.insert(COOKIE, value);
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .context(HttpSnafu {
                path: config.base_url.clone(),
            })?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &str, body: &JSValue) -> ClientResult<JSValue> {
        let url = format!("{}{}", self.base_url, path);
        debug!("post_json: {} {}", url, body);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .context(HttpSnafu { path })?;
        let status = resp.status();
        if !status.is_success() {
            return HttpStatusSnafu {
                path,
                status: status.as_u16(),
            }
            .fail();
        }
        let text = resp.text().context(HttpSnafu { path })?;
        debug!("post_json: {} answered {:?}", url, text);
        if text.trim().is_empty() {
            return Ok(JSValue::Null);
        }
        serde_json::from_str(&text).context(DecodingResponseSnafu { path })
    }
}

/// The JSON body of a request to `path`.
pub fn encode_body<T: Serialize>(path: &str, value: &T) -> ClientResult<JSValue> {
    serde_json::to_value(value).context(EncodingRequestSnafu { path })
}

/// Sends the requests of the pages of one contest.
#[derive(Clone)]
pub struct ServerRequest {
    transport: Arc<dyn Transport>,
    contest_path: String,
}

impl ServerRequest {
    pub fn new(transport: Arc<dyn Transport>, contest_path: &str) -> ServerRequest {
        ServerRequest {
            transport,
            contest_path: contest_path.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<ServerRequest> {
        let transport = HttpTransport::new(config)?;
        Ok(ServerRequest::new(Arc::new(transport), &config.contest_path))
    }

    /// The path of an endpoint (or a page) under the contest.
    pub fn format_full_path(&self, path: &str) -> String {
        if self.contest_path.is_empty() {
            path.to_string()
        } else {
            format!("/{}{}", self.contest_path, path)
        }
    }

    /// Posts the body and decodes the answer.
    pub fn send_request<T: DeserializeOwned>(&self, path: &str, body: &JSValue) -> ClientResult<T> {
        let js = self.post(path, body)?;
        serde_json::from_value(js).context(DecodingResponseSnafu { path })
    }

    /// Posts the body, ignoring the content of the answer.
    pub fn send(&self, path: &str, body: &JSValue) -> ClientResult<()> {
        self.post(path, body).map(|_| ())
    }

    pub fn send_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_request(path, &json!({}))
    }

    /// Posts the body on another thread and hands the outcome to `callback`
    /// on that thread. Nothing waits for the request to complete.
    pub fn send_in_background<F>(&self, path: &str, body: JSValue, callback: F)
    where
        F: FnOnce(ClientResult<JSValue>) + Send + 'static,
    {
        let this = self.clone();
        let path = path.to_string();
        thread::spawn(move || {
            let res = this.post(&path, &body);
            callback(res);
        });
    }

    fn post(&self, path: &str, body: &JSValue) -> ClientResult<JSValue> {
        let full_path = self.format_full_path(path);
        match self.transport.post_json(&full_path, body) {
            Ok(js) => Ok(js),
            Err(e) => {
                warn!("{} failed: {}", full_path, e);
                Err(e)
            }
        }
    }
}
