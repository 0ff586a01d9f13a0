// An in-memory transport for the tests of the pages.

use serde_json::Value as JSValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::client::server_request::Transport;
use crate::client::*;

#[derive(Debug, Clone)]
enum Canned {
    Json(JSValue),
    Status(u16),
}

/// Answers requests with canned responses, matched on the end of the path.
///
/// Responses registered for the same endpoint are served in order, the last
/// one being repeated. Unknown endpoints answer with a 404.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Canned>>>,
    requests: Mutex<Vec<(String, JSValue)>>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    pub fn reply(&self, endpoint: &str, js: JSValue) {
        self.push(endpoint, Canned::Json(js));
    }

    pub fn fail(&self, endpoint: &str, status: u16) {
        self.push(endpoint, Canned::Status(status));
    }

    /// All the requests received so far, as (full path, body).
    pub fn requests(&self) -> Vec<(String, JSValue)> {
        self.requests.lock().unwrap().clone()
    }

    /// The bodies posted to one endpoint.
    pub fn bodies(&self, endpoint: &str) -> Vec<JSValue> {
        self.requests()
            .into_iter()
            .filter(|(p, _)| p.ends_with(endpoint))
            .map(|(_, b)| b)
            .collect()
    }

    fn push(&self, endpoint: &str, c: Canned) {
        self.responses
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(c);
    }
}

impl Transport for MockTransport {
    fn post_json(&self, path: &str, body: &JSValue) -> ClientResult<JSValue> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        let mut responses = self.responses.lock().unwrap();
        let canned = responses
            .iter_mut()
            .filter(|(endpoint, _)| path.ends_with(endpoint.as_str()))
            .max_by_key(|(endpoint, _)| endpoint.len())
            .and_then(|(_, queue)| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });
        match canned {
            Some(Canned::Json(js)) => Ok(js),
            Some(Canned::Status(status)) => HttpStatusSnafu { path, status }.fail(),
            None => HttpStatusSnafu { path, status: 404u16 }.fail(),
        }
    }
}
