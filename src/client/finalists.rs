// The finalists, and the vote of the attendees of the final event.

use log::{debug, info, warn};

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::thread;
use std::time::Duration;

use crate::client::routes::Navigator;
use crate::client::server_request::*;
use crate::client::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Finalist {
    pub biv_id: BivId,
    #[serde(default)]
    pub display_name: String,
    /// Only filled for the administrators.
    #[serde(default)]
    pub vote_count: u32,
}

#[derive(Deserialize)]
struct FinalistListResponse {
    #[serde(default)]
    finalists: Vec<Finalist>,
}

/// The vote count of a finalist moved between two loads.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteChange {
    pub biv_id: String,
    pub display_name: String,
    pub before: u32,
    pub after: u32,
}

pub struct FinalistList {
    server: ServerRequest,
    random_value: f64,
    pub finalists: Vec<Finalist>,
}

impl FinalistList {
    pub fn load(server: &ServerRequest, nav: &Navigator) -> ClientResult<FinalistList> {
        let mut list = FinalistList {
            server: server.clone(),
            random_value: nav.random_value(),
            finalists: Vec::new(),
        };
        list.finalists = list.fetch()?;
        debug!("FinalistList::load: {} finalists", list.finalists.len());
        Ok(list)
    }

    fn fetch(&self) -> ClientResult<Vec<Finalist>> {
        let resp: FinalistListResponse = self.server.send_request(
            FINALIST_LIST,
            &json!({ "random_value": self.random_value }),
        )?;
        Ok(resp.finalists)
    }

    pub fn vote_count(&self, biv_id: &str) -> Option<u32> {
        self.finalists
            .iter()
            .find(|f| f.biv_id == biv_id)
            .map(|f| f.vote_count)
    }

    pub fn total_votes(&self) -> u32 {
        self.finalists.iter().map(|f| f.vote_count).sum()
    }

    /// The finalists whose count differs in `newer`. A finalist missing from
    /// the current list counts as 0 votes.
    pub fn changes(&self, newer: &[Finalist]) -> Vec<VoteChange> {
        newer
            .iter()
            .filter_map(|f| {
                let before = self.vote_count(f.biv_id.as_str()).unwrap_or(0);
                if before == f.vote_count {
                    None
                } else {
                    Some(VoteChange {
                        biv_id: f.biv_id.to_string(),
                        display_name: f.display_name.clone(),
                        before,
                        after: f.vote_count,
                    })
                }
            })
            .collect()
    }

    /// Loads the list again and returns what moved.
    pub fn reload(&mut self) -> ClientResult<Vec<VoteChange>> {
        let newer = self.fetch()?;
        let changes = self.changes(&newer);
        self.finalists = newer;
        Ok(changes)
    }

    /// Votes for a finalist at the event.
    pub fn cast_event_vote(&self, nav: &mut Navigator, biv_id: &str) -> ClientResult<()> {
        let id = match self.finalists.iter().find(|f| f.biv_id == biv_id) {
            Some(f) => f.biv_id.to_json(),
            None => return UnknownNomineeSnafu { biv_id }.fail(),
        };
        self.server
            .send(EVENT_VOTE, &json!({ "nominee_biv_id": id }))?;
        info!("cast_event_vote: {}", biv_id);
        nav.context(&self.server)?.refresh_user(&self.server)?;
        Ok(())
    }

    /// Reloads the list every `interval`, handing the changes to `on_change`.
    ///
    /// Stops after `rounds` reloads, or never. A failed reload is logged and
    /// the next one is tried at the following tick.
    pub fn watch<F>(
        &mut self,
        interval: Duration,
        rounds: Option<usize>,
        mut on_change: F,
    ) -> ClientResult<()>
    where
        F: FnMut(&[VoteChange]),
    {
        let mut round = 0;
        while rounds.map_or(true, |r| round < r) {
            thread::sleep(interval);
            round += 1;
            match self.reload() {
                Ok(changes) if !changes.is_empty() => on_change(&changes),
                Ok(_) => debug!("watch: no change at round {}", round),
                Err(e) => warn!("watch: reload failed: {}", e),
            }
        }
        Ok(())
    }
}
