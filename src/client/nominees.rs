// The public pages of the nominees: the list and the page of one nominee.

use log::{debug, info, warn};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::context::AlertLevel;
use crate::client::routes::Navigator;
use crate::client::server_request::*;
use crate::client::*;

const YOUTUBE_EMBED: &str = "//www.youtube.com/embed/";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Founder {
    #[serde(deserialize_with = "read_biv_id")]
    pub biv_id: String,
    pub display_name: String,
    pub founder_desc: String,
}

/// The details of one nominee, as sent by `/nominee-info`.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NomineeInfo {
    #[serde(deserialize_with = "read_biv_id")]
    pub biv_id: String,
    pub display_name: String,
    pub url: String,
    pub youtube_code: String,
    pub nominee_desc: String,
    pub founders: Vec<Founder>,
}

#[derive(Deserialize)]
struct NomineeInfoResponse {
    nominee: NomineeInfo,
}

/// The link to the page of a nominee, relative to the contest.
pub fn nominee_url(biv_id: &str) -> String {
    format!("/{}/contestant", biv_id)
}

/// The page of one nominee, with its voting dialogs.
pub struct NomineeView {
    server: ServerRequest,
    biv_id: String,
    autoplay: bool,
    support_email: String,
    pub info: NomineeInfo,
    pub twitter_handle: String,
    /// Where to come back after logging in to vote.
    pub vote_url: Option<String>,
    pub show_vote_modal: bool,
    pub show_login_and_vote_modal: bool,
    pub show_tweet_modal: bool,
}

impl NomineeView {
    /// Fetches the nominee. With `vote`, a logged in user who did not vote yet
    /// is asked to confirm a vote straight away.
    pub fn load(
        server: &ServerRequest,
        nav: &mut Navigator,
        biv_id: &str,
        autoplay: bool,
        vote: bool,
        support_email: &str,
    ) -> ClientResult<NomineeView> {
        let resp: NomineeInfoResponse =
            server.send_request(NOMINEE_INFO, &json!({ "nominee_biv_id": biv_id }))?;
        debug!("NomineeView::load: {:?}", resp.nominee);
        let user = &nav.context(server)?.user;
        let show_vote_modal = vote && user.is_logged_in() && !user.has_voted();
        Ok(NomineeView {
            server: server.clone(),
            biv_id: biv_id.to_string(),
            autoplay,
            support_email: support_email.to_string(),
            info: resp.nominee,
            twitter_handle: String::new(),
            vote_url: None,
            show_vote_modal,
            show_login_and_vote_modal: false,
            show_tweet_modal: false,
        })
    }

    pub fn full_nominee_url(&self) -> String {
        self.server
            .format_full_path(&format!("#{}", nominee_url(&self.info.biv_id)))
    }

    /// Opens the vote dialog, or asks a visitor to log in first.
    pub fn cast_vote(&mut self, nav: &mut Navigator) -> ClientResult<()> {
        if !nav.context(&self.server)?.user.is_logged_in() {
            self.vote_url = Some(format!("{}?vote=1", self.full_nominee_url()));
            self.show_login_and_vote_modal = true;
            return Ok(());
        }
        self.show_vote_modal = true;
        Ok(())
    }

    /// Records the vote. A rejected vote is reported as an alert.
    pub fn save_vote(&mut self, nav: &mut Navigator) -> ClientResult<()> {
        let body = json!({ "nominee_biv_id": self.biv_id });
        match self.server.send(NOMINEE_VOTE, &body) {
            Ok(()) => {
                info!("save_vote: voted for {}", self.biv_id);
                nav.context(&self.server)?.refresh_user(&self.server)?;
                self.show_vote_modal = false;
                self.show_tweet_modal = true;
            }
            Err(e) => {
                warn!("save_vote: {}", e);
                self.show_vote_modal = false;
                nav.alert(
                    &format!(
                        "There was a problem recording your vote. Please contact {}",
                        self.support_email
                    ),
                    AlertLevel::Danger,
                );
            }
        }
        Ok(())
    }

    /// Records that the vote was shared on Twitter.
    pub fn tweet_vote(&mut self, nav: &mut Navigator) -> ClientResult<()> {
        let body = json!({
            "twitter_handle": self.twitter_handle,
            "nominee_biv_id": self.biv_id,
        });
        self.server.send(NOMINEE_TWEET, &body)?;
        nav.context(&self.server)?.refresh_user(&self.server)?;
        self.show_tweet_modal = false;
        Ok(())
    }

    pub fn tweet_text(&self, contest_name: &str) -> String {
        format!(
            "I just voted for {} in the {}",
            self.info.display_name, contest_name
        )
    }

    /// The web site of the nominee, as a link.
    pub fn format_url(&self) -> String {
        if self.info.url.contains("://") {
            self.info.url.clone()
        } else {
            format!("http://{}", self.info.url)
        }
    }

    pub fn video_url(&self) -> Option<String> {
        if self.info.url.is_empty() {
            return None;
        }
        let autoplay = if self.autoplay { "?autoplay=1" } else { "" };
        Some(format!("{}{}{}", YOUTUBE_EMBED, self.info.youtube_code, autoplay))
    }

    /// The user voted for this nominee.
    pub fn user_selection(&self, nav: &mut Navigator) -> ClientResult<bool> {
        let user = &nav.context(&self.server)?.user;
        Ok(user.get_vote() == Some(self.biv_id.as_str()))
    }
}

/// A nominee in the public list.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicNominee {
    #[serde(deserialize_with = "read_biv_id")]
    pub biv_id: String,
    pub display_name: String,
    pub youtube_code: String,
    pub nominee_summary: String,
    pub is_finalist: bool,
    pub is_semi_finalist: bool,
    pub is_winner: bool,
}

#[derive(Deserialize)]
struct NomineeListResponse {
    #[serde(default)]
    nominees: Vec<PublicNominee>,
}

/// The list of the public nominees.
pub struct NomineeList {
    server: ServerRequest,
    pub nominees: Vec<PublicNominee>,
    pub finalists: Vec<PublicNominee>,
    pub vote_url: Option<String>,
    pub show_login_and_vote_modal: bool,
}

impl NomineeList {
    /// The server shuffles the list with the random value of the visitor.
    pub fn load(server: &ServerRequest, nav: &Navigator) -> ClientResult<NomineeList> {
        let resp: NomineeListResponse = server.send_request(
            PUBLIC_NOMINEE_LIST,
            &json!({ "random_value": nav.random_value() }),
        )?;
        let finalists: Vec<PublicNominee> = resp
            .nominees
            .iter()
            .filter(|n| n.is_finalist)
            .cloned()
            .collect();
        debug!(
            "NomineeList::load: {} nominees, {} finalists",
            resp.nominees.len(),
            finalists.len()
        );
        Ok(NomineeList {
            server: server.clone(),
            nominees: resp.nominees,
            finalists,
            vote_url: None,
            show_login_and_vote_modal: false,
        })
    }

    pub fn can_vote(&self, nav: &mut Navigator) -> ClientResult<bool> {
        let user = &nav.context(&self.server)?.user;
        Ok(user.can_vote() && !user.has_voted())
    }

    /// Goes to the nominee page to confirm the vote, or asks a visitor to log
    /// in first.
    pub fn cast_vote(&mut self, nav: &mut Navigator, biv_id: &str) -> ClientResult<()> {
        self.find(biv_id)?;
        if !nav.context(&self.server)?.user.is_logged_in() {
            let url = self
                .server
                .format_full_path(&format!("#{}", nominee_url(biv_id)));
            self.vote_url = Some(format!("{}?vote=1", url));
            self.show_login_and_vote_modal = true;
            return Ok(());
        }
        nav.navigate(&format!("{}?vote=1", nominee_url(biv_id)));
        Ok(())
    }

    pub fn select_nominee(
        &self,
        nav: &mut Navigator,
        biv_id: &str,
        autoplay: bool,
    ) -> ClientResult<()> {
        self.find(biv_id)?;
        if autoplay {
            nav.navigate(&format!("{}?autoplay=1", nominee_url(biv_id)));
        } else {
            nav.navigate(&nominee_url(biv_id));
        }
        Ok(())
    }

    pub fn user_selection(&self, nav: &mut Navigator, biv_id: &str) -> ClientResult<bool> {
        let user = &nav.context(&self.server)?.user;
        Ok(user.get_vote() == Some(biv_id))
    }

    fn find(&self, biv_id: &str) -> ClientResult<&PublicNominee> {
        match self.nominees.iter().find(|n| n.biv_id == biv_id) {
            Some(n) => Ok(n),
            None => UnknownNomineeSnafu { biv_id }.fail(),
        }
    }
}
