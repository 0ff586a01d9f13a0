// The review pages of the administrators.

use log::{debug, info};
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;

use crate::client::nominees::Founder;
use crate::client::server_request::*;
use crate::client::*;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewNominee {
    pub biv_id: BivId,
    pub display_name: String,
    pub founders: Vec<Founder>,
    pub is_public: bool,
    pub nominee_desc: String,
    pub submitter_display_name: String,
    pub submitter_email: String,
    pub url: String,
    pub youtube_code: String,
}

#[derive(Deserialize)]
struct NomineesResponse {
    #[serde(default)]
    nominees: Vec<ReviewNominee>,
}

/// All the nominees, public or not.
pub struct NomineeReview {
    server: ServerRequest,
    pub nominees: Vec<ReviewNominee>,
    selected: Option<String>,
    pub show_video_player: bool,
}

impl NomineeReview {
    pub fn load(server: &ServerRequest) -> ClientResult<NomineeReview> {
        let resp: NomineesResponse = server.send_empty(ADMIN_REVIEW_NOMINEES)?;
        debug!("NomineeReview::load: {} nominees", resp.nominees.len());
        Ok(NomineeReview {
            server: server.clone(),
            nominees: resp.nominees,
            selected: None,
            show_video_player: false,
        })
    }

    pub fn nominee(&self, biv_id: &str) -> ClientResult<&ReviewNominee> {
        match self.nominees.iter().find(|n| n.biv_id == biv_id) {
            Some(n) => Ok(n),
            None => UnknownNomineeSnafu { biv_id }.fail(),
        }
    }

    /// Opens the video player on the nominee.
    pub fn select_nominee(&mut self, biv_id: &str) -> ClientResult<()> {
        self.nominee(biv_id)?;
        self.selected = Some(biv_id.to_string());
        self.show_video_player = true;
        Ok(())
    }

    pub fn close_video_player(&mut self) {
        self.show_video_player = false;
    }

    pub fn selected_nominee(&self) -> Option<&ReviewNominee> {
        let id = self.selected.as_deref()?;
        self.nominees.iter().find(|n| n.biv_id == id)
    }

    /// The player of the selected nominee, which starts playing at once.
    pub fn video_url(&self) -> Option<String> {
        let n = self.selected_nominee()?;
        if n.url.is_empty() {
            return None;
        }
        Some(format!(
            "//www.youtube.com/embed/{}?autoplay=1&enablejsapi=1",
            n.youtube_code
        ))
    }

    /// Shows or hides a nominee on the public pages.
    pub fn set_public(&mut self, biv_id: &str, is_public: bool) -> ClientResult<()> {
        let id = self.nominee(biv_id)?.biv_id.to_json();
        self.server.send(
            ADMIN_SET_NOMINEE_VISIBILITY,
            &json!({ "biv_id": id, "is_public": is_public }),
        )?;
        info!("set_public: {} -> {}", biv_id, is_public);
        if let Some(n) = self.nominees.iter_mut().find(|n| n.biv_id == biv_id) {
            n.is_public = is_public;
        }
        Ok(())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSummary {
    pub display_name: String,
    pub user_email: String,
    pub rank_count: u32,
}

#[derive(Deserialize)]
struct JudgesResponse {
    #[serde(default)]
    judges: Vec<JudgeSummary>,
}

pub fn review_judges(server: &ServerRequest) -> ClientResult<Vec<JudgeSummary>> {
    let resp: JudgesResponse = server.send_empty(ADMIN_REVIEW_JUDGES)?;
    Ok(resp.judges)
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NomineeScore {
    #[serde(deserialize_with = "read_biv_id")]
    pub biv_id: String,
    pub display_name: String,
    /// The ranks given by the judges, as displayed.
    pub judge_ranks: String,
    pub votes: u32,
    pub judge_score: f64,
}

#[derive(Deserialize)]
struct ScoresResponse {
    #[serde(default)]
    scores: Vec<NomineeScore>,
}

pub struct ScoreReview {
    pub scores: Vec<NomineeScore>,
    pub total_votes: u32,
    pub total_judge_score: f64,
}

impl ScoreReview {
    /// Best judge score first, then most votes, then by name.
    pub fn load(server: &ServerRequest) -> ClientResult<ScoreReview> {
        let resp: ScoresResponse = server.send_empty(ADMIN_REVIEW_SCORES)?;
        Ok(ScoreReview::from_scores(resp.scores))
    }

    pub fn from_scores(mut scores: Vec<NomineeScore>) -> ScoreReview {
        let total_votes = scores.iter().map(|s| s.votes).sum();
        let total_judge_score = scores.iter().map(|s| s.judge_score).sum();
        scores.sort_by(|a, b| {
            b.judge_score
                .partial_cmp(&a.judge_score)
                .unwrap_or(Ordering::Equal)
                .then(b.votes.cmp(&a.votes))
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        ScoreReview {
            scores,
            total_votes,
            total_judge_score,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteRecord {
    pub biv_id: BivId,
    pub creation_date_time: String,
    pub user_display_name: String,
    pub twitter_handle: Option<String>,
    pub nominee_display_name: String,
    /// `1x`, `2x` (tweeted) or `invalidated`.
    pub vote_status: String,
}

#[derive(Deserialize)]
struct VotesResponse {
    #[serde(default)]
    votes: Vec<VoteRecord>,
}

pub struct VoteReview {
    server: ServerRequest,
    pub votes: Vec<VoteRecord>,
}

impl VoteReview {
    pub fn load(server: &ServerRequest) -> ClientResult<VoteReview> {
        let resp: VotesResponse = server.send_empty(ADMIN_REVIEW_VOTES)?;
        Ok(VoteReview {
            server: server.clone(),
            votes: resp.votes,
        })
    }

    pub fn update_vote_status(&mut self, biv_id: &str, vote_status: &str) -> ClientResult<()> {
        let id = match self.votes.iter().find(|v| v.biv_id == biv_id) {
            Some(v) => v.biv_id.to_json(),
            None => whatever!("no vote {}", biv_id),
        };
        self.server.send(
            ADMIN_SET_VOTE_STATUS,
            &json!({ "biv_id": id, "vote_status": vote_status }),
        )?;
        info!("update_vote_status: {} -> {}", biv_id, vote_status);
        for v in self.votes.iter_mut().filter(|v| v.biv_id == biv_id) {
            v.vote_status = vote_status.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;
    use serde_json::Value as JSValue;
    use std::sync::Arc;

    fn server(mock: &Arc<MockTransport>) -> ServerRequest {
        ServerRequest::new(mock.clone(), "evc")
    }

    #[test]
    fn nominee_visibility() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_NOMINEES,
            json!({"nominees": [
                {"biv_id": 1001, "display_name": "A", "is_public": false, "url": "a.com", "youtube_code": "yt1",
                 "founders": [{"biv_id": 2001, "display_name": "F", "founder_desc": "d"}]},
                {"biv_id": 1002, "display_name": "B", "is_public": true, "url": ""}
            ]}),
        );
        mock.reply(ADMIN_SET_NOMINEE_VISIBILITY, JSValue::Null);
        let mut r = NomineeReview::load(&server(&mock)).unwrap();
        r.set_public("1001", true).unwrap();
        assert!(r.nominee("1001").unwrap().is_public);
        assert_eq!(
            mock.bodies(ADMIN_SET_NOMINEE_VISIBILITY),
            vec![json!({"biv_id": 1001, "is_public": true})]
        );
        assert!(r.set_public("9999", true).is_err());
        assert_eq!(r.nominee("1001").unwrap().founders[0].biv_id, "2001");
    }

    #[test]
    fn refused_visibility_keeps_flag() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_NOMINEES,
            json!({"nominees": [{"biv_id": 1001, "is_public": false}]}),
        );
        mock.fail(ADMIN_SET_NOMINEE_VISIBILITY, 403);
        let mut r = NomineeReview::load(&server(&mock)).unwrap();
        assert_eq!(r.set_public("1001", true).unwrap_err().status(), Some(403));
        assert!(!r.nominee("1001").unwrap().is_public);
    }

    #[test]
    fn video_player() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_NOMINEES,
            json!({"nominees": [
                {"biv_id": 1001, "url": "a.com", "youtube_code": "yt1"},
                {"biv_id": 1002, "url": "", "youtube_code": "yt2"}
            ]}),
        );
        let mut r = NomineeReview::load(&server(&mock)).unwrap();
        assert_eq!(r.video_url(), None);
        r.select_nominee("1001").unwrap();
        assert!(r.show_video_player);
        assert_eq!(
            r.video_url().as_deref(),
            Some("//www.youtube.com/embed/yt1?autoplay=1&enablejsapi=1")
        );
        r.select_nominee("1002").unwrap();
        assert_eq!(r.video_url(), None);
        r.close_video_player();
        assert!(!r.show_video_player);
    }

    #[test]
    fn judges() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_JUDGES,
            json!({"judges": [{"display_name": "J", "user_email": "j@x.com", "rank_count": 5}]}),
        );
        let judges = review_judges(&server(&mock)).unwrap();
        assert_eq!(judges[0].rank_count, 5);
        assert_eq!(judges[0].user_email, "j@x.com");
    }

    #[test]
    fn scores_are_sorted() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_SCORES,
            json!({"scores": [
                {"biv_id": "a", "display_name": "Zeta", "judge_ranks": "1st", "votes": 2, "judge_score": 5},
                {"biv_id": "b", "display_name": "Beta", "judge_ranks": "", "votes": 7, "judge_score": 9.5},
                {"biv_id": "c", "display_name": "Alpha", "judge_ranks": "", "votes": 2, "judge_score": 5},
                {"biv_id": "d", "display_name": "Gamma", "judge_ranks": "", "votes": 4, "judge_score": 5}
            ]}),
        );
        let s = ScoreReview::load(&server(&mock)).unwrap();
        let order: Vec<&str> = s.scores.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(order, vec!["Beta", "Gamma", "Alpha", "Zeta"]);
        assert_eq!(s.total_votes, 15);
        assert_eq!(s.total_judge_score, 24.5);
    }

    #[test]
    fn vote_status() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_VOTES,
            json!({"votes": [{
                "biv_id": 3001,
                "creation_date_time": "2015-10-01 10:00:00",
                "user_display_name": "U",
                "twitter_handle": null,
                "nominee_display_name": "A",
                "vote_status": "1x"
            }]}),
        );
        mock.reply(ADMIN_SET_VOTE_STATUS, JSValue::Null);
        let mut v = VoteReview::load(&server(&mock)).unwrap();
        v.update_vote_status("3001", "invalidated").unwrap();
        assert_eq!(v.votes[0].vote_status, "invalidated");
        assert_eq!(
            mock.bodies(ADMIN_SET_VOTE_STATUS),
            vec![json!({"biv_id": 3001, "vote_status": "invalidated"})]
        );
        assert!(v.update_vote_status("1", "2x").is_err());
    }

    #[test]
    fn string_ids_stay_strings() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            ADMIN_REVIEW_NOMINEES,
            json!({"nominees": [{"biv_id": "1001", "is_public": false}]}),
        );
        mock.reply(ADMIN_SET_NOMINEE_VISIBILITY, JSValue::Null);
        let mut r = NomineeReview::load(&server(&mock)).unwrap();
        r.set_public("1001", true).unwrap();
        assert_eq!(
            mock.bodies(ADMIN_SET_NOMINEE_VISIBILITY),
            vec![json!({"biv_id": "1001", "is_public": true})]
        );

        mock.reply(
            ADMIN_REVIEW_VOTES,
            json!({"votes": [{"biv_id": "3001", "vote_status": "2x"}]}),
        );
        mock.reply(ADMIN_SET_VOTE_STATUS, JSValue::Null);
        let mut v = VoteReview::load(&server(&mock)).unwrap();
        v.update_vote_status("3001", "1x").unwrap();
        assert_eq!(
            mock.bodies(ADMIN_SET_VOTE_STATUS),
            vec![json!({"biv_id": "3001", "vote_status": "1x"})]
        );
    }
}
