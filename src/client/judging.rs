// The judging page: a judge ranks the semi-finalists, every change is saved
// in the background.

use log::{debug, info, warn};
use snafu::prelude::*;

use chrono::{DateTime, Local};
use judge_ranking::{Candidate, RankChange, RankOption, Ranking};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::client::server_request::*;
use crate::client::*;

const THANK_YOU: &str = "Thank you for participating in this contest! ";

/// One nominee of the judging page, as exchanged with the server.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JudgingEntry {
    #[serde(deserialize_with = "read_biv_id")]
    pub biv_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl JudgingEntry {
    fn to_candidate(&self) -> Candidate {
        Candidate {
            comment: self.comment.clone(),
            rank: self.rank,
            ..Candidate::new(&self.biv_id, &self.display_name)
        }
    }

    fn from_candidate(c: &Candidate) -> JudgingEntry {
        JudgingEntry {
            biv_id: c.id.clone(),
            display_name: c.name.clone(),
            rank: c.rank,
            comment: c.comment.clone(),
        }
    }
}

#[derive(Deserialize)]
struct JudgingResponse {
    #[serde(default)]
    judging: Vec<JudgingEntry>,
}

/// How a background save ended.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(DateTime<Local>),
    Failed(String),
}

/// The ranking of the judge during one visit of the judging page.
///
/// The page owns the ranking. Saves are not awaited and a failed save does
/// not undo the local change: the page and the server disagree until the
/// next load. When several saves are in flight, the status line shows the
/// outcome of the last one to complete.
pub struct JudgingSession {
    server: ServerRequest,
    ranking: Ranking,
    support_email: String,
    touch_device: bool,
    auto_save_message: Option<String>,
    /// The nominee whose comment is being edited.
    pub comment_nominee: Option<String>,
    pub comment: String,
    pub show_comment_editor: bool,
    pending: usize,
    sender: Sender<SaveOutcome>,
    receiver: Receiver<SaveOutcome>,
}

impl JudgingSession {
    pub fn load(
        server: &ServerRequest,
        support_email: &str,
        touch_device: bool,
    ) -> ClientResult<JudgingSession> {
        let resp: JudgingResponse = server.send_empty(JUDGING)?;
        let candidates: Vec<Candidate> = resp.judging.iter().map(|e| e.to_candidate()).collect();
        let ranking = Ranking::from_candidates(&candidates).context(RankingSnafu {})?;
        info!(
            "JudgingSession::load: {} nominees, {} ranked",
            candidates.len(),
            ranking.ranked_count()
        );
        let (sender, receiver) = channel();
        Ok(JudgingSession {
            server: server.clone(),
            ranking,
            support_email: support_email.to_string(),
            touch_device,
            auto_save_message: None,
            comment_nominee: None,
            comment: String::new(),
            show_comment_editor: false,
            pending: 0,
            sender,
            receiver,
        })
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    pub fn nominees(&self) -> &[Candidate] {
        self.ranking.candidates()
    }

    /// The status line of the page.
    pub fn auto_save_message(&self) -> Option<&str> {
        self.auto_save_message.as_deref()
    }

    pub fn pending_saves(&self) -> usize {
        self.pending
    }

    /// Gives the nominee the next rank, unless all the ranks are taken.
    pub fn select_nominee(&mut self, biv_id: &str) -> ClientResult<RankChange> {
        let change = self
            .ranking
            .assign_next_rank(biv_id)
            .context(RankingSnafu {})?;
        self.save_if_changed(change);
        Ok(change)
    }

    /// Picks a rank from the menu, 0 removing the rank.
    pub fn select_rank(&mut self, biv_id: &str, rank: u32) -> ClientResult<RankChange> {
        let change = self
            .ranking
            .set_rank(biv_id, rank)
            .context(RankingSnafu {})?;
        self.save_if_changed(change);
        Ok(change)
    }

    pub fn hover_nominee(&mut self, biv_id: &str) -> ClientResult<()> {
        if self.touch_device {
            return Ok(());
        }
        self.ranking.hover(biv_id).context(RankingSnafu {})
    }

    pub fn end_hover_nominee(&mut self, biv_id: &str) -> ClientResult<()> {
        if self.touch_device {
            return Ok(());
        }
        self.ranking.end_hover(biv_id).context(RankingSnafu {})
    }

    pub fn has_comment(&self, biv_id: &str) -> ClientResult<bool> {
        Ok(self.find(biv_id)?.comment.is_some())
    }

    pub fn is_disabled(&self, biv_id: &str) -> ClientResult<bool> {
        self.ranking.is_disabled(biv_id).context(RankingSnafu {})
    }

    pub fn is_ranking_complete(&self) -> bool {
        self.ranking.is_ranking_complete()
    }

    pub fn nominee_url(&self, biv_id: &str) -> String {
        format!("#/{}/contestant", biv_id)
    }

    pub fn superscript(&self, rank: Option<u32>) -> &'static str {
        judge_ranking::superscript(rank)
    }

    /// The entries of the rank menu, starting with "Remove Rank".
    pub fn rank_options(&self) -> Vec<RankOption> {
        judge_ranking::rank_options(self.ranking.max_ranks())
    }

    /// Opens the comment editor on the comment of the nominee.
    pub fn show_comment(&mut self, biv_id: &str) -> ClientResult<()> {
        let current = self.find(biv_id)?.comment.clone();
        self.comment_nominee = Some(biv_id.to_string());
        self.comment = current.unwrap_or_default();
        self.show_comment_editor = true;
        Ok(())
    }

    /// Stores the edited comment and saves the ranking.
    pub fn save_comment(&mut self) -> ClientResult<()> {
        let biv_id = match self.comment_nominee.take() {
            Some(id) => id,
            None => whatever!("no comment is being edited"),
        };
        let comment = std::mem::take(&mut self.comment);
        let change = self
            .ranking
            .set_comment(&biv_id, Some(comment))
            .context(RankingSnafu {})?;
        self.show_comment_editor = false;
        self.save_if_changed(change);
        Ok(())
    }

    /// Applies the saves that completed since the last call. Returns how many.
    pub fn poll_saves(&mut self) -> usize {
        let mut count = 0;
        while let Ok(outcome) = self.receiver.try_recv() {
            self.apply(outcome);
            count += 1;
        }
        count
    }

    /// Blocks until every save sent so far has completed.
    pub fn wait_for_saves(&mut self) {
        while self.pending > 0 {
            match self.receiver.recv() {
                Ok(outcome) => self.apply(outcome),
                Err(_) => break,
            }
        }
    }

    fn find(&self, biv_id: &str) -> ClientResult<&Candidate> {
        match self.ranking.candidate(biv_id) {
            Some(c) => Ok(c),
            None => UnknownNomineeSnafu { biv_id }.fail(),
        }
    }

    fn save_if_changed(&mut self, change: RankChange) {
        if change.is_changed() {
            self.save_values();
        }
    }

    fn save_body(&self) -> JSValue {
        let nominees: Vec<JudgingEntry> = self
            .ranking
            .candidates()
            .iter()
            .map(JudgingEntry::from_candidate)
            .collect();
        json!({ "nominees": nominees })
    }

    fn save_values(&mut self) {
        let body = self.save_body();
        debug!("save_values: {}", body);
        let sender = self.sender.clone();
        self.pending += 1;
        self.server
            .send_in_background(JUDGE_RANKING, body, move |res| {
                let outcome = match res {
                    Ok(_) => SaveOutcome::Saved(Local::now()),
                    Err(e) => SaveOutcome::Failed(e.to_string()),
                };
                // The page may be gone already.
                let _ = sender.send(outcome);
            });
    }

    fn apply(&mut self, outcome: SaveOutcome) {
        self.pending = self.pending.saturating_sub(1);
        let message = match outcome {
            SaveOutcome::Saved(at) => {
                let thanks = if self.ranking.is_ranking_complete() {
                    THANK_YOU
                } else {
                    ""
                };
                format!("{}Autosaved at {}", thanks, at.format("%H:%M:%S"))
            }
            SaveOutcome::Failed(reason) => {
                warn!("ranking not saved: {}", reason);
                format!(
                    "There was a problem recording your ranking. Please contact {}",
                    self.support_email
                )
            }
        };
        self.auto_save_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;
    use std::sync::Arc;

    fn session(mock: &Arc<MockTransport>, touch_device: bool, save_ok: bool) -> JudgingSession {
        mock.reply(
            JUDGING,
            json!({"judging": [
                {"biv_id": "a1", "display_name": "A", "rank": null, "comment": null},
                {"biv_id": "b2", "display_name": "B", "rank": null, "comment": "nice"},
                {"biv_id": "c3", "display_name": "C"},
                {"biv_id": "d4", "display_name": "D"},
                {"biv_id": "e5", "display_name": "E"},
                {"biv_id": "f6", "display_name": "F"}
            ]}),
        );
        if save_ok {
            mock.reply(JUDGE_RANKING, JSValue::Null);
        } else {
            mock.fail(JUDGE_RANKING, 500);
        }
        let server = ServerRequest::new(mock.clone(), "evc");
        JudgingSession::load(&server, "help@x.com", touch_device).unwrap()
    }

    fn saved_ranks(mock: &MockTransport) -> Vec<Option<u64>> {
        let bodies = mock.bodies(JUDGE_RANKING);
        let last = bodies.last().unwrap();
        last["nominees"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["rank"].as_u64())
            .collect()
    }

    #[test]
    fn selecting_saves_in_background() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        assert_eq!(s.select_nominee("c3").unwrap(), RankChange::Changed);
        assert_eq!(s.pending_saves(), 1);
        s.wait_for_saves();
        assert_eq!(s.pending_saves(), 0);
        let msg = s.auto_save_message().unwrap();
        assert!(msg.starts_with("Autosaved at "), "{}", msg);
        assert_eq!(
            saved_ranks(&mock),
            vec![None, None, Some(1), None, None, None]
        );
        let body = &mock.bodies(JUDGE_RANKING)[0];
        assert_eq!(body["nominees"][1]["comment"], json!("nice"));
        assert_eq!(body["nominees"][0]["biv_id"], json!("a1"));
    }

    #[test]
    fn unchanged_ranking_is_not_saved() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        s.select_nominee("a1").unwrap();
        assert_eq!(s.select_nominee("a1").unwrap(), RankChange::Unchanged);
        assert_eq!(s.select_rank("a1", 1).unwrap(), RankChange::Unchanged);
        s.wait_for_saves();
        assert_eq!(mock.bodies(JUDGE_RANKING).len(), 1);
    }

    #[test]
    fn complete_ranking_says_thank_you() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        for id in ["a1", "b2", "c3", "d4", "e5"] {
            s.select_nominee(id).unwrap();
        }
        assert_eq!(s.pending_saves(), 5);
        s.wait_for_saves();
        assert!(s.is_ranking_complete());
        assert!(s.is_disabled("f6").unwrap());
        assert!(!s.is_disabled("a1").unwrap());
        assert_eq!(s.select_nominee("f6").unwrap(), RankChange::Unchanged);
        let msg = s.auto_save_message().unwrap();
        assert!(
            msg.starts_with("Thank you for participating in this contest! Autosaved at "),
            "{}",
            msg
        );

        s.select_rank("a1", 5).unwrap();
        s.wait_for_saves();
        assert_eq!(
            saved_ranks(&mock),
            vec![Some(5), Some(1), Some(2), Some(3), Some(4), None]
        );
        assert_eq!(mock.bodies(JUDGE_RANKING).len(), 6);
    }

    #[test]
    fn removing_a_rank_is_saved() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        for id in ["a1", "b2"] {
            s.select_nominee(id).unwrap();
            s.wait_for_saves();
        }
        assert_eq!(s.select_rank("a1", 0).unwrap(), RankChange::Changed);
        s.wait_for_saves();
        assert_eq!(
            saved_ranks(&mock),
            vec![None, Some(2), None, None, None, None]
        );
        assert!(s.select_rank("a1", 6).is_err());
        assert!(matches!(
            s.select_rank("zz", 1),
            Err(ClientError::Ranking { .. })
        ));
    }

    #[test]
    fn failed_save_keeps_local_ranking() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, false);
        s.select_nominee("d4").unwrap();
        s.wait_for_saves();
        assert_eq!(
            s.auto_save_message(),
            Some("There was a problem recording your ranking. Please contact help@x.com")
        );
        assert_eq!(s.ranking().candidate("d4").unwrap().rank, Some(1));
    }

    #[test]
    fn comments() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        assert!(s.has_comment("b2").unwrap());
        assert!(!s.has_comment("a1").unwrap());
        assert!(s.save_comment().is_err());

        s.show_comment("b2").unwrap();
        assert!(s.show_comment_editor);
        assert_eq!(s.comment, "nice");
        s.comment = "very nice".to_string();
        s.save_comment().unwrap();
        assert!(!s.show_comment_editor);
        s.wait_for_saves();
        let body = &mock.bodies(JUDGE_RANKING)[0];
        assert_eq!(body["nominees"][1]["comment"], json!("very nice"));
        assert!(matches!(
            s.show_comment("zz"),
            Err(ClientError::UnknownNominee { .. })
        ));
    }

    #[test]
    fn hover_is_ignored_on_touch_devices() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        s.hover_nominee("a1").unwrap();
        assert_eq!(s.ranking().candidate("a1").unwrap().hover_rank, Some(1));
        s.end_hover_nominee("a1").unwrap();
        assert_eq!(s.ranking().candidate("a1").unwrap().hover_rank, None);

        let mut t = session(&Arc::new(MockTransport::new()), true, true);
        t.hover_nominee("a1").unwrap();
        assert_eq!(t.ranking().candidate("a1").unwrap().hover_rank, None);
    }

    #[test]
    fn display_helpers() {
        let mock = Arc::new(MockTransport::new());
        let s = session(&mock, false, true);
        assert_eq!(s.nominee_url("a1"), "#/a1/contestant");
        assert_eq!(s.superscript(Some(2)), "nd");
        assert_eq!(s.superscript(None), "");
        let texts: Vec<String> = s.rank_options().into_iter().map(|o| o.text).collect();
        assert_eq!(texts, vec!["Remove Rank", "1st", "2nd", "3rd", "4th", "5th"]);
        assert_eq!(s.nominees().len(), 6);
    }

    #[test]
    fn poll_drains_completed_saves() {
        let mock = Arc::new(MockTransport::new());
        let mut s = session(&mock, false, true);
        assert_eq!(s.poll_saves(), 0);
        s.select_nominee("a1").unwrap();
        let mut seen = 0;
        while seen == 0 {
            seen = s.poll_saves();
            std::thread::yield_now();
        }
        assert_eq!(seen, 1);
        assert_eq!(s.pending_saves(), 0);
        assert!(s.auto_save_message().is_some());
    }
}
