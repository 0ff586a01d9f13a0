use log::{debug, info, warn};
use snafu::{prelude::*, Snafu};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JSValue;
use std::fmt;

use crate::args::Command;
use crate::client::admin::*;
use crate::client::config_reader::ClientConfig;
use crate::client::context::{logout, ContestInfo};
use crate::client::finalists::FinalistList;
use crate::client::judging::JudgingSession;
use crate::client::nomination::NominationForm;
use crate::client::nominees::{NomineeList, NomineeView};
use crate::client::routes::Navigator;
use crate::client::server_request::ServerRequest;

pub mod admin;
pub mod config_reader;
pub mod context;
pub mod finalists;
pub mod judging;
pub mod nomination;
pub mod nominees;
pub mod routes;
pub mod server_request;
#[cfg(test)]
pub mod testing;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not encode the request to {path}"))]
    EncodingRequest {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Could not decode the response of {path}"))]
    DecodingResponse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Request to {path} failed"))]
    Http {
        source: reqwest::Error,
        path: String,
    },
    #[snafu(display("Request to {path} failed with status {status}"))]
    HttpStatus { path: String, status: u16 },
    #[snafu(display("Invalid ranking operation"))]
    Ranking {
        source: judge_ranking::RankingErrors,
    },
    #[snafu(display("No nominee {biv_id} on this page"))]
    UnknownNominee { biv_id: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// The HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// An identifier sent by the server: a number (internal ids) or a string
/// (public URIs). It compares and prints as a string, and is sent back to
/// the server the way it came.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BivId {
    id: String,
    raw: JSValue,
}

impl BivId {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn to_json(&self) -> JSValue {
        self.raw.clone()
    }
}

impl<'de> Deserialize<'de> for BivId {
    fn deserialize<D>(deserializer: D) -> Result<BivId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JSValue::deserialize(deserializer)?;
        let id = match &raw {
            JSValue::String(s) => s.clone(),
            JSValue::Number(n) => n.to_string(),
            x => {
                return Err(serde::de::Error::custom(format!(
                    "read_biv_id: not an identifier: {:?}",
                    x
                )))
            }
        };
        Ok(BivId { id, raw })
    }
}

impl Serialize for BivId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl fmt::Display for BivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.id)
    }
}

impl PartialEq<str> for BivId {
    fn eq(&self, other: &str) -> bool {
        self.id == other
    }
}

impl PartialEq<&str> for BivId {
    fn eq(&self, other: &&str) -> bool {
        self.id == *other
    }
}

/// Reads an identifier as a plain string, when it is never sent back.
pub fn read_biv_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    BivId::deserialize(deserializer).map(|b| b.id)
}

/// A value in [0, 1) drawn once per run, used by the server to shuffle lists.
fn random_value() -> f64 {
    rand::random::<f64>()
}

fn print_alerts(nav: &mut Navigator) {
    for a in nav.take_alerts() {
        println!("[{:?}] {}", a.level, a.message);
    }
}

fn print_judging(session: &JudgingSession) {
    for c in session.nominees() {
        let rank = match c.rank {
            Some(r) => judge_ranking::ordinal(r),
            None => "-".to_string(),
        };
        let disabled = if session.is_disabled(&c.id).unwrap_or(false) {
            " (ranking complete)"
        } else {
            ""
        };
        println!("{:>4}  {:<8} {}{}", rank, c.id, c.name, disabled);
        if let Some(comment) = &c.comment {
            println!("      comment: {}", comment);
        }
    }
    if let Some(msg) = session.auto_save_message() {
        println!("{}", msg);
    }
}

fn run_judging<F>(config: &ClientConfig, server: &ServerRequest, f: F) -> ClientResult<()>
where
    F: FnOnce(&mut JudgingSession) -> ClientResult<()>,
{
    let mut session =
        JudgingSession::load(server, &config.support_email(), config.is_touch_device())?;
    f(&mut session)?;
    session.wait_for_saves();
    print_judging(&session);
    Ok(())
}

/// Runs one command against the site and prints the outcome.
pub fn run_command(config: &ClientConfig, command: &Command) -> ClientResult<()> {
    let server = ServerRequest::from_config(config)?;
    let mut nav = Navigator::new(random_value());
    debug!("run_command: {:?}", command);
    match command {
        Command::ContestInfo => {
            let c = ContestInfo::fetch(&server)?;
            println!("{}", c.display_name);
            println!(
                "nominating: {}  judging: {}  public voting: {}  event voting: {}  expired: {}",
                c.allow_nominations(),
                c.is_judging,
                c.is_public_voting,
                c.is_event_voting,
                c.is_expired
            );
            println!(
                "contestants: {}  semi-finalists: {}  finalists: {}",
                c.contestant_count(),
                c.semi_finalist_count,
                c.finalist_count()
            );
            if let (true, Some(w)) = (c.show_winner, &c.winner_biv_id) {
                println!("winner: {}", w);
            }
        }
        Command::Whoami => {
            let user = &nav.context(&server)?.user;
            if !user.is_logged_in() {
                println!("not logged in");
            } else {
                println!("{}", user.display_name());
                println!(
                    "admin: {}  judge: {}  can vote: {}  voted for: {}",
                    user.is_admin(),
                    user.is_judge(),
                    user.can_vote(),
                    user.get_vote().unwrap_or("-")
                );
            }
        }
        Command::Logout => {
            logout(&server, &mut nav)?;
            print_alerts(&mut nav);
        }
        Command::Nominees { finalists } => {
            nav.navigate("/contestants");
            let list = NomineeList::load(&server, &nav)?;
            let shown = if *finalists {
                &list.finalists
            } else {
                &list.nominees
            };
            for n in shown {
                let mark = if list.user_selection(&mut nav, &n.biv_id)? {
                    "*"
                } else {
                    " "
                };
                println!("{} {:<8} {}", mark, n.biv_id, n.display_name);
            }
            if list.can_vote(&mut nav)? {
                println!("You can vote for one nominee.");
            }
        }
        Command::Nominee { biv_id } => {
            nav.navigate(&nominees::nominee_url(biv_id));
            let view =
                NomineeView::load(&server, &mut nav, biv_id, false, false, &config.support_email())?;
            println!("{}", view.info.display_name);
            println!("{}", view.format_url());
            if let Some(video) = view.video_url() {
                println!("video: https:{}", video);
            }
            println!("{}", view.info.nominee_desc);
            for f in &view.info.founders {
                println!("  {}: {}", f.display_name, f.founder_desc);
            }
            if view.user_selection(&mut nav)? {
                println!("You voted for this nominee.");
            }
        }
        Command::Vote { biv_id, tweet } => {
            nav.navigate(&format!("{}?vote=1", nominees::nominee_url(biv_id)));
            let mut view =
                NomineeView::load(&server, &mut nav, biv_id, false, true, &config.support_email())?;
            view.cast_vote(&mut nav)?;
            if view.show_login_and_vote_modal {
                println!(
                    "Log in to vote, then come back to {}",
                    view.vote_url.as_deref().unwrap_or_default()
                );
                return Ok(());
            }
            view.save_vote(&mut nav)?;
            print_alerts(&mut nav);
            if view.show_tweet_modal {
                println!("Thank you for voting for {}.", view.info.display_name);
                if let Some(handle) = tweet {
                    let contest = nav.context(&server)?.contest.display_name.clone();
                    view.twitter_handle = handle.clone();
                    view.tweet_vote(&mut nav)?;
                    println!("Tweet: {}", view.tweet_text(&contest));
                }
            }
        }
        Command::Form => {
            nav.navigate("/submit-nominee");
            let form = NominationForm::load(&server)?;
            if !form.allow_nominations(&mut nav)? {
                println!("Nominations are closed.");
            }
            for f in &form.fields {
                let hidden = if f.visible { "" } else { " (additional founder)" };
                println!("{:<16} {}{}", f.name, f.label, hidden);
            }
        }
        Command::Nominate { fields } => {
            nav.navigate("/submit-nominee");
            let mut form = NominationForm::load(&server)?;
            for field in fields {
                let (name, value) = match field.split_once('=') {
                    Some(kv) => kv,
                    None => whatever!("expected name=value, got {:?}", field),
                };
                for n in 2..=nomination::MAX_FOUNDERS {
                    if name.starts_with(&format!("founder{}", n)) {
                        while form.founder_count() < n {
                            form.add_founder();
                        }
                    }
                }
                form.set_value(name, value)?;
            }
            form.save_form(&mut nav)?;
            if form.errors.is_empty() {
                info!("nominated, now at {}", nav.route().path());
                println!("Thank you for your nomination ({}).", nav.route().path());
            } else {
                for (name, error) in &form.errors {
                    println!("{}: {}", name, error);
                }
            }
        }
        Command::Judging => run_judging(config, &server, |_| Ok(()))?,
        Command::Pick { biv_id } => run_judging(config, &server, |s| {
            if !s.select_nominee(biv_id)?.is_changed() {
                warn!("{} was not ranked", biv_id);
            }
            Ok(())
        })?,
        Command::Rank { biv_id, rank } => run_judging(config, &server, |s| {
            s.select_rank(biv_id, *rank)?;
            Ok(())
        })?,
        Command::Comment { biv_id, text } => run_judging(config, &server, |s| {
            s.show_comment(biv_id)?;
            s.comment = text.clone();
            s.save_comment()
        })?,
        Command::Finalists { watch, rounds } => {
            nav.navigate("/finalists");
            let mut list = FinalistList::load(&server, &nav)?;
            for f in &list.finalists {
                println!("{:<8} {:<30} {}", f.biv_id, f.display_name, f.vote_count);
            }
            if *watch {
                list.watch(config.poll_interval(), *rounds, |changes| {
                    for c in changes {
                        println!("{}: {} -> {}", c.display_name, c.before, c.after);
                    }
                })?;
            }
        }
        Command::EventVote { biv_id } => {
            nav.navigate("/finalists");
            let list = FinalistList::load(&server, &nav)?;
            list.cast_event_vote(&mut nav, biv_id)?;
            println!("Your vote was recorded.");
        }
        Command::AdminNominees => {
            nav.navigate("/admin-review-nominees");
            let review = NomineeReview::load(&server)?;
            for n in &review.nominees {
                let public = if n.is_public { "public" } else { "hidden" };
                println!(
                    "{:<8} {:<6} {} (by {} <{}>)",
                    n.biv_id, public, n.display_name, n.submitter_display_name, n.submitter_email
                );
            }
        }
        Command::AdminSetPublic { biv_id, is_public } => {
            let mut review = NomineeReview::load(&server)?;
            review.set_public(biv_id, *is_public)?;
            println!("{} is now {}", biv_id, if *is_public { "public" } else { "hidden" });
        }
        Command::AdminJudges => {
            for j in review_judges(&server)? {
                println!("{:<30} {:<30} {}", j.display_name, j.user_email, j.rank_count);
            }
        }
        Command::AdminScores => {
            let review = ScoreReview::load(&server)?;
            for s in &review.scores {
                println!(
                    "{:<30} {:>8.2} {:>6}  {}",
                    s.display_name, s.judge_score, s.votes, s.judge_ranks
                );
            }
            println!(
                "{:<30} {:>8.2} {:>6}",
                "total", review.total_judge_score, review.total_votes
            );
        }
        Command::AdminVotes => {
            let review = VoteReview::load(&server)?;
            for v in &review.votes {
                println!(
                    "{:<8} {} {:<20} {:<20} {:<12} {}",
                    v.biv_id,
                    v.creation_date_time,
                    v.user_display_name,
                    v.nominee_display_name,
                    v.vote_status,
                    v.twitter_handle.as_deref().unwrap_or("")
                );
            }
        }
        Command::AdminSetVoteStatus { biv_id, status } => {
            let mut review = VoteReview::load(&server)?;
            review.update_vote_status(biv_id, status)?;
            println!("vote {} is now {}", biv_id, status);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "read_biv_id")]
        biv_id: String,
    }

    #[test]
    fn biv_ids() {
        let a: WithId = serde_json::from_value(json!({"biv_id": "bXWBk"})).unwrap();
        assert_eq!(a.biv_id, "bXWBk");
        let b: WithId = serde_json::from_value(json!({"biv_id": 100015})).unwrap();
        assert_eq!(b.biv_id, "100015");
        assert!(serde_json::from_value::<WithId>(json!({"biv_id": null})).is_err());
    }

    #[test]
    fn biv_ids_go_back_unchanged() {
        let number: BivId = serde_json::from_value(json!(100015)).unwrap();
        assert_eq!(number, "100015");
        assert_eq!(number.to_json(), json!(100015));
        let digits: BivId = serde_json::from_value(json!("100015")).unwrap();
        assert_eq!(digits.as_str(), "100015");
        assert_eq!(digits.to_json(), json!("100015"));
        assert_ne!(number, digits);
        assert_eq!(serde_json::to_value(&digits).unwrap(), json!("100015"));
        assert_eq!(format!("[{:<8}]", number), "[100015  ]");
        assert!(serde_json::from_value::<BivId>(json!([1])).is_err());
    }

    #[test]
    fn random_values() {
        for _ in 0..100 {
            let v = random_value();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn status_of_errors() {
        let e = ClientError::HttpStatus {
            path: "/x".to_string(),
            status: 403,
        };
        assert_eq!(e.status(), Some(403));
        assert_eq!(e.to_string(), "Request to /x failed with status 403");
    }
}
