// The state shared by the pages: who is logged in, and where the contest stands.

use log::{debug, info};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::routes::Navigator;
use crate::client::server_request::*;
use crate::client::*;

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    #[serde(skip)]
    pub initializing: bool,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(rename = "isJudge")]
    pub is_judge: bool,
    #[serde(rename = "isSemiFinalistSubmitter")]
    pub is_semi_finalist_submitter: bool,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// The nominee this user voted for.
    pub vote: Option<String>,
    #[serde(rename = "canVote")]
    pub can_vote: bool,
    #[serde(rename = "isEventVoter")]
    pub is_event_voter: bool,
    #[serde(rename = "eventVote")]
    pub event_vote: Option<String>,
    #[serde(skip)]
    pub random_value: f64,
}

impl UserState {
    /// The state before the server answered.
    pub fn initializing(random_value: f64) -> UserState {
        UserState {
            initializing: true,
            random_value,
            ..UserState::default()
        }
    }

    pub fn fetch(server: &ServerRequest, random_value: f64) -> ClientResult<UserState> {
        let mut state: UserState = server.send_empty(USER_STATE)?;
        state.random_value = random_value;
        debug!("UserState::fetch: {:?}", state);
        Ok(state)
    }

    pub fn can_vote(&self) -> bool {
        self.can_vote
    }

    pub fn display_name(&self) -> &str {
        if self.is_logged_in {
            &self.display_name
        } else {
            ""
        }
    }

    pub fn get_vote(&self) -> Option<&str> {
        self.vote.as_deref()
    }

    pub fn has_voted(&self) -> bool {
        self.is_logged_in && self.vote.is_some()
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_judge(&self) -> bool {
        self.is_judge
    }
}

/// The phase of the contest and its counters.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestInfo {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "allowNominations")]
    pub allow_nominations: Option<bool>,
    #[serde(rename = "contestantCount")]
    pub contestant_count: u32,
    #[serde(rename = "finalistCount")]
    pub finalist_count: u32,
    #[serde(rename = "semiFinalistCount")]
    pub semi_finalist_count: u32,
    #[serde(rename = "isPreNominating")]
    pub is_pre_nominating: bool,
    #[serde(rename = "isNominating")]
    pub is_nominating: bool,
    #[serde(rename = "isJudging")]
    pub is_judging: bool,
    #[serde(rename = "isPublicVoting")]
    pub is_public_voting: bool,
    #[serde(rename = "isEventRegistration")]
    pub is_event_registration: bool,
    #[serde(rename = "isEventVoting")]
    pub is_event_voting: bool,
    #[serde(rename = "isExpired")]
    pub is_expired: bool,
    #[serde(rename = "showAllContestants")]
    pub show_all_contestants: bool,
    #[serde(rename = "showSemiFinalists")]
    pub show_semi_finalists: bool,
    #[serde(rename = "showFinalists")]
    pub show_finalists: bool,
    #[serde(rename = "showWinner")]
    pub show_winner: bool,
    pub winner_biv_id: Option<String>,
}

impl ContestInfo {
    pub fn fetch(server: &ServerRequest) -> ClientResult<ContestInfo> {
        server.send_empty(CONTEST_INFO)
    }

    /// Older sites send `allowNominations`, newer ones the nominating phase.
    pub fn allow_nominations(&self) -> bool {
        self.allow_nominations.unwrap_or(self.is_nominating)
    }

    pub fn contestant_count(&self) -> u32 {
        self.contestant_count
    }

    pub fn finalist_count(&self) -> u32 {
        self.finalist_count
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AlertLevel {
    Info,
    Danger,
}

/// A message shown in the banner of the page.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
}

/// What the pages know about the user and the contest.
#[derive(PartialEq, Debug, Clone)]
pub struct ViewContext {
    pub user: UserState,
    pub contest: ContestInfo,
}

impl ViewContext {
    pub fn fetch(server: &ServerRequest, random_value: f64) -> ClientResult<ViewContext> {
        let user = UserState::fetch(server, random_value)?;
        let contest = ContestInfo::fetch(server)?;
        Ok(ViewContext { user, contest })
    }

    /// Reloads the user state, e.g. after a vote.
    pub fn refresh_user(&mut self, server: &ServerRequest) -> ClientResult<()> {
        self.user = UserState::fetch(server, self.user.random_value)?;
        Ok(())
    }
}

/// Logs the user out and goes back to the home page.
pub fn logout(server: &ServerRequest, nav: &mut Navigator) -> ClientResult<UserState> {
    let mut state: UserState = server.send_request(LOGOUT, &json!({}))?;
    state.random_value = nav.random_value();
    info!("logout: logged in: {}", state.is_logged_in);
    nav.navigate("/");
    nav.alert("You have successfully logged out.", AlertLevel::Info);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::routes::Route;
    use crate::client::testing::MockTransport;
    use std::sync::Arc;

    fn server(mock: &Arc<MockTransport>) -> ServerRequest {
        ServerRequest::new(mock.clone(), "evc")
    }

    #[test]
    fn user_state() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(
            USER_STATE,
            json!({
                "isLoggedIn": true,
                "isAdmin": false,
                "isJudge": true,
                "displayName": "Jo Judge",
                "vote": "bXWBk",
                "canVote": true,
                "isEventVoter": false,
                "eventVote": null
            }),
        );
        let u = UserState::fetch(&server(&mock), 0.25).unwrap();
        assert!(!u.is_initializing());
        assert!(u.is_judge());
        assert!(!u.is_admin());
        assert!(u.has_voted());
        assert!(u.can_vote());
        assert_eq!(u.display_name(), "Jo Judge");
        assert_eq!(u.get_vote(), Some("bXWBk"));
        assert_eq!(u.random_value, 0.25);
    }

    #[test]
    fn logged_out_user() {
        let u: UserState =
            serde_json::from_value(json!({"isLoggedIn": false, "displayName": "ghost", "vote": "x"}))
                .unwrap();
        assert_eq!(u.display_name(), "");
        assert!(!u.has_voted());
        assert!(UserState::initializing(0.1).is_initializing());
    }

    #[test]
    fn contest_info_defaults() {
        let c: ContestInfo = serde_json::from_value(json!({})).unwrap();
        assert!(!c.allow_nominations());
        assert_eq!(c.contestant_count(), 0);
        assert_eq!(c.finalist_count(), 0);
        let c: ContestInfo =
            serde_json::from_value(json!({"isNominating": true, "finalistCount": 3})).unwrap();
        assert!(c.allow_nominations());
        assert_eq!(c.finalist_count(), 3);
        let c: ContestInfo =
            serde_json::from_value(json!({"isNominating": true, "allowNominations": false}))
                .unwrap();
        assert!(!c.allow_nominations());
    }

    #[test]
    fn logout_goes_home() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(LOGOUT, json!({"isLoggedIn": false}));
        let mut nav = Navigator::new(0.3);
        nav.navigate("/judging");
        let u = logout(&server(&mock), &mut nav).unwrap();
        assert!(!u.is_logged_in());
        assert_eq!(nav.route(), &Route::Finalists);
        assert_eq!(
            nav.take_alerts(),
            vec![Alert {
                message: "You have successfully logged out.".to_string(),
                level: AlertLevel::Info,
            }]
        );
    }
}
