use log::{debug, info};
use snafu::prelude::*;

use crate::client::context::{Alert, AlertLevel, ViewContext};
use crate::client::server_request::ServerRequest;
use crate::client::*;

/// The pages of the site.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Route {
    Contestants,
    Contestant {
        biv_id: String,
        autoplay: bool,
        vote: bool,
    },
    SubmitNominee,
    About,
    NominateThankYou {
        biv_id: String,
    },
    AdminReviewNominees,
    AdminReviewJudges,
    AdminReviewScores,
    AdminReviewVotes,
    Judging,
    Finalists,
}

impl Route {
    /// Reads a location such as `/abc/contestant?vote=1`.
    ///
    /// Unknown locations lead to the finalists page.
    pub fn parse(location: &str) -> Route {
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p, q),
            None => (location, ""),
        };
        let flag = |name: &str| {
            query
                .split('&')
                .filter_map(|kv| kv.split_once('=').or(Some((kv, ""))))
                .any(|(k, v)| k == name && !v.is_empty())
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["contestants"] => Route::Contestants,
            [biv_id, "contestant"] => Route::Contestant {
                biv_id: biv_id.to_string(),
                autoplay: flag("autoplay"),
                vote: flag("vote"),
            },
            ["submit-nominee"] => Route::SubmitNominee,
            ["about"] => Route::About,
            [biv_id, "nominate-thank-you"] => Route::NominateThankYou {
                biv_id: biv_id.to_string(),
            },
            ["admin-review-nominees"] => Route::AdminReviewNominees,
            ["admin-review-judges"] => Route::AdminReviewJudges,
            ["admin-review-scores"] => Route::AdminReviewScores,
            ["admin-review-votes"] => Route::AdminReviewVotes,
            ["judging"] => Route::Judging,
            ["finalists"] => Route::Finalists,
            _ => {
                debug!("Route::parse: redirecting {:?} to the finalists", location);
                Route::Finalists
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Contestants => "/contestants".to_string(),
            Route::Contestant {
                biv_id,
                autoplay,
                vote,
            } => {
                let mut flags: Vec<&str> = Vec::new();
                if *autoplay {
                    flags.push("autoplay=1");
                }
                if *vote {
                    flags.push("vote=1");
                }
                if flags.is_empty() {
                    format!("/{}/contestant", biv_id)
                } else {
                    format!("/{}/contestant?{}", biv_id, flags.join("&"))
                }
            }
            Route::SubmitNominee => "/submit-nominee".to_string(),
            Route::About => "/about".to_string(),
            Route::NominateThankYou { biv_id } => format!("/{}/nominate-thank-you", biv_id),
            Route::AdminReviewNominees => "/admin-review-nominees".to_string(),
            Route::AdminReviewJudges => "/admin-review-judges".to_string(),
            Route::AdminReviewScores => "/admin-review-scores".to_string(),
            Route::AdminReviewVotes => "/admin-review-votes".to_string(),
            Route::Judging => "/judging".to_string(),
            Route::Finalists => "/finalists".to_string(),
        }
    }
}

/// The page being displayed, with the context fetched for it.
///
/// The context is fetched at most once per page and dropped on navigation.
/// Alerts survive navigation until the view takes them.
pub struct Navigator {
    route: Route,
    context: Option<ViewContext>,
    random_value: f64,
    alerts: Vec<Alert>,
}

impl Navigator {
    pub fn new(random_value: f64) -> Navigator {
        Navigator {
            route: Route::parse("/"),
            context: None,
            random_value,
            alerts: Vec::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// A value drawn once per visitor, used by the server to shuffle lists.
    pub fn random_value(&self) -> f64 {
        self.random_value
    }

    pub fn navigate(&mut self, location: &str) {
        let route = Route::parse(location);
        info!("navigate: {}", route.path());
        self.route = route;
        self.context = None;
    }

    /// The context of the current page, fetched on first use.
    pub fn context(&mut self, server: &ServerRequest) -> ClientResult<&mut ViewContext> {
        if self.context.is_none() {
            let ctx = ViewContext::fetch(server, self.random_value)?;
            self.context = Some(ctx);
        }
        match self.context.as_mut() {
            Some(ctx) => Ok(ctx),
            None => whatever!("the context of {} is missing", self.route.path()),
        }
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub fn alert(&mut self, message: &str, level: AlertLevel) {
        self.alerts.push(Alert {
            message: message.to_string(),
            level,
        });
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }
}
