use clap::{Parser, Subcommand};

/// This is a command line client for contest voting sites.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file with the settings of the client (baseUrl, contestPath,
    /// sessionCookie, timeoutSeconds, pollIntervalSeconds, supportEmail, touchDevice).
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (URL) The address of the site, e.g. https://www.publicprize.com. Setting this option overrides
    /// the value that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub base_url: Option<String>,

    /// The first path segment of the contest pages, e.g. esprit-venture-challenge.
    #[clap(long, value_parser)]
    pub contest_path: Option<String>,

    /// The session cookie of a logged in user, as sent by the browser (name=value).
    #[clap(long, value_parser)]
    pub cookie: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// The phase and the counters of the contest.
    ContestInfo,
    /// The user attached to the session cookie.
    Whoami,
    Logout,
    /// The public nominees.
    Nominees {
        /// Only list the finalists.
        #[clap(long, takes_value = false)]
        finalists: bool,
    },
    /// The details of one nominee.
    Nominee {
        #[clap(value_parser)]
        biv_id: String,
    },
    /// Votes for a nominee, and optionally records a tweet of the vote.
    Vote {
        #[clap(value_parser)]
        biv_id: String,
        /// The Twitter handle used to share the vote.
        #[clap(long, value_parser)]
        tweet: Option<String>,
    },
    /// The fields of the nomination form.
    Form,
    /// Nominates a company.
    Nominate {
        /// (name=value, repeated) A field of the form.
        #[clap(long = "field", value_parser)]
        fields: Vec<String>,
    },
    /// The ranking of the judge.
    Judging,
    /// Gives the next available rank to a nominee.
    Pick {
        #[clap(value_parser)]
        biv_id: String,
    },
    /// Moves a nominee to a rank, 0 removing its rank.
    Rank {
        #[clap(value_parser)]
        biv_id: String,
        #[clap(value_parser)]
        rank: u32,
    },
    /// Replaces the comment of the judge on a nominee.
    Comment {
        #[clap(value_parser)]
        biv_id: String,
        #[clap(value_parser)]
        text: String,
    },
    /// The finalists of the event.
    Finalists {
        /// Keeps polling the vote counts.
        #[clap(long, takes_value = false)]
        watch: bool,
        /// (with --watch) Stops after this many polls.
        #[clap(long, value_parser)]
        rounds: Option<usize>,
    },
    /// Votes for a finalist at the event.
    EventVote {
        #[clap(value_parser)]
        biv_id: String,
    },
    AdminNominees,
    /// Shows (true) or hides (false) a nominee on the public pages.
    AdminSetPublic {
        #[clap(value_parser)]
        biv_id: String,
        #[clap(value_parser, action = clap::ArgAction::Set)]
        is_public: bool,
    },
    AdminJudges,
    AdminScores,
    AdminVotes,
    /// Changes the status of a vote (1x, 2x, invalidated).
    AdminSetVoteStatus {
        #[clap(value_parser)]
        biv_id: String,
        #[clap(value_parser)]
        status: String,
    },
}
