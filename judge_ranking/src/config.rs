// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The number of rank slots a judge fills.
pub const MAX_RANKS: u32 = 5;

/// The label of the menu entry that clears a rank.
pub const REMOVE_RANK_LABEL: &str = "Remove Rank";

/// A contestant being ranked by a judge.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    /// The stable identifier, as given by the server.
    pub id: String,
    pub name: String,
    pub comment: Option<String>,
    /// A value in `1..=max_ranks`, or nothing when not ranked.
    pub rank: Option<u32>,
    /// The rank this candidate would receive if it was selected now.
    /// Only used for display, it is never persisted.
    pub hover_rank: Option<u32>,
}

impl Candidate {
    pub fn new(id: &str, name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            comment: None,
            rank: None,
            hover_rank: None,
        }
    }

    pub fn with_rank(id: &str, name: &str, rank: u32) -> Candidate {
        Candidate {
            rank: Some(rank),
            ..Candidate::new(id, name)
        }
    }
}

/// Tells the caller whether an operation modified the ranking, and hence if
/// the ranking should be saved.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RankChange {
    Unchanged,
    Changed,
}

impl RankChange {
    pub fn is_changed(&self) -> bool {
        *self == RankChange::Changed
    }
}

// ******** Display helpers *********

/// One entry of the rank selection menu.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankOption {
    /// 0 clears the rank.
    pub value: u32,
    pub text: String,
}

/// The English suffix of an ordinal number, as displayed next to a rank.
///
/// Only 1, 2 and 3 get a special suffix, every other rank is a "th".
pub fn superscript(rank: Option<u32>) -> &'static str {
    match rank {
        None | Some(0) => "",
        Some(1) => "st",
        Some(2) => "nd",
        Some(3) => "rd",
        Some(_) => "th",
    }
}

/// Formats a rank for display: `1st`, `2nd`, ... and the removal label for 0.
pub fn ordinal(rank: u32) -> String {
    if rank == 0 {
        REMOVE_RANK_LABEL.to_string()
    } else {
        format!("{}{}", rank, superscript(Some(rank)))
    }
}

/// The rank selection menu: the removal entry followed by every rank slot.
pub fn rank_options(max_ranks: u32) -> Vec<RankOption> {
    (0..=max_ranks)
        .map(|value| RankOption {
            value,
            text: ordinal(value),
        })
        .collect()
}

/// Errors caused by addressing the ranking with invalid arguments.
///
/// Moving candidates around never fails by itself.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RankingErrors {
    UnknownCandidate(String),
    DuplicateCandidate(String),
    RankOutOfRange(u32),
    DuplicateRank(u32),
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::UnknownCandidate(id) => write!(f, "unknown candidate {}", id),
            RankingErrors::DuplicateCandidate(id) => {
                write!(f, "candidate {} is listed more than once", id)
            }
            RankingErrors::RankOutOfRange(rank) => write!(f, "rank {} is out of range", rank),
            RankingErrors::DuplicateRank(rank) => {
                write!(f, "rank {} is held by more than one candidate", rank)
            }
        }
    }
}
