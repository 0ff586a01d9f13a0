use log::warn;
use std::collections::HashSet;

pub use crate::config::*;
use crate::Ranking;

/// A builder for loading a ranking.
///
/// The builder checks that every candidate appears once and that no rank is
/// shared or out of range, which is what the reordering operations rely on.
///
/// ```
/// use judge_ranking::builder::Builder;
/// use judge_ranking::{Candidate, RankingErrors};
///
/// let mut builder = Builder::new().max_ranks(3)?;
/// builder.add_candidate_simple("a", "Anna")?;
/// builder.add_candidate(&Candidate::with_rank("b", "Bob", 1))?;
/// let ranking = builder.build()?;
///
/// assert_eq!(ranking.next_available_rank(), Some(2));
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _max_ranks: u32,
    pub(crate) _candidates: Vec<Candidate>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _max_ranks: MAX_RANKS,
            _candidates: Vec::new(),
        }
    }

    pub fn max_ranks(self, max_ranks: u32) -> Result<Builder, RankingErrors> {
        if max_ranks == 0 {
            return Err(RankingErrors::RankOutOfRange(max_ranks));
        }
        Ok(Builder {
            _max_ranks: max_ranks,
            _candidates: self._candidates,
        })
    }

    /// Adds an unranked candidate.
    pub fn add_candidate_simple(&mut self, id: &str, name: &str) -> Result<(), RankingErrors> {
        self.add_candidate(&Candidate::new(id, name))
    }

    /// Adds a candidate, keeping the rank it already has.
    ///
    /// A rank of 0 is read as no rank. The hover preview is always reset.
    pub fn add_candidate(&mut self, candidate: &Candidate) -> Result<(), RankingErrors> {
        if self._candidates.iter().any(|c| c.id == candidate.id) {
            return Err(RankingErrors::DuplicateCandidate(candidate.id.clone()));
        }
        let rank = match candidate.rank {
            Some(0) | None => None,
            Some(r) if r > self._max_ranks => {
                return Err(RankingErrors::RankOutOfRange(r));
            }
            Some(r) if self._candidates.iter().any(|c| c.rank == Some(r)) => {
                return Err(RankingErrors::DuplicateRank(r));
            }
            Some(r) => Some(r),
        };
        self._candidates.push(Candidate {
            rank,
            hover_rank: None,
            ..candidate.clone()
        });
        Ok(())
    }

    pub fn build(self) -> Result<Ranking, RankingErrors> {
        let ranks: HashSet<u32> = self._candidates.iter().filter_map(|c| c.rank).collect();
        let contiguous = (1..=ranks.len() as u32).all(|r| ranks.contains(&r));
        if !contiguous {
            // Happens after a rank was removed: the next assignment fills the gap.
            warn!("build: ranks are not contiguous: {:?}", ranks);
        }
        Ok(Ranking {
            candidates: self._candidates,
            max_ranks: self._max_ranks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_candidates() {
        let mut b = Builder::new();
        b.add_candidate_simple("a", "Anna").unwrap();
        assert_eq!(
            b.add_candidate_simple("a", "Anna again"),
            Err(RankingErrors::DuplicateCandidate("a".to_string()))
        );
    }

    #[test]
    fn rejects_shared_ranks() {
        let mut b = Builder::new();
        b.add_candidate(&Candidate::with_rank("a", "Anna", 2)).unwrap();
        assert_eq!(
            b.add_candidate(&Candidate::with_rank("b", "Bob", 2)),
            Err(RankingErrors::DuplicateRank(2))
        );
        assert_eq!(
            b.add_candidate(&Candidate::with_rank("c", "Clara", 6)),
            Err(RankingErrors::RankOutOfRange(6))
        );
    }

    #[test]
    fn zero_rank_is_no_rank() {
        let mut b = Builder::new();
        b.add_candidate(&Candidate::with_rank("a", "Anna", 0)).unwrap();
        let ranking = b.build().unwrap();
        assert_eq!(ranking.candidate("a").unwrap().rank, None);
    }

    #[test]
    fn accepts_gaps() {
        let mut b = Builder::new();
        b.add_candidate(&Candidate::with_rank("a", "Anna", 1)).unwrap();
        b.add_candidate(&Candidate::with_rank("b", "Bob", 3)).unwrap();
        let ranking = b.build().unwrap();
        assert!(!ranking.is_contiguous());
        assert_eq!(ranking.next_available_rank(), Some(2));
    }

    #[test]
    fn zero_max_ranks() {
        assert!(Builder::new().max_ranks(0).is_err());
    }
}
