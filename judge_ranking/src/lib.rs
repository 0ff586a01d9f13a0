mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;

/// The ranking of one judge over the candidates of a contest.
///
/// At most one candidate holds a given rank, and the ranks in use are
/// `1..=k` for some `k <= max_ranks`. Every operation below keeps these two
/// properties if they hold before it runs. Clearing a rank with
/// [`Ranking::set_rank`] and `0` is the only way to open a gap, which the next
/// assignment fills.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ranking {
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) max_ranks: u32,
}

impl Ranking {
    /// Loads the candidates with the default number of rank slots.
    pub fn from_candidates(candidates: &[Candidate]) -> Result<Ranking, RankingErrors> {
        let mut b = builder::Builder::new();
        for c in candidates {
            b.add_candidate(c)?;
        }
        b.build()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn max_ranks(&self) -> u32 {
        self.max_ranks
    }

    pub fn ranked_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.rank.is_some()).count()
    }

    /// All the rank slots are taken.
    pub fn is_ranking_complete(&self) -> bool {
        self.ranked_count() >= self.max_ranks as usize
    }

    /// The lowest rank slot that nobody holds.
    pub fn next_available_rank(&self) -> Option<u32> {
        (1..=self.max_ranks).find(|r| self.holder_of(*r).is_none())
    }

    /// An unranked candidate cannot be selected anymore once all the slots are
    /// taken.
    pub fn is_disabled(&self, id: &str) -> Result<bool, RankingErrors> {
        let idx = self.index_of(id)?;
        if self.candidates[idx].rank.is_some() {
            return Ok(false);
        }
        Ok(self.is_ranking_complete())
    }

    /// The ranks in use form `1..=k`.
    pub fn is_contiguous(&self) -> bool {
        let ranks: HashSet<u32> = self.candidates.iter().filter_map(|c| c.rank).collect();
        ranks.len() == self.ranked_count() && (1..=ranks.len() as u32).all(|r| ranks.contains(&r))
    }

    /// The ranked candidates, sorted by rank.
    pub fn ranked(&self) -> Vec<(String, u32)> {
        let mut res: Vec<(String, u32)> = self
            .candidates
            .iter()
            .filter_map(|c| c.rank.map(|r| (c.id.clone(), r)))
            .collect();
        res.sort_by_key(|(_, r)| *r);
        res
    }

    /// Gives the candidate the lowest free rank.
    ///
    /// Nothing happens if the candidate is already ranked or if all the slots
    /// are taken.
    pub fn assign_next_rank(&mut self, id: &str) -> Result<RankChange, RankingErrors> {
        let idx = self.index_of(id)?;
        if self.candidates[idx].rank.is_some() {
            debug!("assign_next_rank: {} is already ranked", id);
            return Ok(RankChange::Unchanged);
        }
        if self.is_ranking_complete() {
            debug!("assign_next_rank: ranking completed, ignoring {}", id);
            return Ok(RankChange::Unchanged);
        }
        match self.next_available_rank() {
            Some(rank) => {
                info!("assign_next_rank: {} -> {}", id, rank);
                let c = &mut self.candidates[idx];
                c.hover_rank = None;
                c.rank = Some(rank);
                Ok(RankChange::Changed)
            }
            None => Ok(RankChange::Unchanged),
        }
    }

    /// Moves the candidate to the given rank, 0 meaning no rank.
    ///
    /// If the slot is taken, the holder and its neighbours shift by one slot
    /// until a free slot absorbs the move: towards the higher values when the
    /// candidate moves to a better rank, towards the lower values otherwise
    /// (including when the candidate had no rank). A holder shifted below 1
    /// loses its rank.
    pub fn set_rank(&mut self, id: &str, new_rank: u32) -> Result<RankChange, RankingErrors> {
        if new_rank > self.max_ranks {
            return Err(RankingErrors::RankOutOfRange(new_rank));
        }
        let idx = self.index_of(id)?;
        if new_rank == 0 {
            // The other ranks stay in place, even if this leaves a gap.
            info!("set_rank: clearing rank of {}", id);
            self.candidates[idx].rank = None;
            return Ok(RankChange::Changed);
        }
        if self.candidates[idx].rank == Some(new_rank) {
            return Ok(RankChange::Unchanged);
        }
        if let Some(other) = self.holder_of(new_rank) {
            let old_rank = self.candidates[idx].rank.take();
            debug!(
                "set_rank: {} moves from {:?} to {}, displacing {}",
                id, old_rank, new_rank, self.candidates[other].id
            );
            match old_rank {
                Some(old) if old > new_rank => self.bump_down(other),
                _ => self.bump_up(other),
            }
        }
        info!("set_rank: {} -> {}", id, new_rank);
        self.candidates[idx].rank = Some(new_rank);
        Ok(RankChange::Changed)
    }

    /// Shows which rank an unranked candidate would get if selected now.
    pub fn hover(&mut self, id: &str) -> Result<(), RankingErrors> {
        let idx = self.index_of(id)?;
        if self.candidates[idx].rank.is_none() {
            self.candidates[idx].hover_rank = self.next_available_rank();
        }
        Ok(())
    }

    pub fn end_hover(&mut self, id: &str) -> Result<(), RankingErrors> {
        let idx = self.index_of(id)?;
        self.candidates[idx].hover_rank = None;
        Ok(())
    }

    /// Replaces the comment of a candidate. An empty comment is no comment.
    pub fn set_comment(
        &mut self,
        id: &str,
        comment: Option<String>,
    ) -> Result<RankChange, RankingErrors> {
        let idx = self.index_of(id)?;
        self.candidates[idx].comment = comment.filter(|s| !s.is_empty());
        Ok(RankChange::Changed)
    }

    fn index_of(&self, id: &str) -> Result<usize, RankingErrors> {
        self.candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RankingErrors::UnknownCandidate(id.to_string()))
    }

    fn holder_of(&self, rank: u32) -> Option<usize> {
        self.candidates.iter().position(|c| c.rank == Some(rank))
    }

    // Increments the rank of the candidate, after moving the holder of the
    // next slot out of the way.
    fn bump_down(&mut self, idx: usize) {
        if let Some(rank) = self.candidates[idx].rank {
            if let Some(next) = self.holder_of(rank + 1) {
                self.bump_down(next);
            }
            debug!("bump_down: {} {} -> {}", self.candidates[idx].id, rank, rank + 1);
            self.candidates[idx].rank = Some(rank + 1);
        }
    }

    // Decrements the rank of the candidate, after moving the holder of the
    // previous slot out of the way.
    fn bump_up(&mut self, idx: usize) {
        if let Some(rank) = self.candidates[idx].rank {
            if let Some(prev) = self.holder_of(rank - 1) {
                self.bump_up(prev);
            }
            let new_rank = Some(rank - 1).filter(|r| *r > 0);
            debug!("bump_up: {} {} -> {:?}", self.candidates[idx].id, rank, new_rank);
            self.candidates[idx].rank = new_rank;
        }
    }
}
