pub use crate::config::*;
use crate::Strategy;

use log::debug;

/// A builder for assembling a tallied election.
///
/// The tally contains the scores of all the voters, including the ones that
/// get analysed later: [Election::analyze] removes the ballot of the voter
/// before looking for tactical options.
///
/// ```
/// pub use tactical_voting::builder::Builder;
/// pub use tactical_voting::{Ranking, StrategyRules};
/// # use tactical_voting::TacticalErrors;
///
/// let mut builder = Builder::new(&StrategyRules::DEFAULT_RULES)?
///     .candidates(&["A".to_string(), "B".to_string(), "C".to_string()])?;
///
/// builder.add_score("A", 4)?;
/// builder.add_score("B", 2)?;
/// builder.add_score("C", 3)?;
///
/// let election = builder.build()?;
/// let response = election.analyze(&Ranking::from_letters("CBA")?)?;
/// # Ok::<(), TacticalErrors>(())
/// ```
pub struct Builder {
    pub(crate) _strategy: Strategy,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _scores: Vec<(String, i64)>,
}

impl Builder {
    /// Fails if the rules use a scheme without tactical analysis.
    pub fn new(rules: &StrategyRules) -> Result<Builder, TacticalErrors> {
        Ok(Builder {
            _strategy: Strategy::new(rules)?,
            _candidates: None,
            _scores: Vec::new(),
        })
    }

    /// Declares the candidates of the election.
    ///
    /// If not called, the candidates are inferred from the scores.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, TacticalErrors> {
        if cands.is_empty() {
            return Err(TacticalErrors::EmptyElection);
        }
        // Same validation as a ballot.
        Ranking::new(cands.to_vec())?;
        Ok(Builder {
            _strategy: self._strategy,
            _candidates: Some(cands.to_vec()),
            _scores: Vec::new(),
        })
    }

    /// Records the tallied score of one candidate.
    pub fn add_score(&mut self, candidate: &str, score: i64) -> Result<(), TacticalErrors> {
        if let Some(cands) = self._candidates.as_deref() {
            if !cands.iter().any(|c| c == candidate) {
                return Err(TacticalErrors::UnknownCandidate(candidate.to_string()));
            }
        }
        if self._scores.iter().any(|(c, _)| c == candidate) {
            return Err(TacticalErrors::DuplicateCandidate(candidate.to_string()));
        }
        self._scores.push((candidate.to_string(), score));
        Ok(())
    }

    pub fn build(self) -> Result<Election, TacticalErrors> {
        let candidates: Vec<String> = match self._candidates {
            Some(cands) => cands,
            None => self._scores.iter().map(|(c, _)| c.clone()).collect(),
        };
        if candidates.is_empty() {
            return Err(TacticalErrors::EmptyElection);
        }
        for c in candidates.iter() {
            if !self._scores.iter().any(|(c2, _)| c2 == c) {
                return Err(TacticalErrors::MissingScore(c.clone()));
            }
        }
        debug!("build: candidates: {:?} scores: {:?}", candidates, self._scores);
        Ok(Election {
            strategy: self._strategy,
            candidates,
            tally: ScoreTable::new(self._scores.into_iter().collect()),
        })
    }
}

/// A tallied election, ready for the analysis of its voters.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    strategy: Strategy,
    candidates: Vec<String>,
    tally: ScoreTable,
}

impl Election {
    /// The candidates, in declaration order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn tally(&self) -> &ScoreTable {
        &self.tally
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn winner(&self) -> Option<&str> {
        self.tally.winner()
    }

    /// The scores of all the other voters, for a voter who sincerely cast `ranking`.
    pub fn scores_without(&self, ranking: &Ranking) -> Result<ScoreTable, TacticalErrors> {
        self.tally.without_ballot(ranking)
    }

    /// Tactical options of a voter whose sincere ballot is part of the tally.
    pub fn analyze(&self, ranking: &Ranking) -> Result<BestResponse, TacticalErrors> {
        let others = self.scores_without(ranking)?;
        self.strategy.check_if_best(ranking, &others)
    }
}
