// ********* Input data structures ***********

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::Display;

/// The preference order of one voter, most preferred first.
///
/// A ranking always contains every candidate of the election exactly once.
/// Construction only checks that it is not empty and has no duplicates; the
/// comparison with the candidates of a [ScoreTable] happens when both are
/// handed to the engine.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ranking {
    candidates: Vec<String>,
}

impl Ranking {
    pub fn new(candidates: Vec<String>) -> Result<Ranking, TacticalErrors> {
        if candidates.is_empty() {
            return Err(TacticalErrors::EmptyElection);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for c in candidates.iter() {
            if !seen.insert(c.as_str()) {
                return Err(TacticalErrors::DuplicateCandidate(c.clone()));
            }
        }
        Ok(Ranking { candidates })
    }

    /// Convenience constructor for single-letter candidate labels: "ABCD".
    pub fn from_letters(letters: &str) -> Result<Ranking, TacticalErrors> {
        Ranking::new(letters.chars().map(|c| c.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    // A ranking is never empty, this is only here for clippy.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.candidates.iter()
    }

    /// The most preferred candidate.
    pub fn top(&self) -> &str {
        // Invariant: rankings are never empty.
        self.candidates[0].as_str()
    }

    pub fn position(&self, candidate: &str) -> Option<usize> {
        self.candidates.iter().position(|c| c == candidate)
    }

    /// The Borda points given by this ranking to each candidate, in ranking order.
    pub fn borda_contributions(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        let m = self.candidates.len();
        self.candidates
            .iter()
            .enumerate()
            .map(move |(idx, c)| (c.as_str(), borda_score(idx, m)))
    }
}

impl Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.candidates.join(" > "))
    }
}

/// Points given to the candidate in position `idx` (0-based) of a ballot
/// over `num_candidates` candidates.
pub fn borda_score(idx: usize, num_candidates: usize) -> i64 {
    (num_candidates - 1 - idx) as i64
}

/// The tallied score of each candidate.
///
/// When handed to the tactical engine, the table must not contain the
/// contribution of the voter under analysis (see [ScoreTable::without_ballot]).
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ScoreTable {
    scores: HashMap<String, i64>,
}

impl ScoreTable {
    pub fn new(scores: HashMap<String, i64>) -> ScoreTable {
        ScoreTable { scores }
    }

    pub fn from_pairs(pairs: &[(&str, i64)]) -> ScoreTable {
        ScoreTable {
            scores: pairs.iter().map(|(c, s)| (c.to_string(), *s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, candidate: &str) -> Option<i64> {
        self.scores.get(candidate).cloned()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.scores.contains_key(candidate)
    }

    /// The entries, sorted by candidate label.
    pub fn sorted(&self) -> Vec<(String, i64)> {
        let mut res: Vec<(String, i64)> = self
            .scores
            .iter()
            .map(|(c, s)| (c.clone(), *s))
            .collect();
        res.sort();
        res
    }

    /// Removes the Borda contribution of a ballot from the tally.
    pub fn without_ballot(&self, ranking: &Ranking) -> Result<ScoreTable, TacticalErrors> {
        self.apply_ballot(ranking, -1)
    }

    /// Adds the Borda contribution of a ballot to the tally.
    pub fn with_ballot(&self, ranking: &Ranking) -> Result<ScoreTable, TacticalErrors> {
        self.apply_ballot(ranking, 1)
    }

    fn apply_ballot(&self, ranking: &Ranking, sign: i64) -> Result<ScoreTable, TacticalErrors> {
        check_consistent(ranking, self)?;
        let mut scores = self.scores.clone();
        for (c, points) in ranking.borda_contributions() {
            if let Some(s) = scores.get_mut(c) {
                *s = s
                    .checked_add(sign * points)
                    .ok_or_else(|| TacticalErrors::ScoreOutOfRange(c.to_string()))?;
            }
        }
        Ok(ScoreTable { scores })
    }

    /// The candidate with the highest score. Ties go to the lowest label.
    pub fn winner(&self) -> Option<&str> {
        self.scores
            .iter()
            .max_by(|(c1, s1), (c2, s2)| s1.cmp(s2).then_with(|| c2.cmp(c1)))
            .map(|(c, _)| c.as_str())
    }

    /// The finishing position (1 is the winner) of a candidate, using the
    /// same tie-break as [ScoreTable::winner].
    pub fn rank_of(&self, candidate: &str) -> Option<usize> {
        let score = self.get(candidate)?;
        let beaten_by = self
            .scores
            .iter()
            .filter(|(c, s)| **s > score || (**s == score && c.as_str() < candidate))
            .count();
        Some(beaten_by + 1)
    }
}

/// Checks that a ranking and a table describe the same set of candidates.
pub(crate) fn check_consistent(ranking: &Ranking, scores: &ScoreTable) -> Result<(), TacticalErrors> {
    for c in ranking.iter() {
        if !scores.contains(c) {
            return Err(TacticalErrors::MissingScore(c.clone()));
        }
    }
    // Every ranked candidate has a score: the ballot leaves some out.
    if scores.len() != ranking.len() {
        return Err(TacticalErrors::RankingLength {
            expected: scores.len(),
            found: ranking.len(),
        });
    }
    Ok(())
}

// ******** Output data structures *********

/// One candidate in the leeway table of a target.
///
/// `leeway` is the number of additional Borda points the candidate may still
/// receive from the analysed voter without displacing the target. A negative
/// leeway means the candidate already beats the target.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct LeewayEntry {
    pub candidate: String,
    pub leeway: i64,
}

/// A complete ballot achieving a tactical objective.
pub type TacticalOption = Ranking;

/// The outcome of [crate::Strategy::check_if_best].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BestResponse {
    /// Ballots making the most preferred reachable candidate win.
    /// Empty if the sincere winner is already the best the voter can get.
    pub for_voter_winner: Vec<TacticalOption>,
    /// Ballots pushing the voter's top candidate as high as possible,
    /// even if it does not win.
    pub for_highest_achievable: Vec<TacticalOption>,
}

impl BestResponse {
    pub fn is_empty(&self) -> bool {
        self.for_voter_winner.is_empty() && self.for_highest_achievable.is_empty()
    }
}

/// Errors caused by malformed inputs.
///
/// The absence of a tactical opportunity is not an error: the engine returns
/// empty collections in that case.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TacticalErrors {
    EmptyElection,
    DuplicateCandidate(String),
    /// A candidate that is not part of the ranking, or not part of the election.
    UnknownCandidate(String),
    MissingScore(String),
    RankingLength {
        expected: usize,
        found: usize,
    },
    /// Adding Borda points to the score of this candidate overflows.
    ScoreOutOfRange(String),
    UnsupportedScheme(VotingScheme),
}

impl TacticalErrors {
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, TacticalErrors::UnsupportedScheme(_))
    }
}

impl Error for TacticalErrors {}

impl Display for TacticalErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TacticalErrors::EmptyElection => write!(f, "the election has no candidate"),
            TacticalErrors::DuplicateCandidate(c) => {
                write!(f, "candidate {} appears more than once", c)
            }
            TacticalErrors::UnknownCandidate(c) => write!(f, "unknown candidate {}", c),
            TacticalErrors::MissingScore(c) => write!(f, "no score for candidate {}", c),
            TacticalErrors::RankingLength { expected, found } => write!(
                f,
                "the ranking has {} candidates, expected {}",
                found, expected
            ),
            TacticalErrors::ScoreOutOfRange(c) => {
                write!(f, "the score of candidate {} is out of range", c)
            }
            TacticalErrors::UnsupportedScheme(s) => {
                write!(f, "no tactical analysis for the {:?} scheme", s)
            }
        }
    }
}

// ********* Configuration **********

/// The tally scheme of the election.
///
/// Only Borda has a tactical engine. The other schemes are accepted by the
/// configuration readers and rejected when building a [crate::Strategy].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingScheme {
    Plurality,
    Borda,
    VotingForTwo,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct StrategyRules {
    pub scheme: VotingScheme,
    /// Maximum number of tactical ballots returned by each query.
    pub opt_limit: usize,
}

impl StrategyRules {
    pub const DEFAULT_RULES: StrategyRules = StrategyRules {
        scheme: VotingScheme::Borda,
        opt_limit: 10,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_rejects_duplicates_and_empty() {
        assert_eq!(
            Ranking::from_letters("ABCA"),
            Err(TacticalErrors::DuplicateCandidate("A".to_string()))
        );
        assert_eq!(Ranking::new(vec![]), Err(TacticalErrors::EmptyElection));
    }

    #[test]
    fn borda_round_trip() {
        let r = Ranking::from_letters("CBAD").unwrap();
        let t = ScoreTable::from_pairs(&[("A", 7), ("B", 6), ("C", 3), ("D", 0)]);
        let without = t.without_ballot(&r).unwrap();
        assert_eq!(
            without.sorted(),
            vec![
                ("A".to_string(), 6),
                ("B".to_string(), 4),
                ("C".to_string(), 0),
                ("D".to_string(), 0)
            ]
        );
        assert_eq!(without.with_ballot(&r).unwrap(), t);
    }

    #[test]
    fn winner_and_rank_use_label_tiebreak() {
        let t = ScoreTable::from_pairs(&[("A", 7), ("B", 7), ("C", 7), ("D", 2)]);
        assert_eq!(t.winner(), Some("A"));
        assert_eq!(t.rank_of("A"), Some(1));
        assert_eq!(t.rank_of("B"), Some(2));
        assert_eq!(t.rank_of("C"), Some(3));
        assert_eq!(t.rank_of("D"), Some(4));
        assert_eq!(t.rank_of("E"), None);
        assert_eq!(ScoreTable::default().winner(), None);
    }

    #[test]
    fn inconsistent_tables() {
        let r = Ranking::from_letters("ABC").unwrap();
        let missing = ScoreTable::from_pairs(&[("A", 1), ("B", 1)]);
        assert_eq!(
            missing.with_ballot(&r),
            Err(TacticalErrors::MissingScore("C".to_string()))
        );
        let extra = ScoreTable::from_pairs(&[("A", 1), ("B", 1), ("C", 1), ("E", 1)]);
        assert_eq!(
            extra.with_ballot(&r),
            Err(TacticalErrors::RankingLength {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn extreme_scores_are_rejected() {
        let r = Ranking::from_letters("AB").unwrap();
        let high = ScoreTable::from_pairs(&[("A", i64::MAX), ("B", 0)]);
        let err = high.with_ballot(&r).unwrap_err();
        assert_eq!(err, TacticalErrors::ScoreOutOfRange("A".to_string()));
        assert!(err.is_invalid_input());
        // Removing points from the lowest score.
        let low = ScoreTable::from_pairs(&[("A", i64::MIN), ("B", 0)]);
        assert_eq!(
            low.without_ballot(&r),
            Err(TacticalErrors::ScoreOutOfRange("A".to_string()))
        );
        // The last ranked candidate gets no point.
        let last = ScoreTable::from_pairs(&[("A", 0), ("B", i64::MAX)]);
        assert!(last.with_ballot(&r).is_ok());
    }
}
