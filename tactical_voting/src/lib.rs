mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use crate::config::check_consistent;
pub use crate::config::*;

// **** Leeway ****

/// Computes, for every candidate other than `target`, how many more Borda
/// points the analysed voter may give it while `target` still wins.
///
/// The target is assumed to sit at the top of the ballot, so its final score
/// is `scores_without_voter[target] + (m - 1)`. A candidate sorting after the
/// target loses ties and may reach that score exactly; a candidate sorting
/// before it must stay one point below.
///
/// The result is sorted by decreasing leeway, ties by candidate label.
/// Negative leeways are kept.
pub fn compute_leeway(
    target: &str,
    ranking: &Ranking,
    scores_without_voter: &ScoreTable,
) -> Result<Vec<LeewayEntry>, TacticalErrors> {
    check_consistent(ranking, scores_without_voter)?;
    let target_score = match (ranking.position(target), scores_without_voter.get(target)) {
        (Some(_), Some(s)) => s,
        _ => return Err(TacticalErrors::UnknownCandidate(target.to_string())),
    };
    let upper_bound = target_score
        .checked_add(ranking.len() as i64 - 1)
        .ok_or_else(|| TacticalErrors::ScoreOutOfRange(target.to_string()))?;

    let mut res: Vec<LeewayEntry> = Vec::with_capacity(ranking.len() - 1);
    for x in ranking.iter().filter(|x| x.as_str() != target) {
        let current = scores_without_voter
            .get(x)
            .ok_or_else(|| TacticalErrors::MissingScore(x.clone()))?;
        let lost_ties = if target < x.as_str() { 0 } else { 1 };
        let leeway = upper_bound
            .checked_sub(current)
            .and_then(|l| l.checked_sub(lost_ties))
            .ok_or_else(|| TacticalErrors::ScoreOutOfRange(x.clone()))?;
        res.push(LeewayEntry {
            candidate: x.clone(),
            leeway,
        });
    }
    res.sort_by(|a, b| {
        b.leeway
            .cmp(&a.leeway)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
    debug!(
        "compute_leeway: target: {:?} upper_bound: {:?} leeway: {:?}",
        target, upper_bound, res
    );
    Ok(res)
}

// **** Feasibility ****

/// Tells if the Borda points `m-2, ..., 0` can be spread over the other
/// candidates without any of them exceeding its leeway.
///
/// The largest points go to the largest leeways: the assignment exists iff
/// the sorted leeways dominate the points position by position.
pub fn is_feasible(sorted_leeway: &[LeewayEntry], num_candidates: usize) -> bool {
    if num_candidates <= 1 {
        return true;
    }
    if sorted_leeway.len() != num_candidates - 1 {
        return false;
    }
    if sorted_leeway.last().map(|e| e.leeway < 0).unwrap_or(false) {
        return false;
    }
    sorted_leeway
        .iter()
        .enumerate()
        .all(|(idx, e)| e.leeway >= (num_candidates - 2 - idx) as i64)
}

/// The number of candidates that can be kept below the target by giving them
/// the lowest points of the ballot.
///
/// Walking from the worst leeway upwards, the j-th worst candidate (0-based)
/// counts as long as its leeway is strictly greater than j.
pub fn max_losers(sorted_leeway: &[LeewayEntry]) -> usize {
    let mut k = 0;
    while k < sorted_leeway.len() && sorted_leeway[sorted_leeway.len() - 1 - k].leeway > k as i64
    {
        k += 1;
    }
    k
}

// **** Enumeration ****

/// How the enumeration treats the candidates it cannot place.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SearchMode {
    /// Every candidate must be placed. A level stops at the first candidate
    /// below the threshold.
    Tight,
    /// The search ends when the threshold is exhausted. Unplaced candidates are
    /// put ahead of the placed ones, in their original order.
    Loose,
}

/// Depth-first enumeration of the ballots compatible with a sorted leeway
/// table.
///
/// At each depth, a candidate may take the current `threshold` points if its
/// leeway is at least `threshold`; the next depth uses `threshold - 1`.
/// A leaf is complete when the threshold reaches -1. Returns at most `limit`
/// leaves, each one the order in which the candidates follow the target on
/// the ballot.
pub fn enumerate_options(
    sorted_leeway: &[LeewayEntry],
    threshold: i64,
    limit: usize,
    mode: SearchMode,
) -> Vec<Vec<LeewayEntry>> {
    let res = expand(&[], sorted_leeway, threshold, limit, mode);
    debug!(
        "enumerate_options: threshold: {:?} mode: {:?} leaves: {:?}",
        threshold,
        mode,
        res.len()
    );
    res
}

fn expand(
    placed: &[LeewayEntry],
    remaining: &[LeewayEntry],
    threshold: i64,
    budget: usize,
    mode: SearchMode,
) -> Vec<Vec<LeewayEntry>> {
    if budget == 0 {
        return Vec::new();
    }
    if threshold < 0 {
        let mut leaf: Vec<LeewayEntry> = match mode {
            SearchMode::Tight => Vec::new(),
            SearchMode::Loose => remaining.to_vec(),
        };
        leaf.extend_from_slice(placed);
        return vec![leaf];
    }

    let mut leaves: Vec<Vec<LeewayEntry>> = Vec::new();
    for (idx, entry) in remaining.iter().enumerate() {
        if entry.leeway < threshold {
            match mode {
                // Sorted input: nobody after this one qualifies either.
                SearchMode::Tight => break,
                SearchMode::Loose => continue,
            }
        }
        let mut next_placed = placed.to_vec();
        next_placed.push(entry.clone());
        let mut next_remaining = remaining.to_vec();
        next_remaining.remove(idx);

        let sub = expand(
            &next_placed,
            &next_remaining,
            threshold - 1,
            budget - leaves.len(),
            mode,
        );
        leaves.extend(sub);
        if leaves.len() >= budget {
            break;
        }
    }
    leaves
}

fn leaves_to_rankings(
    target: &str,
    leaves: Vec<Vec<LeewayEntry>>,
) -> Result<Vec<TacticalOption>, TacticalErrors> {
    leaves
        .into_iter()
        .map(|leaf| {
            let mut candidates = vec![target.to_string()];
            candidates.extend(leaf.into_iter().map(|e| e.candidate));
            Ranking::new(candidates)
        })
        .collect()
}

// **** Strategies ****

/// Tactical analysis of a single voter in a Borda election.
///
/// Holds no state besides its rules: all queries are pure and may be run
/// from several threads at once.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Strategy {
    rules: StrategyRules,
}

impl Strategy {
    pub fn new(rules: &StrategyRules) -> Result<Strategy, TacticalErrors> {
        match rules.scheme {
            VotingScheme::Borda => Ok(Strategy { rules: *rules }),
            // TODO: leeway formulas for plurality and voting-for-two ballots.
            s => Err(TacticalErrors::UnsupportedScheme(s)),
        }
    }

    pub fn rules(&self) -> &StrategyRules {
        &self.rules
    }

    /// Ballots that make `target` win, given the scores of all the other
    /// voters. Empty if no ballot can do it.
    pub fn check_winner_possible(
        &self,
        target: &str,
        ranking: &Ranking,
        scores_without_voter: &ScoreTable,
    ) -> Result<Vec<TacticalOption>, TacticalErrors> {
        let m = ranking.len();
        let sorted_leeway = compute_leeway(target, ranking, scores_without_voter)?;
        if m == 1 {
            return leaves_to_rankings(target, vec![vec![]]);
        }
        if !is_feasible(&sorted_leeway, m) {
            debug!("check_winner_possible: {:?} cannot win", target);
            return Ok(Vec::new());
        }
        let leaves = enumerate_options(
            &sorted_leeway,
            m as i64 - 2,
            self.rules.opt_limit,
            SearchMode::Tight,
        );
        leaves_to_rankings(target, leaves)
    }

    /// Ballots that beat as many candidates as possible with `candidate`,
    /// whether or not it ends up winning. Empty if the candidate cannot be
    /// kept ahead of anybody.
    pub fn highest_position(
        &self,
        candidate: &str,
        ranking: &Ranking,
        scores_without_voter: &ScoreTable,
    ) -> Result<Vec<TacticalOption>, TacticalErrors> {
        let sorted_leeway = compute_leeway(candidate, ranking, scores_without_voter)?;
        if ranking.len() == 1 {
            return leaves_to_rankings(candidate, vec![vec![]]);
        }
        let losers = max_losers(&sorted_leeway);
        debug!(
            "highest_position: {:?} can stay ahead of {:?} candidates",
            candidate, losers
        );
        if losers == 0 {
            return Ok(Vec::new());
        }
        let leaves = enumerate_options(
            &sorted_leeway,
            losers as i64 - 1,
            self.rules.opt_limit,
            SearchMode::Loose,
        );
        leaves_to_rankings(candidate, leaves)
    }

    /// Looks for a ballot that improves the outcome for a voter with the
    /// sincere preferences `ranking`.
    ///
    /// The candidates are tried from the most preferred down. Reaching the
    /// sincere winner means no improvement is possible.
    pub fn check_if_best(
        &self,
        ranking: &Ranking,
        scores_without_voter: &ScoreTable,
    ) -> Result<BestResponse, TacticalErrors> {
        let sincere = scores_without_voter.with_ballot(ranking)?;
        let winner = sincere
            .winner()
            .ok_or(TacticalErrors::EmptyElection)?
            .to_string();
        info!(
            "check_if_best: ranking: {} sincere winner: {}",
            ranking, winner
        );

        let for_highest_achievable =
            self.highest_position(ranking.top(), ranking, scores_without_voter)?;

        let mut for_voter_winner: Vec<TacticalOption> = Vec::new();
        for candidate in ranking.iter() {
            if *candidate == winner {
                break;
            }
            let options = self.check_winner_possible(candidate, ranking, scores_without_voter)?;
            if !options.is_empty() {
                info!(
                    "check_if_best: {} can be made to win with {} ballots",
                    candidate,
                    options.len()
                );
                for_voter_winner = options;
                break;
            }
        }
        Ok(BestResponse {
            for_voter_winner,
            for_highest_achievable,
        })
    }
}
