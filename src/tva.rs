use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use tactical_voting::builder::{Builder, Election};
use tactical_voting::*;

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tva::config_reader::*;

pub mod config_reader;

#[derive(Debug, Snafu)]
pub enum TvaError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Not an integer: {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid election: {source}"))]
    InvalidElection { source: TacticalErrors },
    #[snafu(display("Invalid ballot for voter {voter}: {source}"))]
    InvalidVoter {
        source: TacticalErrors,
        voter: String,
    },
    #[snafu(display("No election to analyse: pass --config, or --ranking and --tally"))]
    MissingInput {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TvaResult<T> = Result<T, TvaError>;

/// An election and the voters to analyse, as read from the command line or a
/// configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
struct AnalysisInput {
    contest: String,
    date: Option<String>,
    rules: StrategyRules,
    candidates: Vec<String>,
    tally: Vec<(String, i64)>,
    voters: Vec<TvaVoter>,
}

fn scheme_name(scheme: VotingScheme) -> &'static str {
    match scheme {
        VotingScheme::Borda => "borda",
        VotingScheme::Plurality => "plurality",
        VotingScheme::VotingForTwo => "votingForTwo",
    }
}

fn read_config_input(config_path: &str) -> TvaResult<AnalysisInput> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let rules = StrategyRules {
        scheme: config.rules.voting_scheme()?,
        opt_limit: config
            .rules
            .opt_limit()?
            .unwrap_or(StrategyRules::DEFAULT_RULES.opt_limit),
    };
    Ok(AnalysisInput {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        rules,
        candidates: config.candidates.iter().map(|c| c.name.clone()).collect(),
        tally: config.tally_scores()?,
        voters: config.voters,
    })
}

fn parse_tally_entry(entry: &str) -> TvaResult<(String, i64)> {
    match entry.split_once('=') {
        Some((name, score)) if !name.trim().is_empty() => {
            let s = score
                .trim()
                .parse::<i64>()
                .ok()
                .context(ParsingJsonNumberSnafu { value: score })?;
            Ok((name.trim().to_string(), s))
        }
        _ => whatever!("Cannot read tally entry {:?}, expected NAME=SCORE", entry),
    }
}

fn adhoc_input(ranking: &[String], tally: &[String]) -> TvaResult<AnalysisInput> {
    let scores = tally
        .iter()
        .map(|e| parse_tally_entry(e))
        .collect::<TvaResult<Vec<(String, i64)>>>()?;
    Ok(AnalysisInput {
        contest: "command line".to_string(),
        date: None,
        rules: StrategyRules::DEFAULT_RULES,
        candidates: ranking.to_vec(),
        tally: scores,
        voters: vec![TvaVoter {
            name: "voter".to_string(),
            ranking: ranking.to_vec(),
        }],
    })
}

fn build_election(input: &AnalysisInput) -> TvaResult<Election> {
    let mut builder = Builder::new(&input.rules)
        .context(InvalidElectionSnafu {})?
        .candidates(&input.candidates)
        .context(InvalidElectionSnafu {})?;
    for (name, score) in input.tally.iter() {
        builder
            .add_score(name, *score)
            .context(InvalidElectionSnafu {})?;
    }
    builder.build().context(InvalidElectionSnafu {})
}

fn rankings_to_json(options: &[TacticalOption]) -> Vec<JSValue> {
    options
        .iter()
        .map(|r| json!(r.candidates().to_vec()))
        .collect()
}

/// The best finishing position of `candidate` over all the options. The search
/// does not return the options in rank order.
fn best_rank_of(
    candidate: &str,
    others: &ScoreTable,
    options: &[TacticalOption],
) -> TvaResult<Option<usize>> {
    let mut best: Option<usize> = None;
    for option in options.iter() {
        let rank = others
            .with_ballot(option)
            .context(InvalidElectionSnafu {})?
            .rank_of(candidate);
        best = match (best, rank) {
            (Some(b), Some(r)) => Some(b.min(r)),
            (b, r) => b.or(r),
        };
    }
    Ok(best)
}

fn voter_to_json(election: &Election, voter: &TvaVoter) -> TvaResult<JSValue> {
    let ranking = Ranking::new(voter.ranking.clone()).context(InvalidVoterSnafu {
        voter: voter.name.clone(),
    })?;
    let response = election.analyze(&ranking).context(InvalidVoterSnafu {
        voter: voter.name.clone(),
    })?;
    let others = election
        .scores_without(&ranking)
        .context(InvalidVoterSnafu {
            voter: voter.name.clone(),
        })?;

    // All winner options elect the same candidate.
    let tactical_winner: Option<String> = match response.for_voter_winner.first() {
        Some(option) => others
            .with_ballot(option)
            .context(InvalidElectionSnafu {})?
            .winner()
            .map(|w| w.to_string()),
        None => None,
    };
    let best_rank = best_rank_of(ranking.top(), &others, &response.for_highest_achievable)?;
    debug!(
        "voter_to_json: {}: tactical winner: {:?} best rank: {:?}",
        voter.name, tactical_winner, best_rank
    );

    Ok(json!({
        "voter": voter.name,
        "sincereWinner": election.winner(),
        "tacticalWinner": tactical_winner,
        "winnerOptions": rankings_to_json(&response.for_voter_winner),
        "bestRank": best_rank,
        "highestPositionOptions": rankings_to_json(&response.for_highest_achievable),
    }))
}

fn build_summary_js(input: &AnalysisInput) -> TvaResult<JSValue> {
    let election = build_election(input)?;
    info!(
        "Analysing {} voters, tally: {:?}, winner: {:?}",
        input.voters.len(),
        election.tally().sorted(),
        election.winner()
    );
    let mut results: Vec<JSValue> = Vec::new();
    for voter in input.voters.iter() {
        results.push(voter_to_json(&election, voter)?);
    }
    let c = OutputConfig {
        contest: input.contest.clone(),
        date: input.date.clone(),
        voting_scheme: scheme_name(input.rules.scheme).to_string(),
        opt_limit: input.rules.opt_limit,
    };
    Ok(json!({
        "config": c,
        "results": results }))
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> TvaResult<()> {
    let summary_ref = read_summary(summary_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_analysis(args: &Args) -> TvaResult<()> {
    let mut input = match (&args.config, &args.ranking, &args.tally) {
        (Some(config_path), _, _) => read_config_input(config_path)?,
        (None, Some(ranking), Some(tally)) => adhoc_input(ranking, tally)?,
        _ => return MissingInputSnafu {}.fail(),
    };
    if let Some(opt_limit) = args.opt_limit {
        input.rules.opt_limit = opt_limit;
    }

    let result_js = build_summary_js(&input)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        Some(path) if path != "stdout" => {
            info!("Writing summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
        _ => {
            println!("{}", pretty_js_stats);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
fn test_args(config: Option<String>, reference: Option<String>) -> Args {
    Args {
        config,
        reference,
        out: None,
        ranking: None,
        tally: None,
        opt_limit: None,
        verbose: false,
    }
}

#[cfg(test)]
fn run_analysis_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> TvaResult<()> {
    let test_dir = option_env!("TVA_TEST_DIR").unwrap_or(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/testdata"
    ));
    info!("Running test {}", test_name);
    run_analysis(&test_args(
        Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
    ))
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_analysis_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = &res {
        eprintln!("An error occured {}", e);
    }
    assert!(res.is_ok(), "test {} failed: {:?}", test_name, res);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn two_agents() {
        init();
        test_wrapper("two_agents");
    }

    #[test]
    fn single_voter() {
        init();
        test_wrapper("single_voter");
    }

    #[test]
    fn reference_mismatch_fails() {
        init();
        let res = run_analysis_test(
            "two_agents",
            "two_agents_config.json",
            "../single_voter/single_voter_expected_summary.json",
        );
        assert!(matches!(res, Err(TvaError::Whatever { .. })));
    }

    #[test]
    fn unsupported_scheme() {
        init();
        let res = run_analysis_test(
            "plurality_unsupported",
            "plurality_unsupported_config.json",
            "missing_summary.json",
        );
        assert!(matches!(
            res,
            Err(TvaError::InvalidElection {
                source: TacticalErrors::UnsupportedScheme(VotingScheme::Plurality)
            })
        ));
    }

    #[test]
    fn missing_config_file() {
        let res = run_analysis(&test_args(Some("/nonexistent/config.json".to_string()), None));
        assert!(matches!(res, Err(TvaError::OpeningJson { .. })));
    }

    #[test]
    fn missing_input() {
        let res = run_analysis(&test_args(None, None));
        assert!(matches!(res, Err(TvaError::MissingInput {})));
    }

    #[test]
    fn adhoc_analysis() {
        init();
        let ranking: Vec<String> = ["C", "B", "A", "D"].iter().map(|s| s.to_string()).collect();
        let tally: Vec<String> = ["A=7", "B=6", " C = 3", "D=0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut input = adhoc_input(&ranking, &tally).unwrap();
        input.rules.opt_limit = 1;
        let js = build_summary_js(&input).unwrap();
        assert_eq!(js["results"][0]["sincereWinner"], json!("A"));
        assert_eq!(js["results"][0]["tacticalWinner"], json!("B"));
        assert_eq!(
            js["results"][0]["winnerOptions"],
            json!([["B", "C", "D", "A"]])
        );
        assert_eq!(js["config"]["optLimit"], json!(1));
    }

    #[test]
    fn best_rank_over_all_options() {
        init();
        let names = |s: &str| -> Vec<String> { s.chars().map(|c| c.to_string()).collect() };
        // The voter's ballot C > A > D > B is included in the tally.
        let input = AnalysisInput {
            contest: "best rank".to_string(),
            date: None,
            rules: StrategyRules::DEFAULT_RULES,
            candidates: names("ABCD"),
            tally: vec![
                ("A".to_string(), 8),
                ("B".to_string(), 2),
                ("C".to_string(), 8),
                ("D".to_string(), 8),
            ],
            voters: vec![TvaVoter {
                name: "v".to_string(),
                ranking: names("CADB"),
            }],
        };
        let js = build_summary_js(&input).unwrap();
        let res = &js["results"][0];
        assert_eq!(
            res["highestPositionOptions"],
            json!([["C", "A", "D", "B"], ["C", "B", "D", "A"], ["C", "B", "A", "D"]])
        );
        // C only comes second with the first option.
        let others = ScoreTable::from_pairs(&[("A", 6), ("B", 2), ("C", 5), ("D", 7)]);
        let first = Ranking::from_letters("CADB").unwrap();
        assert_eq!(others.with_ballot(&first).unwrap().rank_of("C"), Some(2));
        assert_eq!(res["bestRank"], json!(1));
    }

    #[test]
    fn adhoc_bad_entries() {
        assert!(parse_tally_entry("A7").is_err());
        assert!(parse_tally_entry("=7").is_err());
        assert!(matches!(
            parse_tally_entry("A=seven"),
            Err(TvaError::ParsingJsonNumber { .. })
        ));
        assert_eq!(parse_tally_entry("AB=-2").unwrap(), ("AB".to_string(), -2));
    }

    #[test]
    fn extreme_tally_is_an_error() {
        let ranking: Vec<String> = ["B", "A"].iter().map(|s| s.to_string()).collect();
        let tally: Vec<String> = [format!("A={}", i64::MIN), "B=0".to_string()].to_vec();
        let input = adhoc_input(&ranking, &tally).unwrap();
        let res = build_summary_js(&input);
        assert!(
            matches!(
                &res,
                Err(TvaError::InvalidVoter {
                    source: TacticalErrors::ScoreOutOfRange(c),
                    ..
                }) if c == "A"
            ),
            "{:?}",
            res
        );
    }

    #[test]
    fn invalid_voter_ballot() {
        let ranking: Vec<String> = ["A", "B", "B"].iter().map(|s| s.to_string()).collect();
        let input = AnalysisInput {
            contest: "dup".to_string(),
            date: None,
            rules: StrategyRules::DEFAULT_RULES,
            candidates: vec!["A".to_string(), "B".to_string()],
            tally: vec![("A".to_string(), 1), ("B".to_string(), 1)],
            voters: vec![TvaVoter {
                name: "v".to_string(),
                ranking,
            }],
        };
        assert!(matches!(
            build_summary_js(&input),
            Err(TvaError::InvalidVoter { .. })
        ));
    }
}
