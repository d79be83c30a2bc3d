use crate::tva::*;

use log::debug;
use snafu::prelude::*;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
}

/// The configuration block echoed at the top of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    #[serde(rename = "votingScheme")]
    pub voting_scheme: String,
    #[serde(rename = "optLimit")]
    pub opt_limit: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TvaCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TvaRules {
    #[serde(rename = "votingScheme")]
    pub _voting_scheme: String,
    #[serde(rename = "optLimit")]
    pub _opt_limit: Option<JSValue>,
}

impl TvaRules {
    pub fn voting_scheme(&self) -> TvaResult<VotingScheme> {
        match self._voting_scheme.as_str() {
            "borda" | "Borda" => Ok(VotingScheme::Borda),
            "plurality" | "Plurality" => Ok(VotingScheme::Plurality),
            "votingForTwo" | "VotingForTwo" => Ok(VotingScheme::VotingForTwo),
            x => whatever!("unknown voting scheme: {}", x),
        }
    }

    pub fn opt_limit(&self) -> TvaResult<Option<usize>> {
        match &self._opt_limit {
            None | Some(JSValue::Null) => Ok(None),
            Some(x) => {
                let limit = read_js_int(x)?;
                usize::try_from(limit)
                    .ok()
                    .map(Some)
                    .context(ParsingJsonNumberSnafu {
                        value: limit.to_string(),
                    })
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TvaVoter {
    pub name: String,
    pub ranking: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TvaConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub candidates: Vec<TvaCandidate>,
    pub rules: TvaRules,
    pub tally: JSMap<String, JSValue>,
    pub voters: Vec<TvaVoter>,
}

impl TvaConfig {
    /// The tally, in the order of the declared candidates, then any other name in
    /// alphabetical order.
    pub fn tally_scores(&self) -> TvaResult<Vec<(String, i64)>> {
        let mut res: Vec<(String, i64)> = Vec::new();
        for c in self.candidates.iter() {
            if let Some(v) = self.tally.get(&c.name) {
                res.push((c.name.clone(), read_js_int(v)?));
            }
        }
        for (name, v) in self.tally.iter() {
            if !self.candidates.iter().any(|c| c.name == *name) {
                res.push((name.clone(), read_js_int(v)?));
            }
        }
        Ok(res)
    }
}

pub fn read_config(path: &str) -> TvaResult<TvaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: TvaConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> TvaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Scores may be written as numbers or as strings.
fn read_js_int(x: &JSValue) -> TvaResult<i64> {
    match x {
        JSValue::Number(n) => n.as_i64().context(ParsingJsonNumberSnafu {
            value: n.to_string(),
        }),
        JSValue::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .context(ParsingJsonNumberSnafu { value: s.clone() }),
        _ => None.context(ParsingJsonNumberSnafu {
            value: x.to_string(),
        }),
    }
}
