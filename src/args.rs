use clap::Parser;

/// This is a tactical voting analyst for Borda count elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election data, in JSON format.
    /// See the manual of the tactical_voting crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an analysis in JSON format. If provided, tva will
    /// check that the computed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (list of comma-separated candidates) The sincere ranking of a single voter to analyse, most preferred first.
    /// Used together with --tally when no configuration file is given.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub ranking: Option<Vec<String>>,

    /// (list of comma-separated NAME=SCORE) The tallied scores of the election, including the ballot passed
    /// with --ranking.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub tally: Option<Vec<String>>,

    /// (default 10) The maximum number of tactical ballots to report for each question. Overrides the value
    /// of the configuration file.
    #[clap(long, value_parser)]
    pub opt_limit: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
