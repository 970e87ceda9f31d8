//! Program to run the hand coverage experiment from a command-line interface (CLI), such as a terminal.
//!
//! Examples:
//!
//! ```shell
//! # default: decks of 24 and 28 cards, hands of 6 and 7, 5 trials each, results in unique_hands.csv
//! $ cargo run --release --bin uniqhands --
//!
//! # a quick, reproducible run, with a progress bar and a JSON summary
//! $ cargo run --release --bin uniqhands -- -d 8,10 -k 3 -t 20 -s seed1234 --bar --summary summary.json
//!
//! # settings from a file, with the trial count overridden
//! $ cargo run --release --bin uniqhands -- --config experiment.json -t 2
//! ```
//!

use std::path::PathBuf;

use clap::Parser;
use kdam::{tqdm, Bar, BarExt};
use tracing_subscriber::EnvFilter;

use crate::{
    combrs::expected_draws,
    hand::KeyKind,
    runner::{AbandonedTrial, ExperimentConfig, Observer, Report, Runner, SkippedCell, TrialResult},
    sim::{group_thousands, Progress},
    Result,
};

/// Environment variable holding the diagnostics filter, e.g. `UNIQHANDS_LOG=debug`
pub const LOG_ENV: &str = "UNIQHANDS_LOG";

/// Arguments for the hand coverage CLI, which determine the experiment configuration.
///
/// Every setting left out falls back to the `--config` file if one is given, and then to the built-in defaults.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file with experiment settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Deck sizes to test, in cards.
    #[arg(short, long, value_delimiter = ',')]
    pub decks: Option<Vec<u32>>,

    /// Hand sizes to test, in cards.
    #[arg(short = 'k', long, value_delimiter = ',')]
    pub hands: Option<Vec<u32>>,

    /// Number of trials for each deck and hand size.
    #[arg(short, long)]
    pub trials: Option<u32>,

    /// Print a progress line every this many attempts (0 to disable).
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Abandon a trial after this many attempts.
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// How hands are keyed while tracking coverage.
    #[arg(long, value_enum)]
    pub key: Option<KeyKind>,

    /// Randomness seed string for deterministic generation.
    ///
    /// If not provided, a default-initialized RNG will be used.
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Result log to write, as comma-separated values.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON summary of the run here.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show a progress bar over all trials.
    #[arg(long)]
    pub bar: bool,

    /// Log more detail (overridden by the UNIQHANDS_LOG environment variable).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {

    /// Resolve the experiment configuration: defaults, then the config file, then explicit flags
    pub fn experiment(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };

        if let Some(decks) = &self.decks {
            config.deck_sizes = decks.clone();
        }
        if let Some(hands) = &self.hands {
            config.hand_sizes = hands.clone();
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(interval) = self.interval {
            config.progress_interval = interval;
        }
        if let Some(max) = self.max_attempts {
            config.max_attempts = Some(max);
        }
        if let Some(key) = self.key {
            config.key = key;
        }
        if let Some(seed) = &self.seed {
            config.seed = Some(seed.clone());
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        Ok(config)
    }

    /// Run the experiment with parsed arguments, useful as an entrypoint for the program.
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        init_logging(self.verbose);

        let runner = Runner::new(self.experiment()?)?;
        let config = runner.config();

        println!("Deck simulation: how long to see every possible hand?");
        println!("------------------------------------------------------");

        let total = config.cells().len() * config.trials as usize;
        let mut console = Console::new(self.bar.then(|| tqdm!(total = total, desc = "trials")), config.trials);
        let report = runner.run_to_file(&mut console)?;
        drop(console);

        print_summary(&report);
        println!("Results written to {}", config.output.display());

        if let Some(path) = &self.summary {
            report.write_json(path)?;
            println!("Summary written to {}", path.display());
        }

        Ok(())
    }
}

/// Install the diagnostics subscriber, writing to stderr so it stays out of the way of the status lines
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // a subscriber may already be installed, e.g. when running inside tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// prints status lines to the console, above the progress bar if there is one
struct Console {
    bar: Option<Bar>,
    trials: u32,
}

impl Console {
    fn new(bar: Option<Bar>, trials: u32) -> Self {
        Self { bar, trials }
    }

    fn line(&mut self, text: String) {
        match &mut self.bar {
            Some(pb) => {
                pb.write(text).ok();
            }
            None => println!("{}", text),
        }
    }

    fn advance(&mut self, n: usize) {
        if let Some(pb) = &mut self.bar {
            pb.update(n).ok();
        }
    }
}

impl Observer for Console {
    fn on_cell_start(&mut self, deck: u32, hand: u32, target: u64) {
        self.line(format!(
            "Deck size {}, hand size {}: {} possible hands, about {} deals expected per trial",
            deck,
            hand,
            group_thousands(target),
            group_thousands(expected_draws(target).round() as u64),
        ));
    }

    fn on_progress(&mut self, _deck: u32, _hand: u32, trial: u32, progress: &Progress) {
        self.line(format!("  trial {}: {}", trial, progress));
    }

    fn on_trial_complete(&mut self, result: &TrialResult) {
        self.line(format!(
            "  trial {}: 100% coverage after {} attempts in {:.3} sec",
            result.trial,
            group_thousands(result.attempts),
            result.seconds,
        ));
        self.advance(1);
    }

    fn on_cell_skipped(&mut self, skipped: &SkippedCell) {
        self.line(format!("Deck size {}, hand size {}: skipped, {}", skipped.deck, skipped.hand, skipped.reason));
        self.advance(self.trials as usize);
    }

    fn on_trial_abandoned(&mut self, abandoned: &AbandonedTrial) {
        self.line(format!(
            "  trial {}: abandoned after {} attempts with {} of {} hands seen",
            abandoned.trial,
            group_thousands(abandoned.attempts),
            group_thousands(abandoned.unique),
            group_thousands(abandoned.target),
        ));
        self.advance(1);
    }
}

// one line per cell, averaged over its completed trials
fn print_summary(report: &Report) {
    if report.summaries.is_empty() {
        println!("No trials completed.");
        return;
    }

    println!();
    println!("{:>5} {:>5} {:>14} {:>7} {:>16} {:>16} {:>10}", "deck", "hand", "hands", "trials", "mean attempts", "expected", "mean sec");
    for s in &report.summaries {
        println!(
            "{:>5} {:>5} {:>14} {:>7} {:>16} {:>16} {:>10.3}",
            s.deck,
            s.hand,
            group_thousands(s.target),
            s.trials,
            group_thousands(s.mean_attempts.round() as u64),
            group_thousands(s.expected_attempts.round() as u64),
            s.mean_seconds,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["uniqhands"]).unwrap();
        assert_eq!(args.experiment().unwrap(), ExperimentConfig::default());
        assert!(!args.bar);
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "uniqhands", "-d", "8,10", "-k", "3", "-t", "20", "-i", "0", "--max-attempts", "5000", "--key", "mask", "-s", "seed1234", "-o", "out.csv",
        ])
        .unwrap();
        let config = args.experiment().unwrap();
        assert_eq!(config.deck_sizes, vec![8, 10]);
        assert_eq!(config.hand_sizes, vec![3]);
        assert_eq!(config.trials, 20);
        assert_eq!(config.progress_interval, 0);
        assert_eq!(config.max_attempts, Some(5000));
        assert_eq!(config.key, KeyKind::Mask);
        assert_eq!(config.seed.as_deref(), Some("seed1234"));
        assert_eq!(config.output, PathBuf::from("out.csv"));
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "deck_sizes": [12], "hand_sizes": [4], "trials": 9, "seed": "file" }}"#).unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::try_parse_from(["uniqhands", "--config", path, "-t", "2"]).unwrap();
        let config = args.experiment().unwrap();
        assert_eq!(config.deck_sizes, vec![12]);
        assert_eq!(config.hand_sizes, vec![4]);
        assert_eq!(config.trials, 2);
        assert_eq!(config.seed.as_deref(), Some("file"));
    }

    #[test]
    fn bad_flags() {
        assert!(Args::try_parse_from(["uniqhands", "--key", "bogus"]).is_err());
        assert!(Args::try_parse_from(["uniqhands", "-d", "x"]).is_err());
    }

    #[test]
    fn console_without_bar() {
        let mut console = Console::new(None, 3);
        console.on_cell_start(4, 2, 6);
        console.on_progress(4, 2, 1, &Progress { attempts: 10, unique: 5, target: 6, expected: 14.7 });
        console.on_trial_complete(&TrialResult { deck: 4, hand: 2, trial: 1, attempts: 12, seconds: 0.001 });
        console.on_cell_skipped(&SkippedCell { deck: 4, hand: 5, reason: "too big".into() });
    }
}
