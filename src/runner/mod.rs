//! Running a whole experiment: every cell of the (deck size, hand size) matrix, for a number of trials each
//!
//! Cells and trials run one after another on the calling thread, and every completed trial is appended to the
//! [ResultLog] as soon as it finishes.
//!

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::combrs::{expected_draws, total_hands};
use crate::sim::{run_trial, Progress};
use crate::{rng_for_trial, Error, Result};

pub mod config;
pub mod log;

pub use config::ExperimentConfig;
pub use log::{ResultLog, TrialResult, LOG_HEADER};

/// Hooks for watching a run as it happens; every method does nothing by default
pub trait Observer {

    /// A valid cell is about to run its trials
    fn on_cell_start(&mut self, _deck: u32, _hand: u32, _target: u64) {}

    /// Periodic report from inside a running trial
    fn on_progress(&mut self, _deck: u32, _hand: u32, _trial: u32, _progress: &Progress) {}

    /// A trial reached full coverage, and its row has been logged
    fn on_trial_complete(&mut self, _result: &TrialResult) {}

    /// A cell was refused without running anything
    fn on_cell_skipped(&mut self, _skipped: &SkippedCell) {}

    /// A trial hit the attempt limit, and was not logged
    fn on_trial_abandoned(&mut self, _abandoned: &AbandonedTrial) {}
}

/// An observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Quiet;

impl Observer for Quiet {}

/// A cell refused because its configuration can't be simulated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCell {
    pub deck: u32,
    pub hand: u32,
    pub reason: String,
}

/// A trial given up on at the attempt limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbandonedTrial {
    pub deck: u32,
    pub hand: u32,
    pub trial: u32,
    pub attempts: u64,
    pub unique: u64,
    pub target: u64,
    pub seconds: f64,
}

/// Aggregates over the completed trials of one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellSummary {
    pub deck: u32,
    pub hand: u32,
    pub target: u64,

    /// Number of completed trials
    pub trials: u32,

    pub mean_attempts: f64,
    pub min_attempts: u64,
    pub max_attempts: u64,
    pub mean_seconds: f64,

    /// The coupon-collector expectation for this cell, to compare `mean_attempts` against
    pub expected_attempts: f64,
}

impl CellSummary {
    /// Summarize the results of a single cell, or nothing if there are none
    pub fn from_results(target: u64, results: &[TrialResult]) -> Option<Self> {
        let first = results.first()?;
        let n = results.len() as f64;
        Some(Self {
            deck: first.deck,
            hand: first.hand,
            target,
            trials: results.len() as u32,
            mean_attempts: results.iter().map(|r| r.attempts as f64).sum::<f64>() / n,
            min_attempts: results.iter().map(|r| r.attempts).min()?,
            max_attempts: results.iter().map(|r| r.attempts).max()?,
            mean_seconds: results.iter().map(|r| r.seconds).sum::<f64>() / n,
            expected_attempts: expected_draws(target),
        })
    }
}

/// Everything that happened in a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Completed trials, in the order they ran (and were logged)
    pub results: Vec<TrialResult>,
    pub skipped: Vec<SkippedCell>,
    pub abandoned: Vec<AbandonedTrial>,
    pub summaries: Vec<CellSummary>,
}

impl Report {
    /// Write this report as pretty-printed JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, self).map_err(|e| Error::io(path, e.into()))?;
        out.flush().map_err(|e| Error::io(path, e))
    }
}

/// Runs the experiment described by an [ExperimentConfig]
#[derive(Debug, Clone)]
pub struct Runner {
    config: ExperimentConfig,
}

impl Runner {
    /// Create a runner, after checking the settings
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run everything, logging to the configured output file
    pub fn run_to_file<O: Observer + ?Sized>(&self, observer: &mut O) -> Result<Report> {
        let mut log = ResultLog::create(&self.config.output)?;
        info!(path = %log.path().display(), "writing results");
        self.run(&mut log, observer)
    }

    /// Run every cell in order, appending each completed trial to `log`
    ///
    /// A cell that can't be simulated (hand larger than deck, too many hands to count, or a key that can't handle the
    /// deck) is refused before dealing anything and adds no rows; the run carries on with the next cell. A failure to
    /// write the log ends the run.
    pub fn run<W: Write, O: Observer + ?Sized>(&self, log: &mut ResultLog<W>, observer: &mut O) -> Result<Report> {
        let opts = self.config.trial_options();
        let seed = self.config.seed.as_deref();
        let mut report = Report::default();

        for (deck, hand) in self.config.cells() {
            let span = info_span!("cell", deck, hand);
            let _enter = span.enter();

            // refuse the whole cell up front, rather than failing on each trial
            let target = match total_hands(deck, hand).and_then(|target| opts.key.build(deck, hand).map(|_| target)) {
                Ok(target) => target,
                Err(err) if err.is_cell_error() => {
                    warn!(%err, "skipping cell");
                    let skipped = SkippedCell { deck, hand, reason: err.to_string() };
                    observer.on_cell_skipped(&skipped);
                    report.skipped.push(skipped);
                    continue;
                }
                Err(err) => return Err(err),
            };

            info!(hands = target, expected = expected_draws(target), trials = self.config.trials, "starting cell");
            observer.on_cell_start(deck, hand, target);

            let mut completed = Vec::with_capacity(self.config.trials as usize);
            for trial in 1..=self.config.trials {
                let mut rng = rng_for_trial(seed, deck, hand, trial);

                let start = Instant::now();
                let outcome = run_trial(deck, hand, &opts, &mut rng, |p| observer.on_progress(deck, hand, trial, p));
                let seconds = start.elapsed().as_secs_f64();

                match outcome {
                    Ok(outcome) => {
                        let result = TrialResult { deck, hand, trial, attempts: outcome.attempts, seconds };
                        log.append(&result)?;
                        debug!(trial, attempts = outcome.attempts, seconds, "trial complete");
                        observer.on_trial_complete(&result);
                        completed.push(result);
                    }
                    Err(Error::AttemptLimit { attempts, unique, target }) => {
                        warn!(trial, attempts, unique, hands = target, "abandoning trial at the attempt limit");
                        let abandoned = AbandonedTrial { deck, hand, trial, attempts, unique, target, seconds };
                        observer.on_trial_abandoned(&abandoned);
                        report.abandoned.push(abandoned);
                    }
                    Err(err) => return Err(err),
                }
            }

            report.summaries.extend(CellSummary::from_results(target, &completed));
            report.results.extend(completed);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // records everything it is told, in order
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        progress: usize,
    }

    impl Observer for Recorder {
        fn on_cell_start(&mut self, deck: u32, hand: u32, target: u64) {
            self.events.push(format!("start {deck} {hand} {target}"));
        }

        fn on_progress(&mut self, _deck: u32, _hand: u32, _trial: u32, _progress: &Progress) {
            self.progress += 1;
        }

        fn on_trial_complete(&mut self, result: &TrialResult) {
            self.events.push(format!("done {} {} {}", result.deck, result.hand, result.trial));
        }

        fn on_cell_skipped(&mut self, skipped: &SkippedCell) {
            self.events.push(format!("skip {} {}", skipped.deck, skipped.hand));
        }

        fn on_trial_abandoned(&mut self, abandoned: &AbandonedTrial) {
            self.events.push(format!("abandon {} {} {}", abandoned.deck, abandoned.hand, abandoned.trial));
        }
    }

    fn config(decks: &[u32], hands: &[u32], trials: u32) -> ExperimentConfig {
        ExperimentConfig {
            deck_sizes: decks.to_vec(),
            hand_sizes: hands.to_vec(),
            trials,
            seed: Some("runner".into()),
            ..Default::default()
        }
    }

    fn log_lines(log: &ResultLog<Vec<u8>>) -> Vec<String> {
        String::from_utf8(log.get_ref().clone()).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn single_cell_end_to_end() {
        let runner = Runner::new(config(&[4], &[2], 1)).unwrap();
        let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
        let report = runner.run(&mut log, &mut Quiet).unwrap();

        let lines = log_lines(&log);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], LOG_HEADER);

        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&fields[..3], &["4", "2", "1"]);
        assert!(fields[3].parse::<u64>().unwrap() >= 6);
        let seconds: f64 = fields[4].parse().unwrap();
        assert!(seconds >= 0.0);
        assert_eq!(fields[4].split('.').nth(1).map(str::len), Some(3), "time should have 3 decimals");

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].target, 6);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn invalid_cell_writes_nothing() {
        let runner = Runner::new(config(&[4], &[5], 3)).unwrap();
        let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
        let mut recorder = Recorder::default();
        let report = runner.run(&mut log, &mut recorder).unwrap();

        assert_eq!(log.rows(), 0);
        assert_eq!(log_lines(&log), vec![LOG_HEADER.to_string()]);
        assert_eq!(recorder.events, vec!["skip 4 5"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("exceeds"));
        assert!(report.results.is_empty() && report.summaries.is_empty());
    }

    #[test]
    fn matrix_order() {
        let runner = Runner::new(config(&[4, 6], &[2, 5], 2)).unwrap();
        let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
        let mut recorder = Recorder::default();
        let report = runner.run(&mut log, &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "start 4 2 6", "done 4 2 1", "done 4 2 2",
                "skip 4 5",
                "start 6 2 15", "done 6 2 1", "done 6 2 2",
                "start 6 5 6", "done 6 5 1", "done 6 5 2",
            ]
        );

        let cells: Vec<String> = log_lines(&log)[1..].iter().map(|l| l.splitn(4, ',').take(3).collect::<Vec<_>>().join(",")).collect();
        assert_eq!(cells, vec!["4,2,1", "4,2,2", "6,2,1", "6,2,2", "6,5,1", "6,5,2"]);
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.summaries.len(), 3);
        for result in &report.results {
            assert!(result.attempts >= total_hands(result.deck, result.hand).unwrap());
        }
    }

    #[test]
    fn seeded_runs_repeat() {
        let attempts = |seed: &str| {
            let runner = Runner::new(ExperimentConfig { seed: Some(seed.into()), ..config(&[7], &[3], 4) }).unwrap();
            let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
            let report = runner.run(&mut log, &mut Quiet).unwrap();
            report.results.iter().map(|r| r.attempts).collect::<Vec<_>>()
        };
        assert_eq!(attempts("again"), attempts("again"));
    }

    #[test]
    fn attempt_limit_abandons() {
        let runner = Runner::new(ExperimentConfig { max_attempts: Some(1), ..config(&[10], &[5], 3) }).unwrap();
        let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
        let mut recorder = Recorder::default();
        let report = runner.run(&mut log, &mut recorder).unwrap();

        assert_eq!(log.rows(), 0);
        assert_eq!(report.abandoned.len(), 3);
        assert!(report.abandoned.iter().all(|a| a.attempts == 1 && a.unique == 1 && a.target == 252));
        assert!(report.summaries.is_empty());
        assert_eq!(recorder.events, vec!["start 10 5 252", "abandon 10 5 1", "abandon 10 5 2", "abandon 10 5 3"]);
    }

    #[test]
    fn progress_reaches_observer() {
        let runner = Runner::new(ExperimentConfig { progress_interval: 1, ..config(&[5], &[2], 1) }).unwrap();
        let mut log = ResultLog::new(Vec::new(), "memory").unwrap();
        let mut recorder = Recorder::default();
        let report = runner.run(&mut log, &mut recorder).unwrap();
        assert_eq!(recorder.progress as u64, report.results[0].attempts);
    }

    #[test]
    fn summary_values() {
        let results = [
            TrialResult { deck: 4, hand: 2, trial: 1, attempts: 10, seconds: 0.5 },
            TrialResult { deck: 4, hand: 2, trial: 2, attempts: 20, seconds: 1.5 },
        ];
        let summary = CellSummary::from_results(6, &results).unwrap();
        assert_eq!((summary.deck, summary.hand, summary.trials), (4, 2, 2));
        assert_eq!((summary.min_attempts, summary.max_attempts), (10, 20));
        assert_eq!(summary.mean_attempts, 15.0);
        assert_eq!(summary.mean_seconds, 1.0);
        assert!((summary.expected_attempts - 14.7).abs() < 1e-9);
        assert!(CellSummary::from_results(6, &[]).is_none());
    }

    #[test]
    fn bad_settings_refused() {
        assert!(matches!(Runner::new(config(&[], &[2], 1)), Err(Error::Config(_))));
    }

    #[test]
    fn files_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results.csv");
        let runner = Runner::new(ExperimentConfig { output: output.clone(), ..config(&[4, 5], &[2], 2) }).unwrap();
        let report = runner.run_to_file(&mut Quiet).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.lines().next(), Some(LOG_HEADER));

        let summary = dir.path().join("summary.json");
        report.write_json(&summary).unwrap();
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(json["results"].as_array().unwrap().len(), 4);
        assert_eq!(json["summaries"][1]["target"], 10);
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("results.csv");
        let runner = Runner::new(ExperimentConfig { output, ..config(&[4], &[2], 1) }).unwrap();
        assert!(matches!(runner.run_to_file(&mut Quiet), Err(Error::Io { .. })));
    }
}
