//! CSV experiment report written by `pairsap bench`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Trials per experiment unless `--runs` says otherwise
pub const DEFAULT_RUNS: usize = 10;

const HEADER: &str = "Run,Duration (ms),Candidate Count";

#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pool_size: usize,
    candidate_count: usize,
    durations: Vec<Duration>,
}

impl ExperimentReport {
    pub fn new(pool_size: usize, candidate_count: usize) -> Self {
        Self {
            pool_size,
            candidate_count,
            durations: Vec::new(),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.durations.push(elapsed);
    }

    pub fn runs(&self) -> usize {
        self.durations.len()
    }

    /// Mean duration in milliseconds; zero when nothing was recorded
    pub fn average_millis(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let total: f64 = self.durations.iter().map(|d| millis(*d)).sum();
        total / self.durations.len() as f64
    }

    pub fn file_name(&self) -> String {
        format!("experiment_results_{}_public_keys.csv", self.pool_size)
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.durations.len() + 2);
        lines.push(HEADER.to_string());
        for (i, elapsed) in self.durations.iter().enumerate() {
            lines.push(format!("{},{:.2},{}", i + 1, millis(*elapsed), self.candidate_count));
        }
        lines.push(format!(
            "Average,{:.2},{}",
            self.average_millis(),
            self.candidate_count
        ));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Write the report into `dir` and return the file path
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.render())
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(path)
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
