use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::{
    fs,
    sync::{mpsc, Semaphore},
    task::JoinSet,
};
use tracing::warn;

use crate::{
    config::Config, info_time, Code, Error, FetchResult, Fetcher, Result, PROGRESS_EVERY,
};

/// Success/failure counters for one run. Owned by the aggregator task,
/// frozen once the run ends, never persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    pub successful: u64,
    pub failed: u64,
}

impl RunTally {
    pub fn total(&self) -> u64 {
        self.successful + self.failed
    }
}

/// One classified code, sent from a worker to the aggregator.
#[derive(Debug)]
pub struct Outcome {
    pub code: Code,
    pub result: FetchResult,
}

/// Drives the fetch of every code in the configured space to completion and
/// returns the final tally. Absent codes never fail the run; only setup
/// problems (output dir, client construction) propagate.
pub async fn harvest(config: &Config) -> Result<RunTally> {
    let start_time = Local::now();
    let workers = config.workers();
    let code_space = config.code_space();

    fs::create_dir_all(&config.output_dir).await?;
    let fetcher = Arc::new(Fetcher::new(config)?);

    println!(
        "Starting to fetch course data from 0000 to {:04}...",
        code_space.saturating_sub(1)
    );
    println!("Output directory: {}/", config.output_dir.display());
    println!("Using {workers} workers");
    println!("{}", "-".repeat(50));

    // A single consumer owns the tally and every file write, so counter
    // updates and writes are serialized without any locks.
    let (outcome_tx, outcome_rx) = mpsc::channel(256);
    let aggregator = tokio::spawn({
        let output_dir = config.output_dir.clone();
        async move { collect_outcomes(outcome_rx, output_dir).await }
    });

    // All codes are submitted up front; the semaphore bounds how many fetches
    // are in flight at once.
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    for code in Code::all().take(code_space as usize) {
        tasks.spawn({
            let fetcher = fetcher.clone();
            let outcome_tx = outcome_tx.clone();
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire_owned().await?;
                let result = fetcher.fetch(code).await;
                outcome_tx.send(Outcome { code, result }).await?;
                Ok::<(), Error>(())
            }
        });
    }
    drop(outcome_tx);

    // A single misbehaving task is logged and skipped; the run always goes
    // the distance.
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Error processing code: {e}"),
            Err(e) => warn!("Error processing code: {e}"),
        }
    }

    let tally = aggregator.await??;
    println!("{}", "-".repeat(50));
    println!("Completed!");
    println!("Successful: {}", tally.successful);
    println!("Failed: {}", tally.failed);
    println!("Total processed: {}", tally.total());
    info_time!(start_time, "Harvested the full code space.");

    Ok(tally)
}

/// Receives every classified code, writes the present ones to disk and keeps
/// the counters. Returns the frozen tally once all workers hang up.
async fn collect_outcomes(
    mut outcome_rx: mpsc::Receiver<Outcome>,
    output_dir: PathBuf,
) -> Result<RunTally> {
    let mut tally = RunTally::default();

    while let Some(Outcome { code, result }) = outcome_rx.recv().await {
        match result {
            FetchResult::Present(value) => match write_artifact(&output_dir, code, &value).await {
                Ok(path) => {
                    tally.successful += 1;
                    println!("✓ {code}: Saved to {}", path.display());
                }
                Err(e) => warn!(%code, "Error processing code: {e}"),
            },
            FetchResult::Absent => {
                tally.failed += 1;
                if code.value() % PROGRESS_EVERY == 0 {
                    println!(
                        "✗ Progress: {code} (Success: {}, Failed: {})",
                        tally.successful, tally.failed
                    );
                }
            }
        }
    }

    Ok(tally)
}

/// Pretty-printed UTF-8, 2-space indent, non-ASCII kept literal. Overwrites
/// whatever a previous run left behind for the same code.
async fn write_artifact(
    output_dir: &Path,
    code: Code,
    value: &serde_json::Value,
) -> Result<PathBuf> {
    let path = output_dir.join(format!("{code}.json"));
    let pretty = serde_json::to_string_pretty(value)?;
    fs::write(&path, pretty).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn aggregator_counts_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(8);
        let aggregator = tokio::spawn(collect_outcomes(rx, dir.path().to_path_buf()));

        tx.send(Outcome {
            code: Code::new(12).unwrap(),
            result: FetchResult::Present(json!({"a": 1})),
        })
        .await
        .unwrap();
        tx.send(Outcome {
            code: Code::new(300).unwrap(),
            result: FetchResult::Absent,
        })
        .await
        .unwrap();
        tx.send(Outcome {
            code: Code::new(13).unwrap(),
            result: FetchResult::Absent,
        })
        .await
        .unwrap();
        drop(tx);

        let tally = aggregator.await.unwrap().unwrap();
        assert_eq!(tally, RunTally { successful: 1, failed: 2 });
        assert_eq!(tally.total(), 3);

        let written = std::fs::read_to_string(dir.path().join("0012.json")).unwrap();
        assert_eq!(written, "{\n  \"a\": 1\n}");
        assert!(!dir.path().join("0300.json").exists());
        assert!(!dir.path().join("0013.json").exists());
    }

    #[tokio::test]
    async fn artifacts_keep_non_ascii_literal() {
        let dir = tempfile::tempdir().unwrap();
        let value = json!({"disciplina": "Cálculo I", "pré": ["Álgebra"]});
        let path = write_artifact(dir.path(), Code::new(1).unwrap(), &value)
            .await
            .unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("Cálculo I"));
        assert!(!written.contains("\\u"));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&written).unwrap(), value);
    }
}
