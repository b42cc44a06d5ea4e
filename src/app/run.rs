// dataprofiler - app/run.rs
//
// Run lifecycle management. Orchestrates the core pipeline on a
// background thread, sending progress messages back via a channel —
// the same shape this codebase already used for long-running scans.

use crate::core::model::{RunConfig, RunProgress};
use crate::core::pipeline::{self, CancellationToken};
use crate::platform::workspace::PlatformPaths;
use crate::util::error::ProfilerError;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// Manages a single profiling run on a background thread.
pub struct RunManager {
    pub progress_rx: Option<mpsc::Receiver<RunProgress>>,
    cancellation: CancellationToken,
    handle: Option<thread::JoinHandle<Result<(), ()>>>,
}

impl RunManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancellation: CancellationToken::new(),
            handle: None,
        }
    }

    /// Start profiling `input_path` under the given config. Spawns one
    /// dedicated worker thread per run (spec §5: "each run is
    /// processed on a single dedicated worker thread").
    pub fn start_run(&mut self, run_id: String, input_path: PathBuf, config: RunConfig, paths: PlatformPaths) {
        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);
        let cancellation = self.cancellation.clone();

        let handle = thread::spawn(move || {
            let distinct_db_path = match paths.distinct_store_path(&run_id) {
                Ok(p) => p,
                Err(e) => {
                    let _ = tx.send(RunProgress::Failed {
                        reason: format!("could not prepare run workspace: {e}"),
                    });
                    return Err(());
                }
            };

            match pipeline::run(&run_id, &input_path, &config, &distinct_db_path, &cancellation, &tx) {
                Ok(_artifact) => Ok(()),
                Err(e) => {
                    tracing::error!(error = %e, "run failed");
                    Err(())
                }
            }
        });

        self.handle = Some(handle);
        tracing::info!("run started");
    }

    /// Signal cooperative cancellation (spec §5).
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Poll for progress messages (non-blocking).
    pub fn poll_progress(&self) -> Vec<RunProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }

    /// Block until the run's worker thread finishes.
    pub fn join(&mut self) -> Result<(), ProfilerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(())) => Err(ProfilerError::Run(crate::util::error::RunError::Catastrophic {
                    code: "E_RUN_FAILED",
                })),
                Err(_) => Err(ProfilerError::Run(crate::util::error::RunError::Catastrophic {
                    code: "E_WORKER_PANIC",
                })),
            }
        } else {
            Ok(())
        }
    }
}

impl Default for RunManager {
    fn default() -> Self {
        Self::new()
    }
}
