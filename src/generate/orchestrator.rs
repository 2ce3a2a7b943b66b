use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::{GenerateError, Result};
use crate::generate::layout::{check_unique_targets, OutputLayout};
use crate::generate::partition::partition;
use crate::generate::worker::{GroupReport, GroupTask, WorkerOutcome};
use crate::profile::VoiceProfile;
use crate::tts::client::AudioFetcher;
use crate::tts::composer::UrlComposer;

pub const WORKER_SUBCOMMAND: &str = "__generate-group";

/// How partitions are run.
#[derive(Clone)]
pub enum Launcher {
    /// One child process of `exe` per partition, fed over stdin.
    Process {
        exe: PathBuf,
        verbose: bool,
        timeout_seconds: Option<u64>,
    },
    /// One thread per partition sharing `fetcher`.
    Thread { fetcher: Arc<dyn AudioFetcher> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub reports: Vec<GroupReport>,
}

impl GenerationSummary {
    pub fn total(&self) -> usize {
        self.reports.iter().map(|r| r.total).sum()
    }

    pub fn fetched(&self) -> usize {
        self.reports.iter().map(|r| r.fetched).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().map(|r| r.skipped).sum()
    }
}

/// Partitions `profiles` across `workers`, runs every partition against the
/// full text list, and waits for all of them. Returns the first failure in
/// partition order; running siblings are never cancelled.
pub fn generate_all(
    composer: &UrlComposer,
    texts: &[String],
    profiles: &[VoiceProfile],
    layout: &OutputLayout,
    workers: usize,
    launcher: &Launcher,
) -> Result<GenerationSummary> {
    composer.ensure_ready(profiles)?;
    check_unique_targets(texts, profiles)?;
    if workers == 0 {
        return Err(GenerateError::config("worker count must be greater than 0"));
    }

    let start = Instant::now();
    let groups = partition(profiles, workers);
    tracing::info!(
        workers,
        texts = texts.len(),
        profiles = profiles.len(),
        "starting generation"
    );

    let running: Vec<Result<RunningGroup>> = groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| {
            launcher.launch(GroupTask {
                index,
                composer: composer.clone(),
                texts: texts.to_vec(),
                profiles: group,
                layout: layout.clone(),
            })
        })
        .collect();

    let mut first_error = None;
    let mut summary = GenerationSummary::default();
    for group in running {
        match group.and_then(RunningGroup::wait) {
            Ok(report) => summary.reports.push(report),
            Err(err) => {
                tracing::error!(error = %err, "worker failed");
                first_error.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    tracing::info!(
        fetched = summary.fetched(),
        skipped = summary.skipped(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "generation finished"
    );
    Ok(summary)
}

impl Launcher {
    pub fn current_exe(verbose: bool, timeout_seconds: Option<u64>) -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|err| GenerateError::Worker(format!("resolve current executable: {err}")))?;
        Ok(Self::Process {
            exe,
            verbose,
            timeout_seconds,
        })
    }

    fn launch(&self, task: GroupTask) -> Result<RunningGroup> {
        match self {
            Launcher::Process {
                exe,
                verbose,
                timeout_seconds,
            } => spawn_process(exe, *verbose, *timeout_seconds, task),
            Launcher::Thread { fetcher } => {
                let fetcher = Arc::clone(fetcher);
                let index = task.index;
                let handle = thread::Builder::new()
                    .name(format!("group-{index}"))
                    .spawn(move || task.run(fetcher.as_ref()))
                    .map_err(|err| GenerateError::Worker(format!("spawn worker thread {index}: {err}")))?;
                Ok(RunningGroup::Thread { index, handle })
            }
        }
    }
}

enum RunningGroup {
    Process {
        index: usize,
        child: Child,
        reader: JoinHandle<std::io::Result<Vec<u8>>>,
    },
    Thread {
        index: usize,
        handle: JoinHandle<Result<GroupReport>>,
    },
}

fn spawn_process(exe: &Path, verbose: bool, timeout_seconds: Option<u64>, task: GroupTask) -> Result<RunningGroup> {
    let index = task.index;
    let payload = serde_json::to_vec(&task)
        .map_err(|err| GenerateError::Worker(format!("serialize task for worker {index}: {err}")))?;

    let mut cmd = Command::new(exe);
    if verbose {
        cmd.arg("--verbose");
    }
    cmd.arg(WORKER_SUBCOMMAND);
    if let Some(secs) = timeout_seconds {
        cmd.arg("--timeout-seconds").arg(secs.to_string());
    }
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    let mut child = cmd
        .spawn()
        .map_err(|err| GenerateError::Worker(format!("spawn worker process {index}: {err}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(err) = stdin.write_all(&payload) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(GenerateError::Worker(format!("send task to worker {index}: {err}")));
        }
    }

    let Some(stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(GenerateError::Worker(format!("capture stdout of worker {index}")));
    };
    let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut handle = stdout;
        handle.read_to_end(&mut buf)?;
        Ok(buf)
    });

    tracing::debug!(worker = index, pid = child.id(), "spawned worker process");
    Ok(RunningGroup::Process { index, child, reader })
}

impl RunningGroup {
    fn wait(self) -> Result<GroupReport> {
        match self {
            RunningGroup::Process {
                index,
                mut child,
                reader,
            } => {
                let status = child
                    .wait()
                    .map_err(|err| GenerateError::Worker(format!("wait for worker {index}: {err}")))?;
                let output = reader
                    .join()
                    .map_err(|_| GenerateError::Worker(format!("reader for worker {index} panicked")))?
                    .map_err(|err| {
                        GenerateError::Worker(format!(
                            "read outcome of worker {index} (exit status {status}): {err}"
                        ))
                    })?;

                match serde_json::from_slice::<WorkerOutcome>(&output) {
                    Ok(WorkerOutcome::Ok(report)) => Ok(report),
                    Ok(WorkerOutcome::Err(failure)) => Err(failure.into()),
                    Err(_) => Err(GenerateError::Worker(format!(
                        "worker {index} exited with status {status} without reporting an outcome"
                    ))),
                }
            }
            RunningGroup::Thread { index, handle } => handle
                .join()
                .map_err(|_| GenerateError::Worker(format!("worker thread {index} panicked")))?,
        }
    }
}
