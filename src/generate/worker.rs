use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{Result, WorkerFailure};
use crate::generate::layout::OutputLayout;
use crate::profile::VoiceProfile;
use crate::tts::client::AudioFetcher;
use crate::tts::composer::UrlComposer;

/// Everything one worker needs, passed by value across the worker boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTask {
    pub index: usize,
    pub composer: UrlComposer,
    pub texts: Vec<String>,
    pub profiles: Vec<VoiceProfile>,
    pub layout: OutputLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub worker: usize,
    pub total: usize,
    pub fetched: usize,
    pub skipped: usize,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

/// What a worker process writes to stdout when it finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerOutcome {
    Ok(GroupReport),
    Err(WorkerFailure),
}

pub struct GroupWorker<'a> {
    composer: &'a UrlComposer,
    fetcher: &'a dyn AudioFetcher,
    layout: &'a OutputLayout,
}

impl<'a> GroupWorker<'a> {
    pub fn new(composer: &'a UrlComposer, fetcher: &'a dyn AudioFetcher, layout: &'a OutputLayout) -> Self {
        Self {
            composer,
            fetcher,
            layout,
        }
    }

    /// Renders every (text, profile) pair of this partition, texts outer,
    /// profiles inner. Pairs whose two files already exist are skipped; the
    /// first fetch or write failure stops the worker.
    pub fn run(&self, worker: usize, texts: &[String], profiles: &[VoiceProfile]) -> Result<GroupReport> {
        let start = Instant::now();
        let pid = std::process::id();
        self.layout.prepare()?;

        let total = texts.len() * profiles.len();
        let mut done = 0;
        let mut fetched = 0;
        let mut skipped = 0;

        for text in texts {
            for profile in profiles {
                let targets = self.layout.targets(text, profile);

                if targets.both_exist() {
                    skipped += 1;
                    done += 1;
                    tracing::info!(pid, worker, done, total, emotion = %profile.emotion_name, "already generated; skipping");
                    continue;
                }

                let url = self.composer.build_for(text, profile)?;
                let audio = self.fetcher.fetch_audio(&url)?;
                targets.write(&audio)?;

                fetched += 1;
                done += 1;
                tracing::info!(pid, worker, done, total, emotion = %profile.emotion_name, "generated");
            }
        }

        let elapsed = start.elapsed();
        tracing::info!(
            pid,
            worker,
            fetched,
            skipped,
            elapsed_secs = elapsed.as_secs_f64(),
            "partition finished"
        );

        Ok(GroupReport {
            worker,
            total,
            fetched,
            skipped,
            elapsed,
        })
    }
}

impl GroupTask {
    pub fn run(&self, fetcher: &dyn AudioFetcher) -> Result<GroupReport> {
        GroupWorker::new(&self.composer, fetcher, &self.layout).run(self.index, &self.texts, &self.profiles)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
