use serde::Serialize;

use crate::generate::partition::default_workers;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: Option<usize>,
    pub default_workers: usize,
}

pub fn detect() -> SystemInfo {
    let os = std::env::consts::OS.to_string();
    let arch = std::env::consts::ARCH.to_string();
    let cpu_cores = std::thread::available_parallelism().ok().map(|n| n.get());

    SystemInfo {
        os,
        arch,
        cpu_cores,
        default_workers: default_workers(),
    }
}
