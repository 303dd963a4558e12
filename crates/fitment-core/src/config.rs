use crate::matcher::MATCH_RESULT_CAP;

pub const IMPORT_BATCH_SIZE_ENV: &str = "FITMENT_IMPORT_BATCH_SIZE";
pub const IMPORT_BATCH_PAUSE_MS_ENV: &str = "FITMENT_IMPORT_BATCH_PAUSE_MS";
pub const MATCH_RESULT_CAP_ENV: &str = "FITMENT_MATCH_RESULT_CAP";

const DEFAULT_IMPORT_BATCH_SIZE: usize = 50;
const DEFAULT_IMPORT_BATCH_PAUSE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            batch_pause_ms: DEFAULT_IMPORT_BATCH_PAUSE_MS,
        }
    }
}

impl ImportConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            batch_size: read_env_usize(IMPORT_BATCH_SIZE_ENV, DEFAULT_IMPORT_BATCH_SIZE, 1),
            batch_pause_ms: read_env_u64(IMPORT_BATCH_PAUSE_MS_ENV)
                .unwrap_or(DEFAULT_IMPORT_BATCH_PAUSE_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub result_cap: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            result_cap: MATCH_RESULT_CAP,
        }
    }
}

impl MatchConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            result_cap: read_env_usize(MATCH_RESULT_CAP_ENV, MATCH_RESULT_CAP, 1),
        }
    }
}

#[must_use]
fn read_env_usize(name: &str, default_value: usize, min_value: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value >= min_value)
        .unwrap_or(default_value)
}

#[must_use]
fn read_env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
}
