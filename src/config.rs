use crate::corpus::Corpus;
use crate::engine::{
    EngineConfig, DEFAULT_BEST_MATCH_THRESHOLD, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_CAPACITY,
};
use crate::storage::{SledStore, PREFERENCES_SCOPE};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every subcommand; each falls back to an environment variable
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// JSON (optionally .gz) file of posts; the bundled sample posts when omitted
    #[arg(long, global = true, env = "POSTSEARCH_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Directory for the preference store (recent searches)
    #[arg(long, global = true, env = "POSTSEARCH_DATA_DIR", default_value = ".postsearch")]
    pub data_dir: PathBuf,

    #[arg(long, global = true, env = "POSTSEARCH_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Scores strictly above this are labelled "best match"
    #[arg(
        long,
        global = true,
        env = "POSTSEARCH_BEST_MATCH",
        default_value_t = DEFAULT_BEST_MATCH_THRESHOLD
    )]
    pub best_match_threshold: u32,

    #[arg(
        long,
        global = true,
        env = "POSTSEARCH_RECENT_CAPACITY",
        default_value_t = DEFAULT_RECENT_CAPACITY
    )]
    pub recent_capacity: usize,

    /// Idle time before a live search fires, in milliseconds
    #[arg(long, global = true, env = "POSTSEARCH_DEBOUNCE_MS", default_value_t = 200)]
    pub debounce_ms: u64,
}

impl Settings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            page_size: self.page_size.max(1),
            best_match_threshold: self.best_match_threshold,
            recent_capacity: self.recent_capacity,
            debounce: Duration::from_millis(self.debounce_ms),
            ..EngineConfig::default()
        }
    }

    pub fn load_corpus(&self) -> Result<Corpus> {
        match &self.corpus {
            Some(path) => Corpus::load(path),
            None => {
                tracing::debug!("No corpus path given, using bundled posts");
                Corpus::builtin()
            }
        }
    }

    pub fn open_store(&self) -> Result<SledStore> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;
        SledStore::open(self.data_dir.join("preferences.db"), PREFERENCES_SCOPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["postsearch"]).unwrap();
        let config = cli.settings.engine_config();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let data_dir = dir.path().join("data");
        let cli = TestCli::try_parse_from([
            "postsearch",
            "--page-size",
            "0",
            "--best-match-threshold",
            "30",
            "--data-dir",
            data_dir.to_str().unwrap(),
        ])?;

        let config = cli.settings.engine_config();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.best_match_threshold, 30);

        assert_eq!(cli.settings.load_corpus()?.len(), 8);
        cli.settings.open_store()?;
        assert!(data_dir.exists());
        Ok(())
    }
}
