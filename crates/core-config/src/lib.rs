//! Configuration loading and parsing.
//!
//! Parses `mbridge.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [bridge]
//! enabled = true
//! start_in_command_mode = true
//!
//! [keys]
//! "page_up" = "\u001b[5~"
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Every field has a default. Unknown fields are ignored so older binaries
//! accept newer files. A file that fails to parse is reported with `warn!` and
//! replaced by defaults; a missing file is silently the default.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

const FILE_NAME: &str = "mbridge.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Attach a bridge to newly opened surfaces.
    #[serde(default = "BridgeConfig::default_enabled")]
    pub enabled: bool,
    /// Newly bound surfaces start with the wide (command mode) caret.
    #[serde(default = "BridgeConfig::default_start_in_command_mode")]
    pub start_in_command_mode: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            start_in_command_mode: Self::default_start_in_command_mode(),
        }
    }
}

impl BridgeConfig {
    const fn default_enabled() -> bool {
        true
    }
    const fn default_start_in_command_mode() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_owned()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Extra named keys: host key name -> engine literal.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path: `./mbridge.toml`, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("mbridge").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_absent");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            debug!(
                target: "config",
                path = %path.display(),
                extra_keys = file.keys.len(),
                enabled = file.bridge.enabled,
                "config_loaded"
            );
            Ok(Config {
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn bridge_enabled(&self) -> bool {
        self.file.bridge.enabled
    }

    pub fn start_in_command_mode(&self) -> bool {
        self.file.bridge.start_in_command_mode
    }

    pub fn extra_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.file
            .keys
            .iter()
            .map(|(name, literal)| (name.as_str(), literal.as_str()))
    }

    pub fn log_filter(&self) -> &str {
        &self.file.log.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.bridge_enabled());
        assert!(cfg.start_in_command_mode());
        assert_eq!(cfg.log_filter(), "info");
        assert_eq!(cfg.extra_keys().count(), 0);
        assert!(cfg.source.is_none());
    }

    #[test]
    fn parses_bridge_section() {
        let tmp = write_config("[bridge]\nenabled = false\nstart_in_command_mode = false\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.bridge_enabled());
        assert!(!cfg.start_in_command_mode());
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let tmp = write_config("[bridge]\nenabled = false\n[log]\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.bridge_enabled());
        assert!(cfg.start_in_command_mode());
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn parses_extra_keys_in_order() {
        let tmp = write_config(
            "[keys]\n\"page_up\" = \"\\u001b[5~\"\n\"f1\" = \"\\u001bOP\"\n[log]\nfilter = \"bridge=trace\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let keys: Vec<_> = cfg.extra_keys().collect();
        assert_eq!(keys, vec![("f1", "\x1bOP"), ("page_up", "\x1b[5~")]);
        assert_eq!(cfg.log_filter(), "bridge=trace");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = write_config("[bridge]\nenabled = true\nflavour = \"vanilla\"\n[extra]\nx = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.bridge_enabled());
        assert!(cfg.source.is_some());
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = write_config("[bridge]\nenabled = \"sometimes\"\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf()))).unwrap();

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed"));
        assert!(cfg.bridge_enabled());
        assert!(cfg.source.is_none());
    }
}
