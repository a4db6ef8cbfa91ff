use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use rj_webclient::{BackendConfig, BackendKind};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::{fsutil, judge::Judge, serdable::GlobPattern};

pub const APP_NAME: &str = "rj";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub judge: JudgeConfig,
    pub backend: BackendConfig,
    pub lang: Vec<LangConfigEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub max_concurrency: usize,
    pub case_timeout_ms: Option<u64>,
    pub default_backend: BackendKind,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: Judge::DEFAULT_MAX_CONCURRENCY,
            case_timeout_ms: None,
            default_backend: BackendKind::default(),
        }
    }
}

/// Backend settings applied when the code file name matches `pattern`.
/// Absent fields keep the `[backend.*]` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangConfigEntry {
    pub pattern: GlobPattern,
    pub wandbox_compiler: Option<String>,
    pub wandbox_options: Option<String>,
    pub paizaio_language: Option<String>,
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "rj.toml";

    pub fn example_toml() -> String {
        Asset::get(Self::FILENAME)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
            .unwrap_or_default()
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read config file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    pub fn user_config_filepath() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(Self::FILENAME))
    }

    /// Resolves the config in this order:
    /// `explicit`, ancestors of `cur_dir`, the user config dir, built-in defaults.
    pub fn load(explicit: Option<&Path>, cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_toml_file(path.to_owned());
        }

        let found = Self::find_file_in_ancestors(cur_dir)
            .or_else(|| Self::user_config_filepath().filter(|p| p.is_file()));

        match found {
            Some(path) => {
                log::info!("Using config {:?}", path);
                Self::from_toml_file(path)
            }
            None => {
                log::info!("No {} found; using defaults", Self::FILENAME);
                Ok(Self::default())
            }
        }
    }

    pub fn case_timeout(&self) -> Option<Duration> {
        self.judge.case_timeout_ms.map(Duration::from_millis)
    }

    pub fn find_lang_for_filename(&self, filename: impl AsRef<str>) -> Option<&LangConfigEntry> {
        let filename = filename.as_ref();
        self.lang.iter().find(|e| e.pattern.matches(filename))
    }

    /// `[backend.*]` with the first matching `[[lang]]` entry applied.
    pub fn backend_config_for_filename(&self, filename: impl AsRef<str>) -> BackendConfig {
        let mut cfg = self.backend.clone();
        let Some(entry) = self.find_lang_for_filename(filename) else {
            return cfg;
        };
        log::debug!("Language override matched: {}", entry.pattern);

        if let Some(c) = &entry.wandbox_compiler {
            cfg.wandbox.compiler = c.clone();
        }
        if let Some(o) = &entry.wandbox_options {
            cfg.wandbox.options = o.clone();
        }
        if let Some(l) = &entry.paizaio_language {
            cfg.paizaio.language = l.clone();
        }
        cfg
    }

    pub fn new_judge(&self, code_filename: impl AsRef<str>) -> Judge {
        Judge::new(self.backend_config_for_filename(code_filename))
            .max_concurrency(self.judge.max_concurrency)
            .case_timeout(self.case_timeout())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml();
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();

        let Config {
            source_config_file,
            judge,
            backend,
            lang,
        } = cfg;

        assert_eq!(source_config_file, None);
        assert_eq!(judge.max_concurrency, 8);
        assert_eq!(judge.case_timeout_ms, Some(60000));
        assert_eq!(judge.default_backend, BackendKind::Wandbox);

        assert_eq!(backend, BackendConfig::default());

        assert_eq!(lang.len(), 3);
        assert_eq!(
            lang[0],
            LangConfigEntry {
                pattern: GlobPattern::parse("*.cpp").unwrap(),
                wandbox_compiler: Some("gcc-head".to_owned()),
                wandbox_options: Some("-std=c++20".to_owned()),
                paizaio_language: Some("cpp".to_owned()),
            }
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.case_timeout(), None);

        let judge = cfg.new_judge("main.cpp");
        assert_eq!(judge.get_max_concurrency(), Judge::DEFAULT_MAX_CONCURRENCY);
        assert_eq!(judge.get_backend_config(), &BackendConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [judge]
            default_backend = "paizaio"

            [backend.paizaio]
            api_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.judge.default_backend, BackendKind::PaizaIo);
        assert_eq!(cfg.judge.max_concurrency, Judge::DEFAULT_MAX_CONCURRENCY);
        assert_eq!(cfg.backend.paizaio.api_key, "secret");
        assert_eq!(cfg.backend.paizaio.settle_delay_ms, 3000);
        assert_eq!(cfg.backend.wandbox, Default::default());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let res = Config::from_toml("[judge]\ndefault_backend = \"ideone\"");
        assert!(dbg!(res).is_err());
    }

    #[test]
    fn lang_override_applies_to_matching_file_only() {
        let cfg = Config::from_toml(&Config::example_toml()).unwrap();

        let py = cfg.backend_config_for_filename("solve.py");
        assert_eq!(py.wandbox.compiler, "cpython-head");
        assert_eq!(py.wandbox.options, "");
        assert_eq!(py.paizaio.language, "python3");

        let rs = cfg.backend_config_for_filename("main.rs");
        assert_eq!(rs, cfg.backend);
    }

    #[test]
    fn lang_override_keeps_absent_fields() {
        let cfg = Config::from_toml(
            r#"
            [[lang]]
            pattern = "*.cc"
            paizaio_language = "cpp"
            "#,
        )
        .unwrap();
        let b = cfg.backend_config_for_filename("a.cc");
        assert_eq!(b.wandbox.compiler, "gcc-head");
        assert_eq!(b.paizaio.language, "cpp");
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let err = Config::load(Some(Path::new("/nonexistent/rj.toml")), "/").unwrap_err();
        assert!(format!("{:#}", err).contains("Cannot read config file"));
    }

    #[test]
    fn find_config_in_ancestors() {
        let root = std::env::temp_dir().join(format!("rj-config-test-{}", std::process::id()));
        let nested = root.join("a").join("b");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(Config::FILENAME), "[judge]\nmax_concurrency = 2\n").unwrap();

        assert_eq!(
            Config::find_file_in_ancestors(&nested),
            Some(root.join(Config::FILENAME))
        );
        let cfg = Config::load(None, &nested).unwrap();
        assert_eq!(cfg.judge.max_concurrency, 2);
        assert_eq!(cfg.source_config_file, Some(root.join(Config::FILENAME)));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
