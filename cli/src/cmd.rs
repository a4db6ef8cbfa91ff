pub mod backends;
pub mod init;

use std::path::PathBuf;
use std::process::ExitCode;

use rj_core::Config;
use rj_webclient::BackendKind;

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of the searched `rj.toml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v: info, -vv: debug). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Judge a code file against the problem's testcases
    #[command(alias("t"))]
    Test(test::Args),

    /// Write an example rj.toml
    Init(init::Args),

    /// List available backends and their settings
    Backends(backends::Args),
}

pub type SubcmdResult = anyhow::Result<ExitCode>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Test(args) => test::exec(args, self).await,
            Init(args) => init::exec(args, self),
            Backends(args) => backends::exec(args, self),
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cfg = Config::load(self.config.as_deref(), util::current_dir())?;
        if let Some(path) = &cfg.source_config_file {
            log::debug!(
                "Loaded config from {}",
                util::replace_homedir_to_tilde(path).to_string_lossy()
            );
        }
        Ok(cfg)
    }

    pub fn config_path_for_display(cfg: &Config) -> String {
        match &cfg.source_config_file {
            Some(path) => util::replace_homedir_to_tilde(path)
                .to_string_lossy()
                .into_owned(),
            None => "<defaults>".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgBackend {
    Wandbox,
    PaizaIo,
}

impl From<ArgBackend> for BackendKind {
    fn from(value: ArgBackend) -> Self {
        use ArgBackend::*;
        match value {
            Wandbox => BackendKind::Wandbox,
            PaizaIo => BackendKind::PaizaIo,
        }
    }
}
