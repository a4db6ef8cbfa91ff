use std::process::ExitCode;

use rj_webclient::BackendKind;
use serde_json::json;
use strum::IntoEnumIterator as _;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(long)]
    pub json: bool,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = global_args.load_config()?;
    let b = &cfg.backend;

    let rows: Vec<_> = BackendKind::iter()
        .map(|kind| {
            let target = match kind {
                BackendKind::Wandbox => json!({
                    "url": b.wandbox.url,
                    "compiler": b.wandbox.compiler,
                    "options": b.wandbox.options,
                }),
                BackendKind::PaizaIo => json!({
                    "url": b.paizaio.create_url,
                    "language": b.paizaio.language,
                    "settle_delay_ms": b.paizaio.settle_delay_ms,
                }),
            };
            json!({
                "name": kind.to_string(),
                "service": kind.service_name(),
                "polling": kind.is_polling(),
                "default": kind == cfg.judge.default_backend,
                "settings": target,
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("config: {}", GlobalArgs::config_path_for_display(&cfg));
    for kind in BackendKind::iter() {
        let mark = if kind == cfg.judge.default_backend { "*" } else { " " };
        let detail = match kind {
            BackendKind::Wandbox => format!("{} ({})", b.wandbox.compiler, b.wandbox.url),
            BackendKind::PaizaIo => format!("{} ({})", b.paizaio.language, b.paizaio.create_url),
        };
        println!(
            "{} {:<8} {:<9} {}",
            mark,
            kind.to_string(),
            kind.service_name(),
            detail
        );
    }
    Ok(ExitCode::SUCCESS)
}
