pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use error::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rj_webclient::BackendKind;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::config::Config;
use crate::fsutil;
use crate::judge::{Job, Judge, JudgeEvent};
use crate::problem::Problem;
use crate::style;
use crate::testing::{JudgeCode, Verdict};

/// Writes the example `rj.toml` into `dir`. Never overwrites an existing file.
pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(Config::FILENAME);
    fsutil::write_new_with_mkdir(&path, Config::example_toml())
        .context("Failed to write example config")?;
    Ok(path)
}

/// Reads the code and the problem, and sets up a judge for them.
/// `backend` falls back to `judge.default_backend` of the config.
pub fn prepare_job(
    code_file: impl AsRef<Path>,
    problem_file: impl AsRef<Path>,
    backend: Option<BackendKind>,
    cfg: &Config,
) -> Result<(Job, Judge)> {
    let code_file = code_file.as_ref();
    let filename = code_file
        .file_name()
        .with_context(|| format!("Not a file: {:?}", code_file))?
        .to_string_lossy();

    let code = fsutil::read_to_string(code_file).context("Failed to read code file")?;
    let problem = Problem::from_json_file(problem_file).context("Failed to load problem")?;

    let backend = backend.unwrap_or(cfg.judge.default_backend);
    log::info!(
        "{}: {} testcases, tolerance {:?}, backend {}",
        filename,
        problem.testcases.len(),
        problem.tolerance,
        backend.service_name()
    );

    let job = Job::new(code, problem.testcases, problem.tolerance, backend);
    Ok((job, cfg.new_judge(&filename)))
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be listened for.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Judges `job`, drawing a spinner per testcase when `render` is set.
/// Returns `None` if `cancelled` completes first.
pub async fn run_job<F>(job: &Job, judge: &Judge, render: bool, cancelled: F) -> Result<Option<Verdict>>
where
    F: Future<Output = ()>,
{
    if !render {
        return judge
            .judge_until(job, None, cancelled)
            .await
            .context("Failed to start judging");
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(render_progress(rx));

    // The sender is dropped on return, which ends the progress task.
    let res = judge.judge_until(job, Some(tx), cancelled).await;
    let _ = progress.await;
    let verdict = res.context("Failed to start judging")?;

    if let Some(verdict) = &verdict {
        println!();
        verdict
            .results()
            .iter()
            .filter(|r| r.judge() != JudgeCode::AC)
            .for_each(style::print_case_detail);
        style::print_verdict_summary(verdict);
    }
    Ok(verdict)
}

async fn render_progress(mut rx: UnboundedReceiver<JudgeEvent>) {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let container = MultiProgress::new();
    let mut bars: Vec<ProgressBar> = Vec::new();

    while let Some(ev) = rx.recv().await {
        match ev {
            JudgeEvent::Started { total } => {
                for i in 1..=total {
                    let bar = container
                        .add(ProgressBar::new_spinner())
                        .with_style(style.clone())
                        .with_message(format!("Testcase {} ...", i));
                    bar.enable_steady_tick(Duration::from_millis(50));
                    bars.push(bar);
                }
            }
            JudgeEvent::CaseFinished(res) => {
                if let Some(bar) = res.case_index.checked_sub(1).and_then(|i| bars.get(i)) {
                    bar.finish_with_message(style::case_label(&res).cyan().to_string());
                }
            }
            JudgeEvent::Finished { .. } => break,
        }
    }

    for bar in bars.iter().filter(|b| !b.is_finished()) {
        bar.abandon_with_message("cancelled".bright_black().to_string());
    }
}

/// `rj test`: judges `code_file` against the testcases of `problem_file`.
pub async fn do_test(
    code_file: impl AsRef<Path>,
    problem_file: impl AsRef<Path>,
    backend: Option<BackendKind>,
    cfg: &Config,
    render: bool,
) -> Result<Option<Verdict>> {
    let (job, judge) = self::prepare_job(code_file, problem_file, backend, cfg)?;
    self::run_job(&job, &judge, render, self::ctrl_c()).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compare::Tolerance;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rj-action-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn init_writes_example_config_once() {
        let dir = temp_dir("init");
        let path = init_config(&dir).unwrap();
        assert_eq!(path, dir.join("rj.toml"));
        assert!(Config::from_toml_file(path).is_ok());
        assert!(init_config(&dir).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn prepare_job_reads_files_and_applies_config() {
        let dir = temp_dir("prepare");
        let code_file = dir.join("main.py");
        let problem_file = dir.join(Problem::FILENAME);
        std::fs::write(&code_file, "print(sum(map(int, input().split())))").unwrap();
        std::fs::write(
            &problem_file,
            r#"{"testCases":[{"input":"1 2","expect":"3"}],"errorMargin":0.5}"#,
        )
        .unwrap();

        let cfg = Config::from_toml(&Config::example_toml()).unwrap();
        let (job, judge) = prepare_job(&code_file, &problem_file, None, &cfg).unwrap();
        assert_eq!(job.backend, BackendKind::Wandbox);
        assert_eq!(job.testcases.len(), 1);
        assert_eq!(job.tolerance, Tolerance::margin(0.5));
        assert!(job.code.starts_with("print("));
        assert_eq!(judge.get_backend_config().wandbox.compiler, "cpython-head");

        let (job, _) =
            prepare_job(&code_file, &problem_file, Some(BackendKind::PaizaIo), &cfg).unwrap();
        assert_eq!(job.backend, BackendKind::PaizaIo);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn prepare_job_fails_on_missing_code() {
        let dir = temp_dir("missing");
        let err = prepare_job(
            dir.join("nope.cpp"),
            dir.join(Problem::FILENAME),
            None,
            &Config::default(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read code file"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn run_job_without_testcases_passes_nothing() {
        let job = Job::new("", vec![], Tolerance::EXACT, BackendKind::Wandbox);
        let v = run_job(&job, &Judge::default(), true, std::future::pending())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.total_count(), 0);
        assert!(!v.is_passed());
    }
}
