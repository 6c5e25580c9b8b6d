pub mod config;
pub mod downloader;
pub mod ytdlp;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use config::AppConfig;
use downloader::extractors::CliMetadataFetcher;
use downloader::groups::{AdaptiveRunner, BatchRunner, Classifier, GroupRunner};
use downloader::models::{Group, RunMode, RunResult};
use downloader::orchestrator::RetryLadder;
use downloader::queue::UrlQueue;
use downloader::reconcile::reconcile;
use downloader::tools::ToolManager;
use downloader::traits::ToolRunner;
use downloader::utils::ProcessRunner;
use ytdlp::YtDlp;

/// Run every group in order, one at a time. A failing group never stops the
/// ones after it.
pub async fn run_groups(runner: &dyn GroupRunner, groups: &[Group]) -> Vec<RunResult> {
    let mut results = Vec::with_capacity(groups.len());
    for group in groups {
        info!(
            "[{}] starting ({} mode, {} URL(s))",
            group.name,
            runner.name(),
            group.urls.len()
        );
        let result = runner.run_group(group).await;
        if result.succeeded() {
            info!("[{}] done", group.name);
        } else {
            error!("[{}] failed with exit code {:?}", group.name, result.exit_code);
        }
        results.push(result);
    }
    results
}

fn build_runner(config: &AppConfig, ytdlp: YtDlp) -> Box<dyn GroupRunner> {
    let downloads: Arc<dyn ToolRunner> = Arc::new(ProcessRunner::new());
    match config.mode {
        RunMode::Batch => Box::new(BatchRunner::new(ytdlp, downloads, config.batch_format.clone())),
        RunMode::Adaptive => {
            let metadata: Arc<dyn ToolRunner> =
                Arc::new(ProcessRunner::new().with_timeout(config.metadata_timeout_secs));
            Box::new(AdaptiveRunner::new(
                CliMetadataFetcher::new(ytdlp.clone(), metadata),
                RetryLadder::new(ytdlp, downloads, config.height_ceiling),
                config.height_ceiling,
                config.metadata_alternate_client,
            ))
        }
    }
}

/// Whole orchestration. `Ok(true)` means every group succeeded and the queue
/// was drained (or, for a dry run, that there was something to do).
pub async fn run(config: &AppConfig, dry_run: bool) -> Result<bool> {
    let toolset = if dry_run {
        None
    } else {
        let tools = ToolManager::new(config.tools.clone())
            .ensure_required(config.accelerator.enabled)
            .context("required tool missing")?;
        Some(tools)
    };

    let queue = UrlQueue::load(&config.queue_file)
        .await
        .context("cannot read URL queue")?;
    if queue.is_empty() {
        error!("no URLs in {}", queue.path().display());
        return Ok(false);
    }

    let classifier = Classifier::new(
        config.groups.clone(),
        config.default_group.clone(),
        config.output_root.clone(),
    );
    let groups = classifier.classify(queue.entries());

    let Some(toolset) = toolset else {
        for group in &groups {
            info!("[{}] -> {}", group.name, group.output_dir.display());
            for url in &group.urls {
                info!("[{}]   {}", group.name, url);
            }
        }
        return Ok(!groups.is_empty());
    };

    let options = config.download_options(toolset.aria2c.as_deref(), Some(toolset.ffmpeg.as_str()));
    let runner = build_runner(config, YtDlp::new(toolset.ytdlp.clone(), options));

    let results = run_groups(runner.as_ref(), &groups).await;
    let outcome = reconcile(&queue, &results)
        .await
        .context("cannot update URL queue")?;
    Ok(outcome.is_success())
}
