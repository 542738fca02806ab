use anyhow::{Context, Result};
use launchdash::data::Dataset;
use launchdash::logging::{log_dataset_loaded, log_startup};
use launchdash::server::{serve, AppContext};
use launchdash::state::Config;

fn load_dataset(cfg: &Config) -> Result<Dataset> {
    let dataset = match &cfg.dataset_path {
        Some(path) => Dataset::load_csv(path)
            .with_context(|| format!("loading dataset {}", path.display()))?,
        None => Dataset::sample(),
    };
    let report = dataset.report();
    log_dataset_loaded(
        &report.source,
        report.rows,
        report.bad_rows,
        report.hash_sha256.as_deref(),
    );
    Ok(dataset)
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    if cfg.debug && std::env::var("LOG_LEVEL").is_err() {
        std::env::set_var("LOG_LEVEL", "debug");
    }

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?
        .block_on(run(cfg))
}

async fn run(cfg: Config) -> Result<()> {
    let dataset = load_dataset(&cfg)?;
    log_startup(
        &format!("http://{}", cfg.bind_addr()),
        &dataset.report().source,
        dataset.len(),
        cfg.debug,
    );

    serve(AppContext::new(dataset, cfg)).await
}
