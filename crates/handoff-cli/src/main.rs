use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Parser;
use handoff::{Context, DownloadRequest, Downloaded, download, status_equals};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWrite;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod progress;

use cli::App;
use progress::DownloadBar;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let app = App::parse();

    let root = Context::background();
    let ctx = match app.timeout() {
        Some(limit) => root.with_timeout(limit),
        None => root.clone(),
    };

    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling download");
            interrupt.cancel();
        }
    });

    match app.output.clone() {
        Some(path) => to_file(&ctx, &app, &path).await,
        None => {
            let done = fetch(&ctx, &app, tokio::io::stdout()).await?;
            report(&done);
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Overwrite `path` in place and trim it once the download succeeded, so a
/// failed run leaves an existing file as it was.
async fn to_file(ctx: &Context, app: &App, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let done = fetch(ctx, app, file).await?;
    done.dest
        .set_len(done.file_size)
        .await
        .with_context(|| format!("failed to truncate {}", path.display()))?;
    debug!(path = %path.display(), "output truncated");

    report(&done);
    Ok(())
}

async fn fetch<W>(ctx: &Context, app: &App, dest: W) -> Result<Downloaded<W>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let bar = DownloadBar::new("Downloading", app.quiet);
    let pb = bar.handle();

    let mut request = DownloadRequest::new(app.url.clone(), dest)
        .progress(bar)
        .read_timeout(app.read_timeout())
        .copy_timeout(app.copy_timeout());
    if let Some(status) = app.expect_status {
        request = request.validate_response(status_equals(status));
    }
    if let Some(dir) = &app.staging_dir {
        request = request.staging_dir(dir);
    }

    let result = download(ctx, request).await;
    pb.finish_and_clear();
    result.with_context(|| format!("failed to download {}", app.url))
}

fn report<W>(done: &Downloaded<W>) {
    eprintln!("Downloaded {} bytes in {:.2?}", done.file_size, done.duration);
}
