use handoff::ProgressHandler;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;

const BAR_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const BAR_CHARS: &str = "█▓▒░  ";

static BAR_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(BAR_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(BAR_CHARS))
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> =
    Lazy::new(|| ProgressStyle::with_template(SPINNER_STYLE).ok().map(|style| style.tick_chars(TICK)));

/// Terminal progress bar fed by the download pipeline.
///
/// Starts as a spinner and switches to a bar once the total is known.
pub struct DownloadBar {
    pb: ProgressBar,
}

impl DownloadBar {
    pub fn new(prefix: &str, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };
        if let Some(style) = SPINNER_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    /// Handle for finishing the bar after the handler was moved into a request.
    pub fn handle(&self) -> ProgressBar { self.pb.clone() }
}

impl ProgressHandler for DownloadBar {
    fn expected(&mut self, total: i64) {
        let Ok(total) = u64::try_from(total) else {
            return;
        };
        self.pb.set_length(total);
        if let Some(style) = BAR_TEMPLATE.as_ref() {
            self.pb.set_style(style.clone());
        }
    }

    fn receive(&mut self, n: usize) { self.pb.inc(n as u64); }
}
