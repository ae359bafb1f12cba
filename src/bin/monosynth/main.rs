//! monosynth - play a single synth voice from the terminal
//!
//! Run with: cargo run --release -- --log-file monosynth.log

mod app;
mod keyboard;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Terminal monophonic synthesizer")]
pub struct Args {
    /// Samples per engine block (envelopes step once per block)
    #[arg(long, default_value_t = 128)]
    pub block_size: usize,

    /// Octave of the `a` key, 4 puts it on middle C
    #[arg(long, default_value_t = 4)]
    pub octave: i32,

    /// Write logs here; filter with RUST_LOG (default "info")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // The terminal owns stdout, so logs only ever go to a file.
    let mut terminal = ratatui::init();
    let result = app::run(&mut terminal, &args);
    ratatui::restore();
    result
}

/// Modules that log from inside the audio callback. Their trace events fire
/// every block, and the file writer below takes a lock, so they are held at
/// debug whatever RUST_LOG asks for.
const AUDIO_THREAD_TARGETS: [&str; 2] = ["monosynth::dsp", "monosynth::synth::voice"];

fn log_filter(directives: &str) -> EyreResult<EnvFilter> {
    let mut filter = EnvFilter::try_new(directives)
        .wrap_err_with(|| format!("invalid log filter `{directives}`"))?;
    for target in AUDIO_THREAD_TARGETS {
        filter = filter.add_directive(format!("{target}=debug").parse()?);
    }
    Ok(filter)
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| "info".into());
    let filter = log_filter(&directives)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tracing::{Event, Subscriber};
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    use super::*;

    struct CountEvents(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for CountEvents {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn count_with(directives: &str, emit: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(log_filter(directives).unwrap())
            .with(CountEvents(count.clone()));
        tracing::subscriber::with_default(subscriber, emit);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn audio_thread_trace_is_filtered_even_at_trace_level() {
        let seen = count_with("trace", || {
            tracing::trace!(target: "monosynth::dsp::envelope", "stage");
            tracing::trace!(target: "monosynth::synth::voice", "gate");
            tracing::trace!(target: "monosynth::synth::handle", "control side");
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn audio_thread_debug_still_passes() {
        let seen = count_with("debug", || {
            tracing::debug!(target: "monosynth::dsp::filter", "coefficients");
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn bad_directives_are_reported() {
        assert!(log_filter("monosynth=loud").is_err());
    }
}
