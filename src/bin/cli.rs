use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, error, info, warn};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use yt2mp3::config::Config;
use yt2mp3::{
    BatchEvent, FfmpegEncoder, InputBuffer, InputMode, LogLevel, Orchestrator, Pipeline,
    PipelineOptions, YoutubeClient,
};

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Cli {
    /// YouTube links or search terms. Piped stdin is read as well.
    pub items: Vec<String>,

    /// Import items from a text file, one per line. Can be repeated.
    #[arg(long = "file", short = 'f')]
    pub files: Vec<PathBuf>,

    #[arg(long = "output-dir", short)]
    pub output_dir: Option<PathBuf>,

    /// `links` only picks up YouTube links, `search` also resolves free text.
    #[arg(long = "mode", short, value_enum)]
    pub mode: Option<InputMode>,

    /// Path to the ffmpeg executable.
    #[arg(long = "ffmpeg")]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long = "no-tags", action = clap::ArgAction::SetTrue)]
    pub no_tags: bool,

    /// Use this config file instead of the default one.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "verbosity",
        short,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let multi = match init_logging(&args.verbosity) {
        Ok(multi) => multi,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args, multi).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    args: Cli,
    multi: MultiProgress,
) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let mut input = InputBuffer::new();
    for item in &args.items {
        input.push_line(item);
    }
    for file in &args.files {
        input.import_file(file)?;
    }
    if !std::io::stdin().is_terminal() {
        let mut piped = String::new();
        std::io::stdin().read_to_string(&mut piped)?;
        input.push_line(piped);
    }

    let mode = args.mode.or(config.mode).unwrap_or_default();
    let output_dir = args.output_dir.or(config.output_dir);

    let encoder = FfmpegEncoder::locate(args.ffmpeg.or(config.ffmpeg));
    let options = PipelineOptions {
        tag: !args.no_tags && config.tags.unwrap_or(true),
    };
    let pipeline = Pipeline::new(Arc::new(YoutubeClient::new()), Arc::new(encoder), options);
    let orchestrator = Orchestrator::new(pipeline);

    let mut handle = match orchestrator.start(input.items(mode), output_dir, mode.empty_warning()) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let bar = multi.add(ProgressBar::new(0));
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.green/white} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    while let Some(event) = handle.events.recv().await {
        match event {
            BatchEvent::Started { total } => bar.set_length(total as u64),
            BatchEvent::Status(text) => bar.set_message(text),
            BatchEvent::Log(line) => match line.level {
                LogLevel::Info => info!("{}", line.message),
                LogLevel::Warn => warn!("{}", line.message),
                LogLevel::Error => error!("{}", line.message),
            },
            BatchEvent::Progress { done, total } => {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            }
            BatchEvent::Finished {
                completed,
                skipped,
                failed,
            } => bar.finish_with_message(format!(
                "All tasks completed. {} converted, {} skipped, {} failed.",
                completed, skipped, failed
            )),
        }
    }

    let summary = handle.wait().await?;
    for failure in &summary.failed {
        warn!("Not converted: {}", failure);
    }
    multi.remove(&bar);
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbosity: &str) -> Result<MultiProgress, log::SetLoggerError> {
    let level = match verbosity {
        "debug" => LevelFilter::Debug,
        "error" => LevelFilter::Error,
        "none" => LevelFilter::Off,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false);
    if verbosity != "full" {
        builder.filter_module("rustypipe", LevelFilter::Warn);
    }
    let logger = builder.build();

    let multi = MultiProgress::new();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);
    Ok(multi)
}
