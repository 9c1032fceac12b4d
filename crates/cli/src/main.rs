#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use voice_emotion_core::audio::{downmix, parse_f32le, DEFAULT_SAMPLE_RATE};
use voice_emotion_core::config::{
    resolve_parsed_with_default, AnalyzerConfig, ConfidenceThreshold, Env,
    ProcessingDelay, SampleRate, StdEnv, DEFAULT_DELAY_MS, ENV_CONFIDENCE_THRESHOLD,
    ENV_DELAY_MS, ENV_SEED,
};
use voice_emotion_core::emotion::DEFAULT_CONFIDENCE_THRESHOLD;
use voice_emotion_core::{AnalysisPipeline, EmotionAnalyzer, SampleBuffer};

#[derive(Parser, Debug)]
#[command(name = "voice-emotion")]
#[command(about = "Heuristic emotion scoring for raw f32le mono/interleaved PCM")]
struct Args {
    /// Raw little-endian f32 PCM file, or `-` for stdin.
    input: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Interleaved channel count; averaged down to mono.
    #[arg(long, default_value_t = 1)]
    channels: u16,

    /// Fixed scorer seed for reproducible output.
    #[arg(long, env = ENV_SEED)]
    seed: Option<u64>,

    #[arg(long)]
    confidence_threshold: Option<f64>,

    #[arg(long)]
    delay_ms: Option<u64>,

    #[arg(long, default_value_t = 0)]
    delay_jitter_ms: u64,

    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(&args, &env)?;

    tracing::info!(
        sample_rate = cfg.sample_rate.hz(),
        channels = args.channels,
        seeded = cfg.seed.is_some(),
        threshold = cfg.confidence.value(),
        "config loaded"
    );

    let raw = read_input(&args.input).await?;
    let interleaved = parse_f32le(&raw).context("input is not raw f32le pcm")?;
    let samples = downmix(&interleaved, args.channels)?;
    tracing::info!(samples = samples.len(), "pcm loaded");

    let pipeline = AnalysisPipeline::from_config(&cfg);
    let result = pipeline
        .analyze(SampleBuffer::new(samples, cfg.sample_rate.hz()))
        .await?;

    tracing::info!(
        emotion = %result.emotion,
        confidence = result.confidence,
        duration_secs = result.duration_secs,
        "analysis complete"
    );

    let report = result.report(&cfg.confidence.policy());
    println!("{}", report.to_json(args.pretty)?);

    Ok(())
}

async fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        use tokio::io::AsyncReadExt;
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: &Args, env: &impl Env) -> anyhow::Result<AnalyzerConfig> {
    let sample_rate = SampleRate::new(args.sample_rate)?;

    let threshold = resolve_parsed_with_default(
        args.confidence_threshold,
        ENV_CONFIDENCE_THRESHOLD,
        env,
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let confidence = ConfidenceThreshold::new(threshold)?;

    let delay_ms = resolve_parsed_with_default(args.delay_ms, ENV_DELAY_MS, env, DEFAULT_DELAY_MS)?;
    Ok(AnalyzerConfig {
        sample_rate,
        confidence,
        delay: ProcessingDelay::new(delay_ms, args.delay_jitter_ms),
        seed: args.seed,
    })
}
