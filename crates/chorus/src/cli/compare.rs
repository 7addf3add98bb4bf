//! The `chorus compare` command: one prompt, several providers.

use chorus_core::sink::{to_json, to_jsonl, write_text_report};
use chorus_core::{
    AdapterFactory, Config, GenerationParams, Harness, ImageSink, Modality, Payload, Prompt,
    ReportFormat,
};
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// The prompt to send to every provider
    #[arg(required = true)]
    pub prompt: String,

    /// Provider to include, as `name` or `name/model` (repeatable)
    #[arg(short, long = "provider", required = true)]
    pub providers: Vec<String>,

    /// Modality hint for the prompt
    #[arg(short, long, value_enum)]
    pub modality: Option<ModalityArg>,

    /// Report format (defaults to the configured output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for generated image files (overrides config)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Maximum tokens for text generation
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature for text generation
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Generated image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Generated image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Noise seed for image generation (random per call when unset)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overall deadline in milliseconds; slower adapters settle as timeouts
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Max retries per adapter for transient failures
    #[arg(long)]
    pub retries: Option<u32>,
}

/// CLI-facing modality values.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModalityArg {
    Text,
    Image,
}

impl From<ModalityArg> for Modality {
    fn from(value: ModalityArg) -> Self {
        match value {
            ModalityArg::Text => Modality::Text,
            ModalityArg::Image => Modality::Image,
        }
    }
}

/// CLI-facing report formats.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Text,
    Json,
    Jsonl,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Jsonl => ReportFormat::JsonLines,
        }
    }
}

/// Execute the compare command.
pub async fn execute(args: CompareArgs, mut config: Config) -> anyhow::Result<()> {
    // CLI flags override the config file for this run
    if let Some(deadline_ms) = args.deadline_ms {
        config.dispatch.deadline_ms = Some(deadline_ms);
    }
    if let Some(retries) = args.retries {
        config.dispatch.retry_attempts = retries;
    }
    if let Some(ref dir) = args.output_dir {
        let expanded = shellexpand::tilde(dir);
        config.general.output_dir = PathBuf::from(expanded.into_owned());
    }

    let format: ReportFormat = match args.format {
        Some(f) => f.into(),
        None => ReportFormat::parse(&config.output.format).unwrap_or(ReportFormat::Text),
    };

    let mut prompt = Prompt::new(&args.prompt).with_params(GenerationParams {
        width: args.width,
        height: args.height,
        temperature: args.temperature,
        max_tokens: args.max_tokens,
        seed: args.seed,
    });
    if let Some(modality) = args.modality {
        prompt = prompt.with_modality(modality.into());
    }

    let specs = args
        .providers
        .iter()
        .map(|p| AdapterFactory::spec_for(p, &config))
        .collect::<Result<Vec<_>, _>>()?;

    let output_dir = config.output_dir();
    let pretty = config.output.pretty;
    let harness = Harness::new(config);
    let set = harness.compare(&prompt, &specs).await?;

    // Persist image payloads before rendering the report, so the report
    // reflects what actually landed on disk.
    let has_images = set
        .iter()
        .any(|r| matches!(r.payload, Some(Payload::Image { .. })));
    if has_images {
        let written = ImageSink::new(&output_dir).write(&set)?;
        for path in &written {
            println!("Saved {}", path.display());
        }
    }

    let rendered = match format {
        ReportFormat::Text => {
            let mut buffer = Vec::new();
            write_text_report(&set, &mut buffer)?;
            String::from_utf8(buffer)?
        }
        ReportFormat::Json => {
            let mut s = to_json(&set, pretty)?;
            s.push('\n');
            s
        }
        ReportFormat::JsonLines => to_jsonl(&set)?,
    };

    match args.output {
        Some(path) => {
            let mut file = std::fs::File::create(&path)?;
            file.write_all(rendered.as_bytes())?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    tracing::info!(
        "Comparison finished: {}/{} providers succeeded",
        set.success_count(),
        set.len()
    );

    Ok(())
}
