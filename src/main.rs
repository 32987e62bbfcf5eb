use anyhow::Result;
use clap::Parser;
use gridsplit::config::SplitConfig;

/// Grid splitter CLI:
/// - cuts one image into a 3x3 grid of PNG slices
/// - optionally captions each slice via the Gemini API
/// - optionally bundles all or selected slices into a zip archive
#[derive(Parser, Debug)]
#[command(name = "gridsplit")]
#[command(about = "✂️  Split an image into a 3x3 grid and caption each piece with AI")]
#[command(
    long_about = "Split an image into a 3x3 grid of PNG slices, written as slice_1.png through slice_9.png.
With --describe each slice gets a short AI caption that is appended to its file name; with --zip the
slices are bundled into all_slices.zip (or selected_slices.zip when combined with --select)."
)]
struct Args {
    /// Input image file (any common raster format)
    input: String,

    /// Directory the slice files are written into
    #[arg(short, long, default_value = ".",
          help = "Output directory (created if missing)")]
    out_dir: String,

    /// Caption every slice with AI
    #[arg(short, long,
          help = "Request an AI caption for every slice (reads GEMINI_API_KEY)")]
    describe: bool,

    /// Bundle the slices into a zip archive
    #[arg(short, long,
          help = "Also write all_slices.zip (or selected_slices.zip with --select)")]
    zip: bool,

    /// Slice numbers to include in the archive
    #[arg(short, long,
          help = "Comma-separated slice numbers (1-9) for the archive, e.g. \"1,5,9\"")]
    select: Option<String>,

    /// Gemini model used for captions
    #[arg(short, long, default_value = gridsplit::describe::DEFAULT_MODEL,
          help = "Gemini model id used for captions")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Parse selection string (e.g. "1,5,9") into slice numbers
    let selection = match &args.select {
        Some(raw) => parse_selection(raw)?,
        None => Vec::new(),
    };

    let config = SplitConfig::new(
        args.input,
        args.out_dir,
        args.describe,
        args.zip,
        selection,
        args.model,
    );

    config.validate().map_err(anyhow::Error::msg)?;
    let options = config.to_slice_options();
    gridsplit::run_split(options).await
}

/// Parse a selection string like "1,5,9" into 1-based slice numbers
fn parse_selection(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<usize>()
                .map_err(|_| anyhow::anyhow!("Invalid slice number in selection: {}", part))
        })
        .collect()
}
