//! markup-summary CLI entry point

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use markup_summary::batch::summarize_paths;
use markup_summary::{preview_file, PreviewConfig};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Print the element/attribute structure of markup files
#[derive(Parser, Debug)]
#[command(name = "markup-summary", version, about)]
struct Cli {
    /// Files to summarize
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Show the info-pane preview (header plus summary or text) instead of the bare summary
    #[arg(long)]
    preview: bool,

    /// Characters of plain text shown in a preview
    #[arg(long, env = "MARKUP_SUMMARY_MAX_CHARS", default_value_t = 50_000)]
    max_chars: usize,

    /// Leading bytes checked for NUL when previewing non-markup files
    #[arg(long, default_value_t = 2048)]
    sniff_bytes: usize,

    /// Extension previewed as markup (repeatable; replaces xml, vti, vtu)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,
}

impl Cli {
    fn preview_config(&self) -> PreviewConfig {
        let config = PreviewConfig::default()
            .with_max_chars(self.max_chars)
            .with_sniff_bytes(self.sniff_bytes);
        if self.extensions.is_empty() {
            config
        } else {
            config.with_markup_extensions(self.extensions.iter().cloned())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out).and_then(|ok| out.flush().map(|_| ok)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        // Reader went away (`| head`); nothing left to report
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: writing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Write summaries or previews to `out`. Returns false when any path failed.
fn run<W: Write>(cli: &Cli, out: &mut W) -> io::Result<bool> {
    let mut ok = true;

    if cli.preview {
        let config = cli.preview_config();
        for (i, path) in cli.paths.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            let preview = preview_file(path, &config);
            ok &= !preview.kind.is_failure();
            writeln!(out, "{}", preview.text)?;
        }
        return Ok(ok);
    }

    for (path, result) in cli.paths.iter().zip(summarize_paths(&cli.paths)) {
        match result {
            Ok(summary) => write!(out, "{}", summary)?,
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                ok = false;
            }
        }
    }
    Ok(ok)
}
