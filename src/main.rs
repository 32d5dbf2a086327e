use anyhow::{bail, Result};
use clap::Parser;
use patchwright::agentic::{
    diff_stats, parse_inline_diff, resolve_inline_diff, AgenticFixer, DiffLine, FileType,
};
use patchwright::config::Config;
use patchwright::replay::ReplayGateway;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "patchwright",
    about = "Turn a change request and a model answer into a validated patch",
    version
)]
struct Args {
    /// File to change (may not exist yet)
    #[arg(short, long)]
    file: PathBuf,

    /// bash, shell, powershell or markdown (guessed from the extension by default)
    #[arg(short = 't', long)]
    file_type: Option<FileType>,

    /// Recorded model response, or - for stdin
    #[arg(short, long)]
    response: PathBuf,

    /// Model id (overrides the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// Show the change without writing it
    #[arg(short, long)]
    preview: bool,

    /// Write the accepted result back to --file
    #[arg(short, long)]
    write: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist the effective settings (including --model) to the config file
    #[arg(long)]
    save_config: bool,

    /// The change request, e.g. "/fix quote the variables"
    #[arg(required = true, trailing_var_arg = true)]
    message: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        // --save-config may be creating the file
        Some(path) if args.save_config && !path.exists() => Config::default(),
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Err(e) = config.validate() {
        bail!("Invalid config ({}): {}", config_path_display(&args), e);
    }

    let filter = if args.verbose || config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if args.save_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        eprintln!("  + Saved settings to {}", config_path_display(&args));
    }

    let model = config.model.clone();
    let file_type = args
        .file_type
        .unwrap_or_else(|| FileType::from_path(&args.file));

    let content = if args.file.exists() {
        std::fs::read_to_string(&args.file)?
    } else {
        String::new()
    };

    let gateway = ReplayGateway::from_source(&args.response, model.clone())?;
    let fixer =
        AgenticFixer::new(Arc::new(gateway), model).with_stream_timeout(config.stream_timeout());
    tracing::debug!(model = fixer.model(), file_type = %file_type, "fixer ready");

    let mut message = args.message.join(" ");
    if args.preview && !message.trim_start().to_lowercase().starts_with("/preview") {
        message = format!("/preview {}", message);
    }

    let result = fixer
        .process_message(
            &message,
            &content,
            &args.file.display().to_string(),
            file_type.as_str(),
        )
        .await;

    if result.is_conversational {
        eprintln!("Not a fix request. Start the message with /fix to force one.");
        return Ok(());
    }
    if !result.success {
        bail!("{}", result.error_message);
    }

    println!("{}\n", result.changes_summary);
    let (added, removed) = diff_stats(&result.modified_content);
    println!("{} line(s) added, {} line(s) removed\n", added, removed);
    print_diff(&result.modified_content);

    if args.write && !result.preview_mode {
        std::fs::write(&args.file, resolve_inline_diff(&result.modified_content))?;
        eprintln!("\n  + Wrote {}", args.file.display());
    }

    Ok(())
}

fn config_path_display(args: &Args) -> String {
    args.config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(Config::config_location)
}

fn print_diff(annotated: &str) {
    for line in parse_inline_diff(annotated) {
        match line {
            DiffLine::Context(text) => println!("  {}", text),
            DiffLine::Remove(text) => println!("- {}", text),
            DiffLine::Add(text) => println!("+ {}", text),
        }
    }
}
