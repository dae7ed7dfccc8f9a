//! unhtml CLI - visible-text extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unhtml::crawl::object_key;
use unhtml::{
    discover_links, process, process_batch, ConvertOptions, ConverterRegistry,
    Document, HtmlConverter, HtmlParser, JsonFormat, LinkKind, OutputFormat, Source, TextOptions,
};

#[derive(Parser)]
#[command(name = "unhtml")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract visible text from HTML, with tables as ASCII grids", long_about = None)]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    text: TextArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Rendering flags shared by every command.
#[derive(Args, Clone, Default)]
struct TextArgs {
    /// JSON file with text options
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Table column separator
    #[arg(long, global = true, env = "UNHTML_SEPARATOR")]
    separator: Option<String>,

    /// Table border fill
    #[arg(long, global = true, env = "UNHTML_BORDER")]
    border: Option<String>,

    /// Encoding to assume for input without a byte-order mark
    #[arg(long, global = true, value_name = "LABEL")]
    encoding: Option<String>,

    /// Encoding of the text output
    #[arg(long, global = true, value_name = "LABEL")]
    output_encoding: Option<String>,

    /// Emit each subtree's text once
    #[arg(long, global = true)]
    dedupe: bool,

    /// Apply NFC normalization to the output
    #[arg(long, global = true)]
    nfc: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert HTML to plain text
    Text {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert HTML to a JSON document description
    Json {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List the links a page points at
    Links {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// URL the page was fetched from (defaults to the file URL)
        #[arg(long, value_name = "URL")]
        base: Option<String>,

        /// Include links a crawler would not follow
        #[arg(long)]
        all: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert many files in parallel
    Batch {
        /// Input files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Name outputs by object key with this prefix instead of file stem
        #[arg(long, value_name = "PREFIX")]
        key_prefix: Option<String>,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref(), &cli.text),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &cli.text),
        Some(Commands::Info { input }) => cmd_info(&input, &cli.text),
        Some(Commands::Links {
            input,
            base,
            all,
            json,
        }) => cmd_links(&input, base.as_deref(), all, json, &cli.text),
        Some(Commands::Batch {
            inputs,
            output,
            key_prefix,
        }) => cmd_batch(&inputs, &output, key_prefix.as_deref(), &cli.text),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: text conversion if input is provided
            if let Some(input) = cli.input {
                cmd_text(&input, cli.output.as_deref(), &cli.text)
            } else {
                println!("{}", "Usage: unhtml <FILE> [OUTPUT]".yellow());
                println!("       unhtml --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Build text options: defaults, then the config file, then flags.
fn text_options(args: &TextArgs) -> unhtml::Result<TextOptions> {
    let mut options = match &args.config {
        Some(path) => TextOptions::from_json_file(path)?,
        None => TextOptions::default(),
    };

    if let Some(ref separator) = args.separator {
        options = options.with_separator(separator.clone());
    }
    if let Some(ref border) = args.border {
        options = options.with_border_fill(border.clone());
    }
    if let Some(ref label) = args.output_encoding {
        options = options.with_output_encoding(label.clone());
    }
    if args.dedupe {
        options = options.with_dedupe_nested(true);
    }
    if args.nfc {
        options = options.with_unicode_normalization(true);
    }

    options.validate()?;
    Ok(options)
}

fn load_source(input: &Path, args: &TextArgs) -> unhtml::Result<Source> {
    let source = Source::from_path(input)?;
    Ok(match args.encoding {
        Some(ref label) => source.with_declared_encoding(label.clone()),
        None => source,
    })
}

fn convert(input: &Path, args: &TextArgs, collect_stats: bool) -> unhtml::Result<Document> {
    let options = ConvertOptions::new()
        .with_text_options(text_options(args)?)
        .with_stats(collect_stats);
    let source = load_source(input, args)?;
    process(&HtmlConverter::new(), &source, &options)
}

fn cmd_text(input: &Path, output: Option<&Path>, args: &TextArgs) -> CliResult {
    let doc = convert(input, args, false)?;

    if let Some(path) = output {
        fs::write(path, &doc.content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&doc.content)?;
        stdout.flush()?;
    }

    Ok(())
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, args: &TextArgs) -> CliResult {
    let doc = convert(input, args, true)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = unhtml::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, args: &TextArgs) -> CliResult {
    let doc = convert(input, args, true)?;
    let format = unhtml::detect_format_from_path(input)
        .map(|f| f.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "URL".bold(), doc.url);
    println!("{}: {}", "Format".bold(), format);
    println!(
        "{}: {}{}",
        "Encoding".bold(),
        doc.encoding.as_deref().unwrap_or("none"),
        if doc.confident { "" } else { " (guessed)" }
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Tables".bold(), doc.stats.table_count);
    println!("{}: {}", "Inline elements".bold(), doc.stats.inline_count);
    println!("{}: {}", "Text blocks".bold(), doc.stats.block_count);
    println!("{}: {}", "Words".bold(), doc.stats.word_count);
    println!("{}: {}", "Characters".bold(), doc.stats.char_count);
    println!("{}: {}", "Output bytes".bold(), doc.content_len());

    Ok(())
}

fn cmd_links(
    input: &Path,
    base: Option<&str>,
    all: bool,
    json: bool,
    args: &TextArgs,
) -> CliResult {
    let source = load_source(input, args)?;
    let tree = HtmlParser::from_source(&source).parse();
    let base = base.unwrap_or(&source.url);

    let links: Vec<_> = discover_links(&tree, base)?
        .into_iter()
        .filter(|link| all || link.kind.is_followed())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }

    for link in &links {
        let kind = match link.kind {
            LinkKind::Webpage => link.kind.name().green(),
            LinkKind::Image | LinkKind::File => link.kind.name().cyan(),
            LinkKind::Unsupported => link.kind.name().dimmed(),
        };
        println!("{:<12} {}", kind, link.url);
    }
    println!("\n{} {} links", "Found".green().bold(), links.len());

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    key_prefix: Option<&str>,
    args: &TextArgs,
) -> CliResult {
    fs::create_dir_all(output_dir)?;

    let options = ConvertOptions::new()
        .with_text_options(text_options(args)?)
        .with_format(OutputFormat::Text);

    let pb = ProgressBar::new(inputs.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading files...");
    let mut sources = Vec::with_capacity(inputs.len());
    let mut failed = 0usize;
    for input in inputs {
        match load_source(input, args) {
            Ok(source) => sources.push((input, source)),
            Err(e) => {
                pb.println(format!("{} {}: {}", "Skipped".yellow(), input.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.set_message("Converting...");
    let registry = ConverterRegistry::with_defaults();
    let batch: Vec<Source> = sources.iter().map(|(_, s)| s.clone()).collect();
    let results = process_batch(&registry, &batch, &options);

    let mut written = 0usize;
    for ((input, source), result) in sources.iter().zip(results) {
        match result {
            Ok(converted) => {
                let name = match key_prefix {
                    Some(prefix) => object_key(prefix, &source.url),
                    None => format!(
                        "{}.txt",
                        input.file_stem().unwrap_or_default().to_string_lossy()
                    ),
                };
                fs::write(output_dir.join(name), &converted.content)?;
                written += 1;
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} written, {} failed",
        "Batch complete:".green().bold(),
        written,
        failed
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unhtml".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Visible-text extraction tool for crawled HTML");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unhtml".dimmed());
    println!("License: MIT");
}
