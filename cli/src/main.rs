//! sopdown CLI - procedure PDF to Markdown converter

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use sopdown::{
    sniff_path, Engine, Input, JsonFormat, LayoutConfig, ParseOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "sopdown")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert procedure-style PDFs to normalized Markdown", long_about = None)]
struct Cli {
    /// Input PDF file (converted to Markdown on stdout)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// JSON file overriding layout heuristics
    #[arg(long, global = true, value_name = "FILE", env = "SOPDOWN_CONFIG")]
    config: Option<PathBuf>,

    /// Abort when any page fails to extract
    #[arg(long, global = true)]
    strict: bool,

    /// Include YAML frontmatter with the header metadata
    #[arg(short, long, global = true)]
    frontmatter: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fallback title (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Convert PDF to JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fallback title (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the title and header metadata
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert several PDFs into a directory of Markdown files
    Batch {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = build_engine(&cli.engine).and_then(|engine| match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            name,
        }) => cmd_markdown(&engine, &input, output.as_deref(), name.as_deref()),
        Some(Commands::Json {
            input,
            output,
            name,
            compact,
        }) => cmd_json(&engine, &input, output.as_deref(), name.as_deref(), compact),
        Some(Commands::Info { input, json }) => cmd_info(&engine, &input, json),
        Some(Commands::Batch { inputs, output }) => cmd_batch(&engine, &inputs, &output),
        None => {
            if let Some(input) = cli.input {
                cmd_markdown(&engine, &input, None, None)
            } else {
                println!("{}", "Usage: sopdown <FILE>".yellow());
                println!("       sopdown --help for more information");
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn build_engine(args: &EngineArgs) -> CliResult<Engine> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading layout configuration from {}", path.display());
            LayoutConfig::from_json_file(path)?
        }
        None => LayoutConfig::default(),
    };

    let mut parse = ParseOptions::new();
    if args.strict {
        parse = parse.strict();
    }

    Ok(Engine::new(config)?
        .with_parse_options(parse)
        .with_render_options(RenderOptions::new().with_frontmatter(args.frontmatter)))
}

/// Explicit name, else the input's file stem.
fn logical_name(input: &Path, name: Option<&str>) -> Option<String> {
    name.map(str::to_string).or_else(|| {
        input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    })
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
    }
    Ok(())
}

fn cmd_markdown(
    engine: &Engine,
    input: &Path,
    output: Option<&Path>,
    name: Option<&str>,
) -> CliResult<()> {
    let name = logical_name(input, name);
    let markdown = engine.convert(Input::from(input), name.as_deref())?;
    write_output(output, &markdown)
}

fn cmd_json(
    engine: &Engine,
    input: &Path,
    output: Option<&Path>,
    name: Option<&str>,
    compact: bool,
) -> CliResult<()> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let name = logical_name(input, name);
    let mut json = engine.convert_json(Input::from(input), name.as_deref(), format)?;
    json.push('\n');
    write_output(output, &json)
}

fn cmd_info(engine: &Engine, input: &Path, json: bool) -> CliResult<()> {
    let version = sniff_path(input)?;
    let name = logical_name(input, None);
    let doc = engine.analyze(Input::from(input), name.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), version);
    println!("{}: {}", "Pages".bold(), doc.page_count);
    match doc.title.as_deref() {
        Some(title) => println!("{}: {}", "Title".bold(), title),
        None => println!("{}: {}", "Title".bold(), "(not found)".dimmed()),
    }

    for field in sopdown::HeaderField::ALL {
        if let Some(value) = doc.metadata.get(field) {
            println!("{}: {}", field.label().bold(), value);
        }
    }

    println!();
    println!("{}", "Content".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Headings".bold(), doc.headings().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Blocks".bold(), doc.blocks.len());

    Ok(())
}

fn cmd_batch(engine: &Engine, inputs: &[PathBuf], output_dir: &Path) -> CliResult<()> {
    fs::create_dir_all(output_dir)?;

    let mut failed = 0usize;
    for (path, result) in engine.convert_batch(inputs) {
        match result {
            Ok(markdown) => {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                let target = output_dir.join(format!("{}.md", stem));
                fs::write(&target, markdown)?;
                println!("{} {}", "Converted".green(), target.display());
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "Failed".red(), path.display(), e);
            }
        }
    }

    println!(
        "\n{} {} converted, {} failed",
        "Done!".green().bold(),
        inputs.len() - failed,
        failed
    );

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}
