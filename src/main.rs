//! CLI tool to parse, build, and reformat nginx configuration files.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Parser as ClapParser, Subcommand};
use serde::Serialize;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use nginx_conf_rs::ext::lua::LuaBlocks;
use nginx_conf_rs::{BuildOptions, Builder, Extensions, Formatter, ParseOptions, Parser, Response};

#[derive(ClapParser, Debug)]
#[command(name = "nginx-conf")]
#[command(version)]
#[command(about = "Convert nginx configuration files to JSON and back")]
struct Cli {
    /// Enable verbose logging (to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a config file and print its JSON representation
    Parse {
        file: String,
        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Pretty-print the JSON with this many spaces
        #[arg(short, long)]
        indent: Option<usize>,
        /// Directives to exclude from validation (comma separated)
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
        /// Stop parsing a file after its first error
        #[arg(long)]
        no_catch: bool,
        /// Attach error details to the top-level errors
        #[arg(long)]
        tb_onerror: bool,
        /// Splice included files into one config
        #[arg(long)]
        combine: bool,
        /// Do not follow include directives
        #[arg(long)]
        single_file: bool,
        /// Keep comments in the output
        #[arg(long)]
        include_comments: bool,
        /// Reject unknown directives
        #[arg(long)]
        strict: bool,
    },
    /// Build config text from a JSON payload, one section per file
    Build {
        payload: PathBuf,
        /// Spaces per indentation level
        #[arg(short, long, default_value_t = 4, conflicts_with = "tabs")]
        indent: usize,
        /// Indent with tabs
        #[arg(short, long)]
        tabs: bool,
        /// Do not prepend the generated-file banner
        #[arg(long)]
        no_headers: bool,
    },
    /// Print the tokens of a config file as JSON
    Lex {
        file: String,
        /// Include line numbers
        #[arg(short = 'n', long)]
        line_numbers: bool,
    },
    /// Strip comments and whitespace from a config file
    Minify { file: String },
    /// Reformat a config file
    Format {
        file: String,
        #[arg(short, long, default_value_t = 4, conflicts_with = "tabs")]
        indent: usize,
        #[arg(short, long)]
        tabs: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let extensions = Extensions::new().with(LuaBlocks);

    match cli.command {
        Command::Parse {
            file,
            out,
            indent,
            ignore,
            no_catch,
            tb_onerror,
            combine,
            single_file,
            include_comments,
            strict,
        } => {
            let options = ParseOptions::new()
                .catch_errors(!no_catch)
                .ignore(ignore)
                .capture_detail(tb_onerror)
                .combine(combine)
                .single(single_file)
                .comments(include_comments)
                .strict(strict);
            let response = Parser::new(options).extensions(&extensions).parse(&file);
            debug!(files = response.config.len(), errors = response.errors.len(), "parsed");

            let json = to_json(&response, indent)?;
            match out {
                Some(path) => fs::write(&path, json + "\n")
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(if response.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Build {
            payload,
            indent,
            tabs,
            no_headers,
        } => {
            let text = fs::read_to_string(&payload)
                .with_context(|| format!("reading {}", payload.display()))?;
            let response: Response = serde_json::from_str(&text)
                .with_context(|| format!("decoding {}", payload.display()))?;
            let options = BuildOptions::new()
                .indent(indent)
                .tabs(tabs)
                .header(!no_headers);
            let builder = Builder::new(options).extensions(&extensions);

            let mut stdout = std::io::stdout().lock();
            for file in &response.config {
                writeln!(stdout, "# {}", file.path)?;
                write!(stdout, "{}", builder.build(&file.parsed))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Lex { file, line_numbers } => {
            let tokens = Formatter::new(BuildOptions::default())
                .extensions(&extensions)
                .lex(&file)?;
            let json = if line_numbers {
                let pairs: Vec<_> = tokens.iter().map(|t| (&t.text, t.line)).collect();
                serde_json::to_string(&pairs)?
            } else {
                let texts: Vec<_> = tokens.iter().map(|t| &t.text).collect();
                serde_json::to_string(&texts)?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Minify { file } => {
            let formatter = Formatter::new(BuildOptions::default()).extensions(&extensions);
            print!("{}", formatter.minify(&file)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Format { file, indent, tabs } => {
            let options = BuildOptions::new().indent(indent).tabs(tabs);
            print!("{}", Formatter::new(options).extensions(&extensions).format(&file)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn to_json(value: &impl Serialize, indent: Option<usize>) -> Result<String> {
    let Some(width) = indent else {
        return Ok(serde_json::to_string(value)?);
    };
    let pad = " ".repeat(width);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}
