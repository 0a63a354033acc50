//! prisma-template CLI
//!
//! Usage:
//!   prisma-template [OPTIONS] [TEMPLATES]...
//!
//! Options:
//!   -p, --palette <FILE>  Palette file (pywal colors.json, flat JSON or TOML)
//!   -o, --output <PATH>   Write here instead of the template's @target
//!   -c, --config <FILE>   Batch config used when no templates are given
//!   --strict              Reject malformed directives
//!   --check               Parse only and list operations
//!   --dry-run             Print rendered targets instead of writing them
//!   --json                Print the batch report as JSON
//!   --syntax              Show the template language reference
//!   -v, --verbose         Increase log verbosity
//!   -h, --help            Print help

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prisma_template::error::format_all;
use prisma_template::pipeline::{self, TemplateJob};
use prisma_template::{
    apply_template_with, parse_strict, ApplyOptions, Palette, ParseMode, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "prisma-template")]
#[command(about = "Apply a color palette to config files through directive templates")]
struct Cli {
    /// Template files to apply (runs the configured batch if none are given)
    templates: Vec<PathBuf>,

    /// Palette file (defaults to pywal's ~/.cache/wal/colors.json)
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Output path overriding the template's @target (single template only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Batch configuration file (TOML)
    #[arg(short, long, conflicts_with = "templates")]
    config: Option<PathBuf>,

    /// Reject malformed directives instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Parse templates and list their operations without applying them
    #[arg(long, conflicts_with_all = ["dry_run", "json", "output", "palette"])]
    check: bool,

    /// Print rendered targets instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Print the batch report as JSON
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,

    /// Show the template language reference
    #[arg(long)]
    syntax: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    if cli.syntax {
        print_syntax();
        return;
    }

    init_logging(cli.verbose);

    if cli.check {
        if cli.templates.is_empty() {
            eprintln!("Error: --check needs at least one template file");
            std::process::exit(2);
        }
        let ok = cli.templates.iter().all(|path| check_template(path));
        std::process::exit(if ok { 0 } else { 1 });
    }

    if cli.output.is_some() && cli.templates.len() != 1 {
        eprintln!("Error: --output can only be used with exactly one template");
        std::process::exit(2);
    }

    // Resolve the batch before the palette so a bare invocation can show help
    let config = if cli.templates.is_empty() {
        match load_config(cli.config.as_deref()) {
            Some(config) => Some(config),
            None => {
                if io::stdin().is_terminal() {
                    print_intro();
                }
                return;
            }
        }
    } else {
        None
    };

    let palette = load_palette(cli.palette.as_deref());

    let mode = if cli.strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    let options = ApplyOptions::new()
        .with_parse_mode(mode)
        .with_dry_run(cli.dry_run);

    let jobs: Vec<TemplateJob> = cli
        .templates
        .iter()
        .map(|path| TemplateJob::new(path).with_output(cli.output.clone()))
        .collect();

    if cli.dry_run {
        let (jobs, options) = match &config {
            Some(config) => (
                pipeline::jobs_from_config(config),
                config.apply_options(&options),
            ),
            None => (jobs, options),
        };
        let ok = jobs.iter().all(|job| dry_run(job, &palette, &options));
        std::process::exit(if ok { 0 } else { 1 });
    }

    let report = match &config {
        Some(config) => pipeline::run(config, &palette, &options),
        None => pipeline::run_jobs(jobs, &palette, &options),
    };
    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", report);
    }

    if !report.is_success() {
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Explicit config path, else the default one if it exists
fn load_config(explicit: Option<&Path>) -> Option<PipelineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PipelineConfig::default_path()?;
            if !default.is_file() {
                return None;
            }
            default
        }
    };
    match PipelineConfig::from_file(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn load_palette(explicit: Option<&Path>) -> Palette {
    let path = match explicit.map(Path::to_path_buf).or_else(Palette::default_path) {
        Some(path) => path,
        None => {
            eprintln!("Error: no palette given and no home directory to find pywal's cache");
            std::process::exit(1);
        }
    };
    match Palette::from_file(&path) {
        Ok(palette) => palette,
        Err(e) => {
            eprintln!("Error loading palette '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Parse strictly and list operations; returns false on any problem
fn check_template(path: &Path) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading template '{}': {}", path.display(), e);
            return false;
        }
    };
    let filename = path.display().to_string();
    match parse_strict(&source) {
        Ok(template) => {
            let target = template.target_path.as_deref().unwrap_or("<no target>");
            println!("{} -> {}", filename, target);
            for op in &template.operations {
                let line = source[..op.span.start].matches('\n').count() + 1;
                let content_lines = op.node.content().split('\n').count();
                println!("  {:>4}: {} ({} content lines)", line, op.node, content_lines);
            }
            true
        }
        Err(errors) => {
            eprint!("{}", format_all(&errors, &source, &filename));
            false
        }
    }
}

fn dry_run(job: &TemplateJob, palette: &Palette, options: &ApplyOptions) -> bool {
    let options = options.clone().with_output(job.output.clone());
    match apply_template_with(&job.path, palette, &options) {
        Ok(applied) => {
            println!("==> {} ({})", applied.target.display(), job.name);
            println!("{}", applied.document.to_text());
            true
        }
        Err(e) => {
            eprintln!("Error in {}: {}", job.name, e);
            false
        }
    }
}

fn print_intro() {
    println!(
        r#"prisma-template - apply a color palette to config files

USAGE:
    prisma-template [OPTIONS] [TEMPLATES]...
    prisma-template --config ~/.config/prisma/config.toml

OPTIONS:
    -p, --palette   Palette file (default: ~/.cache/wal/colors.json)
    -o, --output    Override the template's @target
    -c, --config    Batch config (TOML) used when no templates are given
    --strict        Reject malformed directives
    --check         Parse only and list operations
    --dry-run       Print rendered targets instead of writing them
    --syntax        Show the template language reference

QUICK START:
    printf '@target app.conf\n@append\nbg={{background}}\n' > app.prisma
    prisma-template app.prisma

Run --syntax for the directive reference."#
    );
}

fn print_syntax() {
    println!(
        r#"PRISMA TEMPLATE SYNTAX
======================

DIRECTIVES
----------
@target <path>      File to edit (last one wins; ~, HOME, $VAR, ${{VAR}}
                    and %VAR% expanded)
@line <N>           Replace line N with the block (padding with empty lines)
@lines <S>-<E>      Replace lines S..E (inclusive) with the block
@match "<regex>"    Replace every line containing a match with the block
@append             Add the block at the end
@prepend            Add the block at the start

@match patterns use Python-style regex syntax, including lookaround and
backreferences, and match anywhere in a line. Text after <S>-<E> in @lines
is ignored (reported with --strict). Line numbers above 1048576 are rejected.

Directives must start at column 0 and are case-insensitive. Every directive
except @target takes the lines below it, up to the next '@' line, as its
block. Trailing empty lines of a block are dropped.

Outside a block, empty lines and lines starting with '#' are comments.
Operations run top to bottom, each against the already edited file.

COLOR TOKENS
------------
{{name}}        hex value, e.g. {{background}} -> #1a1b26
{{name.r}}      red 0-255        {{name.h}}  hue 0-360
{{name.g}}      green 0-255      {{name.l}}  lightness with %
{{name.b}}      blue 0-255       {{name.s}}  saturation with %

Tokens naming colors missing from the palette are left untouched.

EXAMPLE
-------
@target ~/.config/app/app.conf
# colors for app
@line 1
background={{background}}
@match "^cursor"
cursor=rgb({{cursor.r}}, {{cursor.g}}, {{cursor.b}})
@append
color0={{color0}}"#
    );
}
