//! Minimal CLI: template | check
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use toml_binder::Binder;
use toml_binder::example::ServiceConfig;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// bind TOML files to the example service configuration, or print its template
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print a documented configuration template
    Template(TemplateOut),
    /// bind each input file and report the outcome
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct TemplateOut {
    /// pre-fill the template from this configuration file
    #[arg(long)]
    from: Option<PathBuf>,

    /// only print populated, non-default values
    #[arg(long, default_value_t = false)]
    plain: bool,

    /// output .toml file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CheckOut {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// print each bound configuration as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns whether every step succeeded.
    pub fn run(&self) -> anyhow::Result<bool> {
        match &self.cmd {
            Command::Template(target) => {
                let binder = match target.from.as_ref() {
                    Some(path) => {
                        let config = Binder::<ServiceConfig>::new()?
                            .parse_file(path)
                            .with_context(|| format!("failed to load {}", path.display()))?;
                        Binder::from_instance(&config)?
                    }
                    None => Binder::<ServiceConfig>::new()?,
                };
                let lines = if target.plain {
                    binder.format_toml()
                } else {
                    binder.format_toml_template()
                };
                let mut text = lines.to_text()?;
                text.push('\n');
                match target.out.as_ref() {
                    Some(out) => write_output(out, &text)?,
                    None => print!("{text}"),
                }
                Ok(true)
            }
            Command::Check(target) => {
                let binder = Binder::<ServiceConfig>::new()?;
                let source_paths = resolve_file_path_patterns(&target.input)?;
                let mut all_ok = true;
                for source_path in source_paths {
                    let shown = source_path.display();
                    let outcome = toml_binder::document::parse_file(&source_path)
                        .and_then(|document| binder.bind_record(&document));
                    match outcome {
                        Ok(record) => {
                            println!("{} {shown}", "ok".green().bold());
                            if target.json {
                                let value = toml_binder::Value::Record(record);
                                println!("{}", serde_json::to_string_pretty(&value)?);
                            }
                        }
                        Err(error) => {
                            all_ok = false;
                            println!("{} {shown}: {error}", "error".red().bold());
                        }
                    }
                }
                Ok(all_ok)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        let entries =
            glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
        for entry in entries {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
