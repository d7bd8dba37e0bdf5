use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use doc_excerpt::{Config, DocIndex, ExampleRenderer, Result};

#[derive(Parser)]
#[command(name = "doc-excerpt")]
#[command(about = "Extract doc comments and runnable examples from a Rust source directory")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Whole doc comment of a function
    doc-excerpt doc build

    # First two sentences of a method's doc
    doc-excerpt doc "DocIndex.lookup_doc[0:2]"

    # Example body as a fenced block
    doc-excerpt example ExampleLookup --annotated

    # Self-contained program for an example
    doc-excerpt play ExampleLookup

    # Every key in the index
    doc-excerpt list --format json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the sources to index
    #[arg(long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file (defaults to <dir>/doc-excerpt.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the doc text of a symbol, optionally sliced: `Name` or `Name[0:2,4]`
    Doc {
        expr: String,
    },

    /// Print the code of an example
    Example {
        /// Example key, e.g. ExampleFoo
        name: String,

        /// Keep the output comment and wrap the code in a fenced block
        #[arg(long)]
        annotated: bool,
    },

    /// Print the recorded output of an example
    Output {
        name: String,
    },

    /// Print an example as a self-contained program
    Play {
        name: String,
    },

    /// List doc and example keys
    List {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn load(dir: &Path, config: Option<&Path>) -> Result<(Config, DocIndex)> {
    let config = match config {
        Some(path) => Config::from_file(path)?,
        None => Config::discover(dir)?,
    };
    let index = DocIndex::build(dir, &config.index)?;
    Ok((config, index))
}

pub fn print_doc(dir: &Path, config: Option<&Path>, expr: &str) -> Result<()> {
    let (_, index) = load(dir, config)?;
    println!("{}", index.doc(expr)?);
    Ok(())
}

pub fn print_example(dir: &Path, config: Option<&Path>, name: &str, annotated: bool) -> Result<()> {
    let (config, index) = load(dir, config)?;
    let renderer = ExampleRenderer::new(&index, config.render);
    println!("{}", renderer.code(name, annotated)?);
    Ok(())
}

pub fn print_output(dir: &Path, config: Option<&Path>, name: &str) -> Result<()> {
    let (config, index) = load(dir, config)?;
    let renderer = ExampleRenderer::new(&index, config.render);
    let handle = renderer.example(name)?;
    if handle.unordered() {
        tracing::info!("{} records unordered output", handle.key());
    }
    println!("{}", handle.output());
    Ok(())
}

pub fn print_playground(dir: &Path, config: Option<&Path>, name: &str) -> Result<()> {
    let (config, index) = load(dir, config)?;
    let renderer = ExampleRenderer::new(&index, config.render);
    print!("{}", renderer.playground(name)?);
    Ok(())
}

#[derive(Serialize)]
struct Listing<'a> {
    name: &'a str,
    docs: Vec<&'a str>,
    examples: Vec<&'a str>,
}

pub fn list_keys(dir: &Path, config: Option<&Path>, format: &str) -> Result<()> {
    let (_, index) = load(dir, config)?;
    let listing = Listing {
        name: index.name(),
        docs: index.doc_keys(),
        examples: index.example_keys(),
    };

    if format == "json" {
        let output = serde_json::to_string_pretty(&listing).unwrap_or_default();
        println!("{}", output);
        return Ok(());
    }

    println!("{} ({})", listing.name, index.dir().display());
    if listing.docs.is_empty() && listing.examples.is_empty() {
        println!("No documented symbols found");
        return Ok(());
    }
    println!("\nDocs ({}):", listing.docs.len());
    for key in &listing.docs {
        println!("  {}", key);
    }
    println!("\nExamples ({}):", listing.examples.len());
    for key in &listing.examples {
        println!("  {}", key);
    }
    Ok(())
}
