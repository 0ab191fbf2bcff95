use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use msbt_core::{Document, Section, WriteOptions};

#[derive(Parser)]
#[command(name = "msbt", about = "MSBT message file inspector / rewriter")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Header fields and section layout
    Info { file: PathBuf },

    /// Every label with its resolved string
    Labels {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Parse, serialize, reparse and compare
    Verify { file: PathBuf },

    /// Parse and write back out unchanged
    Roundtrip {
        input: PathBuf,
        output: PathBuf,
        /// skip fsync before publishing the output
        #[arg(long, default_value_t = false)]
        no_sync: bool,
    },

    /// Replace one label's string and write the result
    SetText {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        label: String,
        #[arg(long)]
        text: String,
    },
}

fn open(path: &Path) -> Result<Document> {
    Document::open(path).with_context(|| format!("parse {}", path.display()))
}

fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

fn print_info(path: &Path, doc: &Document) {
    let h = doc.header();
    println!("file      : {}", path.display());
    println!("byte order: {} ({:?})", hex::encode(h.byte_order), doc.endian());
    println!("encoding  : {:?} (selector {})", doc.encoding(), doc.encoding().selector());
    println!("version   : {}", h.version);
    println!("file size : {}", h.file_size);
    println!("sections  : {}", h.section_count);
    for s in doc.sections() {
        let hdr = s.header();
        let extra = match s {
            Section::Labels(t) => format!(" groups={} labels={}", t.groups.len(), t.len()),
            Section::Strings(p) => format!(" strings={}", p.len()),
            Section::Opaque(o) => match o.attribute_count {
                Some(n) => format!(" attributes={n}"),
                None => String::new(),
            },
        };
        println!("  {} size={}{}", tag_str(&hdr.tag), hdr.size, extra);
    }
}

fn verify(doc: &Document) -> Result<()> {
    let bytes = doc.to_bytes()?;
    let again = Document::parse(&bytes).context("reparse serialized output")?;
    if doc.header() != again.header() {
        bail!("header differs after round trip");
    }
    if doc.section_order() != again.section_order() {
        bail!("section order differs after round trip");
    }
    let a: Vec<_> = doc.labels().map(|l| (l.name, l.index, l.text)).collect();
    let b: Vec<_> = again.labels().map(|l| (l.name, l.index, l.text)).collect();
    if a != b {
        bail!("labels differ after round trip");
    }
    if doc.string_pool() != again.string_pool() {
        bail!("string pool differs after round trip");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Info { file } => {
            let doc = open(&file)?;
            print_info(&file, &doc);
        }
        Cmd::Labels { file, json } => {
            let doc = open(&file)?;
            if json {
                let labels: Vec<_> = doc.labels().collect();
                println!("{}", serde_json::to_string_pretty(&labels)?);
            } else {
                for l in doc.labels() {
                    println!("{} [#{}] {}", l.name, l.index, l.text);
                }
            }
        }
        Cmd::Verify { file } => {
            let doc = open(&file)?;
            verify(&doc).with_context(|| format!("verify {}", file.display()))?;
            println!("verify: ok ({} labels, {} sections)", doc.labels().count(), doc.sections().len());
        }
        Cmd::Roundtrip { input, output, no_sync } => {
            let doc = open(&input)?;
            let opts = WriteOptions { sync: !no_sync, ..WriteOptions::default() };
            doc.write_with(&output, &opts)
                .with_context(|| format!("write {}", output.display()))?;
            info!(input = %input.display(), output = %output.display(), "roundtrip done");
            println!("wrote {}", output.display());
        }
        Cmd::SetText { input, output, label, text } => {
            let mut doc = open(&input)?;
            doc.set_label_text(&label, &text)?;
            let size = doc.recompute_file_size()?;
            doc.write(&output)
                .with_context(|| format!("write {}", output.display()))?;
            info!(%label, size, "label updated");
            println!("{label} -> {text:?} ({size} bytes)");
        }
    }
    Ok(())
}
