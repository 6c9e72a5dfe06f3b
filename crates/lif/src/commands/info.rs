use clap::Args;
use itertools::Itertools;
use lif_raw::{BinaryBlock, LifFile, MemoryBlock};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input LIF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print the block and memory lists as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    blocks: &'a [BinaryBlock],
    memory: Vec<MemoryReport<'a>>,
}

#[derive(Serialize)]
struct MemoryReport<'a> {
    #[serde(flatten)]
    memory: &'a MemoryBlock,
    element: Option<&'a str>,
    /// Every block carrying the identifier, more than one is ambiguous
    blocks: Vec<usize>,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let lif = LifFile::open(&self.file).context(format!("path: {}", self.file.display()))?;

        let report = Report {
            blocks: lif.blocks(),
            memory: lif
                .memory_blocks()
                .iter()
                .map(|memory| MemoryReport {
                    memory,
                    element: lif
                        .element(memory)
                        .and_then(|e| e.attributes.get("Name"))
                        .map(String::as_str),
                    blocks: lif
                        .identifiers()
                        .positions(|id| id == memory.identifier)
                        .collect(),
                })
                .collect(),
        };

        if self.json {
            let out = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{out}");
        } else {
            print!("{}", render(&report));
        }
        Ok(())
    }
}

fn render(report: &Report<'_>) -> String {
    let blocks = report
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "{:>5}  {:<24} {:>14} {:>14}",
                i,
                b.identifier.cyan(),
                b.offset,
                b.size
            )
        })
        .join("\n");

    let memory = report
        .memory
        .iter()
        .map(|m| {
            let block = match m.blocks.as_slice() {
                [] => "missing".red().to_string(),
                [i] => format!("block {i}").green().to_string(),
                many => format!("ambiguous (blocks {})", many.iter().join(", "))
                    .yellow()
                    .to_string(),
            };
            format!(
                "{:<24} {:<32} {:>14}  {}",
                m.memory.identifier.cyan(),
                m.element.unwrap_or("-"),
                m.memory.size,
                block
            )
        })
        .join("\n");

    format!(
        "{} ({})\n{:>5}  {:<24} {:>14} {:>14}\n{}\n\n{} ({})\n{}\n",
        "Blocks".bold(),
        report.blocks.len(),
        "index",
        "identifier",
        "offset",
        "size",
        blocks,
        "Memory".bold(),
        report.memory.len(),
        memory
    )
}
