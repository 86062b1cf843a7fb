use anyhow::Context;
use clap::Parser;
use log::info;
use sqt::{RuleItem, Sequitur};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

/// Induce a context-free grammar from a byte stream and print its rules.
///
/// Terminals are printed as quoted byte literals; rule references use the
/// reserved `r` prefix, which no quoted terminal can produce.
#[derive(Debug, Parser)]
#[command(
    name = "sqt",
    version,
    about = "Online Sequitur grammar induction over a byte stream"
)]
struct Args {
    /// Input file, ingested one byte at a time
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print grammar size statistics after the rule set
    #[arg(long)]
    stats: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;

    let mut seq = Sequitur::new();
    for byte in BufReader::new(file).bytes() {
        let byte = byte.with_context(|| format!("read error in {}", args.input.display()))?;
        seq.append(byte)?;
        if seq.len() % 100_000 == 0 {
            info!("{} bytes ingested", seq.len());
        }
    }

    for (id, body) in seq.rules() {
        let rendered: Vec<String> = body
            .iter()
            .map(|item| match item {
                RuleItem::Terminal(byte) => format!("'{}'", byte.escape_ascii()),
                RuleItem::Rule(rule) => format!("r{rule}"),
            })
            .collect();
        println!("{id}: {}", rendered.join(" "));
    }

    if args.stats {
        println!(
            "# input: {} bytes, rules: {}, symbols: {}",
            seq.len(),
            seq.rule_count(),
            seq.symbol_count()
        );
    }
    Ok(())
}
