//! Split a range into overlapping blocks.

use anyhow::{Result, bail};
use clap::Parser;
use kmerpack_range::{Range, block_partition};
use log::info;

use crate::commands::command::Command;

/// Splits `[start, end)` into near-equal blocks and prints one line per block.
#[derive(Debug, Parser)]
#[command(
    name = "partition",
    about = "Split a range into near-equal overlapping blocks",
    long_about = r#"
Splits the half-open range [--start, --end) into --parts contiguous blocks whose
sizes differ by at most one. Every block except the last extends by --overlap
positions into its successor, clamped to the end of the range.

Output is tab-separated with columns: index, start, end, overlap, and, when
--page-size is given, the page-aligned start of the block and whether the block
already starts on a page boundary.
"#
)]
pub struct Partition {
    /// First position of the range.
    #[arg(short = 's', long = "start")]
    pub start: i64,

    /// One past the last position of the range.
    #[arg(short = 'e', long = "end")]
    pub end: i64,

    /// Number of blocks.
    #[arg(short = 'p', long = "parts")]
    pub parts: usize,

    /// Positions each block extends into the next.
    #[arg(short = 'o', long = "overlap", default_value_t = 0)]
    pub overlap: i64,

    /// Page size for alignment of block starts.
    #[arg(short = 'z', long = "page-size")]
    pub page_size: Option<i64>,
}

impl Command for Partition {
    fn execute(&self, command_line: &str) -> Result<()> {
        info!("Command line: {command_line}");
        for line in self.render()? {
            println!("{line}");
        }
        Ok(())
    }
}

impl Partition {
    /// Partitions the range and formats one output line per block.
    pub fn render(&self) -> Result<Vec<String>> {
        if self.parts == 0 {
            bail!("--parts must be at least 1");
        }
        let range = Range::new(self.start, self.end)?;
        let blocks = block_partition(&range, self.parts, self.overlap)?;
        info!("Split {range} into {} blocks", blocks.len());

        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| -> Result<String> {
                let mut line =
                    format!("{index}\t{}\t{}\t{}", block.start(), block.end(), block.overlap());
                if let Some(page_size) = self.page_size {
                    let aligned = block.align_to_page(page_size)?;
                    let on_boundary = block.is_page_aligned(page_size)?;
                    line.push_str(&format!("\t{aligned}\t{on_boundary}"));
                }
                Ok(line)
            })
            .collect()
    }
}
