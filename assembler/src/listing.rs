use std::fmt;

use image::Cell;

use crate::op::Op;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub address: usize,
    pub labels: Vec<String>,
    pub op: Op,
    pub operands: Vec<String>,
    pub cells: Vec<Cell>,
}

/// Generated cells grouped by source statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: Vec<ListingEntry>,
}

impl Listing {
    pub fn push(&mut self, entry: ListingEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            for label in &entry.labels {
                writeln!(f, "{label}:")?;
            }
            write!(f, "  {:04x}  {}", entry.address, entry.op)?;
            for operand in &entry.operands {
                write!(f, " {operand}")?;
            }
            writeln!(f)?;

            let raw = matches!(entry.op, Op::Int | Op::Bytes);
            let width = if raw { 8 } else { 3 };
            for (i, chunk) in entry.cells.chunks(width).enumerate() {
                let words: Vec<String> =
                    chunk.iter().map(Cell::to_string).collect();
                writeln!(
                    f,
                    "        {:04x}  {}",
                    entry.address + i * width,
                    words.join(" ")
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_labels_statements_and_triples() {
        let mut listing = Listing::default();
        listing.push(ListingEntry {
            address: 6,
            labels: vec!["start".into()],
            op: Op::Add,
            operands: vec!["a".into(), "b".into()],
            cells: vec![20, 3, 9, 3, 21, 12, 3, 3, 15],
        });
        listing.push(ListingEntry {
            address: 15,
            labels: vec![],
            op: Op::Halt,
            operands: vec![],
            cells: vec![-1, -1, 0],
        });

        let expected = "\
start:
  0006  add a b
        0006  20 3 9
        0009  3 21 12
        000c  3 3 15
  000f  halt
        000f  -1 -1 0
";
        assert_eq!(listing.to_string(), expected);
    }
}
