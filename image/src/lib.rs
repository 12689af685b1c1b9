//! # Image
//!
//! The memory image shared by the assembler and the machine.
//!
//! ```text
//!  assembler ──▶ MemoryImage ──▶ encode ──▶ bytes on disk
//!                                               │
//!  machine   ◀── MemoryImage ◀── decode ◀───────┘
//! ```
//!
//! An image is a flat sequence of signed [`Cell`]s where the index of a cell
//! is its address. Every three consecutive cells starting at the instruction
//! pointer form one [`Triple`] of the single `subleq` primitive.

mod cell;
mod codec;

pub use cell::{Cell, SENTINEL, Triple};
pub use codec::{CodecError, DEFAULT_WIDTH, decode, encode, read_image, write_image};

/// A finished memory image.
///
/// The assembler produces it from the generated cells and patches a few
/// cells at the end; the machine takes it over as its initial memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryImage {
    cells: Vec<Cell>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn get(&self, address: usize) -> Option<Cell> {
        self.cells.get(address).copied()
    }

    /// Write `value` at `address`, zero-filling any gap first. The image
    /// never shrinks.
    pub fn store(&mut self, address: usize, value: Cell) {
        if self.cells.len() <= address {
            self.cells.resize(address + 1, 0);
        }
        self.cells[address] = value;
    }

    /// The triple starting at `address`, if all three cells exist.
    pub fn triple_at(&self, address: usize) -> Option<Triple> {
        let end = address.checked_add(3)?;
        match self.cells.get(address..end)? {
            &[a, b, c] => Some(Triple::new(a, b, c)),
            _ => None,
        }
    }
}

impl From<Vec<Cell>> for MemoryImage {
    fn from(cells: Vec<Cell>) -> Self {
        Self::from_cells(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_zero_fills_up_to_address() {
        let mut image = MemoryImage::from_cells(vec![1, 2]);
        image.store(5, 9);
        assert_eq!(image.cells(), &[1, 2, 0, 0, 0, 9]);
    }

    #[test]
    fn store_inside_does_not_grow() {
        let mut image = MemoryImage::from_cells(vec![1, 2, 3]);
        image.store(1, -4);
        assert_eq!(image.cells(), &[1, -4, 3]);
    }

    #[test]
    fn triple_at_requires_three_cells() {
        let image = MemoryImage::from_cells(vec![3, 3, 6, 0]);
        assert_eq!(image.triple_at(0), Some(Triple::new(3, 3, 6)));
        assert_eq!(image.triple_at(1), Some(Triple::new(3, 6, 0)));
        assert_eq!(image.triple_at(2), None);
        assert_eq!(image.triple_at(usize::MAX), None);
    }
}
