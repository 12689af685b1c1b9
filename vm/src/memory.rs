use image::{Cell, MemoryImage, Triple};

use crate::config::MemoryPolicy;
use crate::error::RuntimeError;

/// Machine memory loaded from an image.
///
/// Every access goes through the [`MemoryPolicy`]: under `Grow` an address
/// past the end zero-extends memory first, under `Fault` it is an error.
/// `ip` is only carried along for diagnostics.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<Cell>,
    policy: MemoryPolicy,
    max_cells: usize,
}

impl Memory {
    pub fn new(image: MemoryImage, policy: MemoryPolicy, max_cells: usize) -> Self {
        Self {
            cells: image.into_cells(),
            policy,
            max_cells,
        }
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

    /// Interpret a cell value as an address.
    pub fn address(value: Cell, ip: usize) -> Result<usize, RuntimeError> {
        usize::try_from(value)
            .map_err(|_| RuntimeError::NegativeAddress { address: value, ip })
    }

    fn ensure(&mut self, address: usize, ip: usize) -> Result<(), RuntimeError> {
        if address < self.cells.len() {
            return Ok(());
        }
        match self.policy {
            MemoryPolicy::Fault => {
                Err(RuntimeError::AddressOutOfRange { address, ip })
            }
            MemoryPolicy::Grow if address >= self.max_cells => {
                Err(RuntimeError::MemoryLimit {
                    address,
                    limit: self.max_cells,
                })
            }
            MemoryPolicy::Grow => {
                log::debug!(
                    "[{ip:04x}] growing memory from {} to {} cells",
                    self.cells.len(),
                    address + 1
                );
                self.cells.resize(address + 1, 0);
                Ok(())
            }
        }
    }

    pub fn read(&mut self, address: usize, ip: usize) -> Result<Cell, RuntimeError> {
        self.ensure(address, ip)?;
        Ok(self.cells[address])
    }

    pub fn write(
        &mut self,
        address: usize,
        value: Cell,
        ip: usize,
    ) -> Result<(), RuntimeError> {
        self.ensure(address, ip)?;
        self.cells[address] = value;
        Ok(())
    }

    /// The three cells starting at `ip`.
    pub fn fetch(&mut self, ip: usize) -> Result<Triple, RuntimeError> {
        self.ensure(ip + 2, ip)?;
        Ok(Triple::new(
            self.cells[ip],
            self.cells[ip + 1],
            self.cells[ip + 2],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(cells: &[Cell], policy: MemoryPolicy) -> Memory {
        Memory::new(MemoryImage::from_cells(cells.to_vec()), policy, 64)
    }

    #[test]
    fn grow_zero_extends_on_read_and_write() {
        let mut mem = memory(&[1, 2, 3], MemoryPolicy::Grow);
        assert_eq!(mem.read(5, 0).unwrap(), 0);
        assert_eq!(mem.cells(), &[1, 2, 3, 0, 0, 0]);

        mem.write(8, 7, 0).unwrap();
        assert_eq!(mem.len(), 9);
        assert_eq!(mem.read(8, 0).unwrap(), 7);
    }

    #[test]
    fn grow_stops_at_the_limit() {
        let mut mem = memory(&[0], MemoryPolicy::Grow);
        match mem.write(64, 1, 3) {
            Err(RuntimeError::MemoryLimit { address, limit }) => {
                assert_eq!((address, limit), (64, 64))
            }
            other => panic!("expected MemoryLimit, got {other:?}"),
        }
        assert!(mem.write(63, 1, 3).is_ok());
    }

    #[test]
    fn fault_rejects_out_of_range_access() {
        let mut mem = memory(&[1, 2, 3], MemoryPolicy::Fault);
        assert!(matches!(
            mem.read(3, 6),
            Err(RuntimeError::AddressOutOfRange { address: 3, ip: 6 })
        ));
        assert!(matches!(
            mem.write(10, 1, 6),
            Err(RuntimeError::AddressOutOfRange { address: 10, .. })
        ));
        assert_eq!(mem.len(), 3);
    }

    #[test]
    fn fetch_reads_a_whole_triple() {
        let mut mem = memory(&[3, 3, 6, 0, 0, 0, -1, -1, 0], MemoryPolicy::Fault);
        assert_eq!(mem.fetch(6).unwrap(), Triple::new(-1, -1, 0));
        assert!(mem.fetch(7).is_err());
    }

    #[test]
    fn negative_values_are_not_addresses() {
        assert_eq!(Memory::address(12, 0).unwrap(), 12);
        assert!(matches!(
            Memory::address(-2, 9),
            Err(RuntimeError::NegativeAddress { address: -2, ip: 9 })
        ));
    }
}
