//! # SUBLEQ machine
//!
//! Executes a [`MemoryImage`] one `subleq a b c` triple at a time:
//!
//! - `-1 -1 c` halts with status `c`.
//! - `-1 b c` stores the next input character code at `b`.
//! - `a -1 c` writes the value at `a` to the output.
//! - otherwise `mem[b] -= mem[a]`, jumping to `c` when the result is `<= 0`.
//!
//! Execution starts at address 0. Images produced by the assembler begin
//! with a preamble that jumps through cell 2 to the entry point.
//!
//! Constants live in the same memory as code, so a jump into the constant
//! pool runs its values as triples:
//!
//! ```rust
//! use vm::{Devices, Machine, MachineConfig, ScriptedInput};
//!
//! let assembly = assembler::assemble_str("pool.sq", "jmp [-1]\nint [-01]\nint [7]").unwrap();
//! let devices = Devices::new(ScriptedInput::default(), Vec::new());
//! let mut machine = Machine::new(assembly.image, MachineConfig::default(), devices);
//! assert_eq!(machine.run().unwrap(), 7);
//! ```

mod config;
mod debugger;
mod error;
mod io;
mod machine;
mod memory;

pub use config::{MachineConfig, MemoryPolicy, OutputMode};
pub use debugger::{Command, Debugger, NoDebugger, PromptDebugger};
pub use error::RuntimeError;
pub use image::{Cell, MemoryImage, Triple};
pub use io::{InputSource, LineReader, ScriptedInput, StdinSource};
pub use machine::{Devices, Machine, Step};
pub use memory::Memory;
