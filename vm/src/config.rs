/// How `a -1 c` writes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Decimal followed by a newline.
    #[default]
    Integer,
    /// The character with that code, no separator.
    Ascii,
}

/// What happens when an address lies past the end of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryPolicy {
    /// Zero-extend memory up to the address, the same way the assembler
    /// grows the image for constants.
    #[default]
    Grow,
    /// Fail with [`RuntimeError::AddressOutOfRange`](crate::RuntimeError).
    Fault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Queue a `0` after every line of input.
    pub null_terminate_input: bool,
    pub output: OutputMode,
    /// Written to the output each time a line of input is acquired.
    pub input_prompt: Option<String>,
    pub memory: MemoryPolicy,
    /// Upper bound on memory size under [`MemoryPolicy::Grow`].
    pub max_cells: usize,
    /// Stop with [`RuntimeError::StepLimit`](crate::RuntimeError) after this
    /// many fetched triples.
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            null_terminate_input: false,
            output: OutputMode::Integer,
            input_prompt: None,
            memory: MemoryPolicy::Grow,
            max_cells: 1 << 24,
            max_steps: None,
        }
    }
}
