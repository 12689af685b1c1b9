use std::collections::VecDeque;
use std::io::Write;

use image::{Cell, MemoryImage, Triple};

use crate::config::{MachineConfig, OutputMode};
use crate::debugger::{Command, Debugger, NoDebugger};
use crate::error::RuntimeError;
use crate::io::InputSource;
use crate::memory::Memory;

/// Outcome of a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted(Cell),
}

/// Everything the machine talks to besides its memory.
pub struct Devices<I, W, D = NoDebugger> {
    pub input: I,
    pub output: W,
    pub debugger: D,
}

impl<I, W> Devices<I, W> {
    pub fn new(input: I, output: W) -> Self {
        Self {
            input,
            output,
            debugger: NoDebugger,
        }
    }
}

impl<I, W, D> Devices<I, W, D> {
    pub fn with_debugger<E>(self, debugger: E) -> Devices<I, W, E> {
        Devices {
            input: self.input,
            output: self.output,
            debugger,
        }
    }
}

pub struct Machine<I, W, D = NoDebugger> {
    memory: Memory,
    ip: usize,
    /// Character codes of the last acquired line not yet consumed.
    pending: VecDeque<Cell>,
    config: MachineConfig,
    steps: u64,
    status: Option<Cell>,
    devices: Devices<I, W, D>,
}

impl<I, W, D> Machine<I, W, D>
where
    I: InputSource,
    W: Write,
    D: Debugger,
{
    /// Load `image` and start at address 0.
    pub fn new(
        image: MemoryImage,
        config: MachineConfig,
        devices: Devices<I, W, D>,
    ) -> Self {
        Self {
            memory: Memory::new(image, config.memory, config.max_cells),
            ip: 0,
            pending: VecDeque::new(),
            config,
            steps: 0,
            status: None,
            devices,
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Halt status, once the machine has halted.
    pub fn status(&self) -> Option<Cell> {
        self.status
    }

    /// Number of triples fetched so far, skipped ones included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn pending_input(&self) -> usize {
        self.pending.len()
    }

    pub fn devices(&self) -> &Devices<I, W, D> {
        &self.devices
    }

    pub fn into_devices(self) -> Devices<I, W, D> {
        self.devices
    }

    /// Run until the program halts and return its status.
    pub fn run(&mut self) -> Result<Cell, RuntimeError> {
        loop {
            if let Step::Halted(status) = self.step()? {
                self.devices.output.flush()?;
                log::debug!("halted with status {status} after {} steps", self.steps);
                return Ok(status);
            }
        }
    }

    /// Fetch, advance, consult the debugger, execute.
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        if let Some(status) = self.status {
            return Ok(Step::Halted(status));
        }
        if let Some(limit) =
            self.config.max_steps.filter(|&limit| self.steps >= limit)
        {
            return Err(RuntimeError::StepLimit { steps: limit });
        }

        let at = self.ip;
        let fetched = self.memory.fetch(at)?;
        self.ip = at + 3;
        self.steps += 1;

        let triple = match self.devices.debugger.before_step(self.ip, fetched)? {
            Command::Execute => fetched,
            Command::Skip => {
                log::trace!("[{at:04x}] {fetched} skipped");
                return Ok(Step::Continue);
            }
            Command::Modify(triple) => triple,
        };
        log::trace!("[{at:04x}] {triple}");

        self.execute(at, triple)
    }

    fn execute(&mut self, at: usize, triple: Triple) -> Result<Step, RuntimeError> {
        let Triple { a, b, c } = triple;

        if triple.is_halt() {
            self.status = Some(c);
            self.devices.debugger.on_halt(self.ip, c)?;
            return Ok(Step::Halted(c));
        }

        if triple.is_input() {
            let dest = Memory::address(b, at)?;
            let value = self.next_input(at)?;
            self.memory.write(dest, value, at)?;
            return Ok(Step::Continue);
        }

        if triple.is_output() {
            let src = Memory::address(a, at)?;
            let value = self.memory.read(src, at)?;
            self.emit(value, at)?;
            return Ok(Step::Continue);
        }

        let (src, dest) = (Memory::address(a, at)?, Memory::address(b, at)?);
        let result = self
            .memory
            .read(dest, at)?
            .wrapping_sub(self.memory.read(src, at)?);
        self.memory.write(dest, result, at)?;
        if result <= 0 {
            self.ip = Memory::address(c, at)?;
        }
        Ok(Step::Continue)
    }

    /// Pop the next queued character, acquiring a line when the queue is
    /// empty. An empty line without null termination queues nothing, so
    /// acquisition repeats.
    fn next_input(&mut self, at: usize) -> Result<Cell, RuntimeError> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Ok(value);
            }

            self.devices.debugger.on_input_request(self.ip)?;
            if let Some(prompt) = &self.config.input_prompt {
                write!(self.devices.output, "{prompt}")?;
            }
            self.devices.output.flush()?;
            let Some(line) = self.devices.input.read_line()? else {
                return Err(RuntimeError::InputExhausted { ip: at });
            };
            log::debug!("[{at:04x}] acquired {} characters", line.chars().count());

            self.pending.extend(line.chars().map(|ch| ch as Cell));
            if self.config.null_terminate_input {
                self.pending.push_back(0);
            }
        }
    }

    fn emit(&mut self, value: Cell, at: usize) -> Result<(), RuntimeError> {
        let out = &mut self.devices.output;
        match self.config.output {
            OutputMode::Integer => writeln!(out, "{value}")?,
            OutputMode::Ascii => {
                let ch = u32::try_from(value)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(RuntimeError::InvalidCharacter { value, ip: at })?;
                write!(out, "{ch}")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}
