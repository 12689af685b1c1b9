use std::io::{self, Write};

use image::{Cell, Triple};

use crate::io::InputSource;

/// What to do with the triple the machine just fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Execute,
    /// Continue with the next triple without executing this one.
    Skip,
    /// Execute a different triple in place of this one. Memory is not
    /// changed.
    Modify(Triple),
}

/// Control point invoked by [`Machine`](crate::Machine) once per fetched
/// triple, after the instruction pointer has advanced past it.
pub trait Debugger {
    fn before_step(&mut self, ip: usize, triple: Triple) -> io::Result<Command>;

    /// The machine is about to acquire a line of input.
    fn on_input_request(&mut self, _ip: usize) -> io::Result<()> {
        Ok(())
    }

    fn on_halt(&mut self, _ip: usize, _status: Cell) -> io::Result<()> {
        Ok(())
    }
}

/// Executes everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDebugger;

impl Debugger for NoDebugger {
    #[inline]
    fn before_step(&mut self, _ip: usize, _triple: Triple) -> io::Result<Command> {
        Ok(Command::Execute)
    }
}

impl<D: Debugger + ?Sized> Debugger for &mut D {
    fn before_step(&mut self, ip: usize, triple: Triple) -> io::Result<Command> {
        (**self).before_step(ip, triple)
    }

    fn on_input_request(&mut self, ip: usize) -> io::Result<()> {
        (**self).on_input_request(ip)
    }

    fn on_halt(&mut self, ip: usize, status: Cell) -> io::Result<()> {
        (**self).on_halt(ip, status)
    }
}

/// Interactive stepping driven by text commands:
///
/// ```text
/// e, execute          run the triple
/// s, skip             move on without running it
/// m, modify a,b,c     run `a b c` instead
/// ```
///
/// Anything else prints a hint and prompts again. End of input executes
/// the rest of the program without prompting.
pub struct PromptDebugger<I, W> {
    input: I,
    out: W,
    detached: bool,
}

impl<I: InputSource, W: Write> PromptDebugger<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Self {
            input,
            out,
            detached: false,
        }
    }

    pub fn into_parts(self) -> (I, W) {
        (self.input, self.out)
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    match word {
        "e" | "execute" if rest.trim().is_empty() => Some(Command::Execute),
        "s" | "skip" if rest.trim().is_empty() => Some(Command::Skip),
        "m" | "modify" => {
            let values = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|v| !v.is_empty())
                .map(str::parse::<Cell>)
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            match values[..] {
                [a, b, c] => Some(Command::Modify(Triple::new(a, b, c))),
                _ => None,
            }
        }
        _ => None,
    }
}

impl<I: InputSource, W: Write> Debugger for PromptDebugger<I, W> {
    fn before_step(&mut self, ip: usize, triple: Triple) -> io::Result<Command> {
        if self.detached {
            return Ok(Command::Execute);
        }
        // `ip` has already moved past the triple.
        let at = ip.saturating_sub(3);
        writeln!(self.out, "\n[{at:04x}] {triple}")?;
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = self.input.read_line()? else {
                log::debug!("debugger input closed, detaching");
                self.detached = true;
                return Ok(Command::Execute);
            };
            match parse_command(&line) {
                Some(command) => return Ok(command),
                None => writeln!(
                    self.out,
                    "unknown command `{}` (e, s, m a,b,c)",
                    line.trim()
                )?,
            }
        }
    }

    fn on_input_request(&mut self, ip: usize) -> io::Result<()> {
        if !self.detached {
            writeln!(self.out, "[{:04x}] waiting for input", ip.saturating_sub(3))?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn on_halt(&mut self, ip: usize, status: Cell) -> io::Result<()> {
        if !self.detached {
            writeln!(
                self.out,
                "[{:04x}] halted with status {status}",
                ip.saturating_sub(3)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ScriptedInput;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(parse_command("e"), Some(Command::Execute));
        assert_eq!(parse_command(" execute "), Some(Command::Execute));
        assert_eq!(parse_command("s"), Some(Command::Skip));
        assert_eq!(parse_command("skip"), Some(Command::Skip));
        assert_eq!(
            parse_command("m 1,2,3"),
            Some(Command::Modify(Triple::new(1, 2, 3)))
        );
        assert_eq!(
            parse_command("modify -1, -1, 4"),
            Some(Command::Modify(Triple::new(-1, -1, 4)))
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command("e now"), None);
        assert_eq!(parse_command("m 1,2"), None);
        assert_eq!(parse_command("m 1,two,3"), None);
    }

    #[test]
    fn reprompts_until_a_command_is_understood() {
        let input = ScriptedInput::new(["what", "", "s"]);
        let mut dbg = PromptDebugger::new(input, Vec::new());
        let command = dbg.before_step(9, Triple::new(3, 4, 9)).unwrap();
        assert_eq!(command, Command::Skip);

        let (input, out) = dbg.into_parts();
        assert_eq!(input.reads(), 3);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("\n[0006] 3 4 9\n> "));
        assert_eq!(out.matches("unknown command").count(), 2);
    }

    #[test]
    fn end_of_input_detaches() {
        let mut dbg = PromptDebugger::new(ScriptedInput::new(Vec::<String>::new()), Vec::new());
        assert_eq!(dbg.before_step(9, Triple::new(3, 3, 9)).unwrap(), Command::Execute);
        assert_eq!(dbg.before_step(12, Triple::new(3, 3, 12)).unwrap(), Command::Execute);
        let (input, _) = dbg.into_parts();
        assert_eq!(input.reads(), 1);
    }
}
