//! Second pass: lower each statement into cells.

use image::Cell;
use parser::Token;

use crate::config::{IsaConfig, Size};
use crate::emit::Emitter;
use crate::error::AssembleError;
use crate::listing::{Listing, ListingEntry};
use crate::op::Op;
use crate::operand::{literal_cells, resolve_operand};
use crate::resolve::{Resolution, Statement};

/// Instruction cells (preamble included) plus a per-statement listing.
#[derive(Debug, Clone)]
pub struct Generated {
    pub cells: Vec<Cell>,
    pub listing: Listing,
}

pub fn generate(
    resolution: &Resolution,
    config: &IsaConfig,
) -> Result<Generated, AssembleError> {
    let mut emitter = Emitter::new(config);
    let mut listing = Listing::default();

    for statement in &resolution.statements {
        let start = emitter.position();
        assert_eq!(
            start, statement.address,
            "{}: `{}` emitted at {start}, resolved to {}",
            statement.location, statement.op, statement.address
        );

        lower(&mut emitter, statement, resolution, config)?;

        let emitted = emitter.position() - start;
        if let Size::Fixed(size) = config.spec(statement.op).size {
            assert_eq!(
                emitted, size,
                "{}: `{}` emitted {emitted} cells, expected {size}",
                statement.location, statement.op
            );
        }

        listing.push(ListingEntry {
            address: start,
            labels: statement.labels.clone(),
            op: statement.op,
            operands: statement.operands.iter().map(Token::to_string).collect(),
            cells: emitter.cells()[start..].to_vec(),
        });
    }

    assert_eq!(
        emitter.position(),
        resolution.code_end,
        "generated code length disagrees with resolved layout"
    );
    log::debug!("generated {} cells of code", emitter.position());

    Ok(Generated {
        cells: emitter.into_cells(),
        listing,
    })
}

fn operand(
    statement: &Statement,
    index: usize,
    resolution: &Resolution,
) -> Result<Cell, AssembleError> {
    let token = statement.operands.get(index).ok_or_else(|| {
        AssembleError::MissingOperand {
            op: statement.op,
            expected: index + 1,
            at: statement.location.clone(),
        }
    })?;
    resolve_operand(token, resolution)
}

fn lower(
    e: &mut Emitter,
    statement: &Statement,
    resolution: &Resolution,
    config: &IsaConfig,
) -> Result<(), AssembleError> {
    let arg = |index| operand(statement, index, resolution);

    match statement.op {
        Op::Noop => e.noop(),
        Op::Subleq => {
            let (a, b, c) = (arg(0)?, arg(1)?, arg(2)?);
            e.triple(a, b, c);
        }
        Op::Add => {
            let (a, b) = (arg(0)?, arg(1)?);
            e.add(a, b);
        }
        Op::Sub => {
            let (a, b) = (arg(0)?, arg(1)?);
            e.sub(a, b);
        }
        Op::Zer => {
            let a = arg(0)?;
            e.zero(a);
        }
        Op::Mov => {
            let (src, dest) = (arg(0)?, arg(1)?);
            e.mov(src, dest);
        }
        Op::Jmp => {
            let target = arg(0)?;
            e.jump(target);
        }
        Op::Beq => {
            let (value, target) = (arg(0)?, arg(1)?);
            e.branch_if_zero(value, target);
        }
        Op::Cmp => {
            let (a, b, target) = (arg(0)?, arg(1)?, arg(2)?);
            e.compare_equal(a, b, target);
        }
        Op::In => {
            let dest = arg(0)?;
            e.input(dest);
        }
        Op::Out => {
            let src = arg(0)?;
            e.output(src);
        }
        Op::Int => {
            let value = arg(0)?;
            e.word(value);
        }
        Op::Bytes => {
            if let Some(text) = statement.operands.first() {
                e.words(&literal_cells(text));
            }
        }
        Op::Halt => e.halt(config.halt_status),
        Op::Exit => {
            let status = arg(0)?;
            e.halt(status);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use parser::{MemoryLoader, Preprocessor};

    use super::*;
    use crate::resolve::resolve;

    fn generate_str(source: &str) -> Result<(Resolution, Generated), AssembleError> {
        let tokens = Preprocessor::new(MemoryLoader::new())
            .preprocess_str("test.sq", source)
            .unwrap()
            .tokens;
        let config = IsaConfig::default();
        let resolution = resolve(&tokens, &config)?;
        let generated = generate(&resolution, &config)?;
        Ok((resolution, generated))
    }

    #[test]
    fn every_fixed_op_emits_its_declared_size() {
        let config = IsaConfig::default();
        let sources = [
            (Op::Noop, "noop"),
            (Op::Subleq, "subleq 1 2 3"),
            (Op::Add, "add 1 2"),
            (Op::Sub, "sub 1 2"),
            (Op::Zer, "zer 1"),
            (Op::Mov, "mov 1 2"),
            (Op::Jmp, "jmp 1"),
            (Op::Beq, "beq 1 2"),
            (Op::Cmp, "cmp 1 2 3"),
            (Op::In, "in 1"),
            (Op::Out, "out 1"),
            (Op::Int, "int 1"),
            (Op::Halt, "halt"),
            (Op::Exit, "exit 1"),
        ];
        for (op, source) in sources {
            let (_, generated) = generate_str(source).unwrap();
            let Size::Fixed(size) = config.spec(op).size else {
                panic!("{op} should have a fixed size");
            };
            assert_eq!(
                generated.cells.len() - config.preamble_len(),
                size,
                "{op}"
            );
        }
    }

    #[test]
    fn labels_point_at_first_cell_of_following_statement() {
        let source = "\
            start: mov a sum\n\
            add b sum\n\
            check: cmp a b done\n\
            msg: bytes \"ok\"\n\
            out sum\n\
            done: halt\n\
            a: int 2\n\
            b: int 3\n\
            sum: int 0";
        let (res, generated) = generate_str(source).unwrap();
        for entry in generated.listing.entries() {
            for label in &entry.labels {
                assert_eq!(res.labels[label.as_str()], entry.address, "{label}");
            }
        }
        assert_eq!(generated.cells[res.labels["a"]], 2);
        assert_eq!(generated.cells[res.labels["b"]], 3);
        let msg = res.labels["msg"];
        assert_eq!(&generated.cells[msg..msg + 2], &[111, 107]);
    }

    #[test]
    fn operands_resolve_before_lowering() {
        let (res, generated) =
            generate_str("jmp end\nint [9]\nend: exit 4").unwrap();
        let end = res.labels["end"];
        assert_eq!(&generated.cells[6..9], &[3, 3, end as Cell]);
        assert_eq!(generated.cells[9], res.code_end as Cell);
        assert_eq!(&generated.cells[end..end + 3], &[-1, -1, 4]);
    }

    #[test]
    fn unresolvable_operand_fails_generation() {
        assert!(matches!(
            generate_str("jmp nowhere"),
            Err(AssembleError::UnknownSymbol { .. })
        ));
    }
}
