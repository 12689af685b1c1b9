//! First pass: statement splitting, label addresses and constant allocation.

use image::Cell;
use indexmap::IndexMap;
use indexmap::map::Entry;
use parser::{Location, Token};

use crate::config::{IsaConfig, Size};
use crate::error::AssembleError;
use crate::op::Op;

/// Label name to absolute address, in declaration order.
pub type SymbolTable = IndexMap<String, usize>;

/// One operation with its operand tokens, in program order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub op: Op,
    pub operands: Vec<Token>,
    /// Address of the first cell this statement emits.
    pub address: usize,
    /// Labels declared directly in front of this statement.
    pub labels: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    pub value: Cell,
    pub address: usize,
}

/// Bracketed constants keyed by their source text (`[10]`, `[0x1F]`,
/// `[loop]`). Iteration follows discovery order, which is also address
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantPool {
    entries: IndexMap<String, Constant>,
}

impl ConstantPool {
    pub fn get(&self, text: &str) -> Option<&Constant> {
        self.entries.get(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constant)> {
        self.entries.iter().map(|(text, c)| (text.as_str(), c))
    }
}

/// Everything the generator needs from the first pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub statements: Vec<Statement>,
    pub labels: SymbolTable,
    pub constants: ConstantPool,
    /// One past the last instruction cell; the constant pool starts here.
    pub code_end: usize,
}

impl Resolution {
    /// One past the last constant cell.
    pub fn end(&self) -> usize {
        self.code_end + self.constants.len()
    }
}

pub fn resolve(
    tokens: &[Token],
    config: &IsaConfig,
) -> Result<Resolution, AssembleError> {
    let mut labels = SymbolTable::new();
    for (name, address) in config.reserved_labels() {
        labels.insert(name.to_string(), address);
    }

    let mut statements = Vec::new();
    let mut pending_labels = Vec::new();
    let mut discovered: IndexMap<String, Location> = IndexMap::new();
    let mut ip = config.preamble_len();
    let mut tokens = tokens.iter();

    while let Some(token) = tokens.next() {
        if let Some(op) = op_token(token) {
            let spec = config.spec(op);
            let mut operands = Vec::with_capacity(spec.arity);
            for _ in 0..spec.arity {
                let Some(operand) = tokens.next() else {
                    return Err(AssembleError::MissingOperand {
                        op,
                        expected: spec.arity,
                        at: token.location.clone(),
                    });
                };
                if operand.is_constant_ref() {
                    discovered
                        .entry(operand.text.clone())
                        .or_insert_with(|| operand.location.clone());
                }
                operands.push(operand.clone());
            }

            let size = match spec.size {
                Size::Fixed(n) => n,
                Size::LiteralLength => {
                    operands.first().map_or(0, |s| s.text.chars().count())
                }
            };

            statements.push(Statement {
                op,
                operands,
                address: ip,
                labels: std::mem::take(&mut pending_labels),
                location: token.location.clone(),
            });
            ip += size;
        } else if let Some(name) = token.label_declaration() {
            match labels.entry(name.to_string()) {
                Entry::Occupied(_) => {
                    return Err(AssembleError::DuplicateLabel {
                        name: name.to_string(),
                        at: token.location.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    log::trace!("label {name} = {ip}");
                    slot.insert(ip);
                }
            }
            pending_labels.push(name.to_string());
        } else {
            return Err(AssembleError::UnrecognizedToken {
                token: token.to_string(),
                at: token.location.clone(),
            });
        }
    }

    let code_end = ip;
    let mut constants = ConstantPool::default();
    for (text, at) in discovered {
        let value = constant_value(&text, &labels).ok_or_else(|| {
            AssembleError::UnrecognizedConstant {
                constant: text.clone(),
                at,
            }
        })?;
        log::trace!("constant {text} = {value} at {ip}");
        constants.entries.insert(text, Constant { value, address: ip });
        ip += 1;
    }

    log::debug!(
        "resolved {} statements, {} labels, {} constants; code ends at {code_end}",
        statements.len(),
        labels.len(),
        constants.len()
    );

    Ok(Resolution {
        statements,
        labels,
        constants,
        code_end,
    })
}

fn op_token(token: &Token) -> Option<Op> {
    if token.quoted {
        return None;
    }
    Op::from_name(&token.text)
}

/// Value of a bracketed constant: decimal, `0x` hexadecimal (either may be
/// signed) or the address of a label.
fn constant_value(text: &str, labels: &SymbolTable) -> Option<Cell> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    if let Ok(value) = inner.parse::<Cell>() {
        return Some(value);
    }
    if let Some(value) = parse_hex(inner) {
        return Some(value);
    }
    labels.get(inner).map(|&address| address as Cell)
}

fn parse_hex(text: &str) -> Option<Cell> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = Cell::from_str_radix(digits, 16).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use parser::{MemoryLoader, Preprocessor};

    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Preprocessor::new(MemoryLoader::new())
            .preprocess_str("test.sq", source)
            .unwrap()
            .tokens
    }

    fn resolve_str(source: &str) -> Result<Resolution, AssembleError> {
        resolve(&tokens(source), &IsaConfig::default())
    }

    #[test]
    fn labels_bind_to_running_address() {
        let res = resolve_str("start: noop\nmov a b\nloop: jmp loop\na: int 1\nb: int 2\nend:")
            .unwrap();
        assert_eq!(res.labels["start"], 6);
        assert_eq!(res.labels["loop"], 6 + 3 + 12);
        assert_eq!(res.labels["a"], 24);
        assert_eq!(res.labels["b"], 25);
        assert_eq!(res.labels["end"], 26);
        assert_eq!(res.code_end, 26);
    }

    #[test]
    fn reserved_scratch_labels_are_prebound() {
        let res = resolve_str("halt").unwrap();
        assert_eq!(res.labels["$X"], 3);
        assert_eq!(res.labels["$Y"], 4);
        assert_eq!(res.labels["$Z"], 5);
    }

    #[test]
    fn statements_record_address_and_labels() {
        let res = resolve_str("a: b: add x y\nhalt\nx: int 0\ny: int 0").unwrap();
        assert_eq!(res.statements.len(), 4);
        assert_eq!(res.statements[0].op, Op::Add);
        assert_eq!(res.statements[0].labels, vec!["a", "b"]);
        assert_eq!(res.statements[1].address, 15);
        assert!(res.statements[1].labels.is_empty());
        assert_eq!(res.statements[2].labels, vec!["x"]);
    }

    #[test]
    fn bytes_size_is_character_count() {
        let res = resolve_str("msg: bytes \"héllo, you\"\nafter: halt").unwrap();
        assert_eq!(res.labels["after"], 6 + 10);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        match resolve_str("x: int 1\nnoop\nx: int 2") {
            Err(AssembleError::DuplicateLabel { name, at }) => {
                assert_eq!(name, "x");
                assert_eq!(at.pos.line, 3);
            }
            other => panic!("expected DuplicateLabel, got {other:?}"),
        }
        assert!(matches!(
            resolve_str("$X: int 1"),
            Err(AssembleError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn unknown_token_is_rejected() {
        match resolve_str("noop\nfrobnicate a") {
            Err(AssembleError::UnrecognizedToken { token, at }) => {
                assert_eq!(token, "frobnicate");
                assert_eq!(at.pos.line, 2);
            }
            other => panic!("expected UnrecognizedToken, got {other:?}"),
        }
        assert!(matches!(
            resolve_str("\"halt\""),
            Err(AssembleError::UnrecognizedToken { .. })
        ));
    }

    #[test]
    fn missing_operand_is_rejected() {
        assert!(matches!(
            resolve_str("cmp a b"),
            Err(AssembleError::MissingOperand {
                op: Op::Cmp,
                expected: 3,
                ..
            })
        ));
    }

    #[test]
    fn constants_follow_code_in_discovery_order() {
        let res = resolve_str(
            "add [0x10] x\nsub [5] x\nadd [0x10] x\nout [here]\nhere: halt\nx: int 0",
        )
        .unwrap();
        assert_eq!(res.code_end, 6 + 9 + 3 + 9 + 3 + 3 + 1);

        let pool: Vec<_> = res
            .constants
            .iter()
            .map(|(text, c)| (text.to_string(), c.value, c.address))
            .collect();
        assert_eq!(
            pool,
            vec![
                ("[0x10]".to_string(), 16, res.code_end),
                ("[5]".to_string(), 5, res.code_end + 1),
                ("[here]".to_string(), res.labels["here"] as Cell, res.code_end + 2),
            ]
        );
        assert_eq!(res.end(), res.code_end + 3);
    }

    #[test]
    fn constants_accept_signed_forms() {
        let res = resolve_str("int [-3]\nint [-0x20]").unwrap();
        assert_eq!(res.constants.get("[-3]").unwrap().value, -3);
        assert_eq!(res.constants.get("[-0x20]").unwrap().value, -32);
    }

    #[test]
    fn hex_digits_may_not_carry_their_own_sign() {
        for text in ["int [0x-5]", "int [-0x-5]", "int [0x+5]"] {
            assert!(
                matches!(
                    resolve_str(text),
                    Err(AssembleError::UnrecognizedConstant { .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn unknown_constant_is_rejected() {
        match resolve_str("int [nowhere]") {
            Err(AssembleError::UnrecognizedConstant { constant, .. }) => {
                assert_eq!(constant, "[nowhere]");
            }
            other => panic!("expected UnrecognizedConstant, got {other:?}"),
        }
    }
}
