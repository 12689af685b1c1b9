use image::Cell;
use parser::Token;

use crate::error::AssembleError;
use crate::resolve::Resolution;

/// Resolve an operand token to a concrete cell value.
///
/// Forms, tried in order: a declared label, `label+offset`, a bracketed
/// constant (its pool address), a signed decimal literal.
pub(crate) fn resolve_operand(
    token: &Token,
    resolution: &Resolution,
) -> Result<Cell, AssembleError> {
    let unknown = || AssembleError::UnknownSymbol {
        operand: token.to_string(),
        at: token.location.clone(),
    };

    if token.quoted {
        return Err(unknown());
    }
    let text = token.as_str();

    if let Some(&address) = resolution.labels.get(text) {
        return Ok(address as Cell);
    }

    if let Some((label, offset)) = text.split_once('+') {
        if !label.is_empty() {
            let &base = resolution.labels.get(label).ok_or_else(unknown)?;
            let invalid = || AssembleError::InvalidOffset {
                operand: text.to_string(),
                at: token.location.clone(),
            };
            let offset = offset.parse::<Cell>().map_err(|_| invalid())?;
            return (base as Cell).checked_add(offset).ok_or_else(invalid);
        }
    }

    if token.is_constant_ref() {
        let constant = resolution.constants.get(text).ok_or_else(unknown)?;
        return Ok(constant.address as Cell);
    }

    text.parse::<Cell>().map_err(|_| unknown())
}

/// Character codes of a string operand, one cell each.
pub(crate) fn literal_cells(token: &Token) -> Vec<Cell> {
    token.text.chars().map(|c| c as Cell).collect()
}

#[cfg(test)]
mod tests {
    use parser::{MemoryLoader, Preprocessor};

    use super::*;
    use crate::config::IsaConfig;
    use crate::resolve::resolve;

    fn setup(source: &str) -> (Vec<Token>, Resolution) {
        let tokens = Preprocessor::new(MemoryLoader::new())
            .preprocess_str("test.sq", source)
            .unwrap()
            .tokens;
        let resolution = resolve(&tokens, &IsaConfig::default()).unwrap();
        (tokens, resolution)
    }

    #[test]
    fn resolves_each_form() {
        let (tokens, res) =
            setup("subleq table table+2 [7]\nsubleq 12 -1 $Z\ntable: int 0");
        let values: Vec<Cell> = tokens[1..4]
            .iter()
            .chain(&tokens[5..8])
            .map(|t| resolve_operand(t, &res).unwrap())
            .collect();
        assert_eq!(values, vec![12, 14, 13, 12, -1, 5]);
    }

    #[test]
    fn unknown_names_and_strings_fail() {
        let (tokens, res) = setup("jmp nowhere\nbytes \"x\"\nsub ghost+1 $X");
        assert!(matches!(
            resolve_operand(&tokens[1], &res),
            Err(AssembleError::UnknownSymbol { .. })
        ));
        assert!(matches!(
            resolve_operand(&tokens[3], &res),
            Err(AssembleError::UnknownSymbol { .. })
        ));
        assert!(matches!(
            resolve_operand(&tokens[5], &res),
            Err(AssembleError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn bad_offset_is_reported() {
        let (tokens, res) = setup("jmp here+x\nhere: halt");
        assert!(matches!(
            resolve_operand(&tokens[1], &res),
            Err(AssembleError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn overflowing_offset_is_reported() {
        let (tokens, res) = setup("jmp here+9223372036854775807
here: halt");
        match resolve_operand(&tokens[1], &res) {
            Err(AssembleError::InvalidOffset { operand, at }) => {
                assert_eq!(operand, "here+9223372036854775807");
                assert_eq!(at.to_string(), "test.sq:1:5");
            }
            other => panic!("expected InvalidOffset, got {other:?}"),
        }
    }

    #[test]
    fn literal_cells_are_code_points() {
        let (tokens, _) = setup("bytes \"Hi!\"");
        assert_eq!(literal_cells(&tokens[1]), vec![72, 105, 33]);
    }
}
