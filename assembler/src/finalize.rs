use image::{Cell, MemoryImage};
use parser::Directives;

use crate::config::IsaConfig;
use crate::error::AssembleError;
use crate::resolve::Resolution;

/// Directive naming the label execution starts at.
pub const ENTRY_DIRECTIVE: &str = "ENTRY";

/// Patch the entry cell and lay the constant pool out after the code.
pub fn finalize(
    cells: Vec<Cell>,
    resolution: &Resolution,
    directives: &Directives,
    config: &IsaConfig,
) -> Result<MemoryImage, AssembleError> {
    let mut image = MemoryImage::from_cells(cells);

    for key in directives.keys().filter(|k| *k != ENTRY_DIRECTIVE) {
        log::warn!("ignoring unknown directive `{key}`");
    }

    if let Some(entry) = directives.get(ENTRY_DIRECTIVE) {
        let label = &entry.value;
        let &address = resolution.labels.get(label.as_str()).ok_or_else(|| {
            AssembleError::UnknownEntry {
                label: label.clone(),
                at: entry.location.clone(),
            }
        })?;
        log::debug!("entry point {label} = {address}");
        image.store(config.entry_cell, address as Cell);
    }

    for (_, constant) in resolution.constants.iter() {
        image.store(constant.address, constant.value);
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use parser::{MemoryLoader, Preprocessor};

    use super::*;
    use crate::generate::generate;
    use crate::resolve::resolve;

    fn finalize_str(source: &str) -> Result<(Resolution, MemoryImage), AssembleError> {
        let program = Preprocessor::new(MemoryLoader::new())
            .preprocess_str("test.sq", source)
            .unwrap();
        let config = IsaConfig::default();
        let resolution = resolve(&program.tokens, &config)?;
        let generated = generate(&resolution, &config)?;
        let image =
            finalize(generated.cells, &resolution, &program.directives, &config)?;
        Ok((resolution, image))
    }

    #[test]
    fn without_entry_the_preamble_jumps_past_itself() {
        let (_, image) = finalize_str("halt").unwrap();
        assert_eq!(image.cells(), &[3, 3, 6, 0, 0, 0, -1, -1, 0]);
    }

    #[test]
    fn entry_directive_patches_bootstrap_target() {
        let (res, image) =
            finalize_str("#set ENTRY=main\nnoop\nmain: halt").unwrap();
        assert_eq!(image.get(2), Some(res.labels["main"] as Cell));
        assert_eq!(image.get(2), Some(9));
    }

    #[test]
    fn unknown_entry_label_is_fatal() {
        match finalize_str("#set ENTRY=missing\nhalt") {
            Err(AssembleError::UnknownEntry { label, at }) => {
                assert_eq!(label, "missing");
                assert_eq!(at.to_string(), "test.sq:1:6");
            }
            other => panic!("expected UnknownEntry, got {other:?}"),
        }
    }

    #[test]
    fn constants_are_written_after_code() {
        let (res, image) =
            finalize_str("add [40] x\nout [0x2]\nhalt\nx: int 1").unwrap();
        assert_eq!(image.len(), res.code_end + 2);
        assert_eq!(image.get(res.code_end), Some(40));
        assert_eq!(image.get(res.code_end + 1), Some(2));
        assert_eq!(image.get(6), Some(res.code_end as Cell));
    }
}
