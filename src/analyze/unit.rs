//! Turning scanned files into compilation units.

use crate::analyze::lang::parser_for;
use crate::error::ExtractError;
use crate::types::{Extraction, Language, LanguageKind, SourceFile, SourceUnit, SymbolName};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Symbols defined and required by `content`, read as `language`.
pub fn extract(content: &str, language: Language) -> Extraction {
    parser_for(language).extract(content)
}

/// Reads `bytes` as UTF-8 text, accepting a leading byte-order mark.
pub fn decode<'a>(file: &'a SourceFile) -> Result<&'a str, ExtractError> {
    let bytes = file.bytes.strip_prefix(UTF8_BOM).unwrap_or(&file.bytes);
    std::str::from_utf8(bytes).map_err(|source| ExtractError::Decode {
        path: file.path.clone(),
        source,
    })
}

/// Decodes and extracts one file.
///
/// Header-based units define their own basename, which is what include
/// directives elsewhere name.
pub fn extract_unit(file: &SourceFile) -> Result<SourceUnit, ExtractError> {
    let content = decode(file)?;
    let mut extraction = extract(content, file.language);

    if file.language.kind() == LanguageKind::HeaderBased {
        if let Some(name) = file.path.file_name().and_then(|n| n.to_str()) {
            extraction.define(SymbolName::new(name));
        }
    }

    log::debug!(
        "{}: defines {} symbol(s), requires {}",
        file.relative_path,
        extraction.defines.len(),
        extraction.requires.len()
    );

    Ok(SourceUnit {
        path: file.path.clone(),
        relative_path: file.relative_path.clone(),
        language: file.language,
        origin: file.origin,
        defines: extraction.defines,
        requires: extraction.requires,
    })
}
