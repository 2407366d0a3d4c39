mod c;
mod fortran;

pub use c::CParser;
pub use fortran::{FortranParser, SourceForm};

use crate::types::{Extraction, Language};

/// Lexical symbol extraction for one language family.
pub trait LanguageParser: Send + Sync {
    /// Symbols defined and required by `content`. Comments and literals never contribute.
    fn extract(&self, content: &str) -> Extraction;
}

static FIXED_FORM: FortranParser = FortranParser::new(SourceForm::Fixed);
static FREE_FORM: FortranParser = FortranParser::new(SourceForm::Free);
static C_FAMILY: CParser = CParser;

pub fn parser_for(language: Language) -> &'static dyn LanguageParser {
    match language {
        Language::FortranFixed => &FIXED_FORM,
        Language::FortranFree => &FREE_FORM,
        Language::C | Language::Cpp | Language::Header => &C_FAMILY,
    }
}
