use crate::types::{Language, LanguageKind};
use std::path::Path;

/// The language of `path` when it belongs to a `kind` source set.
pub fn should_include_file(path: &Path, kind: LanguageKind) -> Option<Language> {
    Language::from_path(path).filter(|language| language.kind() == kind)
}

/// Whether a directory name is on the exclude list (case-insensitive).
pub(crate) fn is_excluded_dir(name: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|e| e.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_based_selection() {
        let kind = LanguageKind::ModuleBased;
        assert_eq!(
            should_include_file(Path::new("src/gwf2bas7.f"), kind),
            Some(Language::FortranFixed)
        );
        assert_eq!(
            should_include_file(Path::new("src/Solver.F90"), kind),
            Some(Language::FortranFree)
        );
        assert_eq!(should_include_file(Path::new("src/io.c"), kind), None);
        assert_eq!(should_include_file(Path::new("README"), kind), None);
    }

    #[test]
    fn test_header_based_selection() {
        let kind = LanguageKind::HeaderBased;
        assert_eq!(
            should_include_file(Path::new("lib/grid.h"), kind),
            Some(Language::Header)
        );
        assert_eq!(
            should_include_file(Path::new("lib/grid.cpp"), kind),
            Some(Language::Cpp)
        );
        assert_eq!(should_include_file(Path::new("lib/grid.f"), kind), None);
    }

    #[test]
    fn test_is_excluded_dir() {
        let exclude = vec!["Parallel".to_string(), "serial".to_string()];
        assert!(is_excluded_dir("parallel", &exclude));
        assert!(is_excluded_dir("SERIAL", &exclude));
        assert!(!is_excluded_dir("src", &exclude));
    }
}
