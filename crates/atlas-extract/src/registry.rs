//! Language extractor contract and registry.

use atlas_core::Entity;

/// A language-specific entity extractor.
///
/// `extract` must never fail: empty source, parse failures, and any other
/// degenerate input return an empty vector.
pub trait LanguageExtractor: Send + Sync {
    /// Unique language identifier, e.g. `"python"`.
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles, with leading dots.
    fn supported_extensions(&self) -> &'static [&'static str];

    fn can_handle(&self, file_path: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| file_path.ends_with(ext))
    }

    fn extract(&self, source: &str, file_path: &str) -> Vec<Entity>;
}

/// Dispatches files to extractors: extension match first, then a
/// `can_handle` sweep as fallback.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extractor: Box<dyn LanguageExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn get_extractor(&self, file_path: &str) -> Option<&dyn LanguageExtractor> {
        for extractor in &self.extractors {
            if extractor
                .supported_extensions()
                .iter()
                .any(|ext| file_path.ends_with(ext))
            {
                return Some(extractor.as_ref());
            }
        }
        self.extractors
            .iter()
            .find(|e| e.can_handle(file_path))
            .map(|e| e.as_ref())
    }

    pub fn can_handle(&self, file_path: &str) -> bool {
        self.get_extractor(file_path).is_some()
    }

    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.language_id()).collect()
    }
}

/// Registry with every built-in extractor.
pub fn default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(Box::new(crate::python::PythonExtractor));
    registry.register(Box::new(crate::typescript::TypeScriptExtractor));
    registry.register(Box::new(crate::javascript::JavaScriptExtractor));
    registry.register(Box::new(crate::rust_lang::RustExtractor));
    registry.register(Box::new(crate::cpp::CppExtractor));
    registry.register(Box::new(crate::c_lang::CExtractor));
    registry.register(Box::new(crate::java::JavaExtractor));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_dispatches_by_extension() {
        let registry = default_registry();
        assert_eq!(registry.get_extractor("a.py").unwrap().language_id(), "python");
        assert_eq!(registry.get_extractor("a.tsx").unwrap().language_id(), "typescript");
        assert_eq!(registry.get_extractor("a.mjs").unwrap().language_id(), "javascript");
        assert_eq!(registry.get_extractor("a.rs").unwrap().language_id(), "rust");
        assert_eq!(registry.get_extractor("a.hpp").unwrap().language_id(), "cpp");
        assert_eq!(registry.get_extractor("a.c").unwrap().language_id(), "c");
        assert_eq!(registry.get_extractor("A.java").unwrap().language_id(), "java");
        assert!(registry.get_extractor("a.rb").is_none());
        assert!(registry.can_handle("pkg/mod.py"));
        assert!(!registry.can_handle("notes.txt"));
    }

    #[test]
    fn registry_lists_languages() {
        let registry = default_registry();
        let langs = registry.supported_languages();
        assert_eq!(langs.len(), 7);
        assert!(langs.contains(&"python"));
        assert!(langs.contains(&"java"));
    }
}
