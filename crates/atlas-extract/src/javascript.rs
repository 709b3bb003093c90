//! JavaScript/JSX extractor — a thin TypeScript subset.
//!
//! Drops the TypeScript-only declaration forms (interfaces, enums, type
//! aliases) and emits no type annotations.

use std::collections::HashSet;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{TS_BUILTINS, TS_COMMON_METHODS};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;
use crate::typescript::{ARROW, CLASS, FUNC, METHOD, TypeScriptExtractor};

pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".js", ".jsx", ".mjs", ".cjs"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for JavaScriptExtractor {
    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &FUNC),
            (EntityKind::Function, &ARROW),
            (EntityKind::Function, &METHOD),
            (EntityKind::Class, &CLASS),
        ]
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        RegexLanguage::import_patterns(&TypeScriptExtractor)
    }

    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        TypeScriptExtractor.parse_import(pattern_index, caps)
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &TS_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &TS_COMMON_METHODS
    }

    fn extract_jsx_components(&self, text: &str) -> Vec<String> {
        TypeScriptExtractor.extract_jsx_components(text)
    }
}
