//! Rust extractor.
//!
//! `impl Trait for Type` is modeled as inheritance from the type to the
//! trait; `#[...]` attributes play the decorator role.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{RUST_BUILTINS, RUST_COMMON_METHODS};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;

static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"(?:
//[^\n]*
|/\*[\s\S]*?\*/
|r#+"[\s\S]*?"#+
|r"[^"]*"
|b?'(?:[^'\\]|\\.)*'
|b?"(?:[^"\\]|\\.)*"
)"##
        .replace('\n', "")
        .as_str(),
    )
    .expect("rust strip pattern")
});

static FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+(?P<name>[a-z_]\w*)\s*(?:<[^>]*>)?\s*\("#,
    )
    .expect("rust fn pattern")
});

static STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:pub(?:\([^)]*\))?\s+)?struct\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?")
        .expect("rust struct pattern")
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:pub(?:\([^)]*\))?\s+)?enum\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?")
        .expect("rust enum pattern")
});

static TRAIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?(?:\s*:\s*(?P<inherits>[A-Za-z_]\w*(?:\s*\+\s*[A-Za-z_]\w*)*))?",
    )
    .expect("rust trait pattern")
});

static IMPL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"impl\s*(?:<[^>]*>)?\s+(?:(?P<trait_name>[A-Z]\w*)\s+for\s+)?(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?\s*\{",
    )
    .expect("rust impl pattern")
});

static TYPE_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:pub(?:\([^)]*\))?\s+)?type\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?\s*=")
        .expect("rust type alias pattern")
});

static CONST_STATIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+(?P<name>[A-Z_]\w*)\s*:")
        .expect("rust const pattern")
});

static MOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:pub(?:\([^)]*\))?\s+)?mod\s+(?P<name>[a-z_]\w*)\s*[{;]")
        .expect("rust mod pattern")
});

static MACRO_RULES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"macro_rules!\s+(?P<name>[a-z_]\w*)").expect("rust macro pattern"));

static USE_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"use\s+(?:(?:crate|super|self)::)?(?P<path>[\w:]+)::(?P<name>[A-Za-z_]\w*)\s*;",
    )
    .expect("rust use pattern")
});
static USE_BRACED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"use\s+(?:(?:crate|super|self)::)?(?P<path>[\w:]+)::\{(?P<names>[^}]+)\}\s*;")
        .expect("rust braced use pattern")
});
static USE_GLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"use\s+(?:(?:crate|super|self)::)?(?P<path>[\w:]+)::\*\s*;")
        .expect("rust glob use pattern")
});
static USE_RENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"use\s+(?:(?:crate|super|self)::)?(?P<path>[\w:]+)::(?P<orig>[A-Za-z_]\w*)\s+as\s+(?P<name>[A-Za-z_]\w*)\s*;",
    )
    .expect("rust rename use pattern")
});

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#!?\[(\w+(?:::\w+)*)").expect("rust attribute pattern"));

static GENERIC_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("generics pattern"));

pub struct RustExtractor;

impl LanguageExtractor for RustExtractor {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".rs"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for RustExtractor {
    fn strip_regex(&self) -> &'static Regex {
        &STRIP
    }

    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &FN),
            (EntityKind::Function, &MACRO_RULES),
            (EntityKind::Class, &STRUCT),
            (EntityKind::Class, &ENUM),
            (EntityKind::Class, &TRAIT),
            (EntityKind::Class, &IMPL),
            (EntityKind::Variable, &TYPE_ALIAS),
            (EntityKind::Variable, &CONST_STATIC),
            (EntityKind::ModuleCode, &MOD),
        ]
    }

    /// Trait bounds (`:` list joined by `+`) and `impl Trait for Type`.
    fn extract_inherits(&self, caps: &Captures) -> Vec<String> {
        if let Some(trait_name) = caps.name("trait_name") {
            return vec![trait_name.as_str().to_string()];
        }
        let Some(inherits) = caps.name("inherits") else {
            return Vec::new();
        };
        let mut bases = Vec::new();
        for part in inherits.as_str().split('+') {
            let cleaned = GENERIC_PARAMS.replace_all(part.trim(), "");
            let name = cleaned.trim();
            if name.chars().next().is_some_and(|c| c.is_uppercase())
                && !RUST_BUILTINS.contains(name)
            {
                bases.push(name.to_string());
            }
        }
        bases
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        vec![&USE_RENAME, &USE_BRACED, &USE_SIMPLE, &USE_GLOB]
    }

    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        let path = caps
            .name("path")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        match pattern_index {
            // use path::orig as name;
            0 => caps
                .name("name")
                .map(|m| vec![(path, m.as_str().to_string())])
                .unwrap_or_default(),
            // use path::{a, b as c};
            1 => {
                let Some(names) = caps.name("names") else {
                    return Vec::new();
                };
                let mut pairs = Vec::new();
                for part in names.as_str().split(',') {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    match part.split_once(" as ") {
                        Some((_orig, alias)) => {
                            pairs.push((path.clone(), alias.trim().to_string()));
                        }
                        None => pairs.push((path.clone(), part.to_string())),
                    }
                }
                pairs
            }
            // use path::Name;
            2 => caps
                .name("name")
                .map(|m| vec![(path, m.as_str().to_string())])
                .unwrap_or_default(),
            // use path::*;
            3 => vec![(path, "*".to_string())],
            _ => Vec::new(),
        }
    }

    /// `#[...]` attributes above the declaration, blank lines skipped.
    fn extract_decorators(&self, lines: &[&str], decl_line: usize) -> Vec<String> {
        let mut decorators = Vec::new();
        let mut i = decl_line;
        while i > 0 {
            i -= 1;
            let line = lines[i].trim();
            if line.starts_with("#[") || line.starts_with("#![") {
                if let Some(caps) = ATTRIBUTE.captures(line) {
                    decorators.push(caps[1].to_string());
                }
            } else if !line.is_empty() {
                break;
            }
        }
        decorators.reverse();
        decorators
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &RUST_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &RUST_COMMON_METHODS
    }
}
