//! Java extractor.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{JAVA_BUILTINS, JAVA_COMMON_METHODS};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;

static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:
//[^\n]*
|/\*[\s\S]*?\*/
|"""[\s\S]*?"""
|'(?:[^'\\]|\\.)*'
|"(?:[^"\\]|\\.)*"
)"#
        .replace('\n', "")
        .as_str(),
    )
    .expect("java strip pattern")
});

const MODIFIERS: &str = r"(?:(?:public|private|protected|static|final|abstract|synchronized|native|strictfp|sealed|non-sealed|default)\s+)*";

fn pattern(tail: &str) -> Regex {
    Regex::new(&format!("{MODIFIERS}{tail}")).expect("java pattern")
}

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"class\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?(?:\s+extends\s+(?P<inherits>[A-Za-z_]\w*(?:\s*<[^>]*>)?))?(?:\s+implements\s+[A-Za-z_][\w.,<>\s]*)?\s*\{",
    )
});

static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"interface\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?(?:\s+extends\s+(?P<inherits>[A-Za-z_][\w.,<>\s]*))?\s*\{",
    )
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"enum\s+(?P<name>[A-Z]\w*)\s*(?:\s+implements\s+(?P<inherits>[A-Za-z_][\w.,<>\s]*))?\s*\{",
    )
});

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"record\s+(?P<name>[A-Z]\w*)\s*(?:<[^>]*>)?\s*\([^)]*\)(?:\s+implements\s+(?P<inherits>[A-Za-z_][\w.,<>\s]*))?\s*\{",
    )
});

static ANNOTATION_TYPE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"@interface\s+(?P<name>[A-Z]\w*)\s*\{"));

static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?:<[^>]*>\s+)?(?:[\w<>\[\],.\s]+?\s+)(?P<name>[a-z_]\w*)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\s*\{",
    )
});

static CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?P<name>[A-Z]\w*)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\s*\{")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"import\s+(?:static\s+)?(?P<path>[\w.]+)\.(?P<name>[A-Za-z_]\w*|\*)\s*;")
        .expect("java import pattern")
});

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+(?:\.\w+)*)").expect("java annotation pattern"));

static TYPE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?::\s*|<\s*|,\s*)([A-Z][A-Za-z0-9_]*)").expect("java type ref pattern")
});

static GENERIC_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("generics pattern"));

/// Annotations that carry no dependency information.
const TRIVIAL_ANNOTATIONS: [&str; 5] = [
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
    "SafeVarargs",
];

static JAVA_TYPE_BUILTINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "String", "Integer", "Long", "Double", "Float", "Boolean",
        "Character", "Byte", "Short", "Object", "Class", "Enum",
        "List", "Map", "Set", "Collection", "Iterable", "Iterator",
        "Optional", "Stream", "Comparable", "Serializable", "Cloneable",
        "Runnable", "Callable", "Future", "CompletableFuture",
        "Consumer", "Supplier", "Function", "Predicate", "BiFunction",
        "Exception", "RuntimeException", "Error", "Throwable",
        "Override", "Deprecated",
        "T", "K", "V", "E", "R",
    ])
});

pub struct JavaExtractor;

impl LanguageExtractor for JavaExtractor {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".java"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for JavaExtractor {
    fn strip_regex(&self) -> &'static Regex {
        &STRIP
    }

    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &METHOD),
            (EntityKind::Function, &CONSTRUCTOR),
            (EntityKind::Class, &CLASS),
            (EntityKind::Class, &INTERFACE),
            (EntityKind::Class, &ENUM),
            (EntityKind::Class, &RECORD),
            (EntityKind::Class, &ANNOTATION_TYPE),
        ]
    }

    fn extract_inherits(&self, caps: &Captures) -> Vec<String> {
        let Some(inherits) = caps.name("inherits") else {
            return Vec::new();
        };
        let mut bases = Vec::new();
        for base in inherits.as_str().split(',') {
            let cleaned = GENERIC_PARAMS.replace_all(base.trim(), "");
            let name = cleaned.trim();
            if name.chars().next().is_some_and(|c| c.is_uppercase())
                && !JAVA_BUILTINS.contains(name)
            {
                bases.push(name.to_string());
            }
        }
        bases
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        vec![&IMPORT]
    }

    fn parse_import(&self, _pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        match (caps.name("path"), caps.name("name")) {
            (Some(path), Some(name)) => {
                vec![(path.as_str().to_string(), name.as_str().to_string())]
            }
            _ => Vec::new(),
        }
    }

    /// Annotations above the declaration, skipping blanks and the trivial
    /// marker annotations.
    fn extract_decorators(&self, lines: &[&str], decl_line: usize) -> Vec<String> {
        let mut decorators = Vec::new();
        let mut i = decl_line;
        while i > 0 {
            i -= 1;
            let line = lines[i].trim();
            if let Some(caps) = ANNOTATION.captures(line) {
                let name = caps[1].to_string();
                if !TRIVIAL_ANNOTATIONS.contains(&name.as_str()) {
                    decorators.push(name);
                }
            } else if !line.is_empty() {
                break;
            }
        }
        decorators.reverse();
        decorators
    }

    fn extract_type_refs(&self, text: &str) -> Vec<String> {
        let mut refs = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for caps in TYPE_REF.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = m.as_str();
            if !JAVA_TYPE_BUILTINS.contains(name)
                && !JAVA_BUILTINS.contains(name)
                && seen.insert(name)
            {
                refs.push(name.to_string());
            }
        }
        refs
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &JAVA_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &JAVA_COMMON_METHODS
    }
}
