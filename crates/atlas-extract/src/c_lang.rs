//! C extractor.
//!
//! Functions, structs, enums, unions, typedefs, and #define macros. No
//! classes, namespaces, or templates.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{C_BUILTINS, C_COMMON_METHODS};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;

static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:
//[^\n]*
|/\*[\s\S]*?\*/
|'(?:[^'\\]|\\.)*'
|"(?:[^"\\]|\\.)*"
)"#
        .replace('\n', "")
        .as_str(),
    )
    .expect("c strip pattern")
});

pub(crate) static INCLUDE_LOCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"#\s*include\s+"(?P<path>[^"]+)""#).expect("include pattern"));
pub(crate) static INCLUDE_SYSTEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*include\s+<(?P<path>[^>]+)>").expect("include pattern"));

static FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:static|inline|extern)\s+)*(?:[\w*]+\s+)+?(?P<name>[a-z_]\w*)\s*\([^)]*\)\s*\{",
    )
    .expect("c function pattern")
});

static STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:typedef\s+)?struct\s+(?P<name>[A-Za-z_]\w*)\s*\{").expect("c struct pattern")
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:typedef\s+)?enum\s+(?P<name>[A-Za-z_]\w*)\s*\{").expect("c enum pattern")
});

static UNION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:typedef\s+)?union\s+(?P<name>[A-Za-z_]\w*)\s*\{").expect("c union pattern")
});

static TYPEDEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"typedef\s+.*?\s+(?P<name>[A-Za-z_]\w*)\s*;").expect("c typedef pattern")
});

static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*define\s+(?P<name>[A-Za-z_]\w*)(?:\s*\([^)]*\))?").expect("c define pattern")
});

/// Parse an include match: `"..."` maps to module ".", `<...>` to module "".
pub(crate) fn parse_include(pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
    let Some(path) = caps.name("path") else {
        return Vec::new();
    };
    match pattern_index {
        0 => vec![(".".to_string(), path.as_str().to_string())],
        1 => vec![(String::new(), path.as_str().to_string())],
        _ => Vec::new(),
    }
}

pub struct CExtractor;

impl LanguageExtractor for CExtractor {
    fn language_id(&self) -> &'static str {
        "c"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".c"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for CExtractor {
    fn strip_regex(&self) -> &'static Regex {
        &STRIP
    }

    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &FUNC),
            (EntityKind::Class, &STRUCT),
            (EntityKind::Class, &ENUM),
            (EntityKind::Class, &UNION),
            (EntityKind::Variable, &TYPEDEF),
            (EntityKind::Variable, &DEFINE),
        ]
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        vec![&INCLUDE_LOCAL, &INCLUDE_SYSTEM]
    }

    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        parse_include(pattern_index, caps)
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &C_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &C_COMMON_METHODS
    }
}
