//! C++ extractor.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{CPP_BUILTINS, CPP_COMMON_METHODS};
use crate::c_lang::{INCLUDE_LOCAL, INCLUDE_SYSTEM, parse_include};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;

// The raw-string arm approximates R"delim(...)delim" without a
// backreference on the delimiter; a mismatched custom delimiter blanks a
// slightly wrong span but never fails.
static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:
//[^\n]*
|/\*[\s\S]*?\*/
|'(?:[^'\\]|\\.)*'
|R"[^(]*\([\s\S]*?\)[^"]*"
|"(?:[^"\\]|\\.)*"
)"#
        .replace('\n', "")
        .as_str(),
    )
    .expect("cpp strip pattern")
});

static FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:template\s*<[^>]*>\s*)?(?:(?:static|inline|virtual|explicit|constexpr|consteval|extern)\s+)*(?:[\w:*&<>]+\s+)+?(?P<name>[a-z_]\w*)\s*\([^)]*\)\s*(?:const\s*)?(?:noexcept\s*(?:\([^)]*\))?\s*)?(?:override\s*|final\s*)*(?:\{|;)",
    )
    .expect("cpp function pattern")
});

static CTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:explicit\s+)?~?(?P<name>[A-Z]\w*)\s*\([^)]*\)\s*(?::\s*[^{;]*?)?\s*\{")
        .expect("cpp ctor pattern")
});

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:template\s*<[^>]*>\s*)?class\s+(?P<name>[A-Z]\w*)\s*(?:final\s*)?(?::\s*(?P<inherits>(?:(?:public|private|protected)\s+)?[A-Za-z_]\w*(?:\s*<[^>]*>)?(?:\s*,\s*(?:(?:public|private|protected)\s+)?[A-Za-z_]\w*(?:\s*<[^>]*>)?)*))?\s*\{",
    )
    .expect("cpp class pattern")
});

static STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:template\s*<[^>]*>\s*)?struct\s+(?P<name>[A-Z]\w*)\s*(?:final\s*)?(?::\s*(?P<inherits>(?:(?:public|private|protected)\s+)?[A-Za-z_]\w*(?:\s*<[^>]*>)?(?:\s*,\s*(?:(?:public|private|protected)\s+)?[A-Za-z_]\w*(?:\s*<[^>]*>)?)*))?\s*\{",
    )
    .expect("cpp struct pattern")
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"enum\s+(?:class\s+)?(?P<name>[A-Z]\w*)\s*(?::\s*\w+\s*)?\{")
        .expect("cpp enum pattern")
});

static NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"namespace\s+(?P<name>[A-Za-z_]\w*)\s*\{").expect("cpp namespace pattern")
});

static USING_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"using\s+(?P<name>[A-Za-z_]\w*)\s*=").expect("cpp using alias pattern")
});

static TYPEDEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"typedef\s+.*?\s+(?P<name>[A-Za-z_]\w*)\s*;").expect("cpp typedef pattern")
});

static USING_NS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"using\s+namespace\s+(?P<name>[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)\s*;")
        .expect("cpp using namespace pattern")
});

pub struct CppExtractor;

impl LanguageExtractor for CppExtractor {
    fn language_id(&self) -> &'static str {
        "cpp"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx", ".h"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for CppExtractor {
    fn strip_regex(&self) -> &'static Regex {
        &STRIP
    }

    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &FUNC),
            (EntityKind::Function, &CTOR),
            (EntityKind::Class, &CLASS),
            (EntityKind::Class, &STRUCT),
            (EntityKind::Class, &ENUM),
            (EntityKind::Class, &NAMESPACE),
            (EntityKind::Variable, &USING_ALIAS),
            (EntityKind::Variable, &TYPEDEF),
        ]
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        vec![&INCLUDE_LOCAL, &INCLUDE_SYSTEM, &USING_NS]
    }

    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        match pattern_index {
            0 | 1 => parse_include(pattern_index, caps),
            2 => caps
                .name("name")
                .map(|m| vec![(m.as_str().to_string(), m.as_str().to_string())])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &CPP_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &CPP_COMMON_METHODS
    }
}
