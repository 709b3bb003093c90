//! TypeScript/TSX extractor.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind};

use crate::builtins::{TS_BUILTINS, TS_COMMON_METHODS, TS_TYPE_BUILTINS};
use crate::regex_base::{RegexLanguage, extract_regex};
use crate::registry::LanguageExtractor;

pub(crate) static FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+(?P<name>[A-Za-z_$]\w*)\s*(?:<[^>]*>)?\s*\(",
    )
    .expect("ts function pattern")
});

pub(crate) static ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$]\w*)\s*(?::\s*[^=]+?)?\s*=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$]\w*)\s*(?::\s*[^=]*?)?\s*=>",
    )
    .expect("ts arrow pattern")
});

pub(crate) static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(?P<name>[A-Za-z_$]\w*)\s*(?:<[^>]*>)?(?:\s+extends\s+(?P<inherits>[A-Za-z_$][\w.]*(?:\s*<[^>]*>)?(?:\s*,\s*[A-Za-z_$][\w.]*(?:\s*<[^>]*>)?)*))?(?:\s+implements\s+[^{]*?)?\s*\{",
    )
    .expect("ts class pattern")
});

static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:default\s+)?interface\s+(?P<name>[A-Za-z_$]\w*)\s*(?:<[^>]*>)?(?:\s+extends\s+(?P<inherits>[A-Za-z_$][\w.]*(?:\s*<[^>]*>)?(?:\s*,\s*[A-Za-z_$][\w.]*(?:\s*<[^>]*>)?)*))?\s*\{",
    )
    .expect("ts interface pattern")
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:export\s+)?(?:const\s+)?enum\s+(?P<name>[A-Za-z_$]\w*)\s*\{")
        .expect("ts enum pattern")
});

static TYPE_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:export\s+)?type\s+(?P<name>[A-Za-z_$]\w*)\s*(?:<[^>]*>)?\s*=")
        .expect("ts type alias pattern")
});

pub(crate) static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s+(?:public\s+|private\s+|protected\s+)?(?:static\s+)?(?:readonly\s+)?(?:async\s+)?(?:get\s+|set\s+)?(?P<name>[A-Za-z_$]\w*)\s*(?:<[^>]*>)?\s*\(",
    )
    .expect("ts method pattern")
});

static IMPORT_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+\{([^}]+)\}\s+from\s+['"]([^'"]+)['"]"#).expect("ts named import")
});
static IMPORT_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+([A-Za-z_$]\w*)\s+from\s+['"]([^'"]+)['"]"#).expect("ts default import")
});
static IMPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+\*\s+as\s+([A-Za-z_$]\w*)\s+from\s+['"]([^'"]+)['"]"#)
        .expect("ts star import")
});
static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:const|let|var)\s+(?:\{([^}]+)\}|([A-Za-z_$]\w*))\s*=\s*require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
    )
    .expect("ts require pattern")
});

static TYPE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*([A-Z][A-Za-z0-9_]*)").expect("ts type ref pattern"));
static GENERIC_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([A-Z][A-Za-z0-9_]*)").expect("ts generic ref pattern"));
static JSX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([A-Z][A-Za-z0-9_]*)").expect("jsx pattern"));

/// Split a `{a, b as c}` list into `(module, local_name)` pairs.
pub(crate) fn split_named_list(names: &str, module: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for part in names.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once(" as ") {
            Some((_original, alias)) => pairs.push((module.to_string(), alias.trim().to_string())),
            None => pairs.push((module.to_string(), part.to_string())),
        }
    }
    pairs
}

pub struct TypeScriptExtractor;

impl LanguageExtractor for TypeScriptExtractor {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".ts", ".tsx"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_regex(self, source)
    }
}

impl RegexLanguage for TypeScriptExtractor {
    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)> {
        vec![
            (EntityKind::Function, &FUNC),
            (EntityKind::Function, &ARROW),
            (EntityKind::Function, &METHOD),
            (EntityKind::Class, &CLASS),
            (EntityKind::Class, &INTERFACE),
            (EntityKind::Class, &ENUM),
            (EntityKind::Variable, &TYPE_ALIAS),
        ]
    }

    fn import_patterns(&self) -> Vec<&'static Regex> {
        vec![&IMPORT_NAMED, &IMPORT_DEFAULT, &IMPORT_STAR, &REQUIRE]
    }

    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)> {
        match pattern_index {
            // import {a, b as c} from 'module'
            0 => {
                let names = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let module = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                split_named_list(names, module)
            }
            // import Default from 'module'  /  import * as ns from 'module'
            1 | 2 => {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let module = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                vec![(module.to_string(), name.to_string())]
            }
            // const {a} = require('module')  /  const x = require('module')
            3 => {
                let module = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                if let Some(destructured) = caps.get(1) {
                    split_named_list(destructured.as_str(), module)
                } else if let Some(default_name) = caps.get(2) {
                    vec![(module.to_string(), default_name.as_str().to_string())]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn builtins(&self) -> &'static HashSet<&'static str> {
        &TS_BUILTINS
    }

    fn common_methods(&self) -> &'static HashSet<&'static str> {
        &TS_COMMON_METHODS
    }

    fn extract_type_refs(&self, text: &str) -> Vec<String> {
        let mut refs = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for pattern in [&*TYPE_REF, &*GENERIC_REF] {
            for caps in pattern.captures_iter(text) {
                let Some(m) = caps.get(1) else { continue };
                let name = m.as_str();
                if !TS_TYPE_BUILTINS.contains(name) && seen.insert(name) {
                    refs.push(name.to_string());
                }
            }
        }
        refs
    }

    fn extract_jsx_components(&self, text: &str) -> Vec<String> {
        let mut components = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for caps in JSX.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = m.as_str();
            if !TS_BUILTINS.contains(name) && !TS_TYPE_BUILTINS.contains(name) && seen.insert(name)
            {
                components.push(name.to_string());
            }
        }
        components
    }
}
