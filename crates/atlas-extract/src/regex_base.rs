//! Shared machinery for regex-based language extractors.
//!
//! The pipeline: strip comments/strings to space-preserving blanks, locate
//! declarations via per-language patterns, find body ends by balanced brace
//! counting, pull calls/type refs/inheritance/decorators out of each body,
//! then apply hierarchical scoping. Languages supply patterns and filter
//! sets through the [`RegexLanguage`] hooks.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use atlas_core::{Entity, EntityKind, short_hash};

/// C-family comment and string stripping, shared default.
pub static DEFAULT_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:
//[^\n]*
|/\*[\s\S]*?\*/
|'''[\s\S]*?'''
|"""[\s\S]*?"""
|'(?:[^'\\]|\\.)*'
|"(?:[^"\\]|\\.)*"
|`(?:[^`\\]|\\.)*`
)"#
        .replace('\n', "")
        .as_str(),
    )
    .expect("strip pattern compiles")
});

static QUALIFIED_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)?)\s*\(").expect("call pattern compiles")
});

static DECORATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+(?:\.\w+)*)").expect("decorator pattern compiles"));

static GENERIC_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("generics pattern compiles"));

/// Language hooks consumed by the shared pipeline. Languages implement this
/// alongside [`LanguageExtractor`], whose `extract` delegates to
/// [`extract_regex`].
pub trait RegexLanguage: Send + Sync {
    /// Pattern matching comments and string literals to blank out.
    fn strip_regex(&self) -> &'static Regex {
        &DEFAULT_STRIP
    }

    /// `(kind, pattern)` pairs; each pattern needs a named `name` capture
    /// and may carry an `inherits` capture.
    fn declaration_patterns(&self) -> Vec<(EntityKind, &'static Regex)>;

    fn import_patterns(&self) -> Vec<&'static Regex>;

    /// Turn an import match (identified by its pattern index) into
    /// `(module, name)` pairs.
    fn parse_import(&self, pattern_index: usize, caps: &Captures) -> Vec<(String, String)>;

    fn builtins(&self) -> &'static HashSet<&'static str>;

    fn common_methods(&self) -> &'static HashSet<&'static str>;

    /// Inheritance list from a declaration match. The default reads the
    /// `inherits` capture: comma-separated bases, generics stripped,
    /// visibility keywords dropped, capitalized names kept.
    fn extract_inherits(&self, caps: &Captures) -> Vec<String> {
        let Some(inherits) = caps.name("inherits") else {
            return Vec::new();
        };
        let mut bases = Vec::new();
        for base in inherits.as_str().split(',') {
            let cleaned = GENERIC_PARAMS.replace_all(base.trim(), "");
            let last = cleaned.split_whitespace().next_back().unwrap_or("");
            if last.chars().next().is_some_and(|c| c.is_uppercase()) {
                bases.push(last.to_string());
            }
        }
        bases
    }

    /// Decorator names from the lines immediately preceding a declaration
    /// (`decl_line` is 0-indexed). The default reads `@name` prefixes.
    fn extract_decorators(&self, lines: &[&str], decl_line: usize) -> Vec<String> {
        let mut decorators = Vec::new();
        let mut i = decl_line;
        while i > 0 {
            i -= 1;
            let line = lines[i].trim();
            match DECORATOR.captures(line) {
                Some(caps) => decorators.push(caps[1].to_string()),
                None => break,
            }
        }
        decorators.reverse();
        decorators
    }

    /// Type annotation references from a declaration body. Default: none.
    fn extract_type_refs(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }

    /// JSX component usage from a body. Default: none (TS/JSX only).
    fn extract_jsx_components(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Replace the first standalone occurrence of `name` (bounded by
/// non-identifier characters) with a placeholder. Used for structure hashes
/// so a rename leaves the hash unchanged.
pub(crate) fn replace_first_ident(haystack: &str, name: &str) -> String {
    if name.is_empty() {
        return haystack.to_string();
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let mut search_from = 0;
    while let Some(pos) = haystack[search_from..].find(name) {
        let start = search_from + pos;
        let end = start + name.len();
        let before_ok = !haystack[..start].chars().next_back().is_some_and(is_ident);
        let after_ok = !haystack[end..].chars().next().is_some_and(is_ident);
        if before_ok && after_ok {
            let mut out = String::with_capacity(haystack.len());
            out.push_str(&haystack[..start]);
            out.push_str("___");
            out.push_str(&haystack[end..]);
            return out;
        }
        let step = haystack[start..]
            .chars()
            .next()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        search_from = start + step;
    }
    haystack.to_string()
}

/// Blank out every match, preserving newlines so line numbers survive.
pub(crate) fn strip_to_blanks(pattern: &Regex, source: &str) -> String {
    pattern
        .replace_all(source, |caps: &Captures| {
            caps[0]
                .chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect::<String>()
        })
        .into_owned()
}

/// 0-indexed line of the closing brace for a declaration starting at
/// `start_line`, or the last line when no balanced close is found.
fn find_body_end(stripped_lines: &[&str], start_line: usize) -> usize {
    let mut depth: i32 = 0;
    let mut found_open = false;
    for (i, line) in stripped_lines.iter().enumerate().skip(start_line) {
        for ch in line.chars() {
            if ch == '{' {
                depth += 1;
                found_open = true;
            } else if ch == '}' {
                depth -= 1;
                if found_open && depth == 0 {
                    return i;
                }
            }
        }
    }
    stripped_lines.len().saturating_sub(1)
}

/// Qualified call names from a stripped body, filtered through the
/// language's builtin and common-method sets. First occurrence wins.
fn extract_calls_from_body(lang: &dyn RegexLanguage, body: &str) -> Vec<String> {
    let builtins = lang.builtins();
    let common = lang.common_methods();
    let mut calls = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for caps in QUALIFIED_CALL.captures_iter(body) {
        let Some(m) = caps.get(1) else { continue };
        let name = m.as_str();
        if !seen.insert(name) {
            continue;
        }
        let bare = name.rsplit('.').next().unwrap_or(name);
        if builtins.contains(bare) || builtins.contains(name) {
            continue;
        }
        if !name.contains('.') && common.contains(bare) {
            continue;
        }
        if let Some((receiver, _)) = name.split_once('.') {
            if builtins.contains(receiver) {
                continue;
            }
            if common.contains(bare) {
                continue;
            }
        }
        calls.push(name.to_string());
    }
    calls
}

fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn extract_imports(lang: &dyn RegexLanguage, source: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    for (idx, pattern) in lang.import_patterns().into_iter().enumerate() {
        for caps in pattern.captures_iter(source) {
            let Some(m0) = caps.get(0) else { continue };
            let line_start = line_of_offset(source, m0.start()) as u32;
            let line_end = line_of_offset(source, m0.end()) as u32;
            for (module, name) in lang.parse_import(idx, &caps) {
                let mut entity = Entity::new(
                    EntityKind::Import,
                    name.clone(),
                    line_start,
                    line_end,
                    short_hash(&format!("import:{module}:{name}"), 12),
                    short_hash("other:import", 12),
                );
                entity.imports = vec![(module, name)];
                entities.push(entity);
            }
        }
    }
    entities
}

fn extract_declarations(
    lang: &dyn RegexLanguage,
    lines: &[&str],
    stripped: &str,
    stripped_lines: &[&str],
) -> Vec<Entity> {
    let mut entities = Vec::new();

    for (kind, pattern) in lang.declaration_patterns() {
        for caps in pattern.captures_iter(stripped) {
            let Some(name_match) = caps.name("name") else {
                continue;
            };
            let name = name_match.as_str();
            if name.is_empty() {
                continue;
            }
            let Some(m0) = caps.get(0) else { continue };

            let line_start = line_of_offset(stripped, m0.start());
            let decl_line_idx = line_start - 1;

            let mut line_end = find_body_end(stripped_lines, decl_line_idx) + 1;
            if line_end == line_start && kind == EntityKind::Variable {
                line_end = line_of_offset(stripped, m0.end());
            }
            let line_end = line_end.clamp(line_start, stripped_lines.len().max(line_start));

            let stripped_body = stripped_lines[decl_line_idx..line_end].join("\n");

            let mut calls = extract_calls_from_body(lang, &stripped_body);
            for component in lang.extract_jsx_components(&stripped_body) {
                if !calls.contains(&component) {
                    calls.push(component);
                }
            }

            let type_refs = lang.extract_type_refs(&stripped_body);
            let inherits = lang.extract_inherits(&caps);
            let decorators = lang.extract_decorators(stripped_lines, decl_line_idx);

            // Hashes come from the original source so edits inside string
            // literals still count as changes.
            let sig_text = lines[decl_line_idx..line_end.min(lines.len())].join("\n");
            let signature_hash = short_hash(&sig_text, 12);
            let structure_hash = short_hash(&replace_first_ident(&sig_text, name), 12);

            let mut entity = Entity::new(
                kind,
                name,
                line_start as u32,
                line_end as u32,
                signature_hash,
                structure_hash,
            );
            entity.calls = calls;
            entity.inherits = inherits;
            entity.type_refs = type_refs;
            entity.decorators = decorators;
            entities.push(entity);
        }
    }

    entities
}

/// Hierarchical scoping: nested declarations get `Parent.child` names.
/// Declarations are ordered by `(line_start, -span)` and a stack of
/// enclosing class ranges decides nesting. Imports are never scoped.
fn apply_scoping(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by(|a, b| {
        a.line_start.cmp(&b.line_start).then_with(|| {
            let span_a = a.line_end.saturating_sub(a.line_start);
            let span_b = b.line_end.saturating_sub(b.line_start);
            span_b.cmp(&span_a)
        })
    });

    let mut scope_stack: Vec<(String, u32)> = Vec::new();
    for entity in entities.iter_mut() {
        while scope_stack
            .last()
            .is_some_and(|(_, end)| entity.line_start > *end)
        {
            scope_stack.pop();
        }

        if entity.kind != EntityKind::Import {
            if let Some((parent, _)) = scope_stack.last() {
                entity.name = format!("{parent}.{}", entity.name);
            }
        }

        if entity.kind == EntityKind::Class {
            scope_stack.push((entity.name.clone(), entity.line_end));
        }
    }

    entities
}

/// Full extraction pipeline for a regex-based language.
pub fn extract_regex(lang: &dyn RegexLanguage, source: &str) -> Vec<Entity> {
    if source.trim().is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = source.split('\n').collect();
    let stripped = strip_to_blanks(lang.strip_regex(), source);
    let stripped_lines: Vec<&str> = stripped.split('\n').collect();

    let mut entities = Vec::new();
    // Imports read the original source so paths inside string literals
    // survive the strip.
    entities.extend(extract_imports(lang, source));
    entities.extend(extract_declarations(lang, &lines, &stripped, &stripped_lines));

    apply_scoping(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_preserves_line_numbers() {
        let src = "let a = \"text // not a comment\";\n// real comment\nlet b = 2;";
        let stripped = strip_to_blanks(&DEFAULT_STRIP, src);
        assert_eq!(stripped.matches('\n').count(), src.matches('\n').count());
        assert!(!stripped.contains("not a comment"));
        assert!(!stripped.contains("real comment"));
        assert!(stripped.contains("let b = 2;"));
    }

    #[test]
    fn body_end_balances_braces() {
        let lines: Vec<&str> = "fn f() {\n  if x {\n  }\n}\nfn g() {}".split('\n').collect();
        assert_eq!(find_body_end(&lines, 0), 3);
        assert_eq!(find_body_end(&lines, 4), 4);
    }

    #[test]
    fn replace_first_ident_respects_boundaries() {
        let replaced = replace_first_ident("def f(x): return f(x)", "f");
        assert_eq!(replaced, "def ___(x): return f(x)");
        // "def" must not be mangled even though it contains "f" ... it does
        // not start at a boundary match, so nothing else changes.
        let replaced = replace_first_ident("undefined f", "f");
        assert_eq!(replaced, "undefined ___");
    }
}
