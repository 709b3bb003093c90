//! Shadow parsing for broken or incomplete Python source.
//!
//! Strategy: try a full parse; on failure, binary-search for maximal valid
//! regions and scavenge the invalid lines with regexes, attaching a
//! confidence score to each recovered entity. Shadow entities carry a
//! `shadow:` signature prefix so a later clean parse replaces them.

use std::sync::LazyLock;

use regex::Regex;

use atlas_core::{Entity, EntityKind};

use crate::python::{extract_python, parse_python};

static FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(async\s+)?def\s+(\w+)\s*\(([^)]*)\)?:?").expect("shadow def pattern")
});
static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*class\s+(\w+)\s*(\([^)]*\))?:?").expect("shadow class pattern")
});
static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(from\s+[\w.]+\s+)?import\s+").expect("shadow import pattern")
});

/// A region of source with its parse status.
#[derive(Debug, Clone)]
pub struct ParseRegion {
    /// 1-indexed inclusive span.
    pub start_line: usize,
    pub end_line: usize,
    pub valid: bool,
    pub entities: Vec<Entity>,
    pub confidence: f32,
}

#[derive(Debug, Default)]
pub struct ShadowParser;

impl ShadowParser {
    pub fn new() -> Self {
        ShadowParser
    }

    /// Partition source into parse regions. Whole-file success yields one
    /// valid region; otherwise valid subranges parse normally and invalid
    /// lines go through regex scavenging.
    pub fn parse(&self, source: &str) -> Vec<ParseRegion> {
        if source.trim().is_empty() {
            return Vec::new();
        }
        let lines: Vec<&str> = source.split('\n').collect();
        let total = lines.len();

        if Self::parses_cleanly(source) {
            return vec![ParseRegion {
                start_line: 1,
                end_line: total,
                valid: true,
                entities: extract_python(source),
                confidence: 1.0,
            }];
        }

        self.binary_search_regions(&lines, 1, total)
    }

    fn parses_cleanly(source: &str) -> bool {
        parse_python(source).is_some_and(|tree| !tree.root_node().has_error())
    }

    fn binary_search_regions(&self, lines: &[&str], start: usize, end: usize) -> Vec<ParseRegion> {
        if start > end {
            return Vec::new();
        }

        let chunk = lines[start - 1..end].join("\n");
        if Self::parses_cleanly(&chunk) {
            let mut entities = extract_python(&chunk);
            for entity in entities.iter_mut() {
                entity.line_start += (start - 1) as u32;
                entity.line_end += (start - 1) as u32;
            }
            return vec![ParseRegion {
                start_line: start,
                end_line: end,
                valid: true,
                entities,
                confidence: 1.0,
            }];
        }

        if start == end {
            let entities = Self::regex_extract(&chunk, start);
            let confidence = entities
                .iter()
                .filter_map(|e| e.confidence)
                .fold(0.0_f32, f32::max);
            return vec![ParseRegion {
                start_line: start,
                end_line: end,
                valid: false,
                entities,
                confidence,
            }];
        }

        let mid = (start + end) / 2;
        let mut regions = self.binary_search_regions(lines, start, mid);
        regions.extend(self.binary_search_regions(lines, mid + 1, end));
        regions
    }

    /// Best-effort extraction from an invalid line.
    fn regex_extract(text: &str, line_num: usize) -> Vec<Entity> {
        if let Some(caps) = FUNCTION_PATTERN.captures(text) {
            let after_def = text.split_once("def").map(|(_, rest)| rest).unwrap_or("");
            let has_colon = after_def.contains(':');
            let has_close_paren = text.contains(')');
            let confidence = if has_colon && has_close_paren {
                0.9
            } else if has_close_paren {
                0.7
            } else {
                0.5
            };

            let name = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let args = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let mut entity = Entity::new(
                EntityKind::Function,
                name,
                line_num as u32,
                line_num as u32,
                format!("shadow:{name}({args})"),
                format!("shadow_func:{args}"),
            );
            entity.confidence = Some(confidence);
            return vec![entity];
        }

        if let Some(caps) = CLASS_PATTERN.captures(text) {
            let confidence = if text.trim_end().ends_with(':') { 0.9 } else { 0.6 };
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let mut entity = Entity::new(
                EntityKind::Class,
                name,
                line_num as u32,
                line_num as u32,
                format!("shadow:{name}"),
                "shadow_class",
            );
            entity.confidence = Some(confidence);
            return vec![entity];
        }

        if IMPORT_PATTERN.is_match(text) {
            let mut entity = Entity::new(
                EntityKind::Import,
                format!("__import_{line_num}__"),
                line_num as u32,
                line_num as u32,
                format!("shadow:import:{line_num}"),
                "shadow_import",
            );
            entity.confidence = Some(0.7);
            return vec![entity];
        }

        Vec::new()
    }
}

/// Flatten shadow regions into entities, prefixing every signature hash with
/// `shadow:` so the next clean parse replaces them all.
pub fn shadow_extract(source: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    for region in ShadowParser::new().parse(source) {
        for mut entity in region.entities {
            if !entity.signature_hash.starts_with("shadow:") {
                entity.signature_hash = format!("shadow:{}", entity.signature_hash);
            }
            entities.push(entity);
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_is_one_valid_region() {
        let src = "def foo():\n    return 1\n";
        let regions = ShadowParser::new().parse(src);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].valid);
        assert_eq!(regions[0].entities.len(), 1);
        assert_eq!(regions[0].entities[0].name, "foo");
    }

    #[test]
    fn broken_tail_still_recovers_valid_prefix() {
        let src = "def good():\n    return 1\n\ndef broken(:\n    return 2\n";
        let regions = ShadowParser::new().parse(src);
        let valid_names: Vec<&str> = regions
            .iter()
            .filter(|r| r.valid)
            .flat_map(|r| r.entities.iter().map(|e| e.name.as_str()))
            .collect();
        assert!(valid_names.contains(&"good"));

        let shadowed: Vec<&Entity> = regions
            .iter()
            .filter(|r| !r.valid)
            .flat_map(|r| r.entities.iter())
            .collect();
        assert!(shadowed.iter().any(|e| e.name == "broken"));
        assert!(shadowed.iter().all(|e| e.confidence.is_some()));
    }

    #[test]
    fn shadow_extract_prefixes_signatures() {
        let src = "def good():\n    return 1\n\ndef broken(:\n";
        let entities = shadow_extract(src);
        assert!(!entities.is_empty());
        assert!(entities.iter().all(|e| e.signature_hash.starts_with("shadow:")));
    }

    #[test]
    fn broken_def_line_scores_by_shape() {
        let complete = ShadowParser::regex_extract("def f(a, b):", 1);
        assert_eq!(complete[0].confidence, Some(0.9));
        let partial = ShadowParser::regex_extract("def f(a, b)", 1);
        assert_eq!(partial[0].confidence, Some(0.7));
        let open = ShadowParser::regex_extract("def f(a,", 1);
        assert_eq!(open[0].confidence, Some(0.5));
    }
}
