//! Semantic paths: fully qualified entity addressing for Python files.
//!
//! A scope-aware pass over the AST that records where every definition
//! lives (file, enclosing scope chain, span). The resolver uses these for
//! LEGB-style name resolution before falling back to graph-wide scans.

use std::collections::HashMap;

use tree_sitter::Node;

use atlas_core::{EntityKind, short_hash};

use crate::python::parse_python;

/// Fully qualified entity address.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticPath {
    pub file_path: String,
    /// Enclosing scopes, outermost first: `["UserService", "get_user"]`.
    pub scope_chain: Vec<String>,
    pub kind: EntityKind,
    pub name: String,
    pub signature_hash: String,
    pub line_start: u32,
    pub line_end: u32,
}

impl SemanticPath {
    pub fn fqn(&self) -> String {
        format!(
            "{}::{}::{}::{}",
            self.file_path,
            self.scope_chain.join("::"),
            self.kind,
            self.name
        )
    }

    pub fn unique_id(&self) -> String {
        short_hash(&format!("{}::{}", self.fqn(), self.signature_hash), 16)
    }

    pub fn scope_depth(&self) -> usize {
        self.scope_chain.len()
    }
}

/// Extract semantic paths from Python source. Empty or unparsable source
/// yields an empty list.
pub fn extract_semantic_paths(source: &str, file_path: &str) -> Vec<SemanticPath> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    let Some(tree) = parse_python(source) else {
        return Vec::new();
    };
    let root = tree.root_node();
    if root.has_error() {
        return Vec::new();
    }

    let mut collector = PathCollector {
        source,
        file_path,
        scope_chain: Vec::new(),
        paths: Vec::new(),
    };
    collector.visit(root);
    collector.paths
}

struct PathCollector<'a> {
    source: &'a str,
    file_path: &'a str,
    scope_chain: Vec<String>,
    paths: Vec<SemanticPath>,
}

impl<'a> PathCollector<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn named_children_of(node: Node) -> Vec<Node> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    fn push_path(&mut self, kind: EntityKind, name: &str, sig: String, node: Node) {
        self.paths.push(SemanticPath {
            file_path: self.file_path.to_string(),
            scope_chain: self.scope_chain.clone(),
            kind,
            name: name.to_string(),
            signature_hash: sig,
            line_start: node.start_position().row as u32 + 1,
            line_end: node.end_position().row as u32 + 1,
        });
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_definition(node, EntityKind::Function),
            "class_definition" => self.visit_definition(node, EntityKind::Class),
            "decorated_definition" => {
                if let Some(def) = node.child_by_field_name("definition") {
                    self.visit(def);
                }
            }
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" && node.child_by_field_name("right").is_some() {
                        let name = self.text(left);
                        let sig = short_hash(&format!("var:{name}"), 12);
                        self.push_path(EntityKind::Variable, name, sig, node);
                    }
                }
            }
            "import_statement" | "import_from_statement" => {
                for child in Self::named_children_of(node) {
                    match child.kind() {
                        "dotted_name" => {
                            let name = self.text(child);
                            let sig = short_hash(&format!("import:{name}"), 12);
                            self.push_path(EntityKind::Import, name, sig, node);
                        }
                        "aliased_import" => {
                            let alias = child
                                .child_by_field_name("alias")
                                .or_else(|| child.child_by_field_name("name"))
                                .map(|n| self.text(n))
                                .unwrap_or("");
                            let sig = short_hash(&format!("import:{alias}"), 12);
                            self.push_path(EntityKind::Import, alias, sig, node);
                        }
                        _ => {}
                    }
                }
            }
            _ => {
                for child in Self::named_children_of(node) {
                    self.visit(child);
                }
            }
        }
    }

    fn visit_definition(&mut self, node: Node, kind: EntityKind) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node).to_string();
        let body_hash = short_hash(self.text(node), 8);
        let sig = short_hash(&format!("{kind}:{name}|body:{body_hash}"), 12);
        self.push_path(kind, &name, sig, node);

        self.scope_chain.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body);
        }
        self.scope_chain.pop();
    }
}

/// The deepest-nested entity whose span contains `line`.
pub fn find_entity_at_position(paths: &[SemanticPath], line: u32) -> Option<&SemanticPath> {
    paths
        .iter()
        .filter(|p| p.line_start <= line && line <= p.line_end)
        .max_by_key(|p| p.scope_depth())
}

/// LEGB-like resolution: search from the innermost enclosing scope outward
/// for a path with the given name.
pub fn resolve_name<'a>(
    name: &str,
    scope_chain: &[String],
    paths: &'a [SemanticPath],
) -> Option<&'a SemanticPath> {
    for depth in (0..=scope_chain.len()).rev() {
        let search_scope = &scope_chain[..depth];
        if let Some(found) = paths
            .iter()
            .find(|p| p.name == name && p.scope_chain == search_scope)
        {
            return Some(found);
        }
    }
    None
}

/// Group paths by the file they belong to.
pub fn index_by_file(paths: Vec<SemanticPath>) -> HashMap<String, Vec<SemanticPath>> {
    let mut index: HashMap<String, Vec<SemanticPath>> = HashMap::new();
    for path in paths {
        index.entry(path.file_path.clone()).or_default().push(path);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "\
class UserService:
    def get_user(self, user_id):
        record = fetch(user_id)
        return record

def fetch(user_id):
    return user_id
";

    #[test]
    fn paths_carry_scope_chains() {
        let paths = extract_semantic_paths(SRC, "svc.py");
        let get_user = paths.iter().find(|p| p.name == "get_user").unwrap();
        assert_eq!(get_user.scope_chain, vec!["UserService"]);
        assert_eq!(get_user.kind, EntityKind::Function);

        let fetch = paths.iter().find(|p| p.name == "fetch").unwrap();
        assert!(fetch.scope_chain.is_empty());
        assert!(get_user.fqn().starts_with("svc.py::UserService::"));
    }

    #[test]
    fn resolve_prefers_inner_scope() {
        let paths = extract_semantic_paths(SRC, "svc.py");
        let scope = vec!["UserService".to_string()];
        let resolved = resolve_name("get_user", &scope, &paths).unwrap();
        assert_eq!(resolved.scope_chain, vec!["UserService"]);

        // Module-level lookup still finds top-level definitions.
        let resolved = resolve_name("fetch", &[], &paths).unwrap();
        assert!(resolved.scope_chain.is_empty());
        assert!(resolve_name("missing", &[], &paths).is_none());
    }

    #[test]
    fn entity_at_position_is_deepest() {
        let paths = extract_semantic_paths(SRC, "svc.py");
        let hit = find_entity_at_position(&paths, 3).unwrap();
        assert_eq!(hit.name, "record");
    }
}
