//! Python extractor built on tree-sitter.
//!
//! Produces one entity per function/method (scoped names), class,
//! module-level variable, and imported symbol, plus a synthetic
//! `__module__` entity for bare module-level calls. Call names are
//! qualified through `self`/`cls` and the local/module type context;
//! stdlib and known-external calls are dropped.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;

use tree_sitter::{Node, Parser, Tree};

use atlas_core::filters::{
    COMMON_ATTR_METHODS, KNOWN_EXTERNAL_PACKAGES, PY_BUILTINS, STDLIB_MODULES,
};
use atlas_core::{Entity, EntityKind, short_hash};

use crate::regex_base::replace_first_ident;
use crate::registry::LanguageExtractor;

/// Type-annotation names that never become `type_refs`.
static PY_TYPE_BUILTINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "str", "int", "float", "bool", "list", "dict", "set", "tuple",
        "None", "bytes", "complex", "object", "type",
        "Any", "Optional", "List", "Dict", "Set", "Tuple", "Union", "Type",
        "Callable", "Iterator", "Generator", "Sequence", "Mapping",
        "FrozenSet", "Deque", "DefaultDict", "OrderedDict", "Counter",
        "ClassVar", "Final", "Literal", "TypeVar", "Protocol",
    ])
});

pub(crate) fn parse_python(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

/// Extract all entities from Python source. Empty source and source that
/// fails to parse both yield an empty list.
pub fn extract_python(source: &str) -> Vec<Entity> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    let Some(tree) = parse_python(source) else {
        tracing::debug!("python parser unavailable");
        return Vec::new();
    };
    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!("python source has syntax errors, skipping extraction");
        return Vec::new();
    }

    let mut walker = PyWalker::new(source);
    walker.collect_import_context(root);
    walker.collect_module_type_context(root);
    walker.visit(root);
    walker.extract_module_calls(root);
    walker.entities
}

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".py", ".pyi"]
    }

    fn extract(&self, source: &str, _file_path: &str) -> Vec<Entity> {
        extract_python(source)
    }
}

fn line_start(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn line_end(node: Node) -> u32 {
    node.end_position().row as u32 + 1
}

struct PyWalker<'a> {
    source: &'a str,
    scope: Vec<String>,
    entities: Vec<Entity>,
    /// Local names bound to stdlib or known-external modules/symbols.
    stdlib_names: HashSet<String>,
    /// PascalCase names imported from known-external packages; method calls
    /// on values of these types are dropped.
    external_types: HashSet<String>,
    /// Module-level variable name -> class name.
    module_types: HashMap<String, String>,
}

impl<'a> PyWalker<'a> {
    fn new(source: &'a str) -> Self {
        PyWalker {
            source,
            scope: Vec::new(),
            entities: Vec::new(),
            stdlib_names: HashSet::new(),
            external_types: HashSet::new(),
            module_types: HashMap::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn named_children_of(node: Node) -> Vec<Node> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    /// Normalized token dump of a subtree: comments skipped, whitespace
    /// collapsed, every leaf token kept verbatim. Hashing this instead of
    /// raw text makes whitespace/comment edits non-semantic.
    fn dump(&self, node: Node, out: &mut String) {
        if node.kind() == "comment" {
            return;
        }
        if node.child_count() == 0 {
            out.push_str(self.text(node));
            out.push(' ');
            return;
        }
        out.push('(');
        out.push_str(node.kind());
        out.push(' ');
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.dump(child, out);
        }
        out.push(')');
    }

    fn node_dump(&self, node: Node) -> String {
        let mut out = String::new();
        self.dump(node, &mut out);
        out
    }

    fn signature_hash(&self, node: Node) -> String {
        short_hash(&self.node_dump(node), 12)
    }

    fn structure_hash(&self, node: Node, bare_name: &str) -> String {
        short_hash(&replace_first_ident(&self.node_dump(node), bare_name), 12)
    }

    fn scoped_name(&self, bare: &str) -> String {
        if self.scope.is_empty() {
            bare.to_string()
        } else {
            format!("{}.{bare}", self.scope.join("."))
        }
    }

    // ── Import context pre-passes ───────────────────────────────────────

    /// `(original_dotted_name, local_name)` pairs of an import statement.
    fn import_statement_names(&self, node: Node) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for child in Self::named_children_of(node) {
            match child.kind() {
                "dotted_name" => {
                    let t = self.text(child).to_string();
                    out.push((t.clone(), t));
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or("");
                    let alias = child
                        .child_by_field_name("alias")
                        .map(|n| self.text(n))
                        .unwrap_or(name);
                    out.push((name.to_string(), alias.to_string()));
                }
                _ => {}
            }
        }
        out
    }

    /// `(module, [(original_name, local_name)])` of a from-import.
    fn import_from_names(&self, node: Node) -> (String, Vec<(String, String)>) {
        let module_node = node.child_by_field_name("module_name");
        let module = module_node
            .map(|n| self.text(n))
            .unwrap_or("")
            .trim_start_matches('.')
            .to_string();
        let module_id = module_node.map(|n| n.id());

        let mut names = Vec::new();
        for child in Self::named_children_of(node) {
            if Some(child.id()) == module_id {
                continue;
            }
            match child.kind() {
                "dotted_name" => {
                    let t = self.text(child).to_string();
                    names.push((t.clone(), t));
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or("");
                    let alias = child
                        .child_by_field_name("alias")
                        .map(|n| self.text(n))
                        .unwrap_or(name);
                    names.push((name.to_string(), alias.to_string()));
                }
                "wildcard_import" => names.push(("*".to_string(), "*".to_string())),
                _ => {}
            }
        }
        (module, names)
    }

    /// Pre-pass: names bound to stdlib/external modules, and PascalCase
    /// types imported from external packages.
    fn collect_import_context(&mut self, node: Node) {
        match node.kind() {
            "import_statement" => {
                for (full, local) in self.import_statement_names(node) {
                    let top = full.split('.').next().unwrap_or("");
                    let external = KNOWN_EXTERNAL_PACKAGES.contains(top);
                    if STDLIB_MODULES.contains(top) || external {
                        if external && local.chars().next().is_some_and(|c| c.is_uppercase()) {
                            self.external_types.insert(local.clone());
                        }
                        self.stdlib_names.insert(local);
                    }
                }
            }
            "import_from_statement" => {
                let (module, names) = self.import_from_names(node);
                let top = module.split('.').next().unwrap_or("");
                let external = KNOWN_EXTERNAL_PACKAGES.contains(top);
                if STDLIB_MODULES.contains(top) || external {
                    for (_orig, local) in names {
                        if external && local.chars().next().is_some_and(|c| c.is_uppercase()) {
                            self.external_types.insert(local.clone());
                        }
                        self.stdlib_names.insert(local);
                    }
                }
            }
            _ => {
                for child in Self::named_children_of(node) {
                    self.collect_import_context(child);
                }
            }
        }
    }

    /// Inner expression of a `type` annotation wrapper, if any.
    fn annotation_inner(node: Node) -> Node {
        if node.kind() == "type" {
            node.named_child(0).unwrap_or(node)
        } else {
            node
        }
    }

    /// Class name of an annotation when it is a plain or dotted name.
    fn annotation_name(&self, node: Node) -> Option<String> {
        let inner = Self::annotation_inner(node);
        match inner.kind() {
            "identifier" => Some(self.text(inner).to_string()),
            "attribute" => inner
                .child_by_field_name("attribute")
                .map(|a| self.text(a).to_string()),
            _ => None,
        }
    }

    /// Pre-pass: module-level `x = SomeClass()` / `x: SomeClass` bindings.
    fn collect_module_type_context(&mut self, root: Node) {
        for stmt in Self::named_children_of(root) {
            if stmt.kind() != "expression_statement" {
                continue;
            }
            for assign in Self::named_children_of(stmt) {
                if assign.kind() != "assignment" {
                    continue;
                }
                let Some(left) = assign.child_by_field_name("left") else {
                    continue;
                };
                if left.kind() != "identifier" {
                    continue;
                }
                let target = self.text(left).to_string();

                if let Some(right) = assign.child_by_field_name("right") {
                    if right.kind() == "call" {
                        if let Some(func) = right.child_by_field_name("function") {
                            match func.kind() {
                                "identifier" => {
                                    self.module_types
                                        .insert(target.clone(), self.text(func).to_string());
                                }
                                "attribute" => {
                                    if let Some(attr) = func.child_by_field_name("attribute") {
                                        self.module_types
                                            .insert(target.clone(), self.text(attr).to_string());
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                if let Some(ann) = assign.child_by_field_name("type") {
                    let inner = Self::annotation_inner(ann);
                    if inner.kind() == "identifier" {
                        self.module_types.insert(target, self.text(inner).to_string());
                    }
                }
            }
        }
    }

    // ── Visitors ────────────────────────────────────────────────────────

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function(node, Vec::new()),
            "class_definition" => self.visit_class(node, Vec::new()),
            "decorated_definition" => {
                let decorators = self.decorator_names(node);
                if let Some(def) = node.child_by_field_name("definition") {
                    match def.kind() {
                        "function_definition" => self.visit_function(def, decorators),
                        "class_definition" => self.visit_class(def, decorators),
                        _ => {}
                    }
                }
            }
            "import_statement" => self.visit_import(node),
            "import_from_statement" => self.visit_import_from(node),
            "expression_statement" => {
                if self.scope.is_empty() {
                    for child in Self::named_children_of(node) {
                        if child.kind() == "assignment" {
                            self.visit_module_assignment(child);
                        }
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

    fn visit_function(&mut self, node: Node, decorators: Vec<String>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let bare = self.text(name_node).to_string();
        let type_ctx = self.extract_type_context(node);

        let mut entity = Entity::new(
            EntityKind::Function,
            self.scoped_name(&bare),
            line_start(node),
            line_end(node),
            self.signature_hash(node),
            self.structure_hash(node, &bare),
        );
        entity.calls = self.extract_calls(node, &type_ctx);
        entity.uses = self.extract_uses(node);
        entity.type_refs = self.extract_type_refs(node);
        entity.params = self.param_names(node);
        entity.type_context = type_ctx;
        entity.decorators = decorators;
        self.entities.push(entity);

        self.scope.push(bare);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body);
        }
        self.scope.pop();
    }

    fn visit_class(&mut self, node: Node, decorators: Vec<String>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let bare = self.text(name_node).to_string();

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for base in Self::named_children_of(superclasses) {
                match base.kind() {
                    "identifier" => bases.push(self.text(base).to_string()),
                    "attribute" => {
                        if let Some(attr) = base.child_by_field_name("attribute") {
                            bases.push(self.text(attr).to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut entity = Entity::new(
            EntityKind::Class,
            self.scoped_name(&bare),
            line_start(node),
            line_end(node),
            self.signature_hash(node),
            self.structure_hash(node, &bare),
        );
        entity.calls = self.extract_calls(node, &HashMap::new());
        entity.uses = self.extract_uses(node);
        entity.inherits = bases;
        entity.decorators = decorators;
        self.entities.push(entity);

        self.scope.push(bare);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body);
        }
        self.scope.pop();
    }

    fn visit_import(&mut self, node: Node) {
        let sig = short_hash(&format!("import:{}", self.node_dump(node)), 12);
        let structure = short_hash("other:import_statement", 12);
        for (full, local) in self.import_statement_names(node) {
            let mut entity = Entity::new(
                EntityKind::Import,
                local,
                line_start(node),
                line_end(node),
                sig.clone(),
                structure.clone(),
            );
            entity.imports = vec![(String::new(), full)];
            self.entities.push(entity);
        }
    }

    fn visit_import_from(&mut self, node: Node) {
        let sig = short_hash(&format!("import:{}", self.node_dump(node)), 12);
        let structure = short_hash("other:import_from_statement", 12);
        let (module, names) = self.import_from_names(node);
        for (orig, local) in names {
            let mut entity = Entity::new(
                EntityKind::Import,
                local,
                line_start(node),
                line_end(node),
                sig.clone(),
                structure.clone(),
            );
            entity.imports = vec![(module.clone(), orig)];
            self.entities.push(entity);
        }
    }

    fn visit_module_assignment(&mut self, assign: Node) {
        let Some(left) = assign.child_by_field_name("left") else {
            return;
        };
        // Bare annotations (`x: T`) bind no value and produce no entity.
        let Some(right) = assign.child_by_field_name("right") else {
            return;
        };

        let targets: Vec<String> = match left.kind() {
            "identifier" => vec![self.text(left).to_string()],
            "pattern_list" | "tuple_pattern" => Self::named_children_of(left)
                .into_iter()
                .filter(|n| n.kind() == "identifier")
                .map(|n| self.text(n).to_string())
                .collect(),
            _ => return,
        };
        if targets.is_empty() {
            return;
        }

        let right_dump = self.node_dump(right);
        for target in targets {
            let mut uses = self.extract_uses(right);
            if target == "__all__" && matches!(right.kind(), "list" | "tuple") {
                uses = Self::named_children_of(right)
                    .into_iter()
                    .filter_map(|n| self.string_value(n))
                    .collect();
            }

            let mut entity = Entity::new(
                EntityKind::Variable,
                target.clone(),
                line_start(assign),
                line_end(assign),
                short_hash(&format!("var:{target}|{right_dump}"), 12),
                short_hash("other:assignment", 12),
            );
            entity.uses = uses;
            self.entities.push(entity);
        }
    }

    fn string_value(&self, node: Node) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        let mut out = String::new();
        let mut found = false;
        for child in Self::named_children_of(node) {
            if child.kind() == "string_content" {
                out.push_str(self.text(child));
                found = true;
            }
        }
        found.then_some(out)
    }

    /// Synthetic `__module__` entity collecting bare module-level calls.
    fn extract_module_calls(&mut self, root: Node) {
        let mut module_calls = Vec::new();
        for stmt in Self::named_children_of(root) {
            if stmt.kind() != "expression_statement" {
                continue;
            }
            for expr in Self::named_children_of(stmt) {
                if expr.kind() != "call" {
                    continue;
                }
                let Some(func) = expr.child_by_field_name("function") else {
                    continue;
                };
                match func.kind() {
                    "identifier" => {
                        let name = self.text(func);
                        if !PY_BUILTINS.contains(name) && !self.stdlib_names.contains(name) {
                            module_calls.push(name.to_string());
                        }
                    }
                    "attribute" => {
                        let bare = func
                            .child_by_field_name("attribute")
                            .map(|a| self.text(a))
                            .unwrap_or("");
                        let receiver = func
                            .child_by_field_name("object")
                            .filter(|o| o.kind() == "identifier")
                            .map(|o| self.text(o));
                        if receiver.is_some_and(|r| self.stdlib_names.contains(r)) {
                            continue;
                        }
                        if !bare.is_empty()
                            && !PY_BUILTINS.contains(bare)
                            && !COMMON_ATTR_METHODS.contains(bare)
                        {
                            module_calls.push(bare.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        if !module_calls.is_empty() {
            let sig = short_hash(&format!("module:{}", module_calls.join(",")), 12);
            let mut entity =
                Entity::new(EntityKind::ModuleCode, "__module__", 1, 1, sig, "module");
            entity.calls = module_calls;
            self.entities.push(entity);
        }
    }

    // ── Per-entity extraction helpers ───────────────────────────────────

    fn decorator_names(&self, decorated: Node) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = decorated.walk();
        for child in decorated.children(&mut cursor) {
            if child.kind() != "decorator" {
                continue;
            }
            let raw = self.text(child).trim_start_matches('@');
            let name: String = raw
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
                .collect();
            if !name.is_empty() {
                out.push(name);
            }
        }
        out
    }

    fn param_names(&self, func: Node) -> Vec<String> {
        let Some(params) = func.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for child in Self::named_children_of(params) {
            let name = match child.kind() {
                "identifier" => Some(self.text(child)),
                "typed_parameter" => child
                    .named_child(0)
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| self.text(n)),
                "default_parameter" | "typed_default_parameter" => child
                    .child_by_field_name("name")
                    .map(|n| self.text(n)),
                _ => None,
            };
            if let Some(name) = name {
                if name != "self" && name != "cls" {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Breadth-first node sweep, mirroring the order of a full AST walk.
    fn walk_subtree(node: Node) -> Vec<Node> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            for child in Self::named_children_of(current) {
                queue.push_back(child);
            }
        }
        out
    }

    /// Calls within a subtree, qualified through `self`/`cls` and the type
    /// context, with builtin/stdlib/common-method filtering.
    fn extract_calls(&self, node: Node, type_ctx: &HashMap<String, String>) -> Vec<String> {
        let enclosing_class = self.scope.last().cloned();
        let mut calls = Vec::new();

        for current in Self::walk_subtree(node) {
            if current.kind() != "call" {
                continue;
            }
            let Some(func) = current.child_by_field_name("function") else {
                continue;
            };
            match func.kind() {
                "identifier" => {
                    let name = self.text(func);
                    if !PY_BUILTINS.contains(name) && !self.stdlib_names.contains(name) {
                        calls.push(name.to_string());
                    }
                }
                "attribute" => {
                    let bare = func
                        .child_by_field_name("attribute")
                        .map(|a| self.text(a))
                        .unwrap_or("");
                    if bare.is_empty() {
                        continue;
                    }
                    let receiver = func
                        .child_by_field_name("object")
                        .filter(|o| o.kind() == "identifier")
                        .map(|o| self.text(o));

                    if let (Some(r), Some(class_name)) = (receiver, &enclosing_class) {
                        if r == "self" || r == "cls" {
                            calls.push(format!("{class_name}.{bare}"));
                            continue;
                        }
                    }
                    if receiver.is_some_and(|r| self.stdlib_names.contains(r)) {
                        continue;
                    }
                    if let Some(class_name) =
                        receiver.and_then(|r| type_ctx.get(r).or_else(|| self.module_types.get(r)))
                    {
                        // Type-qualified calls stay even for common method
                        // names: the context makes the edge precise.
                        if self.external_types.contains(class_name) {
                            continue;
                        }
                        calls.push(format!("{class_name}.{bare}"));
                        continue;
                    }
                    if !PY_BUILTINS.contains(bare) && !COMMON_ATTR_METHODS.contains(bare) {
                        match receiver {
                            Some(r) if !PY_BUILTINS.contains(r) => {
                                calls.push(format!("{r}.{bare}"));
                            }
                            _ => calls.push(bare.to_string()),
                        }
                    }
                }
                _ => {}
            }
        }
        calls
    }

    /// Whether an identifier reads a value rather than naming or binding one.
    fn is_load_context(&self, node: Node) -> bool {
        let Some(parent) = node.parent() else {
            return true;
        };
        let in_field = |field: &str| {
            parent
                .child_by_field_name(field)
                .map(|f| f.id())
                == Some(node.id())
        };
        match parent.kind() {
            "attribute" => !in_field("attribute"),
            "keyword_argument" => !in_field("name"),
            "function_definition" | "class_definition" => !in_field("name"),
            "parameters" | "typed_parameter" | "lambda_parameters" => false,
            "default_parameter" | "typed_default_parameter" => !in_field("name"),
            "assignment" | "augmented_assignment" => !in_field("left"),
            "for_statement" => !in_field("left"),
            "pattern_list" | "tuple_pattern" => false,
            _ => true,
        }
    }

    fn extract_uses(&self, node: Node) -> Vec<String> {
        let mut uses = Vec::new();
        for current in Self::walk_subtree(node) {
            if current.kind() == "identifier" && self.is_load_context(current) {
                uses.push(self.text(current).to_string());
            }
        }
        uses
    }

    fn collect_annotation(&self, node: Node, seen: &mut HashSet<String>, refs: &mut Vec<String>) {
        match node.kind() {
            "identifier" => {
                let name = self.text(node);
                if !PY_TYPE_BUILTINS.contains(name) && seen.insert(name.to_string()) {
                    refs.push(name.to_string());
                }
            }
            "attribute" => {
                if let Some(attr) = node.child_by_field_name("attribute") {
                    let name = self.text(attr);
                    if !PY_TYPE_BUILTINS.contains(name) && seen.insert(name.to_string()) {
                        refs.push(name.to_string());
                    }
                }
            }
            _ => {
                for child in Self::named_children_of(node) {
                    self.collect_annotation(child, seen, refs);
                }
            }
        }
    }

    /// Type annotation references from parameters and the return type.
    fn extract_type_refs(&self, func: Node) -> Vec<String> {
        let mut refs = Vec::new();
        let mut seen = HashSet::new();
        if let Some(params) = func.child_by_field_name("parameters") {
            for child in Self::named_children_of(params) {
                if let Some(ty) = child.child_by_field_name("type") {
                    self.collect_annotation(ty, &mut seen, &mut refs);
                }
            }
        }
        if let Some(ret) = func.child_by_field_name("return_type") {
            self.collect_annotation(ret, &mut seen, &mut refs);
        }
        refs
    }

    /// Variable-to-type map for one function: parameter annotations plus
    /// constructor and annotated assignments in the body.
    fn extract_type_context(&self, func: Node) -> HashMap<String, String> {
        let mut map = HashMap::new();

        if let Some(params) = func.child_by_field_name("parameters") {
            for child in Self::named_children_of(params) {
                let name = match child.kind() {
                    "typed_parameter" => child
                        .named_child(0)
                        .filter(|n| n.kind() == "identifier")
                        .map(|n| self.text(n)),
                    "typed_default_parameter" => child
                        .child_by_field_name("name")
                        .map(|n| self.text(n)),
                    _ => None,
                };
                let Some(name) = name else { continue };
                if name == "self" || name == "cls" {
                    continue;
                }
                if let Some(ty) = child.child_by_field_name("type") {
                    if let Some(type_name) = self.annotation_name(ty) {
                        map.insert(name.to_string(), type_name);
                    }
                }
            }
        }

        for current in Self::walk_subtree(func) {
            if current.kind() != "assignment" {
                continue;
            }
            let Some(left) = current.child_by_field_name("left") else {
                continue;
            };
            if left.kind() != "identifier" {
                continue;
            }
            let target = self.text(left).to_string();

            if let Some(right) = current.child_by_field_name("right") {
                if right.kind() == "call" {
                    if let Some(callee) = right.child_by_field_name("function") {
                        if callee.kind() == "identifier" {
                            map.insert(target.clone(), self.text(callee).to_string());
                        }
                    }
                }
            }
            if let Some(ann) = current.child_by_field_name("type") {
                let inner = Self::annotation_inner(ann);
                if inner.kind() == "identifier" {
                    map.insert(target, self.text(inner).to_string());
                }
            }
        }

        map
    }
}
