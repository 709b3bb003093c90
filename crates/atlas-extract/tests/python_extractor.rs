//! Python extraction: scoped names, call qualification, imports, hashes.

use atlas_core::EntityKind;
use atlas_extract::extract_python;

fn names(entities: &[atlas_core::Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.name.as_str()).collect()
}

fn find<'e>(entities: &'e [atlas_core::Entity], name: &str) -> &'e atlas_core::Entity {
    entities
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("entity {name} not found in {:?}", names(entities)))
}

#[test]
fn simple_function() {
    let entities = extract_python("def foo(x):\n    return x\n");
    assert_eq!(entities.len(), 1);
    let foo = &entities[0];
    assert_eq!(foo.kind, EntityKind::Function);
    assert_eq!(foo.name, "foo");
    assert_eq!(foo.line_start, 1);
    assert_eq!(foo.line_end, 2);
    assert_eq!(foo.params, vec!["x"]);
    assert_eq!(foo.signature_hash.len(), 12);
    assert_eq!(foo.structure_hash.len(), 12);
}

#[test]
fn empty_and_broken_source_yield_nothing() {
    assert!(extract_python("").is_empty());
    assert!(extract_python("   \n\n").is_empty());
    assert!(extract_python("def broken(:\n    return 1\n").is_empty());
}

#[test]
fn methods_get_scoped_names_and_self_calls_qualify() {
    let src = "\
class Service:
    def run(self):
        self.validate()

    def validate(self):
        pass
";
    let entities = extract_python(src);
    let got = names(&entities);
    assert!(got.contains(&"Service"));
    assert!(got.contains(&"Service.run"));
    assert!(got.contains(&"Service.validate"));

    let run = find(&entities, "Service.run");
    assert_eq!(run.calls, vec!["Service.validate"]);
    // self is never a parameter.
    assert!(run.params.is_empty());
}

#[test]
fn nested_functions_are_scoped() {
    let src = "\
def outer():
    def inner():
        pass
    return inner
";
    let entities = extract_python(src);
    let got = names(&entities);
    assert!(got.contains(&"outer"));
    assert!(got.contains(&"outer.inner"));
}

#[test]
fn class_bases_are_recorded() {
    let src = "\
class Child(Base, mixins.Sortable):
    pass
";
    let entities = extract_python(src);
    let child = find(&entities, "Child");
    assert_eq!(child.inherits, vec!["Base", "Sortable"]);
}

#[test]
fn one_import_entity_per_symbol() {
    let src = "\
import os
from api.auth import login as do_login, logout
";
    let entities = extract_python(src);
    let os_import = find(&entities, "os");
    assert_eq!(os_import.kind, EntityKind::Import);
    assert_eq!(os_import.imports, vec![(String::new(), "os".to_string())]);

    let login = find(&entities, "do_login");
    assert_eq!(login.imports, vec![("api.auth".to_string(), "login".to_string())]);
    let logout = find(&entities, "logout");
    assert_eq!(logout.imports, vec![("api.auth".to_string(), "logout".to_string())]);
}

#[test]
fn builtin_and_stdlib_calls_are_dropped() {
    let src = "\
import json

def dump(data):
    print(len(data))
    return json.dumps(data)
";
    let entities = extract_python(src);
    let dump = find(&entities, "dump");
    assert!(dump.calls.is_empty(), "got {:?}", dump.calls);
}

#[test]
fn typed_receivers_qualify_calls() {
    let src = "\
class Repo:
    def persist(self):
        pass

def store(r: Repo):
    r.persist()
";
    let entities = extract_python(src);
    let store = find(&entities, "store");
    assert_eq!(store.calls, vec!["Repo.persist"]);
    assert_eq!(store.type_context.get("r").map(String::as_str), Some("Repo"));
    assert_eq!(store.type_refs, vec!["Repo"]);
}

#[test]
fn constructor_assignment_feeds_type_context() {
    let src = "\
def build():
    svc = Service()
    svc.launch_all()
";
    let entities = extract_python(src);
    let build = find(&entities, "build");
    assert!(build.calls.contains(&"Service".to_string()));
    assert!(build.calls.contains(&"Service.launch_all".to_string()), "got {:?}", build.calls);
}

#[test]
fn external_typed_receivers_are_dropped() {
    let src = "\
from httpx import AsyncClient

def go(client: AsyncClient):
    client.stream_rows()
";
    let entities = extract_python(src);
    let go = find(&entities, "go");
    assert!(go.calls.is_empty(), "got {:?}", go.calls);
}

#[test]
fn module_level_calls_become_module_entity() {
    let src = "\
def setup():
    pass

setup()
";
    let entities = extract_python(src);
    let module = find(&entities, "__module__");
    assert_eq!(module.kind, EntityKind::ModuleCode);
    assert_eq!(module.calls, vec!["setup"]);

    // No module entity without bare module-level calls.
    let quiet = extract_python("def setup():\n    pass\n");
    assert!(!names(&quiet).contains(&"__module__"));
}

#[test]
fn module_variables_and_all_exports() {
    let src = "\
__all__ = [\"alpha\", \"beta\"]
LIMIT = 10
a, b = 1, 2
";
    let entities = extract_python(src);
    let all_var = find(&entities, "__all__");
    assert_eq!(all_var.kind, EntityKind::Variable);
    assert_eq!(all_var.uses, vec!["alpha", "beta"]);

    assert_eq!(find(&entities, "LIMIT").kind, EntityKind::Variable);
    // Tuple targets get one entity each.
    assert!(names(&entities).contains(&"a"));
    assert!(names(&entities).contains(&"b"));
}

#[test]
fn decorators_are_captured() {
    let src = "\
class Box:
    @property
    def value(self):
        return self._v

@app.route
def index():
    pass
";
    let entities = extract_python(src);
    assert_eq!(find(&entities, "Box.value").decorators, vec!["property"]);
    assert_eq!(find(&entities, "index").decorators, vec!["app.route"]);
}

#[test]
fn type_refs_cover_params_and_return() {
    let src = "\
def handle(req: Request, count: int) -> Response:
    return req
";
    let entities = extract_python(src);
    let handle = find(&entities, "handle");
    assert_eq!(handle.type_refs, vec!["Request", "Response"]);
}

#[test]
fn rename_keeps_structure_hash_stable() {
    let old = extract_python("def old_name(x):\n    return x\n");
    let new = extract_python("def new_name(x):\n    return x\n");
    assert_eq!(old[0].structure_hash, new[0].structure_hash);
    assert_ne!(old[0].signature_hash, new[0].signature_hash);
}

#[test]
fn whitespace_and_comments_do_not_change_signature() {
    let plain = extract_python("def f(x):\n    return x\n");
    let spaced = extract_python("def f(x):\n\n    return x\n");
    let commented = extract_python("def f(x):\n    # tally the total\n    return x\n");
    assert_eq!(plain[0].signature_hash, spaced[0].signature_hash);
    assert_eq!(plain[0].signature_hash, commented[0].signature_hash);

    let changed = extract_python("def f(x):\n    return x + 1\n");
    assert_ne!(plain[0].signature_hash, changed[0].signature_hash);
}

#[test]
fn uses_track_loaded_names() {
    let src = "\
def combine(a):
    total = a + OFFSET
    return total
";
    let entities = extract_python(src);
    let combine = find(&entities, "combine");
    assert!(combine.uses.contains(&"OFFSET".to_string()));
    assert!(combine.uses.contains(&"a".to_string()));
}
