//! Regex-based extractors: declarations, imports, scoping, and filters per
//! language.

use atlas_core::{Entity, EntityKind};
use atlas_extract::{
    CExtractor, CppExtractor, JavaExtractor, JavaScriptExtractor, LanguageExtractor,
    RustExtractor, TypeScriptExtractor,
};

fn names(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.name.as_str()).collect()
}

fn find<'e>(entities: &'e [Entity], name: &str) -> &'e Entity {
    entities
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("entity {name} not found in {:?}", names(entities)))
}

// ── TypeScript ──────────────────────────────────────────────────────────

const TS_SRC: &str = "\
import { fetchUser } from './api';
import Store from './store';
import * as utils from './utils';

export function loadUser(id: string): Promise<UserRecord> {
    return fetchUser(id);
}

export const double = (n: number) => n * 2;

export class UserStore extends BaseStore {
    load(id: string) {
        return loadUser(id);
    }
}

export interface Pageable {
    page: number;
}

export type UserId = string;
";

#[test]
fn typescript_declarations_and_imports() {
    let entities = TypeScriptExtractor.extract(TS_SRC, "store.ts");

    let fetch_user = find(&entities, "fetchUser");
    assert_eq!(fetch_user.kind, EntityKind::Import);
    assert_eq!(fetch_user.imports, vec![("./api".to_string(), "fetchUser".to_string())]);
    assert_eq!(find(&entities, "Store").imports[0].0, "./store");
    assert_eq!(find(&entities, "utils").imports[0].0, "./utils");

    assert_eq!(find(&entities, "loadUser").kind, EntityKind::Function);
    assert_eq!(find(&entities, "double").kind, EntityKind::Function);
    assert_eq!(find(&entities, "Pageable").kind, EntityKind::Class);
    assert_eq!(find(&entities, "UserId").kind, EntityKind::Variable);

    let store = find(&entities, "UserStore");
    assert_eq!(store.inherits, vec!["BaseStore"]);
}

#[test]
fn typescript_scopes_methods_and_extracts_calls() {
    let entities = TypeScriptExtractor.extract(TS_SRC, "store.ts");
    let load = find(&entities, "UserStore.load");
    assert_eq!(load.kind, EntityKind::Function);
    assert!(load.calls.contains(&"loadUser".to_string()), "got {:?}", load.calls);

    let load_user = find(&entities, "loadUser");
    assert!(load_user.calls.contains(&"fetchUser".to_string()));
    assert!(load_user.type_refs.contains(&"UserRecord".to_string()));
    assert!(!load_user.type_refs.contains(&"Promise".to_string()));
}

#[test]
fn typescript_import_aliases_bind_local_names() {
    let src = "import { original as alias, plain } from './m';\n";
    let entities = TypeScriptExtractor.extract(src, "a.ts");
    let got = names(&entities);
    assert!(got.contains(&"alias"));
    assert!(got.contains(&"plain"));
    assert!(!got.contains(&"original"));
}

#[test]
fn tsx_components_count_as_calls() {
    let src = "\
import { Panel } from './panel';

export function Dashboard() {
    return <Panel title=\"overview\" />;
}
";
    let entities = TypeScriptExtractor.extract(src, "dash.tsx");
    let dashboard = find(&entities, "Dashboard");
    assert!(dashboard.calls.contains(&"Panel".to_string()), "got {:?}", dashboard.calls);
}

// ── JavaScript ──────────────────────────────────────────────────────────

#[test]
fn javascript_skips_type_forms() {
    let src = "\
const add = (a, b) => a + b;

class Queue {
    enqueue_item(x) {
        store_item(x);
    }
}
";
    let entities = JavaScriptExtractor.extract(src, "q.js");
    let got = names(&entities);
    assert!(got.contains(&"add"));
    assert!(got.contains(&"Queue"));
    assert!(got.contains(&"Queue.enqueue_item"));

    let enqueue = find(&entities, "Queue.enqueue_item");
    assert!(enqueue.calls.contains(&"store_item".to_string()));
    assert!(enqueue.type_refs.is_empty());

    // Common array methods never become calls.
    let src = "function drain(items) {\n    items.forEach(render_row);\n}\n";
    let entities = JavaScriptExtractor.extract(src, "d.js");
    let drain = find(&entities, "drain");
    assert!(!drain.calls.iter().any(|c| c.contains("forEach")), "got {:?}", drain.calls);
}

#[test]
fn javascript_require_imports() {
    let src = "const { readConfig } = require('./config');\nconst app = require('./app');\n";
    let entities = JavaScriptExtractor.extract(src, "main.js");
    assert_eq!(find(&entities, "readConfig").imports[0].0, "./config");
    assert_eq!(find(&entities, "app").imports[0].0, "./app");
}

// ── Rust ────────────────────────────────────────────────────────────────

const RUST_SRC: &str = "\
use crate::store::Store;
use serde::{Serialize, Deserialize};
use std::collections::HashMap as Map;
use crate::util::*;

mod helpers;

#[derive(Debug)]
pub struct Engine {
    store: Store,
}

impl Runner for Engine {
    fn run(&self) {
        process_items();
    }
}

pub fn process_items() {
}
";

#[test]
fn rust_use_forms() {
    let entities = RustExtractor.extract(RUST_SRC, "engine.rs");
    assert_eq!(find(&entities, "Store").imports, vec![("store".to_string(), "Store".to_string())]);
    assert_eq!(find(&entities, "Serialize").imports[0].0, "serde");
    assert_eq!(find(&entities, "Deserialize").imports[0].0, "serde");
    assert_eq!(find(&entities, "Map").imports[0].0, "std::collections");
    assert_eq!(find(&entities, "*").imports, vec![("util".to_string(), "*".to_string())]);
}

#[test]
fn rust_impl_for_maps_to_inherits() {
    let entities = RustExtractor.extract(RUST_SRC, "engine.rs");
    let engine_impl = entities
        .iter()
        .find(|e| e.name == "Engine" && !e.inherits.is_empty())
        .expect("impl entity with trait");
    assert_eq!(engine_impl.inherits, vec!["Runner"]);

    let run = find(&entities, "Engine.run");
    assert!(run.calls.contains(&"process_items".to_string()));

    assert_eq!(find(&entities, "helpers").kind, EntityKind::ModuleCode);
}

#[test]
fn rust_attributes_are_decorators() {
    let entities = RustExtractor.extract(RUST_SRC, "engine.rs");
    let derived = entities
        .iter()
        .find(|e| e.name == "Engine" && e.decorators.contains(&"derive".to_string()))
        .is_some();
    assert!(derived, "struct should carry its derive attribute");
}

#[test]
fn rust_common_methods_are_filtered() {
    let src = "\
fn gather(xs: Vec<u32>) -> Vec<u32> {
    let out = xs.iter().map(double_item).collect();
    transform_all(out)
}
";
    let entities = RustExtractor.extract(src, "g.rs");
    let gather = find(&entities, "gather");
    assert!(gather.calls.contains(&"transform_all".to_string()));
    assert!(!gather.calls.iter().any(|c| c.ends_with("iter") || c.ends_with("collect")),
        "got {:?}", gather.calls);
}

// ── C ───────────────────────────────────────────────────────────────────

#[test]
fn c_includes_and_declarations() {
    let src = "\
#include \"list.h\"
#include <stdio.h>

#define MAX_ITEMS 64

struct Node {
    int value;
};

static int count_items(struct Node *head) {
    return walk_list(head);
}
";
    let entities = CExtractor.extract(src, "list.c");

    assert_eq!(find(&entities, "list.h").imports, vec![(".".to_string(), "list.h".to_string())]);
    assert_eq!(find(&entities, "stdio.h").imports, vec![(String::new(), "stdio.h".to_string())]);

    assert_eq!(find(&entities, "MAX_ITEMS").kind, EntityKind::Variable);
    assert_eq!(find(&entities, "Node").kind, EntityKind::Class);

    let count = find(&entities, "count_items");
    assert_eq!(count.kind, EntityKind::Function);
    assert!(count.calls.contains(&"walk_list".to_string()));
    assert!(!count.calls.iter().any(|c| c == "printf"));
}

// ── C++ ─────────────────────────────────────────────────────────────────

#[test]
fn cpp_classes_namespaces_and_constructors() {
    let src = "\
#include \"engine.h\"
#include <vector>

namespace gfx {

class Renderer : public Widget {
public:
    Renderer(int w) {
        init_buffers();
    }
};

}

void draw_frame() {
    render_pass();
}
";
    let entities = CppExtractor.extract(src, "render.cpp");

    assert_eq!(find(&entities, "engine.h").imports[0].0, ".");
    assert_eq!(find(&entities, "vector").imports[0].0, "");

    let renderer = find(&entities, "gfx.Renderer");
    assert_eq!(renderer.kind, EntityKind::Class);
    assert_eq!(renderer.inherits, vec!["Widget"]);

    let ctor = find(&entities, "gfx.Renderer.Renderer");
    assert_eq!(ctor.kind, EntityKind::Function);
    assert!(ctor.calls.contains(&"init_buffers".to_string()));

    let draw = find(&entities, "draw_frame");
    assert!(draw.calls.contains(&"render_pass".to_string()));
}

// ── Java ────────────────────────────────────────────────────────────────

#[test]
fn java_classes_methods_and_annotations() {
    let src = "\
import java.util.List;
import static java.util.Collections.emptyList;

public class OrderService extends BaseService {
    @Transactional
    @Override
    public void submit(Order order) {
        validate_input(order);
    }
}
";
    let entities = JavaExtractor.extract(src, "OrderService.java");

    assert_eq!(find(&entities, "List").imports, vec![("java.util".to_string(), "List".to_string())]);
    assert_eq!(
        find(&entities, "emptyList").imports,
        vec![("java.util.Collections".to_string(), "emptyList".to_string())]
    );

    let service = find(&entities, "OrderService");
    assert_eq!(service.inherits, vec!["BaseService"]);

    let submit = find(&entities, "OrderService.submit");
    assert!(submit.calls.contains(&"validate_input".to_string()));
    // @Override is trivial and dropped; @Transactional is kept.
    assert_eq!(submit.decorators, vec!["Transactional"]);
}

#[test]
fn java_wildcard_import() {
    let src = "import com.example.util.*;\n";
    let entities = JavaExtractor.extract(src, "A.java");
    assert_eq!(
        find(&entities, "*").imports,
        vec![("com.example.util".to_string(), "*".to_string())]
    );
}
