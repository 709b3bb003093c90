//! Benchmark the incremental edit path: one edited file in an already
//! populated graph should stay fast enough for interactive use.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use atlas_bridge::Bridge;

fn module_source(index: usize, version: usize) -> String {
    let mut src = String::new();
    for f in 0..10 {
        src.push_str(&format!(
            "def func_{index}_{f}(x):\n    return helper_{index}(x) + {version}\n\n"
        ));
    }
    src.push_str(&format!("def helper_{index}(x):\n    return x\n"));
    src
}

fn populated_bridge(files: usize) -> (Bridge, Vec<String>) {
    let mut bridge = Bridge::new();
    let mut sources = Vec::new();
    for i in 0..files {
        let src = module_source(i, 0);
        bridge.process_change(&format!("pkg/mod_{i}.py"), "", &src);
        sources.push(src);
    }
    (bridge, sources)
}

fn bench_incremental_edit(c: &mut Criterion) {
    let (mut bridge, sources) = populated_bridge(20);
    let old = sources[7].clone();
    let new = module_source(7, 1);

    c.bench_function("process_change_single_file", |b| {
        b.iter(|| {
            let ops = bridge.process_change(black_box("pkg/mod_7.py"), &old, &new);
            black_box(ops);
            // Swap back so each iteration performs real work.
            let ops = bridge.process_change(black_box("pkg/mod_7.py"), &new, &old);
            black_box(ops);
        })
    });
}

fn bench_semantic_gate(c: &mut Criterion) {
    let (mut bridge, sources) = populated_bridge(5);
    let src = sources[2].clone();

    c.bench_function("semantic_gate_no_change", |b| {
        b.iter(|| {
            let ops = bridge.process_change(black_box("pkg/mod_2.py"), &src, &src);
            black_box(ops);
        })
    });
}

criterion_group!(benches, bench_incremental_edit, bench_semantic_gate);
criterion_main!(benches);
