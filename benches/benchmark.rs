use cladeshift::edit::TreeSession;
use cladeshift::layout::{LayoutConfig, OrderMode};
use cladeshift::{layout_newick_str, parse_newick_str};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const TREE_SIZES: &[(&str, usize)] = &[("n64", 64), ("n512", 512), ("n4096", 4096)];

/// Balanced binary tree with `num_leaves` leaves and branch lengths.
fn balanced_newick(num_leaves: usize) -> String {
    fn subtree(first: usize, count: usize, out: &mut String) {
        if count == 1 {
            out.push_str(&format!("T{first}:0.5"));
            return;
        }
        let left = count / 2;
        out.push('(');
        subtree(first, left, out);
        out.push(',');
        subtree(first + left, count - left, out);
        out.push_str("):1.25");
    }
    let mut newick = String::new();
    subtree(0, num_leaves, &mut newick);
    newick.push(';');
    newick
}

fn newick_parsing(c: &mut Criterion) {
    for (name, size) in TREE_SIZES {
        let newick = balanced_newick(*size);
        c.bench_function(&format!("parse {name}"), |b| {
            b.iter(|| parse_newick_str(black_box(&newick)).unwrap());
        });
    }
}

fn layout_pass(c: &mut Criterion) {
    let configs = [
        ("leaf_driven", LayoutConfig::new()),
        ("internal_labeled", LayoutConfig::new().with_order(OrderMode::InternalLabeled)),
    ];
    for (name, size) in TREE_SIZES {
        let newick = balanced_newick(*size);
        for (mode, config) in &configs {
            c.bench_function(&format!("layout {mode} {name}"), |b| {
                b.iter(|| layout_newick_str(black_box(&newick), config).unwrap());
            });
        }
    }
}

fn merge_cycle(c: &mut Criterion) {
    let newick = balanced_newick(512);
    c.bench_function("collapse rename expand n512", |b| {
        b.iter(|| {
            let mut session = TreeSession::new(newick.as_str(), LayoutConfig::new()).unwrap();
            let layout = session.layout().unwrap();
            let clade = layout.id(layout.tree().root().children()[0]).unwrap();
            session.collapse(clade).unwrap();
            session.rename(clade, "Merged").unwrap();
            session.expand(clade).unwrap();
        });
    });
}

criterion_group!(regression, newick_parsing, layout_pass);
criterion_group! {
    name = editing;
    config = Criterion::default().sample_size(10);
    targets = merge_cycle
}
criterion_main!(regression, editing);
