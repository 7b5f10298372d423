// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use arbor::inline::inline_assets;
use arbor::model::{EntryKind, Workspace};
use arbor::ops::{apply_op, ApplyResult, Op};
use arbor::path;
use arbor::view::visible_rows;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `tree.lookup`, `tree.ops`, `tree.inline`
// - Case IDs (the string after the `/`) must remain stable across refactors so results stay
//   comparable over time.
fn checksum_apply_result(result: &ApplyResult) -> u64 {
    let mut acc = 0u64;
    acc = acc.wrapping_mul(131).wrapping_add(result.changed as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.delta.added.len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.delta.updated.len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.delta.removed.len() as u64);
    acc
}

fn benches_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree.lookup");

    for (label, case) in [("medium", fixtures::Case::Medium), ("large", fixtures::Case::Large)] {
        let tree = fixtures::tree(case);
        let (deep_ids, deep_path) = fixtures::deepest_folder(case);
        let deepest = deep_ids.last().cloned().expect("deepest folder");
        let last_file = fixtures::id("file:root_f5.json");

        group.bench_function(format!("find_by_id_{label}"), |b| {
            b.iter(|| black_box(tree.find_by_id(black_box(&last_file)).is_some()))
        });
        group.bench_function(format!("find_path_ids_{label}"), |b| {
            b.iter(|| black_box(tree.find_path_ids(black_box(&deepest)).map(|ids| ids.len())))
        });
        group.bench_function(format!("resolve_{label}"), |b| {
            let reference = format!("../{deep_path}/./");
            let base = &deep_ids[..1];
            b.iter(|| black_box(path::resolve(&tree, black_box(&reference), base)))
        });
        group.bench_function(format!("visible_rows_{label}"), |b| {
            b.iter(|| black_box(visible_rows(&tree, Some(&last_file)).len()))
        });
    }

    group.finish();
}

fn benches_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree.ops");

    let tree = fixtures::tree(fixtures::Case::Large);
    let (deep_ids, _) = fixtures::deepest_folder(fixtures::Case::Large);
    let deepest = deep_ids.last().cloned().expect("deepest folder");
    let first = deep_ids[0].clone();
    let sibling = fixtures::id("dir:root_d3");
    let active = fixtures::markup_in(deepest.as_str().trim_start_matches("dir:"));
    let mut template = Workspace::new(tree);
    template.set_active_file_id(Some(active.clone()));

    let cases = [
        (
            "create_deep",
            Op::Create {
                entry_id: fixtures::id("bench-new"),
                kind: EntryKind::File,
                name: "new.js".to_owned(),
                parent_id: Some(deepest.clone()),
            },
        ),
        ("rename_active", Op::Rename { entry_id: active.clone(), name: "renamed.py".to_owned() }),
        ("move_subtree", Op::Move { entry_id: first.clone(), target_folder_id: sibling }),
        ("delete_active_subtree", Op::Delete { entry_id: first }),
    ];

    for (label, op) in cases {
        group.bench_function(label, |b| {
            b.iter_batched(
                || template.clone(),
                |mut workspace| {
                    let result = apply_op(&mut workspace, black_box(&op)).expect("apply_op");
                    black_box(checksum_apply_result(&result))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn benches_inline(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree.inline");

    let tree = fixtures::tree(fixtures::Case::Medium);
    let top = fixtures::markup_in("root");
    let nested = fixtures::markup_in("root_d0_d0_d0");

    group.bench_function("top_level", |b| {
        b.iter(|| black_box(inline_assets(&tree, black_box(&top)).expect("inline").html.len()))
    });
    group.bench_function("nested", |b| {
        b.iter(|| black_box(inline_assets(&tree, black_box(&nested)).expect("inline").html.len()))
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_lookup, benches_ops, benches_inline
}
criterion_main!(benches);
