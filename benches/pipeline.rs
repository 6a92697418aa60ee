//! Benchmarks for the wmllint pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wmllint::parser::iterator::WmlIterator;
use wmllint::parser::translate_file;
use wmllint::registry::CorpusState;
use wmllint::report::Reporter;
use wmllint::rules::rewrite;
use wmllint::LintOptions;

/// A synthetic scenario with the constructs the pipeline spends time on:
/// nested tags, messages, a map block, and macro references.
fn synthetic_scenario(sides: usize, events: usize) -> String {
    let mut out = String::from("#textdomain wesnoth-bench\n[scenario]\nid=bench\nname=_ \"Benchmark\"\nnext_scenario=null\n");
    out.push_str("map_data=\"\n");
    for _ in 0..24 {
        out.push_str(&"Gg,".repeat(23));
        out.push_str("Gg\n");
    }
    out.push_str("\"\n");
    for side in 1..=sides {
        out.push_str(&format!(
            "[side]\nside={}\ntype=Elvish Fighter\nid=leader{}\ncanrecruit=yes\nrecruit=Elvish Fighter,Elvish Archer\n[ai]\nrecruitment_pattern=fighter,archer\n[/ai]\n[/side]\n",
            side, side
        ));
    }
    for i in 0..events {
        out.push_str(&format!(
            "[event]\nname=turn {}\n[message]\nspeaker=leader1\nmessage=_ \"Line number {} of benchmark dialogue.\"\n[/message]\n{{MODIFY_UNIT id=leader1 moves 0}}\n[/event]\n",
            i + 1,
            i + 1
        ));
    }
    out.push_str("[/scenario]\n");
    out
}

// -- Parsing benchmarks --

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    let source = synthetic_scenario(4, 40);
    let lines: Vec<String> = source.lines().map(str::to_string).collect();

    group.bench_function("walk_scenario", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for visit in WmlIterator::new(black_box(&lines), "bench.cfg") {
                count += visit.elements.len();
            }
            count
        })
    });

    group.finish();
}

// -- Rewrite benchmarks --

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");

    let source = synthetic_scenario(4, 40);
    let lines: Vec<String> = source.lines().map(str::to_string).collect();

    group.bench_function("rewrite_scenario", |b| {
        b.iter(|| {
            let mut reporter = Reporter::new();
            rewrite("bench.cfg", black_box(lines.clone()), false, &mut reporter)
        })
    });

    group.finish();
}

// -- Whole-pipeline benchmarks --

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    let small = synthetic_scenario(2, 5);
    let large = synthetic_scenario(6, 120);
    let options = LintOptions {
        verbose: 0,
        ..LintOptions::default()
    };

    group.bench_function("translate_small", |b| {
        b.iter(|| {
            let mut state = CorpusState::new();
            let mut reporter = Reporter::new();
            translate_file(
                "bench.cfg",
                black_box(&small),
                &mut state,
                &options,
                &mut reporter,
            )
        })
    });

    group.bench_function("translate_large", |b| {
        b.iter(|| {
            let mut state = CorpusState::new();
            let mut reporter = Reporter::new();
            translate_file(
                "bench.cfg",
                black_box(&large),
                &mut state,
                &options,
                &mut reporter,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_iteration, bench_rewrite, bench_translate);
criterion_main!(benches);
