use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lectern_core::markdown::{format_inline, parse};
use lectern_core::reader::{search, Toc};

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_parse");

    let small = generate_document(5);
    let medium = generate_document(50);
    let large = generate_document(500);

    group.bench_function("5_sections", |b| b.iter(|| parse(black_box(&small))));
    group.bench_function("50_sections", |b| b.iter(|| parse(black_box(&medium))));
    group.bench_function("500_sections", |b| b.iter(|| parse(black_box(&large))));

    group.bench_function("inline", |b| {
        b.iter(|| {
            format_inline(black_box(
                "Read **Romans 3:23** and *John 3:16*, then compare **both** with *Acts 1:8*.",
            ))
        })
    });

    group.finish();
}

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");
    let blocks = parse(&generate_document(200));

    group.bench_function("toc", |b| b.iter(|| Toc::from_blocks(black_box(&blocks))));
    group.bench_function("search", |b| {
        b.iter(|| search(black_box(&blocks), black_box("shepherd")))
    });

    group.finish();
}

fn generate_document(sections: usize) -> String {
    let mut s = String::from("# Study guide\n\n");
    for i in 0..sections {
        s.push_str(&format!(
            "## Lesson {i}\n\
             The LORD is my **shepherd**; I shall not *want*.  \n\
             He maketh me to lie down in green pastures.\n\
             \n\
             ### Questions {i}\n\
             1. What does *shepherd* mean here?\n\
             ---\n"
        ));
    }
    s
}

criterion_group!(benches, bench_parse, bench_navigation);
criterion_main!(benches);
