use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lectern_core::grader::{grade_all, GradeOptions};
use lectern_core::model::{AnswerInput, AnswerRecord, AnswerSet};
use lectern_core::similarity::similarity;

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    let verse = "For God so loved the world, that he gave his only begotten Son, \
                 that whosoever believeth in him should not perish, but have everlasting life.";
    let attempt = "For God so loved the world that he gave his one and only Son, \
                   that whoever believes in him shall not perish but have eternal life";
    let cjk = "神爱世人，甚至将他的独生子赐给他们，叫一切信他的，不致灭亡，反得永生。";
    let cjk_attempt = "神爱世人甚至将独生子赐给他们叫一切信他的人不致灭亡反得永生";
    let long_a = verse.repeat(10);
    let long_b = attempt.repeat(10);

    group.bench_function("verse", |b| {
        b.iter(|| similarity(black_box(attempt), black_box(verse)))
    });

    group.bench_function("cjk", |b| {
        b.iter(|| similarity(black_box(cjk_attempt), black_box(cjk)))
    });

    group.bench_function("ten_verses", |b| {
        b.iter(|| similarity(black_box(&long_b), black_box(&long_a)))
    });

    group.finish();
}

fn bench_grade_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_all");

    for n in [10usize, 100] {
        let (inputs, answers) = generate_worksheet(n);
        group.bench_function(format!("{n}_inputs"), |b| {
            b.iter(|| {
                grade_all(
                    black_box(&inputs),
                    black_box(&answers),
                    GradeOptions::default(),
                )
            })
        });
    }

    group.finish();
}

fn generate_worksheet(n: usize) -> (Vec<AnswerInput>, AnswerSet) {
    let mut answers = AnswerSet::default();
    let mut inputs = Vec::with_capacity(n);
    for i in 0..n {
        let reference = format!("Psalm {}:1", i + 1);
        answers.answers.insert(
            format!("q{i}_{reference}"),
            AnswerRecord {
                reference: reference.clone(),
                text: format!("Blessed is the one who walks in the way number {i}"),
                has_data: true,
                ..Default::default()
            },
        );
        inputs.push(AnswerInput {
            question: i.to_string(),
            reference: Some(reference),
            has_answer: true,
            value: format!("Blessed is one who walks the way {i}"),
        });
    }
    (inputs, answers)
}

criterion_group!(benches, bench_similarity, bench_grade_all);
criterion_main!(benches);
