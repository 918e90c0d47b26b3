use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rules::RuleSet;

const SMALL_SENTENCES: usize = 16;
const LARGE_SENTENCES: usize = 10_000;

fn make_article(sentences: usize) -> String {
    const LINES: [&str; 4] = [
        "ChatGPT is an AI tool built by OpenAI. ",
        "Apple Intelligence ships with artificial intelligence features. ",
        "The maintainer said the email was plain. ",
        "Nothing to see here, just ordinary prose. ",
    ];
    let mut out = String::with_capacity(sentences * 48);
    for i in 0..sentences {
        out.push_str(LINES[i % LINES.len()]);
    }
    out
}

fn bench_apply_small(c: &mut Criterion) {
    let rules = RuleSet::standard();
    let input = make_article(SMALL_SENTENCES);
    c.bench_function("bench_apply_small", |b| {
        b.iter(|| {
            let out = rules.apply(black_box(&input));
            black_box(out.len());
        });
    });
}

fn bench_apply_large(c: &mut Criterion) {
    let rules = RuleSet::standard();
    let input = make_article(LARGE_SENTENCES);
    c.bench_function("bench_apply_large", |b| {
        b.iter(|| {
            let out = rules.apply(black_box(&input));
            black_box(out.len());
        });
    });
}

fn bench_apply_no_candidates(c: &mut Criterion) {
    let rules = RuleSet::standard();
    let input = "Nothing to see here, just ordinary prose. ".repeat(1_000);
    let input = input.replace(['a', 'A'], "o");
    c.bench_function("bench_apply_no_candidates", |b| {
        b.iter(|| {
            let out = rules.apply(black_box(&input));
            black_box(out.len());
        });
    });
}

criterion_group!(
    benches,
    bench_apply_small,
    bench_apply_large,
    bench_apply_no_candidates
);
criterion_main!(benches);
