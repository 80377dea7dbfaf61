use criterion::{Criterion, criterion_group, criterion_main};
use psh_lexer::tokenize;
use std::hint::black_box;

const SCRIPT: &str = r#"
for f in *.log; do
    if grep -q "ERROR" "$f"; then
        echo "$f has errors" >> report.txt
    fi
done
count=$(wc -l < report.txt)
case $count in
    0) echo clean;;
    *) echo "found $count" | tee -a summary;;
esac
"#;

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_small_script", |b| {
        b.iter(|| tokenize(black_box(SCRIPT)))
    });

    let large = SCRIPT.repeat(100);
    c.bench_function("tokenize_large_script", |b| {
        b.iter(|| tokenize(black_box(&large)))
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
