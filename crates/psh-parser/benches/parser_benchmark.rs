use criterion::{Criterion, criterion_group, criterion_main};
use psh_parser::parse_source;
use std::hint::black_box;

const SCRIPT: &str = r#"
backup() {
    local src=$1
    if [[ -d $src ]]; then
        tar -czf "$src.tgz" "$src" 2> errors.log
    fi
}
for dir in */; do
    backup "$dir" && echo "ok: $dir" || echo "failed: $dir"
done
case $? in
    0) echo all good;;
    *) echo "exit $?";;
esac
"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_small_script", |b| {
        b.iter(|| parse_source(black_box(SCRIPT)))
    });

    let large = SCRIPT.repeat(50);
    c.bench_function("parse_large_script", |b| {
        b.iter(|| parse_source(black_box(&large)))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
