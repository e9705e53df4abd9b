use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nsearch::align::{extend, banded_align, AlignParams, Direction};
use nsearch::alphabet::Dna;

fn bench_banded_align(c: &mut Criterion) {
    let a = b"TATAATGTTTACATTGGACGTTCAGGTACCATGATCGATCGATCGTAGC".repeat(4);
    let b = b"TATAATGACACTGGACGTTCAGGTACCATGATCGATCGATCGTAGCATG".repeat(4);
    let params = AlignParams::default();
    c.bench_function("banded_align_200bp", |bencher| {
        bencher.iter(|| banded_align::<Dna>(black_box(&a), black_box(&b), black_box(&params)));
    });
}

fn bench_extend(c: &mut Criterion) {
    let a = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".repeat(4);
    let b = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".repeat(4);
    let params = AlignParams::default();
    c.bench_function("extend_200bp_perfect_match", |bencher| {
        bencher.iter(|| extend::<Dna>(black_box(&a), black_box(&b), 0, 0, Direction::Forward, black_box(&params)));
    });
}

criterion_group!(benches, bench_banded_align, bench_extend);
criterion_main!(benches);
