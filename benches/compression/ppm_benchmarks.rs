use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ppm_coder::compression::{ppm_compress, ppm_decompress, PpmConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn text_input(len: usize) -> Vec<u8> {
    let words = [
        "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog ", "and ", "runs ",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        data.extend_from_slice(words[rng.gen_range(0..words.len())].as_bytes());
    }
    data.truncate(len);
    data
}

fn random_input(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen()).collect()
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppm_compress");
    for (name, input) in [("text", text_input(16 * 1024)), ("random", random_input(16 * 1024))] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        for order in [-1, 1, 3] {
            let config = PpmConfig::default().with_model_order(order);
            group.bench_with_input(
                BenchmarkId::new(name, format!("order{order}")),
                &input,
                |b, input| b.iter(|| ppm_compress(black_box(input), &config).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppm_decompress");
    let input = text_input(16 * 1024);
    group.throughput(Throughput::Bytes(input.len() as u64));
    for order in [-1, 1, 3] {
        let config = PpmConfig::default().with_model_order(order);
        let bits = ppm_compress(&input, &config).unwrap();
        group.bench_with_input(
            BenchmarkId::new("text", format!("order{order}")),
            &bits,
            |b, bits| b.iter(|| ppm_decompress(black_box(bits), &config).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
