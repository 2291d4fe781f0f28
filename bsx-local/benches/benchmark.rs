use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use bsx_parse::{convert, ConvertOptions, Format};

const PAGES: [(Format, &str); 3] = [
    (Format::NwChem, include_str!("../../bsx-parse/basis_files/nwchem-6-31Gs.txt")),
    (Format::GamessUs, include_str!("../../bsx-parse/basis_files/gamess-us-6-31Gs.txt")),
    (Format::Gaussian94, include_str!("../../bsx-parse/basis_files/gaussian94-6-31Gs.txt")),
];

pub fn criterion_benchmark(c: &mut Criterion) {
    let elements = ["H", "He", "Cl"];
    let mut group = c.benchmark_group("convert_6-31G*");
    for (source, page) in PAGES.iter() {
        let chunks = source.extract(page, "6-31G*", &elements).unwrap().chunks;
        for target in Format::ALL {
            let options = ConvertOptions::new(target);
            group.bench_function(BenchmarkId::new(source.tag(), target.tag()), |b| {
                b.iter(|| convert("6-31G*", black_box(&chunks), *source, &options))
            });
        }
    }
    group.finish();

    let (_, page) = PAGES[2];
    c.bench_function("extract_g94", |b| {
        b.iter(|| Format::Gaussian94.extract(black_box(page), "6-31G*", &elements))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
