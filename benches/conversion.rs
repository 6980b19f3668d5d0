use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matjson::convert::Converter;
use matjson::mat::{ArrayEntry, ArrayNode, CharArray, Mat5Reader, Mat5Writer, Matrix, StructArray};
use matjson::pipeline::{run, PipelineSettings, WorkLayout};
use std::fs;
use tempfile::TempDir;

/// Variables of a typical acquisition file: one settings struct per channel
fn generate_entries(num_channels: usize) -> Vec<ArrayEntry> {
    (0..num_channels)
        .map(|i| {
            let channel = StructArray::scalar(vec![
                ("index", ArrayNode::from(Matrix::scalar(i as f64))),
                ("label", CharArray::row(format!("channel {}", i)).into()),
                ("gain", Matrix::scalar(1.0 + i as f64 * 0.01).into()),
                ("enabled", Matrix::logical_scalar(i % 2 == 0).into()),
                ("samples", Matrix::new(vec![1, 256], vec![0.5; 256]).into()),
            ]);
            ArrayEntry::new(format!("ch{}", i), channel.into())
        })
        .collect()
}

/// Benchmark array tree to JSON rendering
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_json");
    let converter = Converter::new();

    for num_channels in [10, 100, 1000] {
        let entries = generate_entries(num_channels);
        group.throughput(Throughput::Elements(num_channels as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}channels", num_channels)),
            &entries,
            |b, entries| b.iter(|| converter.convert(entries)),
        );
    }

    group.finish();
}

/// Benchmark MAT decoding, plain and compressed
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_mat");
    let entries = generate_entries(100);
    let reader = Mat5Reader::new();

    for compress in [false, true] {
        let bytes = Mat5Writer::new()
            .with_compression(compress)
            .to_bytes(&entries)
            .unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        let label = if compress { "compressed" } else { "plain" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &bytes, |b, bytes| {
            b.iter(|| reader.read_bytes(bytes).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a whole directory run
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for num_files in [20, 100] {
        group.throughput(Throughput::Elements(num_files as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}files", num_files)),
            &num_files,
            |b, &num_files| {
                b.iter_batched(
                    || {
                        let temp_dir = TempDir::new().unwrap();
                        let source = temp_dir.path().join("in");
                        fs::create_dir_all(&source).unwrap();
                        let writer = Mat5Writer::new();
                        let entries = generate_entries(10);
                        for i in 0..num_files {
                            writer
                                .write_file(source.join(format!("run{:04}.mat", i)), &entries)
                                .unwrap();
                        }
                        let settings =
                            PipelineSettings::new(&source, WorkLayout::under(temp_dir.path()));
                        (temp_dir, settings)
                    },
                    |(temp_dir, settings)| {
                        let summary = run(&settings).expect("Pipeline failed");
                        assert_eq!(summary.len(), num_files);
                        drop(temp_dir);
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_read, bench_pipeline);
criterion_main!(benches);
