use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_cmd::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;

static CLI_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn parkbook(data_dir: &TempDir, args: &[&str]) {
    let mut cmd = Command::cargo_bin("parkbook").expect("failed to locate parkbook binary");
    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    let status = cmd
        .args(["--data-dir", data_dir.path().to_str().unwrap(), "--quiet"])
        .args(args)
        .status()
        .expect("failed to execute parkbook");
    assert!(status.success(), "parkbook {args:?} failed");
}

fn initialize_data_dir(slots: usize) -> TempDir {
    let data_dir = TempDir::new().expect("failed to create temp dir");
    parkbook(&data_dir, &["init"]);
    for index in 0..slots {
        let code = format!("A-{index:02}");
        parkbook(&data_dir, &["slot", "add", &code, "--vehicle", "car"]);
    }
    data_dir
}

fn reserve(data_dir: &TempDir, email: &str) {
    parkbook(
        data_dir,
        &[
            "reserve", "--vehicle", "car", "--turn", "morning", "--date", "2025-03-10",
            "--today", "2025-03-10", "--email", email,
        ],
    );
}

fn bench_cli_startup(c: &mut Criterion) {
    c.bench_function("cli_startup_version", |b| {
        b.iter(|| {
            let mut cmd = Command::cargo_bin("parkbook").expect("failed to locate parkbook binary");
            let output = cmd.arg("--version").output().expect("failed to run parkbook");
            black_box(output);
        });
    });
}

fn bench_cli_reserve(c: &mut Criterion) {
    c.bench_function("cli_reserve", |b| {
        b.iter_batched(
            || initialize_data_dir(1),
            |data_dir| {
                let counter = CLI_COUNTER.fetch_add(1, Ordering::Relaxed);
                reserve(&data_dir, &format!("driver{counter}@x.com"));
            },
            BatchSize::PerIteration,
        );
    });
}

fn bench_cli_occupancy(c: &mut Criterion) {
    let data_dir = initialize_data_dir(20);
    for index in 0..10 {
        reserve(&data_dir, &format!("driver{index}@x.com"));
    }

    c.bench_function("cli_occupancy", |b| {
        b.iter(|| {
            parkbook(
                &data_dir,
                &["occupancy", "--date", "2025-03-10", "--time", "10:00", "--format", "json"],
            );
        });
    });
}

criterion_group!(
    cli_bench,
    bench_cli_startup,
    bench_cli_reserve,
    bench_cli_occupancy
);
criterion_main!(cli_bench);
