use std::hint::black_box;

use divan::{AllocProfiler, Bencher};
use loam_bench::{call_chain, wide_def};
use loam_expr::{StaticPrimTable, lower_surface};
use loam_opt::optimize_deadcode;
use loam_ssa::{PipelineOptions, optimize_with, pass_purity, pass_sweep, pass_usage};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

#[divan::bench(args = [16, 128, 1024])]
fn lower_wide_def(bencher: Bencher, values: usize) {
    let surface = wide_def(values, values / 8);
    bencher.bench(|| {
        let tree = lower_surface(black_box(&surface))
            .unwrap_or_else(|err| panic!("lowering failed in benchmark setup: {err}"));
        black_box(tree.arena.live_count())
    });
}

#[divan::bench(args = [16, 128, 1024])]
fn deadcode_wide_def(bencher: Bencher, values: usize) {
    let surface = wide_def(values, values / 8);
    let prims = StaticPrimTable::with_builtins();
    bencher
        .with_inputs(|| {
            lower_surface(&surface)
                .unwrap_or_else(|err| panic!("lowering failed in benchmark setup: {err}"))
        })
        .bench_local_values(|mut tree| black_box(optimize_deadcode(&mut tree, &prims)));
}

#[divan::bench(args = [16, 128, 1024])]
fn term_pipeline(bencher: Bencher, calls: usize) {
    let root = call_chain(calls);
    let prims = StaticPrimTable::with_builtins();
    let options = PipelineOptions::default();
    bencher
        .with_inputs(|| root.clone())
        .bench_local_values(|mut root| {
            let stats = optimize_with(&mut root, &prims, &options)
                .unwrap_or_else(|err| panic!("pipeline failed in benchmark: {err}"));
            black_box(stats)
        });
}

#[divan::bench(args = [16, 128, 1024])]
fn term_sweep_only(bencher: Bencher, calls: usize) {
    let mut analyzed = call_chain(calls);
    let prims = StaticPrimTable::with_builtins();
    pass_purity(&mut analyzed, &prims);
    pass_usage(&mut analyzed);
    bencher
        .with_inputs(|| analyzed.clone())
        .bench_local_values(|mut root| black_box(pass_sweep(&mut root)));
}
