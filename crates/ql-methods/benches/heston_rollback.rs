use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ql_math::Array;
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite, Uniform1dMesher,
};
use ql_methods::finite_differences::operators::FdmHestonOp;
use ql_methods::{FdmBackwardSolver, FdmSchemeDesc};
use ql_processes::HestonProcess;
use ql_termstructures::FlatForward;
use std::hint::black_box;
use std::sync::Arc;

fn heston_problem() -> (HestonProcess, FdmMesherComposite, Array) {
    let process = HestonProcess::new(
        Arc::new(FlatForward::new(0.05)),
        Arc::new(FlatForward::new(0.02)),
        100.0,
        0.04,
        1.5,
        0.04,
        0.3,
        -0.7,
    )
    .expect("valid Heston parameters");
    let v_mesher =
        FdmHestonVarianceMesher::new(25, &process, 1.0, 10, 1e-4).expect("variance mesher");
    let x_mesher =
        Uniform1dMesher::new(20.0_f64.ln(), 500.0_f64.ln(), 100).expect("log-spot mesher");
    let mesher = FdmMesherComposite::from_2d(x_mesher, v_mesher).expect("composite mesher");
    let payoff: Vec<f64> = mesher
        .layout()
        .iter()
        .map(|it| (mesher.location(&it, 0).exp() - 100.0).max(0.0))
        .collect();
    (process, mesher, Array::from_vec(payoff))
}

fn bench_heston_rollback(c: &mut Criterion) {
    let (process, mesher, payoff) = heston_problem();
    let mut group = c.benchmark_group("heston_rollback_50_steps");
    for (name, desc) in [
        ("douglas", FdmSchemeDesc::douglas()),
        ("hundsdorfer", FdmSchemeDesc::hundsdorfer()),
        ("modified_craig_sneyd", FdmSchemeDesc::modified_craig_sneyd()),
        ("tr_bdf2", FdmSchemeDesc::tr_bdf2()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &desc, |b, desc| {
            b.iter(|| {
                let op = FdmHestonOp::new(&mesher, &process);
                let mut solver = FdmBackwardSolver::new(
                    Box::new(op),
                    FdmBoundaryConditionSet::new(),
                    None,
                    *desc,
                );
                let mut a = payoff.clone();
                solver
                    .rollback(&mut a, 1.0, 0.0, 50, 0)
                    .expect("rollback should succeed");
                black_box(a)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_heston_rollback);
criterion_main!(benches);
