use approx::assert_abs_diff_eq;
use quantlib_fdm::instruments::{
    BarrierOptionArguments, BarrierType, Exercise, OptionType, PlainVanillaPayoff, PricingEngine,
    VanillaOptionArguments,
};
use quantlib_fdm::pricingengines::{
    black_scholes_merton, AnalyticEuropeanEngine, FdBlackScholesBarrierEngine,
    FdBlackScholesVanillaEngine, FdGridSettings,
};
use quantlib_fdm::processes::{black_scholes_merton_process, GeneralizedBlackScholesProcess};
use quantlib_fdm::termstructures::{BlackConstantVol, FlatForward};
use std::sync::Arc;

fn process() -> Arc<GeneralizedBlackScholesProcess> {
    Arc::new(black_scholes_merton_process(
        100.0,
        Arc::new(FlatForward::new(0.03)),
        Arc::new(FlatForward::new(0.01)),
        Arc::new(BlackConstantVol::new(0.3)),
    ))
}

#[cfg(feature = "serde")]
#[test]
fn grid_settings_load_from_json() {
    let grid: FdGridSettings = serde_json::from_str(r#"{ "x_grid": 300, "t_grid": 150 }"#).unwrap();
    assert_eq!(grid.v_grid, FdGridSettings::default().v_grid);

    let args = VanillaOptionArguments::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Call, 110.0)),
        Exercise::european(2.0).unwrap(),
    );
    let fd = FdBlackScholesVanillaEngine::new(process()).with_grid(grid).calculate(&args).unwrap();
    let analytic = AnalyticEuropeanEngine::new(process()).calculate(&args).unwrap();
    assert_abs_diff_eq!(fd.npv, analytic.npv, epsilon = 1e-2);
}

#[test]
fn up_barriers_split_the_vanilla() {
    let engine = FdBlackScholesBarrierEngine::new(process())
        .with_grid(FdGridSettings::default().with_x_grid(200).with_t_grid(200));
    let barrier = |barrier_type| {
        engine
            .calculate(&BarrierOptionArguments::new(
                Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
                Exercise::european(1.0).unwrap(),
                barrier_type,
                120.0,
                0.0,
            ))
            .unwrap()
            .npv
    };
    let vanilla = black_scholes_merton(OptionType::Put, 100.0, 100.0, 0.03, 0.01, 0.3, 1.0).npv;
    let (up_in, up_out) = (barrier(BarrierType::UpIn), barrier(BarrierType::UpOut));
    assert!(up_in > 0.0 && up_out > up_in);
    assert_abs_diff_eq!(up_in + up_out, vanilla, epsilon = 2e-2);
}
