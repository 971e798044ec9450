//! End-to-end factor analysis on a synthetic universe.

use std::collections::BTreeMap;

use sagres_eval::{
    FactorAnalysis, MemorySink, PortfolioConfig, RecordPayload, SubjectKind, Weighting,
};
use sagres_traits::{Date, FactorPanel, MarketCapPanel, PriceSeries, Symbol};

const LOADINGS: [(&str, f64); 6] = [
    ("A", 2.0),
    ("B", 1.5),
    ("C", 1.0),
    ("D", 0.5),
    ("E", 0.0),
    ("F", -0.5),
];

fn day(i: usize) -> Date {
    Date::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

/// Each asset's return is a common term plus its loading times a shared driver.
fn universe(n_days: usize) -> (BTreeMap<Symbol, PriceSeries>, FactorPanel) {
    let driver = |t: usize| ((t * 7 % 11) as f64 - 5.0) / 1000.0;
    let market = |t: usize| ((t * 3 % 5) as f64 - 2.0) / 2000.0;

    let mut prices = BTreeMap::new();
    let mut factors = FactorPanel::new();
    for (symbol, loading) in LOADINGS {
        let mut price = 100.0;
        let mut closes = vec![(day(0), price)];
        for t in 1..n_days {
            price *= 1.0 + market(t) + loading * driver(t);
            closes.push((day(t), price));
        }
        prices.insert(symbol.to_string(), PriceSeries::from_closes(closes).unwrap());
        for t in 0..n_days {
            factors.insert_value(day(t), symbol, loading);
        }
    }
    (prices, factors)
}

#[test]
fn test_pipeline_produces_consistent_report() {
    let (prices, factors) = universe(60);
    let report = FactorAnalysis::new(PortfolioConfig::default())
        .run("loading", &prices, &factors, None)
        .unwrap();

    assert_eq!(report.start, day(1));
    assert_eq!(report.end, day(59));
    assert_eq!(report.portfolio.len(), 59);
    assert!(report.portfolio.skipped.is_empty());

    for d in &report.portfolio.days {
        assert!(d.factor_date < d.date);
        assert_eq!(d.spread_return, d.high_return - d.low_return);
        assert_eq!(d.high.members, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(d.low.members, vec!["E".to_string(), "F".to_string()]);
    }

    assert_eq!(report.regressions.len(), 6);
    assert_eq!(report.summary.total_assets, 6);
    let beta = |s: &str| report.regressions[s].beta;
    assert!(beta("A") > beta("C"));
    assert!(beta("C") > beta("F"));
    assert!(report.regressions["A"].t_stat > 1.96);

    assert!(report.performance.spread.metrics.max_drawdown <= 0.0);
    assert_eq!(report.performance.spread.n_periods, 59);
}

#[test]
fn test_pipeline_short_history_skips_regressions() {
    let (prices, factors) = universe(20);
    let report = FactorAnalysis::default()
        .run("loading", &prices, &factors, None)
        .unwrap();
    assert_eq!(report.portfolio.len(), 19);
    assert!(report.regressions.is_empty());
    assert_eq!(report.summary.total_assets, 0);
}

#[test]
fn test_pipeline_publishes_keyed_records() {
    let (prices, factors) = universe(45);
    let mut caps = MarketCapPanel::new();
    for (symbol, loading) in LOADINGS {
        caps.insert_value(day(0), symbol, 1_000.0 * (3.0 - loading));
    }
    let config = PortfolioConfig {
        n_groups: 2,
        weighting: Weighting::MarketCap,
    };
    let report = FactorAnalysis::new(config)
        .run("loading", &prices, &factors, Some(&caps))
        .unwrap();
    assert!(report.portfolio.days.iter().all(|d| d.high.cap_weighted));

    let mut sink = MemorySink::new();
    let written = report.publish(&mut sink).unwrap();
    assert_eq!(written, 3 + report.regressions.len());

    let records = sink.records();
    assert_eq!(records[2].key.subject, "spread");
    assert_eq!(records[2].key.kind, SubjectKind::Leg);
    assert!(records[3..].iter().all(|r| r.key.kind == SubjectKind::Asset));
    assert!(matches!(records[0].payload, RecordPayload::Performance(_)));
    assert!(
        records
            .iter()
            .all(|r| r.key.factor_name == "loading" && r.key.start == day(1) && r.key.end == day(44))
    );
}

#[test]
fn test_pipeline_is_deterministic() {
    let (prices, factors) = universe(40);
    let analysis = FactorAnalysis::default();
    let a = analysis.run("loading", &prices, &factors, None).unwrap();
    let b = analysis.run("loading", &prices, &factors, None).unwrap();
    assert_eq!(a, b);
}
