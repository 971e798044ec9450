//! Rebalance-driven strategy backtest.
//!
//! On every scheduled rebalance date the factor snapshots at or before that date
//! are combined into a composite score, the sizer turns the score into target
//! weights, and those weights earn the asset returns of every trading day after
//! the rebalance up to and including the next one. Positions can be closed early
//! by the risk rules. A rebalance that cannot be scored or sized is skipped and
//! the previous positions are kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rayon::prelude::*;
use sagres_combine::score;
use sagres_eval::{compute_returns_by_asset, evaluate_series, PerformanceReport};
use sagres_traits::{
    CrossSection, Date, FactorPanel, MarketCapPanel, PriceSeries, Result, SagresError, Symbol,
    TimeSeries,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::risk::ExitKind;
use crate::sizing::{sizer_for, PositionSizer};

/// Positions set on one rebalance date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rebalance {
    /// Rebalance date
    pub date: Date,
    /// Signed target weights
    pub positions: CrossSection,
}

/// A scheduled rebalance that kept the previous positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRebalance {
    /// Scheduled date
    pub date: Date,
    /// Why no positions could be built
    pub reason: String,
}

/// A position closed by a risk rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskExit {
    /// Day the rule triggered; the position still earns that day's return
    pub date: Date,
    /// Closed asset
    pub symbol: Symbol,
    /// Triggered rule
    pub kind: ExitKind,
    /// Signed return since entry
    pub price_return: f64,
}

/// Outcome of a strategy backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Sizer name
    pub strategy: String,
    /// Requested start
    pub start: Date,
    /// Requested end
    pub end: Date,
    /// Successful rebalances
    pub rebalances: Vec<Rebalance>,
    /// Rebalances that kept the previous positions
    pub skipped: Vec<SkippedRebalance>,
    /// Early exits
    pub exits: Vec<RiskExit>,
    /// Daily strategy returns
    pub returns: TimeSeries,
    /// Performance of `returns`
    pub performance: PerformanceReport,
}

#[derive(Debug)]
struct Holding<'a> {
    symbol: &'a str,
    weight: f64,
    entry: Option<f64>,
}

/// Runs a factor strategy over historical prices.
pub struct StrategyBacktest {
    config: StrategyConfig,
    sizer: Box<dyn PositionSizer>,
}

impl fmt::Debug for StrategyBacktest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyBacktest")
            .field("config", &self.config)
            .field("sizer", &self.sizer.name())
            .finish()
    }
}

impl StrategyBacktest {
    /// Backtest with the sizer selected by `config.sizing`.
    ///
    /// # Errors
    ///
    /// [`SagresError::Configuration`] for an invalid configuration.
    pub fn new(config: StrategyConfig) -> Result<Self> {
        let sizer = sizer_for(&config.sizing);
        Self::with_sizer(config, sizer)
    }

    /// Backtest with a custom sizer; `config.sizing` is still validated.
    pub fn with_sizer(config: StrategyConfig, sizer: Box<dyn PositionSizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sizer })
    }

    /// The configuration.
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Target positions for one rebalance date.
    fn target(
        &self,
        date: Date,
        factors: &BTreeMap<String, FactorPanel>,
        market_caps: Option<&MarketCapPanel>,
    ) -> Result<CrossSection> {
        let sections: BTreeMap<String, CrossSection> = factors
            .iter()
            .filter(|(name, _)| self.config.factor_weights.contains_key(*name))
            .filter_map(|(name, panel)| {
                panel
                    .latest_at_or_before(date)
                    .map(|(_, section)| (name.clone(), section.finite()))
            })
            .collect();
        if sections.is_empty() {
            return Err(SagresError::insufficient(
                format!("factor snapshot on {date}"),
                1,
                0,
            ));
        }

        let composite = score(date, &sections, &self.config.factor_weights)?;
        let caps = market_caps
            .and_then(|panel| panel.latest_at_or_before(date))
            .map(|(_, section)| section);
        self.sizer.size(&composite, caps)
    }

    /// Runs the strategy between `start` and `end` inclusive.
    ///
    /// `factors` maps factor names to panels; only factors with a weight in the
    /// configuration are used.
    ///
    /// # Errors
    ///
    /// - [`SagresError::Configuration`] if `start` is after `end`
    /// - [`SagresError::InsufficientData`] if no rebalance succeeds or fewer than
    ///   two trading days follow the first one
    pub fn run(
        &self,
        start: Date,
        end: Date,
        prices: &BTreeMap<Symbol, PriceSeries>,
        factors: &BTreeMap<String, FactorPanel>,
        market_caps: Option<&MarketCapPanel>,
    ) -> Result<StrategyResult> {
        if start > end {
            return Err(SagresError::Configuration(format!(
                "start {start} is after end {end}"
            )));
        }
        let schedule = self.config.rebalance.rebalance_dates(start, end);
        let returns = compute_returns_by_asset(prices)?;

        // Scoring depends only on the date; carrying positions forward does not.
        let targets: Vec<(Date, Result<CrossSection>)> = schedule
            .par_iter()
            .map(|&date| (date, self.target(date, factors, market_caps)))
            .collect();

        let mut rebalances = Vec::new();
        let mut skipped = Vec::new();
        for (date, target) in targets {
            match target {
                Ok(positions) => rebalances.push(Rebalance { date, positions }),
                Err(e) => {
                    warn!(%date, error = %e, "rebalance skipped, keeping previous positions");
                    skipped.push(SkippedRebalance {
                        date,
                        reason: e.to_string(),
                    });
                }
            }
        }
        let Some(first) = rebalances.first().map(|r| r.date) else {
            return Err(SagresError::insufficient(
                "strategy rebalances",
                1,
                rebalances.len(),
            ));
        };

        let days: BTreeSet<Date> = returns
            .values()
            .flat_map(|series| series.dates())
            .filter(|d| *d > first && *d <= end)
            .collect();

        let rules = self.config.risk;
        let mut exits = Vec::new();
        let mut daily = TimeSeries::new();
        let mut holdings: Vec<Holding<'_>> = Vec::new();
        let mut next = 0;

        for day in days {
            while let Some(rebalance) = rebalances.get(next).filter(|r| r.date < day) {
                holdings = rebalance
                    .positions
                    .iter()
                    .filter(|(_, w)| *w != 0.0)
                    .map(|(symbol, weight)| Holding {
                        symbol,
                        weight,
                        entry: prices
                            .get(symbol)
                            .and_then(|p| p.close_at_or_before(rebalance.date)),
                    })
                    .collect();
                debug!(date = %rebalance.date, holdings = holdings.len(), "positions set");
                next += 1;
            }

            let ret: f64 = holdings
                .iter()
                .map(|h| {
                    let r = returns
                        .get(h.symbol)
                        .and_then(|series| series.get(&day))
                        .filter(|r| r.is_finite())
                        .unwrap_or(0.0);
                    h.weight * r
                })
                .sum();
            daily.insert(day, ret);

            if rules.is_active() {
                holdings.retain(|h| {
                    let price = prices.get(h.symbol).and_then(|p| p.close_on(day));
                    let (Some(entry), Some(price)) = (h.entry, price) else {
                        return true;
                    };
                    match rules.check(h.weight, entry, price) {
                        Some(kind) => {
                            let price_return = (price / entry - 1.0) * h.weight.signum();
                            info!(%day, symbol = h.symbol, %kind, price_return, "position closed");
                            exits.push(RiskExit {
                                date: day,
                                symbol: h.symbol.to_string(),
                                kind,
                                price_return,
                            });
                            false
                        }
                        None => true,
                    }
                });
            }
        }

        let performance = evaluate_series(&daily)?;
        info!(
            strategy = self.sizer.name(),
            %start,
            %end,
            rebalances = rebalances.len(),
            skipped = skipped.len(),
            exits = exits.len(),
            sharpe = performance.metrics.sharpe_ratio,
            "strategy backtest complete"
        );

        Ok(StrategyResult {
            strategy: self.sizer.name().to_string(),
            start,
            end,
            rebalances,
            skipped,
            exits,
            returns: daily,
            performance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LongOnlyConfig, LongShortConfig, SizingConfig};
    use crate::risk::RiskRules;
    use crate::schedule::RebalanceFrequency;
    use approx::assert_relative_eq;

    const GROWTH: [(&str, f64); 4] = [("A", 0.002), ("B", 0.001), ("C", 0.0), ("D", -0.001)];

    fn day(i: u64) -> Date {
        // 2024-01-01 is a Monday.
        Date::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i)
    }

    fn growth_prices(n_days: u64) -> BTreeMap<Symbol, PriceSeries> {
        GROWTH
            .iter()
            .map(|&(symbol, g)| {
                let closes = (0..n_days).map(|t| (day(t), 100.0 * (1.0 + g).powi(t as i32)));
                (symbol.to_string(), PriceSeries::from_closes(closes).unwrap())
            })
            .collect()
    }

    fn trend_factor(date: Date) -> BTreeMap<String, FactorPanel> {
        let mut panel = FactorPanel::new();
        for (symbol, g) in GROWTH {
            panel.insert_value(date, symbol, g);
        }
        BTreeMap::from([("trend".to_string(), panel)])
    }

    fn config(sizing: SizingConfig, risk: RiskRules) -> StrategyConfig {
        StrategyConfig {
            factor_weights: BTreeMap::from([("trend".to_string(), 1.0)]),
            rebalance: RebalanceFrequency::Weekly,
            sizing,
            risk,
        }
    }

    fn top_half() -> SizingConfig {
        SizingConfig::LongOnly(LongOnlyConfig {
            selection_pct: 0.5,
            min_stocks: 1,
            equal_weight: true,
        })
    }

    #[test]
    fn test_long_only_holds_top_half() {
        let backtest = StrategyBacktest::new(config(top_half(), RiskRules::default())).unwrap();
        let result = backtest
            .run(day(0), day(39), &growth_prices(40), &trend_factor(day(0)), None)
            .unwrap();

        // Fridays Jan 5 .. Feb 9
        assert_eq!(result.rebalances.len(), 6);
        assert_eq!(result.rebalances[0].date, day(4));
        assert!(result.skipped.is_empty());
        assert_eq!(
            result.rebalances[0].positions.symbols().collect::<Vec<_>>(),
            vec!["A", "B"]
        );

        // Returns accrue strictly after the first rebalance.
        assert_eq!(result.returns.first().map(|(d, _)| d), Some(day(5)));
        assert_eq!(result.returns.len(), 35);
        for r in result.returns.values() {
            assert_relative_eq!(r, 0.0015, epsilon = 1e-12);
        }
        assert_eq!(result.performance.n_periods, 35);
        assert_eq!(result.strategy, "long-only");
    }

    #[test]
    fn test_long_short_earns_spread() {
        let sizing = SizingConfig::LongShort(LongShortConfig {
            long_pct: 0.5,
            short_pct: 0.25,
            long_allocation: 0.8,
            short_allocation: 0.5,
        });
        let backtest = StrategyBacktest::new(config(sizing, RiskRules::default())).unwrap();
        let result = backtest
            .run(day(0), day(20), &growth_prices(21), &trend_factor(day(0)), None)
            .unwrap();

        let positions = &result.rebalances[0].positions;
        assert_relative_eq!(positions.get("A").unwrap(), 0.4);
        assert_relative_eq!(positions.get("D").unwrap(), -0.5);
        // 0.8 * 0.0015 long, -0.5 * -0.001 short
        for r in result.returns.values() {
            assert_relative_eq!(r, 0.0017, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_stop_loss_closes_until_next_rebalance() {
        let mut prices = BTreeMap::new();
        prices.insert(
            "A".to_string(),
            PriceSeries::from_closes((0..21).map(|t| (day(t), if t < 8 { 100.0 } else { 90.0 })))
                .unwrap(),
        );
        prices.insert(
            "B".to_string(),
            PriceSeries::from_closes((0..21).map(|t| (day(t), 100.0))).unwrap(),
        );
        let mut panel = FactorPanel::new();
        panel.insert_value(day(0), "A", 2.0);
        panel.insert_value(day(0), "B", 1.0);
        let factors = BTreeMap::from([("trend".to_string(), panel)]);

        let risk = RiskRules {
            stop_loss: Some(0.05),
            take_profit: None,
        };
        let backtest = StrategyBacktest::new(config(top_half(), risk)).unwrap();
        let result = backtest.run(day(0), day(20), &prices, &factors, None).unwrap();

        assert_eq!(result.exits.len(), 1);
        let exit = &result.exits[0];
        assert_eq!(exit.date, day(8));
        assert_eq!(exit.symbol, "A");
        assert_eq!(exit.kind, ExitKind::StopLoss);
        assert_relative_eq!(exit.price_return, -0.1, epsilon = 1e-12);

        // The drop is realized on the trigger day, nothing is held afterwards.
        assert_relative_eq!(result.returns.get(&day(8)).unwrap(), -0.1, epsilon = 1e-12);
        assert_eq!(result.returns.get(&day(9)), Some(0.0));
        assert_eq!(result.returns.len(), 16);
    }

    #[test]
    fn test_unscorable_rebalance_is_skipped() {
        let backtest = StrategyBacktest::new(config(top_half(), RiskRules::default())).unwrap();
        // No factor values before Jan 10.
        let result = backtest
            .run(day(0), day(20), &growth_prices(21), &trend_factor(day(9)), None)
            .unwrap();

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].date, day(4));
        assert!(result.skipped[0].reason.contains("factor snapshot"));
        assert_eq!(result.rebalances[0].date, day(11));
        assert_eq!(result.returns.first().map(|(d, _)| d), Some(day(12)));
    }

    #[test]
    fn test_errors() {
        let backtest = StrategyBacktest::new(config(top_half(), RiskRules::default())).unwrap();
        let prices = growth_prices(21);

        assert!(matches!(
            backtest.run(day(10), day(0), &prices, &trend_factor(day(0)), None),
            Err(SagresError::Configuration(_))
        ));
        assert!(matches!(
            backtest.run(day(0), day(20), &prices, &BTreeMap::new(), None),
            Err(SagresError::InsufficientData { .. })
        ));
        assert!(StrategyBacktest::new(StrategyConfig::default()).is_err());
    }

    #[test]
    fn test_result_serializes() {
        let backtest = StrategyBacktest::new(config(top_half(), RiskRules::default())).unwrap();
        let result = backtest
            .run(day(0), day(20), &growth_prices(21), &trend_factor(day(0)), None)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["strategy"], "long-only");
        assert!(json["performance"]["metrics"]["sharpe_ratio"].is_number());
    }
}
