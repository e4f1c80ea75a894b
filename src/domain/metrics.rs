//! Performance metrics over the closed trade sequence.
//!
//! Every trade is treated as one "daily" return sample when annualizing the
//! Sharpe ratio, whatever its actual holding period.

use chrono::NaiveDateTime;
use std::fmt;

use super::backtest::BacktestConfig;
use super::ohlcv::PriceTable;
use super::pairing::calculate_pnl;
use super::signal::{Signal, SignalRow, count};
use super::trade::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const STDDEV_EPSILON: f64 = 1e-12;

const HIGH_RETURN_THRESHOLD: f64 = 0.20;
const HIGH_SHARPE_THRESHOLD: f64 = 1.5;
const HIGH_WIN_RATE_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    HighReturn,
    HighSharpe,
    HighWinRate,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::HighReturn => "high-return",
            Badge::HighSharpe => "high-sharpe",
            Badge::HighWinRate => "high-winrate",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Equity after a trade closes, and its drawdown from the running peak.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub equity: f64,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    /// Ratio, e.g. 0.05 for +5%.
    pub total_return: f64,
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    /// Ratio, always <= 0.
    pub max_drawdown: f64,
    pub trade_count: usize,
    /// Percentage in [0, 100].
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    pub badges: Vec<Badge>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Summary for `signals` over `table`, or `None` when either side of the
/// signal stream is empty or no trade could be paired.
pub fn calculate_performance(
    table: &PriceTable,
    signals: &[SignalRow],
    config: &BacktestConfig,
) -> Option<PerformanceSummary> {
    if !has_both_sides(signals) {
        return None;
    }
    summarize(signals, calculate_pnl(table, signals, config.sizing()), config)
}

/// Summary of trades already paired from `signals`. `None` unless the signal
/// table has at least one Buy and one Sell.
pub fn summarize(
    signals: &[SignalRow],
    trades: Vec<Trade>,
    config: &BacktestConfig,
) -> Option<PerformanceSummary> {
    if !has_both_sides(signals) {
        return None;
    }
    PerformanceSummary::from_trades(trades, config)
}

fn has_both_sides(signals: &[SignalRow]) -> bool {
    count(signals, Signal::Buy) > 0 && count(signals, Signal::Sell) > 0
}

impl PerformanceSummary {
    /// Fold a trade sequence into a summary. PnL is recomputed from entry and
    /// exit prices with `config`'s sizing. `None` for an empty sequence.
    pub fn from_trades(trades: Vec<Trade>, config: &BacktestConfig) -> Option<Self> {
        if trades.is_empty() {
            return None;
        }

        let initial_balance = config.initial_balance;
        let trade_value = config.sizing().trade_value();
        let trades: Vec<Trade> = trades
            .into_iter()
            .map(|t| {
                Trade::close(
                    t.entry_time,
                    t.entry_price,
                    t.exit_time,
                    t.exit_price,
                    trade_value,
                )
            })
            .collect();

        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let total_return = total_pnl / initial_balance;

        let returns: Vec<f64> = trades.iter().map(|t| t.pnl / initial_balance).collect();
        let sharpe_ratio = compute_sharpe(&returns, config.risk_free_rate);

        let equity_curve = compute_equity_curve(&trades, initial_balance);
        let max_drawdown = equity_curve
            .iter()
            .map(|p| p.drawdown)
            .fold(0.0_f64, f64::min);

        let trade_count = trades.len();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let losses = trade_count - wins;
        let win_rate = wins as f64 / trade_count as f64 * 100.0;

        let mut badges = Vec::new();
        if total_return > HIGH_RETURN_THRESHOLD {
            badges.push(Badge::HighReturn);
        }
        if sharpe_ratio > HIGH_SHARPE_THRESHOLD {
            badges.push(Badge::HighSharpe);
        }
        if win_rate > HIGH_WIN_RATE_THRESHOLD {
            badges.push(Badge::HighWinRate);
        }

        Some(PerformanceSummary {
            total_return,
            total_pnl,
            sharpe_ratio,
            max_drawdown,
            trade_count,
            win_rate,
            wins,
            losses,
            badges,
            trades,
            equity_curve,
        })
    }

    /// Labelled display values: percentages and Sharpe to two decimals.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let badges: Vec<&str> = self.badges.iter().map(|b| b.label()).collect();
        vec![
            ("Total Return", format_pct(self.total_return * 100.0)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Max Drawdown", format_pct(self.max_drawdown * 100.0)),
            ("# of Trades", self.trade_count.to_string()),
            ("% Profitable", format_pct(self.win_rate)),
            ("Badges", badges.join(" ")),
        ]
    }
}

fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Annualized Sharpe over per-trade returns, using the sample standard
/// deviation. Zero for fewer than two samples or a flat series.
fn compute_sharpe(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev.is_nan() || stddev <= STDDEV_EPSILON {
        return 0.0;
    }

    let excess_return = mean - risk_free_rate / TRADING_DAYS_PER_YEAR;
    (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Equity after each trade and its drawdown from the running peak of the
/// curve itself.
fn compute_equity_curve(trades: &[Trade], initial_balance: f64) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(trades.len());
    let mut equity = initial_balance;
    let mut peak = f64::NEG_INFINITY;

    for trade in trades {
        equity += trade.pnl;
        peak = peak.max(equity);
        let drawdown = if peak > 0.0 {
            (equity - peak) / peak
        } else {
            0.0
        };
        curve.push(EquityPoint {
            time: trade.exit_time,
            equity,
            drawdown,
        });
    }

    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn t(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(day)
    }

    /// A trade sized at the default 1000 with the given entry/exit prices.
    fn make_trade(n: i64, entry: f64, exit: f64) -> Trade {
        Trade::close(t(2 * n), entry, t(2 * n + 1), exit, 1_000.0)
    }

    fn summarize(trades: Vec<Trade>) -> PerformanceSummary {
        PerformanceSummary::from_trades(trades, &BacktestConfig::default()).unwrap()
    }

    #[test]
    fn no_trades_no_summary() {
        assert!(PerformanceSummary::from_trades(vec![], &BacktestConfig::default()).is_none());
    }

    #[test]
    fn single_winning_trade() {
        let s = summarize(vec![make_trade(0, 100.0, 110.0)]);

        assert_relative_eq!(s.total_pnl, 100.0, epsilon = 1e-9);
        assert_relative_eq!(s.total_return, 0.01, epsilon = 1e-12);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.trade_count, 1);
        assert_eq!(s.win_rate, 100.0);
        assert_eq!((s.wins, s.losses), (1, 0));
    }

    #[test]
    fn identical_returns_give_zero_sharpe() {
        let s = summarize(vec![
            make_trade(0, 100.0, 110.0),
            make_trade(1, 100.0, 110.0),
            make_trade(2, 100.0, 110.0),
        ]);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert!(!s.sharpe_ratio.is_nan());
    }

    #[test]
    fn sharpe_uses_sample_stddev() {
        // pnl 100 and 300 -> returns 0.01 and 0.03
        let s = summarize(vec![make_trade(0, 100.0, 110.0), make_trade(1, 100.0, 130.0)]);
        let mean = 0.02_f64;
        let stddev = ((0.01_f64 - mean).powi(2) + (0.03_f64 - mean).powi(2)).sqrt();
        let expected = mean / stddev * 252.0_f64.sqrt();

        assert_relative_eq!(s.sharpe_ratio, expected, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_subtracts_daily_risk_free_rate() {
        let trades = vec![make_trade(0, 100.0, 110.0), make_trade(1, 100.0, 130.0)];
        let config = BacktestConfig {
            risk_free_rate: 0.252,
            ..BacktestConfig::default()
        };
        let s = PerformanceSummary::from_trades(trades, &config).unwrap();
        let stddev = 2.0_f64.sqrt() * 0.01;
        let expected = (0.02 - 0.001) / stddev * 252.0_f64.sqrt();

        assert_relative_eq!(s.sharpe_ratio, expected, epsilon = 1e-9);
    }

    #[test]
    fn drawdown_from_running_peak() {
        // equity: 10100, 9900, 10200, 10000
        let s = summarize(vec![
            make_trade(0, 100.0, 110.0),
            make_trade(1, 100.0, 80.0),
            make_trade(2, 100.0, 130.0),
            make_trade(3, 100.0, 80.0),
        ]);
        let equity: Vec<f64> = s.equity_curve.iter().map(|p| p.equity).collect();
        for (got, want) in equity.iter().zip([10_100.0, 9_900.0, 10_200.0, 10_000.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-6);
        }

        assert_relative_eq!(s.max_drawdown, -200.0 / 10_100.0, epsilon = 1e-12);
        assert_relative_eq!(s.equity_curve[3].drawdown, -200.0 / 10_200.0, epsilon = 1e-12);
        assert_eq!(s.equity_curve[0].drawdown, 0.0);
        assert_eq!(s.equity_curve[2].time, t(5));
    }

    #[test]
    fn first_losing_trade_sets_its_own_peak() {
        let s = summarize(vec![make_trade(0, 100.0, 90.0), make_trade(1, 100.0, 95.0)]);
        assert_eq!(s.equity_curve[0].drawdown, 0.0);
        assert_relative_eq!(s.max_drawdown, -50.0 / 9_900.0, epsilon = 1e-12);
    }

    #[test]
    fn monotonic_equity_has_zero_drawdown() {
        let s = summarize(vec![
            make_trade(0, 100.0, 101.0),
            make_trade(1, 100.0, 102.0),
            make_trade(2, 100.0, 100.0),
        ]);
        assert_eq!(s.max_drawdown, 0.0);
    }

    #[test]
    fn win_rate_counts_strictly_positive_pnl() {
        let s = summarize(vec![
            make_trade(0, 100.0, 110.0),
            make_trade(1, 100.0, 100.0),
            make_trade(2, 100.0, 90.0),
            make_trade(3, 100.0, 120.0),
        ]);
        assert_relative_eq!(s.win_rate, 50.0, epsilon = 1e-12);
        assert_eq!((s.wins, s.losses), (2, 2));
    }

    #[test]
    fn pnl_recomputed_with_config_sizing() {
        let trade = Trade::close(t(0), 100.0, t(1), 110.0, 5.0);
        let config = BacktestConfig {
            initial_balance: 20_000.0,
            trade_size_fraction: 0.5,
            ..BacktestConfig::default()
        };
        let s = PerformanceSummary::from_trades(vec![trade], &config).unwrap();

        assert_relative_eq!(s.trades[0].quantity, 100.0, epsilon = 1e-9);
        assert_relative_eq!(s.total_pnl, 1_000.0, epsilon = 1e-9);
        assert_relative_eq!(s.total_return, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn badges_awarded_above_thresholds() {
        // Whole balance per trade: returns of 10%, 15% and 12%.
        let config = BacktestConfig {
            trade_size_fraction: 1.0,
            ..BacktestConfig::default()
        };
        let trades = vec![
            make_trade(0, 100.0, 110.0),
            make_trade(1, 100.0, 115.0),
            make_trade(2, 100.0, 112.0),
        ];
        let s = PerformanceSummary::from_trades(trades, &config).unwrap();

        assert!(s.total_return > 0.20);
        assert!(s.sharpe_ratio > 1.5);
        assert_eq!(
            s.badges,
            vec![Badge::HighReturn, Badge::HighSharpe, Badge::HighWinRate]
        );
    }

    #[test]
    fn no_badges_for_flat_losing_run() {
        let s = summarize(vec![make_trade(0, 100.0, 95.0), make_trade(1, 100.0, 95.0)]);
        assert!(s.badges.is_empty());
    }

    #[test]
    fn display_rows_are_formatted() {
        let s = summarize(vec![
            make_trade(0, 100.0, 110.0),
            make_trade(1, 100.0, 80.0),
            make_trade(2, 100.0, 130.0),
        ]);
        let rows = s.display_rows();
        let get = |label: &str| {
            rows.iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(get("Total Return"), "2.00%");
        assert_eq!(get("Max Drawdown"), "-1.98%");
        assert_eq!(get("# of Trades"), "3");
        assert_eq!(get("% Profitable"), "66.67%");
        assert_eq!(get("Badges"), "high-sharpe high-winrate");
        assert!(get("Sharpe Ratio").parse::<f64>().is_ok());
    }

    #[test]
    fn badge_labels() {
        assert_eq!(Badge::HighReturn.to_string(), "high-return");
        assert_eq!(Badge::HighSharpe.to_string(), "high-sharpe");
        assert_eq!(Badge::HighWinRate.to_string(), "high-winrate");
    }
}
