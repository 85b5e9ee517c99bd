//! Simple moving average over trailing closes.
//!
//! SMA(n) = mean of the last n closes. Returns the `0.0` sentinel when fewer
//! than n samples exist; callers gate on history length before acting on it.

pub fn moving_average(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period {
        return 0.0;
    }
    let window = &prices[prices.len() - period..];
    window.iter().sum::<f64>() / period as f64
}
