pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Round half to even at `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `part / total * 100` at one decimal, 0 when there is nothing to divide
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(part as f64 / total as f64 * 100.0, 1)
    }
}

/// Mean of the samples rounded to a whole millisecond, 0 when empty
pub fn mean_ms(samples: &[u64]) -> u64 {
    let as_f64: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    mean(&as_f64).map(|m| m.round_ties_even() as u64).unwrap_or(0)
}
