pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (m - v).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// `1 - sd/mean` as a percentage in [0, 100]; `None` when the mean is not positive
pub fn steadiness(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    if m <= 0.0 {
        return None;
    }
    let sd = std_dev(data)?;
    Some(((1.0 - sd / m) * 100.0).clamp(0.0, 100.0))
}
