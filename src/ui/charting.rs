use typeclock::stats::Snapshot;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(history: &[Snapshot], elapsed_secs: f64) -> (f64, f64) {
    let highest_wpm = history
        .iter()
        .map(|s| s.wpm.max(s.raw))
        .max()
        .unwrap_or(0);

    let overall_duration = match history.last() {
        Some(s) => s.elapsed.max(elapsed_secs),
        None => elapsed_secs,
    }
    .max(1.0);

    // leave headroom so the top of the line is not clipped
    let y_max = (f64::from(highest_wpm) / 10.0).ceil() * 10.0;

    (overall_duration, y_max.max(10.0))
}

/// Chart series as (seconds, value) pairs: net wpm and raw wpm
pub fn series(history: &[Snapshot]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    history
        .iter()
        .map(|s| {
            let t = s.elapsed;
            ((t, f64::from(s.wpm)), (t, f64::from(s.raw)))
        })
        .unzip()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
