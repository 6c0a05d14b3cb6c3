pub fn truncate_label(label: &str, limit: usize) -> &str {
    label
        .char_indices()
        .nth(limit)
        .map(|(index, _)| &label[..index])
        .unwrap_or(label)
}

pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < 1e15 {
        format!("{weight:.0}")
    } else {
        let text = format!("{weight:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

pub fn parse_weight(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|weight| weight.is_finite())
}
