/// Renders a float the way boosts and explanation values are printed: integral values keep
/// one trailing decimal (`100.0`), everything else uses the shortest round-trip form (`0.6`,
/// `80.1`).
pub(crate) fn fmt_float(value: f32) -> String {
    if value == value.trunc() && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
