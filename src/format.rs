pub const DIVIDER: &str = "--------------------------------------------";

pub fn bytes_to_gib(bytes: u64) -> f64 {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    bytes as f64 / GIB
}

/// `used GB / total GB` with the two-decimal fields every panel uses.
pub fn format_gb_pair(used: f64, total: f64) -> String {
    format!("{used:.2} GB / {total:.2} GB")
}
