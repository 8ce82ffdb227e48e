use crate::engine::aggregator::{DeltaSign, MemoryReading};

/// One bar character per this many GB of change.
const MEMORY_STEP_GB: f64 = 0.01;
/// Absorbs binary representation error so a 0.05 GB change yields 5 steps.
const STEP_TOLERANCE: f64 = 1e-9;
const CPU_INDENT: usize = 9;
/// The CPU bar always shows this many columns (indent included) at 0%.
const CPU_BASE_WIDTH: usize = 12;

pub fn memory_bar_len(delta_abs: f64) -> usize {
    (delta_abs / MEMORY_STEP_GB + STEP_TOLERANCE).floor() as usize
}

/// `   |#####* 0.05 (2.05)`: fill and tip encode the direction of change.
pub fn memory_graphic(reading: &MemoryReading) -> String {
    let len = memory_bar_len(reading.delta_abs);
    let (fill, tip) = match reading.delta_sign {
        DeltaSign::PositiveOrZero if len == 0 => ('#', 'o'),
        DeltaSign::PositiveOrZero => ('#', '*'),
        DeltaSign::Negative => (':', '@'),
    };

    let mut out = String::with_capacity(len + 24);
    out.push_str("   |");
    out.extend(std::iter::repeat_n(fill, len));
    out.push(tip);
    out.push_str(&format!(
        " {:.2} ({:.2})",
        reading.delta_abs, reading.used_physical_gb
    ));
    out
}

pub fn cpu_graphic(percent_used: f64) -> String {
    let width = percent_used.max(0.0).floor() as usize + CPU_BASE_WIDTH;
    let bars = width - CPU_INDENT;
    format!(
        "{}{} {percent_used:.2}",
        " ".repeat(CPU_INDENT),
        "|".repeat(bars)
    )
}
