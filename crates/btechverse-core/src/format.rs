//! Human-readable formatting for sizes and counters shown to students.

/// Format a byte count with a 1024 base (`1.5 MB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut unit: u64 = 1;
    while exponent < UNITS.len() - 1 && bytes >= unit * 1024 {
        unit *= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / unit as f64;
    format!("{} {}", trim_decimals(value, 2), UNITS[exponent])
}

/// Format a counter compactly: `999`, `1.2k`, `3.4M`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}M", trim_decimals(n as f64 / 1_000_000.0, 1))
    } else if n >= 1_000 {
        format!("{}k", trim_decimals(n as f64 / 1_000.0, 1))
    } else {
        n.to_string()
    }
}

fn trim_decimals(value: f64, places: usize) -> String {
    let rounded = format!("{:.*}", places, value);
    if rounded.contains('.') {
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rounded
    }
}
