use std::{fs::File, io, path::Path};

use anyhow::Context;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Rounds to one decimal, the precision of every reported percentage.
pub fn round1(value: f64) -> f64 {
    pede_stats::binning::round_to(value, 1)
}

/// Formats a number for tables and summaries; NaN becomes `n/a`.
pub fn fmt_num(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "n/a".to_owned()
    } else {
        format!("{value:.decimals$}")
    }
}

/// Rounds to `decimals` and prints without trailing zeros; NaN becomes `n/a`.
pub fn fmt_rounded(value: f64, decimals: i32) -> String {
    if value.is_nan() {
        "n/a".to_owned()
    } else {
        pede_stats::binning::round_to(value, decimals).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt_num(27.2727, 1), "27.3");
        assert_eq!(fmt_num(f64::NAN, 4), "n/a");
        assert_eq!(fmt_rounded(6.300_04, 4), "6.3");
        assert_eq!(fmt_rounded(f64::NAN, 6), "n/a");
        assert_eq!(round1(41.666), 41.7);
    }
}
