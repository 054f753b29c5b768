//! Output directory of one analysis
//!
//! Every artifact goes through [`ReportDir`] so each written file is logged.
//! Tables are CSV, charts SVG, and the summary markdown.

pub mod chart;
pub mod tables;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

#[derive(Debug)]
pub struct ReportDir {
    dir: PathBuf,
    written: usize,
}

impl ReportDir {
    pub fn create(output_root: &Path, name: &str) -> anyhow::Result<Self> {
        let dir = output_root.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes rows whose fields become the CSV columns.
    pub fn write_rows<S, I>(&mut self, file_name: &str, rows: I) -> anyhow::Result<()>
    where
        S: serde::Serialize,
        I: IntoIterator<Item = S>,
    {
        let path = self.dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
        self.wrote(&path);
        Ok(())
    }

    /// Writes a CSV table whose header is only known at run time.
    pub fn write_records<I>(
        &mut self,
        file_name: &str,
        header: &[&str],
        rows: I,
    ) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let path = self.dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        writer
            .write_record(header)
            .with_context(|| format!("Failed to write CSV header to {}", path.display()))?;
        for row in rows {
            writer
                .write_record(&row)
                .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
        self.wrote(&path);
        Ok(())
    }

    pub fn write_text(&mut self, file_name: &str, content: &str) -> anyhow::Result<()> {
        let path = self.dir.join(file_name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        self.wrote(&path);
        Ok(())
    }

    /// Renders a chart; a failure is logged and the run goes on.
    pub fn chart<F>(&mut self, file_name: &str, render: F)
    where
        F: FnOnce(&Path) -> anyhow::Result<()>,
    {
        let path = self.dir.join(file_name);
        match render(&path) {
            Ok(()) => self.wrote(&path),
            Err(e) => log::warn!("skipped chart {}: {e:#}", path.display()),
        }
    }

    fn wrote(&mut self, path: &Path) {
        self.written += 1;
        log::info!("wrote {}", path.display());
    }
}

/// Empty cell for NaN, the number otherwise.
pub fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_cells_are_empty() {
        assert_eq!(cell(f64::NAN), "");
        assert_eq!(cell(2.5), "2.5");
        assert_eq!(cell(2019.0), "2019");
    }
}
