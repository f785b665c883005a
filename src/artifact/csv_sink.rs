// ==========================================
// 需求预测与产能排产系统 - CSV 产物输出
// ==========================================
// 兼容面: 列名与列序固定，不得改动
//   date, demand, machines_running, capacity_today, fulfilled_today,
//   backlog_end, operators_required, materials_required
// 浮点列带小数点输出，整数列按整数输出
// ==========================================

use crate::artifact::{ArtifactError, ArtifactResult, ArtifactSink};
use crate::domain::schedule::{ScheduleDay, ScheduleRun};
use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// 产物表头
pub const SCHEDULE_COLUMNS: [&str; 8] = [
    "date",
    "demand",
    "machines_running",
    "capacity_today",
    "fulfilled_today",
    "backlog_end",
    "operators_required",
    "materials_required",
];

// ==========================================
// CsvArtifactSink - 目录下按 <prefix>_<uuid>.csv 落盘
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvArtifactSink {
    dir: PathBuf,
}

impl CsvArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 将排产结果写入任意 writer
    pub fn write_run<W: std::io::Write>(writer: W, run: &ScheduleRun) -> ArtifactResult<()> {
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(SCHEDULE_COLUMNS)?;
        for day in &run.days {
            csv_writer.write_record(row_fields(day))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl ArtifactSink for CsvArtifactSink {
    fn persist(&self, prefix: &str, run: &ScheduleRun) -> ArtifactResult<String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ArtifactError::DirectoryError(format!("{}: {}", self.dir.display(), e)))?;

        let path = self
            .dir
            .join(format!("{}_{}.csv", prefix, Uuid::new_v4().simple()));
        let file = std::fs::File::create(&path)?;
        Self::write_run(file, run)?;

        let locator = path.display().to_string();
        info!(artifact = %locator, rows = run.days.len(), "排产产物已写出");
        Ok(locator)
    }
}

fn row_fields(day: &ScheduleDay) -> [String; 8] {
    [
        day.date.format("%Y-%m-%d").to_string(),
        format_float(day.demand),
        day.machines_running.to_string(),
        day.capacity_today.to_string(),
        format_float(day.fulfilled_today),
        format_float(day.backlog_end),
        day.operators_required.to_string(),
        format_float(day.materials_required()),
    ]
}

/// 浮点格式：整数值保留一位小数（450 → "450.0"）
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(450.0), "450.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(12.25), "12.25");
        assert_eq!(format_float(-3.0), "-3.0");
    }
}
