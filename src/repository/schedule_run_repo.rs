// ==========================================
// 需求预测与产能排产系统 - 排产结果数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: schedule_run（运行汇总）/ schedule_day（逐日明细）
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::schedule::{ScheduleDay, ScheduleRun};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// StoredScheduleRun - 已落库的运行记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct StoredScheduleRun {
    pub run_id: String,
    pub prefix: String,
    pub total_demand: f64,
    pub total_fulfilled: f64,
    pub peak_machines: u32,
    pub avg_operators: f64,
    pub days: Vec<ScheduleDay>,
}

// ==========================================
// ScheduleRunRepository - 排产结果仓储
// ==========================================
pub struct ScheduleRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRunRepository {
    /// 创建新的仓储实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一次排产运行（单事务）
    pub fn insert_run(&self, run_id: &str, prefix: &str, run: &ScheduleRun) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO schedule_run (
                run_id, prefix, machines, throughput_per_machine, labor_per_shift,
                initial_backlog, start_date, end_date, total_demand, total_fulfilled,
                peak_machines, avg_operators
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                run_id,
                prefix,
                run.config.machines,
                run.config.throughput_per_machine,
                run.config.labor_per_shift,
                run.initial_backlog,
                run.summary.start_date.map(format_date),
                run.summary.end_date.map(format_date),
                run.summary.total_demand,
                run.summary.total_fulfilled,
                run.summary.peak_machines,
                run.summary.avg_operators,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO schedule_day (
                    run_id, date, demand, machines_running, capacity_today,
                    fulfilled_today, backlog_end, operators_required, materials_required
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for day in &run.days {
                stmt.execute(params![
                    run_id,
                    format_date(day.date),
                    day.demand,
                    day.machines_running,
                    to_sql_int(day.capacity_today, "capacity_today")?,
                    day.fulfilled_today,
                    day.backlog_end,
                    to_sql_int(day.operators_required, "operators_required")?,
                    day.materials_required(),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 按 run_id 读取运行及逐日明细（按日期升序）
    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<StoredScheduleRun>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT prefix, total_demand, total_fulfilled, peak_machines, avg_operators,
                       initial_backlog
                FROM schedule_run WHERE run_id = ?1
                "#,
                params![run_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, f64>(5)?,
                    ))
                },
            )
            .optional()?;

        let (prefix, total_demand, total_fulfilled, peak_machines, avg_operators, initial_backlog) =
            match header {
                Some(h) => h,
                None => return Ok(None),
            };

        let mut stmt = conn.prepare(
            r#"
            SELECT date, demand, machines_running, capacity_today, fulfilled_today,
                   backlog_end, operators_required
            FROM schedule_day WHERE run_id = ?1 ORDER BY date
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut days = Vec::new();
        let mut backlog_in = initial_backlog;
        for row in rows {
            let (date_str, demand, machines_running, capacity, fulfilled, backlog_end, operators) = row?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "date".to_string(),
                    message: format!("{}: {}", date_str, e),
                }
            })?;
            days.push(ScheduleDay {
                date,
                demand,
                effective_required: demand + backlog_in,
                machines_running,
                capacity_today: capacity.max(0) as u64,
                fulfilled_today: fulfilled,
                backlog_end,
                operators_required: operators.max(0) as u64,
            });
            backlog_in = backlog_end;
        }

        Ok(Some(StoredScheduleRun {
            run_id: run_id.to_string(),
            prefix,
            total_demand,
            total_fulfilled,
            peak_machines,
            avg_operators,
            days,
        }))
    }

    /// 统计运行数
    pub fn count_runs(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM schedule_run", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn to_sql_int(value: u64, field: &str) -> RepositoryResult<i64> {
    i64::try_from(value).map_err(|_| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("数值超出 INTEGER 范围: {}", value),
    })
}
