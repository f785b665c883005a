// ==========================================
// 需求预测与产能排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::config_reader_trait::PlannerConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::planner_config::{
    get_default_artifact_dir, ForecastSettings, SchedulerDefaults,
};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const SCHEDULER_MACHINES: &str = "scheduler.machines";
    pub const SCHEDULER_THROUGHPUT: &str = "scheduler.throughput_per_machine";
    pub const SCHEDULER_LABOR: &str = "scheduler.labor_per_shift";
    pub const FORECAST_ARIMA_ORDER: &str = "forecast.arima_order";
    pub const FORECAST_TIMEOUT_MS: &str = "forecast.timeout_ms";
    pub const ARTIFACT_DIR: &str = "artifact.dir";
}

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ConfigError::ReadError {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取并解析配置，缺失时返回默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::ValueError {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
        }
    }
}

/// 解析 "p,d,q"
fn parse_arima_order(key: &str, raw: &str) -> ConfigResult<(usize, usize, usize)> {
    let invalid = |message: &str| ConfigError::ValueError {
        key: key.to_string(),
        value: raw.to_string(),
        message: message.to_string(),
    };

    let parts: Vec<usize> = raw
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid("期望三个非负整数 p,d,q"))?;

    match parts.as_slice() {
        [p, d, q] => Ok((*p, *d, *q)),
        _ => Err(invalid("期望三个非负整数 p,d,q")),
    }
}

#[async_trait]
impl PlannerConfigReader for ConfigManager {
    async fn get_scheduler_defaults(&self) -> ConfigResult<SchedulerDefaults> {
        let defaults = SchedulerDefaults::default();
        let throughput =
            self.get_parsed_or(config_keys::SCHEDULER_THROUGHPUT, defaults.throughput_per_machine)?;
        if throughput == 0 {
            return Err(ConfigError::ValueError {
                key: config_keys::SCHEDULER_THROUGHPUT.to_string(),
                value: "0".to_string(),
                message: "必须大于 0".to_string(),
            });
        }

        Ok(SchedulerDefaults {
            machines: self.get_parsed_or(config_keys::SCHEDULER_MACHINES, defaults.machines)?,
            throughput_per_machine: throughput,
            labor_per_shift: self.get_parsed_or(config_keys::SCHEDULER_LABOR, defaults.labor_per_shift)?,
        })
    }

    async fn get_forecast_settings(&self) -> ConfigResult<ForecastSettings> {
        let defaults = ForecastSettings::default();
        let arima_order = match self.get_global_config_value(config_keys::FORECAST_ARIMA_ORDER)? {
            Some(raw) => parse_arima_order(config_keys::FORECAST_ARIMA_ORDER, &raw)?,
            None => defaults.arima_order,
        };

        Ok(ForecastSettings {
            arima_order,
            timeout_ms: self.get_parsed_or(config_keys::FORECAST_TIMEOUT_MS, defaults.timeout_ms)?,
        })
    }

    async fn get_artifact_dir(&self) -> ConfigResult<PathBuf> {
        Ok(self
            .get_global_config_value(config_keys::ARTIFACT_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(get_default_artifact_dir))
    }
}
