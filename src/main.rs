// ==========================================
// 需求预测与产能排产系统 - 命令行入口
// ==========================================
// 用法:
//   demand-planner forecast <source> <target>
//   demand-planner schedule-day <date> <demand> [machines throughput labor]
//   demand-planner schedule-range <source> <start> <end> [machines throughput labor]
// 输出: JSON 响应（stdout），日志写 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use demand_planner::api::{LineOverrides, PlanningApi, PlanningResponse};
use demand_planner::config::{get_default_db_path, ConfigManager, PlannerConfigReader};
use demand_planner::domain::DemandInput;
use serde::Serialize;

const USAGE: &str = "用法:
  demand-planner forecast <source> <target>
  demand-planner schedule-day <date> <demand> [machines throughput labor]
  demand-planner schedule-range <source> <start> <end> [machines throughput labor]";

#[tokio::main]
async fn main() -> Result<()> {
    demand_planner::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    tracing::info!("{} v{}", demand_planner::APP_NAME, demand_planner::VERSION);

    let db_path = get_default_db_path();
    tracing::info!("使用配置库: {}", db_path);
    let config_manager = ConfigManager::new(&db_path).context("无法打开配置库")?;
    let config = config_manager
        .load_planner_config()
        .await
        .context("配置加载失败")?;
    let api = PlanningApi::from_config(&config).context("规划 API 初始化失败")?;

    let ok = match command.as_str() {
        "forecast" => {
            let [source, target] = take_args::<2>(&args[1..])?;
            let input = DemandInput::from_source_str(&source);
            print_response(&api.resolve_and_forecast_async(&input, &target).await)?
        }
        "schedule-day" => {
            if args.len() < 3 {
                bail!("schedule-day 需要 <date> <demand>\n{}", USAGE);
            }
            let demand: f64 = args[2]
                .trim()
                .parse()
                .with_context(|| format!("需求量不是数值: {}", args[2]))?;
            let overrides = parse_overrides(&args[3..])?;
            print_response(&api.schedule_single_day(&args[1], demand, overrides))?
        }
        "schedule-range" => {
            if args.len() < 4 {
                bail!("schedule-range 需要 <source> <start> <end>\n{}", USAGE);
            }
            let input = DemandInput::from_source_str(&args[1]);
            let overrides = parse_overrides(&args[4..])?;
            print_response(&api.schedule_range(&input, &args[2], &args[3], overrides))?
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// 取恰好 N 个位置参数
fn take_args<const N: usize>(args: &[String]) -> Result<[String; N]> {
    if args.len() != N {
        bail!("参数个数错误: 期望 {}，实际 {}\n{}", N, args.len(), USAGE);
    }
    let owned: Vec<String> = args.to_vec();
    owned
        .try_into()
        .map_err(|_| anyhow!("参数个数错误\n{}", USAGE))
}

/// 可选的三个产线参数: 要么全给，要么都不给
fn parse_overrides(args: &[String]) -> Result<LineOverrides> {
    match args {
        [] => Ok(LineOverrides::default()),
        [machines, throughput, labor] => {
            let parse = |name: &str, value: &str| -> Result<u32> {
                value
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("{} 必须为非负整数: {}", name, value))
            };
            Ok(LineOverrides::new(
                parse("machines", machines)?,
                parse("throughput_per_machine", throughput)?,
                parse("labor_per_shift", labor)?,
            ))
        }
        _ => bail!("产线参数需同时给出 machines throughput labor\n{}", USAGE),
    }
}

fn print_response<T: Serialize>(response: &PlanningResponse<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.is_success())
}
