// ==========================================
// CapacityScheduler 集成测试
// ==========================================
// 测试目标: 逐日积压结转、产能约束、汇总指标
// ==========================================


use demand_planner::domain::MachineConfig;
use demand_planner::engine::CapacityScheduler;
use test_helpers::{d, daily_series, default_line};

// ==========================================
// 场景测试
// ==========================================

#[test]
fn test_single_day_within_capacity() {
    let scheduler = CapacityScheduler::new(default_line());
    let run = scheduler.schedule_single_day(d(2025, 1, 1), 450.0);

    assert_eq!(run.days.len(), 1);
    let day = &run.days[0];
    assert_eq!(day.machines_running, 5);
    assert_eq!(day.capacity_today, 500);
    assert_eq!(day.fulfilled_today, 450.0);
    assert_eq!(day.backlog_end, 0.0);
    assert_eq!(day.operators_required, 25);
}

#[test]
fn test_backlog_carried_to_next_day() {
    let scheduler = CapacityScheduler::new(default_line());
    let run = scheduler.schedule(&daily_series(d(2025, 1, 1), &[600.0, 0.0]));

    let day1 = &run.days[0];
    assert_eq!(day1.machines_running, 5);
    assert_eq!(day1.fulfilled_today, 500.0);
    assert_eq!(day1.backlog_end, 100.0);

    let day2 = &run.days[1];
    assert_eq!(day2.effective_required, 100.0);
    assert_eq!(day2.machines_running, 1);
    assert_eq!(day2.fulfilled_today, 100.0);
    assert_eq!(day2.backlog_end, 0.0);
    assert_eq!(day2.operators_required, 5);

    assert_eq!(run.summary.total_demand, 600.0);
    assert_eq!(run.summary.total_fulfilled, 600.0);
    assert_eq!(run.summary.peak_machines, 5);
    assert_eq!(run.summary.avg_operators, 15.0);
}

#[test]
fn test_zero_demand_idles_line() {
    let scheduler = CapacityScheduler::new(default_line());
    let run = scheduler.schedule(&daily_series(d(2025, 1, 1), &[0.0, 0.0, 0.0]));

    for day in &run.days {
        assert_eq!(day.machines_running, 0);
        assert_eq!(day.capacity_today, 0);
        assert_eq!(day.operators_required, 0);
    }
    assert_eq!(run.summary.peak_machines, 0);
    assert_eq!(run.summary.avg_operators, 0.0);
}

// ==========================================
// 不变量测试
// ==========================================

fn demand_profile() -> Vec<f64> {
    vec![
        120.0, 980.0, 0.0, 333.3, 1500.0, 0.0, 0.0, 70.0, 501.0, 499.9, 2000.0, 10.0, 0.0, 250.0,
    ]
}

#[test]
fn test_day_invariants_hold() {
    let config = MachineConfig::new(4, 150, 3).unwrap();
    let scheduler = CapacityScheduler::new(config);
    let run = scheduler.schedule(&daily_series(d(2025, 3, 1), &demand_profile()));

    let mut backlog_in = 0.0;
    for day in &run.days {
        assert!(day.backlog_end >= 0.0, "{}: 积压为负", day.date);
        assert!(day.fulfilled_today <= day.capacity_today as f64);
        assert!(day.fulfilled_today <= day.demand + backlog_in + 1e-9);
        assert!(day.machines_running <= config.machines);
        assert_eq!(
            day.capacity_today,
            u64::from(day.machines_running) * u64::from(config.throughput_per_machine)
        );
        assert_eq!(
            day.operators_required,
            u64::from(day.machines_running) * u64::from(config.labor_per_shift)
        );
        backlog_in = day.backlog_end;
    }
}

#[test]
fn test_backlog_conservation() {
    let scheduler = CapacityScheduler::new(MachineConfig::new(3, 100, 2).unwrap());
    let initial_backlog = 250.0;
    let run = scheduler.schedule_with_backlog(
        &daily_series(d(2025, 3, 1), &demand_profile()),
        initial_backlog,
    );

    let fulfilled: f64 = run.days.iter().map(|x| x.fulfilled_today).sum();
    let demand: f64 = run.days.iter().map(|x| x.demand).sum();
    let lhs = fulfilled + run.final_backlog();
    let rhs = demand + initial_backlog;
    assert!((lhs - rhs).abs() < 1e-6, "lhs={} rhs={}", lhs, rhs);
    assert_eq!(run.days[0].backlog_start(), initial_backlog);
}

#[test]
fn test_scheduling_is_idempotent() {
    let scheduler = CapacityScheduler::new(default_line());
    let series = daily_series(d(2025, 3, 1), &demand_profile());

    assert_eq!(scheduler.schedule(&series), scheduler.schedule(&series));
}

#[test]
fn test_fractional_demand_rounds_machines_up() {
    let scheduler = CapacityScheduler::new(default_line());
    let run = scheduler.schedule_single_day(d(2025, 1, 1), 100.5);

    assert_eq!(run.days[0].machines_running, 2);
    assert_eq!(run.days[0].capacity_today, 200);
    assert_eq!(run.days[0].fulfilled_today, 100.5);
}

#[test]
fn test_materials_match_fulfilled() {
    let scheduler = CapacityScheduler::new(default_line());
    let run = scheduler.schedule(&daily_series(d(2025, 1, 1), &[700.0, 300.0]));
    for day in &run.days {
        assert_eq!(day.materials_required(), day.fulfilled_today);
    }
}
