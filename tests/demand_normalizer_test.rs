// ==========================================
// DemandNormalizer 集成测试
// ==========================================
// 测试目标: 各类输入形态 → 无缺口逐日序列
// ==========================================


use demand_planner::domain::{DemandInput, DemandRecord, PlanningError};
use demand_planner::importer::{DemandNormalizer, TabularData, TabularReader};
use demand_planner::importer::ImportResult;
use std::sync::Arc;
use test_helpers::{d, mapping, write_csv};

#[test]
fn test_csv_file_with_intraday_rows_is_summed() {
    let file = write_csv(
        "Order Date,Qty\n\
         2025-01-01 08:00:00,10\n\
         2025-01-01 17:30:00,5\n\
         2025-01-03,7\n",
    );
    let input = DemandInput::from_source_str(file.path().to_str().unwrap());
    assert!(matches!(input, DemandInput::Tabular(_)));

    let series = DemandNormalizer::new()
        .normalize(&input, d(2025, 1, 1), d(2025, 1, 4))
        .unwrap();

    assert_eq!(series.values(), vec![15.0, 0.0, 7.0, 0.0]);
    assert_eq!(series.start_date(), Some(d(2025, 1, 1)));
    assert_eq!(series.end_date(), Some(d(2025, 1, 4)));
}

#[test]
fn test_csv_missing_value_column() {
    let file = write_csv("date,price\n2025-01-01,10\n");
    let input = DemandInput::Tabular(file.path().to_str().unwrap().to_string());

    let result = DemandNormalizer::new().normalize(&input, d(2025, 1, 1), d(2025, 1, 2));
    assert!(matches!(result, Err(PlanningError::InputFormat(_))));
}

#[test]
fn test_csv_bad_date_names_row() {
    let file = write_csv("date,demand\n2025-01-01,10\nnot-a-date,3\n");
    let input = DemandInput::Tabular(file.path().to_str().unwrap().to_string());

    match DemandNormalizer::new().normalize(&input, d(2025, 1, 1), d(2025, 1, 2)) {
        Err(PlanningError::InputFormat(msg)) => assert!(msg.contains("行 3"), "{}", msg),
        other => panic!("期望 InputFormat，实际 {:?}", other),
    }
}

#[test]
fn test_records_and_mapping_agree() {
    let records = DemandInput::Records(vec![
        DemandRecord::new("2025-02-01", 3.0),
        DemandRecord::new("2025-02-03", 4.0),
    ]);
    let map = mapping(&[("2025-02-01", 3.0), ("2025-02-03", 4.0)]);

    let normalizer = DemandNormalizer::new();
    let a = normalizer.normalize(&records, d(2025, 2, 1), d(2025, 2, 3)).unwrap();
    let b = normalizer.normalize(&map, d(2025, 2, 1), d(2025, 2, 3)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.values(), vec![3.0, 0.0, 4.0]);
}

#[test]
fn test_encoded_payload_mapping() {
    let input = DemandInput::from_source_str(r#"{"2025-01-02": 8, "2025-01-01": "2.5"}"#);
    assert!(matches!(input, DemandInput::Encoded(_)));

    let series = DemandNormalizer::new()
        .normalize(&input, d(2025, 1, 1), d(2025, 1, 2))
        .unwrap();
    assert_eq!(series.values(), vec![2.5, 8.0]);
}

#[test]
fn test_encoded_payload_records() {
    let input = DemandInput::Encoded(
        r#"[{"Date": "2025-01-01", "Demand": 4}, {"Date": "2025-01-01", "Demand": 6}]"#.to_string(),
    );
    let series = DemandNormalizer::new()
        .normalize(&input, d(2025, 1, 1), d(2025, 1, 1))
        .unwrap();
    assert_eq!(series.values(), vec![10.0]);
}

#[test]
fn test_unparseable_string_is_input_format() {
    let input = DemandInput::from_source_str("definitely not demand data");
    let result = DemandNormalizer::new().normalize(&input, d(2025, 1, 1), d(2025, 1, 2));
    assert!(matches!(result, Err(PlanningError::InputFormat(_))));
}

#[test]
fn test_scalar_payload_is_input_format() {
    let input = DemandInput::Encoded("42".to_string());
    let result = DemandNormalizer::new().normalize(&input, d(2025, 1, 1), d(2025, 1, 2));
    assert!(matches!(result, Err(PlanningError::InputFormat(_))));
}

#[test]
fn test_end_before_start() {
    let input = mapping(&[("2025-01-01", 1.0)]);
    let result = DemandNormalizer::new().normalize(&input, d(2025, 1, 5), d(2025, 1, 1));
    assert!(matches!(result, Err(PlanningError::DateRange(_))));
}

#[test]
fn test_out_of_range_rows_dropped() {
    let input = mapping(&[("2024-12-31", 99.0), ("2025-01-01", 1.0), ("2025-01-09", 99.0)]);
    let series = DemandNormalizer::new()
        .normalize(&input, d(2025, 1, 1), d(2025, 1, 2))
        .unwrap();
    assert_eq!(series.values(), vec![1.0, 0.0]);
}

#[test]
fn test_normalize_is_idempotent() {
    let file = write_csv("date,value\n2025-01-01,1\n2025-01-01,2\n2025-01-05,3\n");
    let input = DemandInput::Tabular(file.path().to_str().unwrap().to_string());
    let normalizer = DemandNormalizer::new();

    let first = normalizer.normalize(&input, d(2025, 1, 1), d(2025, 1, 6)).unwrap();
    let second = normalizer.normalize(&input, d(2025, 1, 1), d(2025, 1, 6)).unwrap();
    assert_eq!(first, second);
}

// ==========================================
// 远程数据源: 注入读取器
// ==========================================

struct RemoteStub;

impl TabularReader for RemoteStub {
    fn read(&self, locator: &str) -> ImportResult<TabularData> {
        assert!(locator.starts_with("https://"));
        Ok(TabularData {
            headers: vec!["DATE".to_string(), "Quantity".to_string()],
            rows: vec![vec!["2025/01/02".to_string(), "1,200".to_string()]],
        })
    }
}

#[test]
fn test_url_locator_requires_injected_reader() {
    let input = DemandInput::from_source_str("https://example.com/demand.csv");
    assert!(matches!(input, DemandInput::Tabular(_)));

    let default_result = DemandNormalizer::new().normalize(&input, d(2025, 1, 1), d(2025, 1, 2));
    assert!(matches!(default_result, Err(PlanningError::InputFormat(_))));

    let series = DemandNormalizer::with_reader(Arc::new(RemoteStub))
        .normalize(&input, d(2025, 1, 1), d(2025, 1, 2))
        .unwrap();
    assert_eq!(series.values(), vec![0.0, 1200.0]);
}
