//! Generated fixtures → CSV files → loader → aggregation engine.

use event_metrics_core::config::{DataConfig, GeneratorConfig};
use event_metrics_core::types::{fields, AxisRange, ChartKind};
use event_metrics_datasets::{load_context, FixtureGenerator};
use event_metrics_reporting::{AggregationEngine, ConversionMode, MetricQuery, SatisfactionMode};

fn generated_engine(seed: u64) -> (tempfile::TempDir, DataConfig, AggregationEngine) {
    let dir = tempfile::tempdir().unwrap();
    let data = DataConfig {
        sales_path: dir.path().join("ventas_eventos.csv").display().to_string(),
        views_path: dir.path().join("vistas_eventos.csv").display().to_string(),
    };
    let config = GeneratorConfig {
        sales_rows: 500,
        views_rows: 1000,
        year: 2024,
        user_pool: 300,
        seed: Some(seed),
    };
    FixtureGenerator::new(config)
        .unwrap()
        .write_files(&data.sales_path, &data.views_path)
        .unwrap();

    let engine = AggregationEngine::new(load_context(&data).unwrap(), 128);
    (dir, data, engine)
}

#[test]
fn test_default_dashboard_on_generated_tables() {
    let (_dir, _data, engine) = generated_engine(2024);

    let options = engine.filter_options();
    assert_eq!(options.cities.len(), 5);
    assert_eq!(options.categories.len(), 5);
    assert_eq!(options.events.len(), 5);

    for query in engine.default_queries().queries() {
        assert!(query.validate().is_ok());
        let result = engine.run(&query);
        assert!(!result.is_empty(), "{:?} produced no rows", query.metric());
        assert!(result.y_values().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_generated_satisfaction_stays_within_clamp() {
    let (_dir, _data, engine) = generated_engine(7);
    let mut params = engine.default_queries().satisfaction;

    for (mode, temporal) in [
        (SatisfactionMode::General, false),
        (SatisfactionMode::General, true),
        (SatisfactionMode::CompareByEvent, false),
        (SatisfactionMode::CompareByEvent, true),
    ] {
        params.mode = mode;
        params.temporal = temporal;
        let result = engine.satisfaction(&params);
        assert_eq!(result.y_axis_clamp, Some(AxisRange::SATISFACTION));
        let expected_kind = if temporal { ChartKind::Line } else { ChartKind::Bar };
        assert_eq!(result.chart_kind, expected_kind);
        for value in result.y_values() {
            assert!((3.0..=5.0).contains(&value), "{value}");
        }
    }
}

#[test]
fn test_by_city_conversion_never_exceeds_join() {
    let (_dir, _data, engine) = generated_engine(11);
    let mut params = engine.default_queries().conversion_rate.unwrap();

    let combined = engine.conversion_rate(&params);
    params.mode = ConversionMode::ByCity;
    let by_city = engine.conversion_rate(&params);

    assert!(by_city.rows.len() >= combined.rows.len());
    for row in &by_city.rows {
        let tickets = row.value(fields::TICKETS_SOLD).unwrap();
        let views = row.value(fields::VIEW_COUNT).unwrap();
        assert!(views > 0.0);
        assert_eq!(row.value(fields::CONVERSION_RATE), Some(tickets / views));
    }
}

#[test]
fn test_reload_from_regenerated_files() {
    let (_dir, data, engine) = generated_engine(1);
    let query = MetricQuery::ProfitabilityIndex(engine.default_queries().profitability_index);
    let before = engine.run(&query);

    let config = GeneratorConfig {
        sales_rows: 50,
        views_rows: 50,
        year: 2023,
        user_pool: 10,
        seed: Some(99),
    };
    FixtureGenerator::new(config)
        .unwrap()
        .write_files(&data.sales_path, &data.views_path)
        .unwrap();
    let generation = engine.reload(load_context(&data).unwrap());
    assert_eq!(generation, 2);

    let after = engine.run(&query);
    assert_ne!(*before, *after);
    let window = engine.filter_options().sales_dates.unwrap();
    assert!(window.start >= chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    assert!(window.end <= chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
}
