//! Synthetic fixture tables for demos and local development.
//!
//! Every sales row picks one of a fixed event catalogue (each event belongs
//! to exactly one category) and one of a fixed list of cities. Dates fall on
//! days 1..=28 of a random month of the configured year.

use crate::schema::{SalesRow, ViewRow};
use chrono::{Days, NaiveDate};
use event_metrics_core::config::GeneratorConfig;
use event_metrics_core::types::{SalesRecord, ViewRecord};
use event_metrics_core::{MetricsError, MetricsResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::info;

/// Event name and its category.
pub const EVENTS: [(&str, &str); 5] = [
    ("Concierto A", "Música"),
    ("Obra de Teatro B", "Teatro"),
    ("Feria C", "Cultura"),
    ("Conferencia D", "Educación"),
    ("Exposición E", "Arte"),
];

pub const CITIES: [&str; 5] = ["Manta", "Guayaquil", "Cuenca", "Quito", "Ambato"];

const MAX_TICKETS: u32 = 10;
const MAX_VIEW_SECS: u32 = 300;
const DAYS_PER_MONTH: u64 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSummary {
    pub sales_rows: usize,
    pub views_rows: usize,
    pub year: i32,
}

pub struct FixtureGenerator {
    config: GeneratorConfig,
    months: Vec<NaiveDate>,
    rng: StdRng,
}

impl FixtureGenerator {
    pub fn new(config: GeneratorConfig) -> MetricsResult<Self> {
        if config.user_pool == 0 {
            return Err(MetricsError::Generation(
                "user_pool must be at least 1".to_string(),
            ));
        }
        let months = (1..=12)
            .map(|month| NaiveDate::from_ymd_opt(config.year, month, 1))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| MetricsError::Generation(format!("unsupported year {}", config.year)))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, months, rng })
    }

    fn random_date(&mut self) -> NaiveDate {
        let first = self.months[self.rng.gen_range(0..self.months.len())];
        first + Days::new(self.rng.gen_range(0..DAYS_PER_MONTH))
    }

    pub fn sales(&mut self) -> Vec<SalesRecord> {
        (0..self.config.sales_rows).map(|_| self.sale()).collect()
    }

    fn sale(&mut self) -> SalesRecord {
        let date = self.random_date();
        let (event, category) = EVENTS[self.rng.gen_range(0..EVENTS.len())];
        let city = CITIES[self.rng.gen_range(0..CITIES.len())];
        let tickets_sold = self.rng.gen_range(1..=MAX_TICKETS);
        let satisfaction = round_to(self.rng.gen_range(3.0..=5.0), 1);
        let total = round_to(f64::from(tickets_sold) * self.rng.gen_range(20.0..=100.0), 2);
        let discount = round_to(total * self.rng.gen_range(0.05..=0.3), 2);

        SalesRecord {
            date,
            event: event.to_string(),
            category: category.to_string(),
            city: city.to_string(),
            tickets_sold,
            satisfaction: format!("{satisfaction:.1}"),
            total,
            discount,
        }
    }

    pub fn views(&mut self) -> Vec<ViewRecord> {
        (0..self.config.views_rows).map(|_| self.view()).collect()
    }

    fn view(&mut self) -> ViewRecord {
        let date = self.random_date();
        let user = self.rng.gen_range(1..=self.config.user_pool);
        let view_duration_secs = self.rng.gen_range(1..=MAX_VIEW_SECS);
        let city = CITIES[self.rng.gen_range(0..CITIES.len())];

        ViewRecord {
            date,
            user_id: format!("user_{user}"),
            view_duration_secs,
            city: city.to_string(),
        }
    }

    /// Generate both tables and write them as CSV files.
    pub fn write_files(
        &mut self,
        sales_path: impl AsRef<Path>,
        views_path: impl AsRef<Path>,
    ) -> MetricsResult<FixtureSummary> {
        let sales = self.sales();
        let views = self.views();

        write_sales(create(sales_path.as_ref())?, &sales)?;
        write_views(create(views_path.as_ref())?, &views)?;

        let summary = FixtureSummary {
            sales_rows: sales.len(),
            views_rows: views.len(),
            year: self.config.year,
        };
        info!(
            sales_path = %sales_path.as_ref().display(),
            views_path = %views_path.as_ref().display(),
            sales_rows = summary.sales_rows,
            views_rows = summary.views_rows,
            "Fixture tables written"
        );
        Ok(summary)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn create(path: &Path) -> MetricsResult<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::File::create(path)?)
}

pub fn write_sales<W: io::Write>(writer: W, records: &[SalesRecord]) -> MetricsResult<()> {
    write_table(writer, records.iter().map(SalesRow::from))
}

pub fn write_views<W: io::Write>(writer: W, records: &[ViewRecord]) -> MetricsResult<()> {
    write_table(writer, records.iter().map(ViewRow::from))
}

fn write_table<W, Row>(writer: W, rows: impl Iterator<Item = Row>) -> MetricsResult<()>
where
    W: io::Write,
    Row: Serialize,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| MetricsError::Generation(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_sales, load_views, read_sales};
    use chrono::Datelike;

    fn config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            sales_rows: 200,
            views_rows: 300,
            year: 2024,
            user_pool: 25,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_sales_rows_stay_in_range() {
        let mut generator = FixtureGenerator::new(config(7)).unwrap();
        let sales = generator.sales();
        assert_eq!(sales.len(), 200);

        for sale in &sales {
            assert_eq!(sale.date.year(), 2024);
            assert!(sale.date.day() <= 28);
            assert!((1..=10).contains(&sale.tickets_sold));
            let score = sale.satisfaction_score().unwrap();
            assert!((3.0..=5.0).contains(&score));
            let per_ticket = sale.total / f64::from(sale.tickets_sold);
            assert!((19.99..=100.01).contains(&per_ticket));
            assert!(sale.discount >= 0.0 && sale.discount <= sale.total * 0.3 + 0.01);
            assert!(CITIES.contains(&sale.city.as_str()));
        }
    }

    #[test]
    fn test_each_event_has_one_category() {
        let mut generator = FixtureGenerator::new(config(11)).unwrap();
        for sale in generator.sales() {
            let (_, category) = EVENTS
                .iter()
                .find(|(event, _)| *event == sale.event)
                .unwrap();
            assert_eq!(sale.category, *category);
        }
    }

    #[test]
    fn test_views_use_user_pool() {
        let mut generator = FixtureGenerator::new(config(3)).unwrap();
        let views = generator.views();
        assert_eq!(views.len(), 300);
        for view in &views {
            let n: u32 = view.user_id.strip_prefix("user_").unwrap().parse().unwrap();
            assert!((1..=25).contains(&n));
            assert!((1..=300).contains(&view.view_duration_secs));
        }
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let a = FixtureGenerator::new(config(42)).unwrap().sales();
        let b = FixtureGenerator::new(config(42)).unwrap().sales();
        let c = FixtureGenerator::new(config(43)).unwrap().sales();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut no_users = config(1);
        no_users.user_pool = 0;
        assert!(matches!(
            FixtureGenerator::new(no_users),
            Err(MetricsError::Generation(_))
        ));

        let mut bad_year = config(1);
        bad_year.year = 1_000_000;
        assert!(FixtureGenerator::new(bad_year).is_err());
    }

    #[test]
    fn test_written_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let sales_path = dir.path().join("data/ventas_eventos.csv");
        let views_path = dir.path().join("data/vistas_eventos.csv");

        let mut generator = FixtureGenerator::new(config(5)).unwrap();
        let summary = generator.write_files(&sales_path, &views_path).unwrap();
        assert_eq!(summary.sales_rows, 200);
        assert_eq!(summary.views_rows, 300);

        let sales = load_sales(&sales_path).unwrap();
        let views = load_views(&views_path).unwrap();
        assert_eq!(sales.len(), 200);
        assert_eq!(views.len(), 300);

        let expected = FixtureGenerator::new(config(5)).unwrap().sales();
        assert_eq!(sales, expected);
    }

    #[test]
    fn test_written_header_row() {
        let mut buf = Vec::new();
        let records = FixtureGenerator::new(config(9)).unwrap().sales();
        write_sales(&mut buf, &records[..1]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "Fecha,Evento,Categoría,Entradas Vendidas,Ubicación,Satisfacción,Total,Descuento\n"
        ));
        assert_eq!(read_sales(buf.as_slice()).unwrap(), records[..1].to_vec());
    }
}
