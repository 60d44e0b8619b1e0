//! Sales and Views tables on disk: the CSV loader used at startup and the
//! offline fixture generator that produces synthetic tables.

pub mod generator;
pub mod loader;
pub mod schema;

pub use generator::{FixtureGenerator, FixtureSummary};
pub use loader::{load_context, load_sales, load_views};
