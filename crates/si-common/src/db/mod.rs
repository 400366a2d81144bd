pub mod cities;
pub mod migrations;
pub mod pool;
pub mod results;
pub mod salaries;
pub mod store;
pub mod util;

/// Declares a storage error enum with the pool and postgres variants every
/// table module needs, plus any table-specific variants.
macro_rules! db_error {
    ($name:ident { $($(#[$meta:meta])* $variant:ident $(($($field:ty),*))?,)* }) => {
        #[derive(Debug, thiserror::Error)]
        pub enum $name {
            #[error("failed to get postgres connection: {0}")]
            Pool(#[from] deadpool_postgres::PoolError),
            #[error("postgres error: {0}")]
            Postgres(#[from] tokio_postgres::Error),
            $($(#[$meta])* $variant $(($($field),*))?,)*
        }
    };
}

pub(crate) use db_error;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use cities::{delete_city_standards_for_year, fetch_city_standard, insert_city_standards};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPoolError, PgPool, create_pool_from_url, create_pool_from_url_checked};
pub use results::{delete_result, insert_results, list_results};
pub use salaries::{delete_salaries_for_year, fetch_salaries, insert_salaries};
pub use store::PgContributionStore;
