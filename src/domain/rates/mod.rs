// Rate series domain
pub mod normalizer;
pub mod types;

pub use normalizer::{SeedPolicy, SeriesNormalizer};
pub use types::{CurrencyPair, DatedRate, DenseSeries, NormalizedPoint, Rate, SparseSeries, Window};
