pub mod dataset;
pub mod query;

pub use dataset::{Cell, Dataset, DatasetError, MissingField, Record, Row};
