mod products;

pub use products::{AppendOutcome, ProductStore};
