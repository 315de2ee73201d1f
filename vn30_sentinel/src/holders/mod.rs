pub mod results;

pub use results::{ResultsHolder, ResultsSnapshot};
