pub mod models;
pub mod writer;

pub use models::OddsRow;
pub use writer::OddsWriter;
