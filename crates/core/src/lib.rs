pub mod institution;
pub mod money;
pub mod period;
pub mod transaction;

pub use institution::Institution;
pub use money::Money;
pub use period::DateRange;
pub use transaction::{Direction, NormalizedTransaction, RecordError};
