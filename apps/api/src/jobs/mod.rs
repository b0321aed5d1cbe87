// Job catalog: storage seam, lookup/keyword search and the embedding
// backfill task.

pub mod backfill;
pub mod handlers;
pub mod memory;
pub mod search;
pub mod store;
