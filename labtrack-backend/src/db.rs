pub mod error;
pub mod model;
pub(crate) mod schema;
pub mod seed_data;
#[cfg(test)]
mod test_util;
mod util;

pub use model::{FetchById, FetchMany, Write};
pub use util::Pagination;
