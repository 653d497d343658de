pub mod decoder;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod schema;
pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use entities::*;
pub use errors::*;
pub use ports::*;
