pub mod partition;
pub mod query;
pub mod remote;
pub mod resolve;
pub mod schema;
