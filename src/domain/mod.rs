pub mod changes;
pub mod lead;
pub mod query;
pub mod validation;
