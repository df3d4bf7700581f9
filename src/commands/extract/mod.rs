mod dom;
mod escape;
mod records;
mod run;
mod scan_conditions;
mod scan_sections;
mod serialize;
mod statements;
mod store;
mod table_shape;

pub use run::{TARGETS, run};
pub use store::describe_table;
