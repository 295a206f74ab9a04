pub mod catalog;
pub mod operator_map;
pub mod submissions;
