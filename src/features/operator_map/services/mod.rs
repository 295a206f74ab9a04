mod operator_map;

pub use operator_map::OperatorMap;
