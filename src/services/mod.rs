pub mod variable_store;

pub use variable_store::VariableStore;
