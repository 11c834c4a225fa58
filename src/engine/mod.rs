pub(crate) mod scheduler;
pub(crate) mod static_layer;
pub(crate) mod tree_engine;
