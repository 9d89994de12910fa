pub mod check;
pub mod defaults;
pub mod export;
pub mod list;
pub mod node_ops;
