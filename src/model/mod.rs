pub mod config;
pub mod mind_map;
pub mod node;
pub mod tree;
pub mod view;

pub use config::*;
pub use mind_map::*;
pub use node::*;
pub use tree::*;
pub use view::*;
