pub mod node;
pub mod path;
pub mod workflow;

pub use node::*;
pub use path::*;
pub use workflow::*;
