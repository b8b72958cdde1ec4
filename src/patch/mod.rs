pub mod apply;
pub mod definition;
pub mod report;
pub mod text;

pub use apply::*;
pub use definition::*;
pub use report::*;
