mod content;
mod id;
mod node;
mod routing_table;

pub use content::*;
pub use id::*;
pub use node::*;
pub use routing_table::*;
