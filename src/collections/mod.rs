mod node;
pub mod ordered_chain;
