pub use fanout_core::{contract, logging, suppress};
