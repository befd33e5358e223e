pub use loginguard_types::prelude::*;

// vim: ts=4
