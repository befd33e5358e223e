//! Utility functions for database operations

use loginguard_types::prelude::*;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

// vim: ts=4
