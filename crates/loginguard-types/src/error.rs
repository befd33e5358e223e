//! Error type shared by the engine and the adapters

pub type LgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Malformed address or CIDR text
	Parse(String),
	/// Invalid configuration value
	ConfigError(String),
	/// Persistence unavailable or a query failed
	DbError,
	NotFound,

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Parse(msg) => write!(f, "parse error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::DbError => write!(f, "storage error"),
			Error::NotFound => write!(f, "not found"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

// vim: ts=4
