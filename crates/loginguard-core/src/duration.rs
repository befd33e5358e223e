//! Human-readable rendering of ban durations (`1d2h3m4s`)

const UNITS: [(u64, char); 6] = [
	(365 * 86400, 'y'),
	(7 * 86400, 'w'),
	(86400, 'd'),
	(3600, 'h'),
	(60, 'm'),
	(1, 's'),
];

/// Render seconds as years, weeks, days, hours, minutes and seconds,
/// leaving out zero components
pub fn format_duration(secs: u64) -> String {
	if secs == 0 {
		return "0s".to_string();
	}

	let mut out = String::new();
	let mut rest = secs;
	for (unit, suffix) in UNITS {
		let n = rest / unit;
		if n > 0 {
			out.push_str(&n.to_string());
			out.push(suffix);
			rest %= unit;
		}
	}
	out
}


// vim: ts=4
