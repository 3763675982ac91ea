use flexi_logger::{
	DeferredNow,
	filter::{LogLineFilter, LogLineWriter},
};
use log::LevelFilter;

/// Caps for chatty dependencies, applied on top of `RUST_LOG`.
const HTTP_STACK_CAPS: [(&str, LevelFilter); 4] = [
	("hyper", LevelFilter::Info),
	("reqwest", LevelFilter::Info),
	("rustls", LevelFilter::Warn),
	("h2", LevelFilter::Info),
];

/// Caps log levels per module path prefix, the longest matching prefix wins.
struct ModuleCaps(Vec<(String, LevelFilter)>);

impl ModuleCaps {
	fn new(caps: &[(&str, LevelFilter)]) -> Self {
		let mut caps: Vec<_> = caps
			.iter()
			.map(|(prefix, level)| (prefix.to_string(), *level))
			.collect();

		caps.sort_by_key(|(prefix, _)| std::cmp::Reverse(prefix.len()));
		Self(caps)
	}

	fn cap_for(&self, module_path: &str) -> Option<LevelFilter> {
		self
			.0
			.iter()
			.find(|(prefix, _)| module_path.starts_with(prefix.as_str()))
			.map(|(_, level)| *level)
	}
}

impl LogLineFilter for ModuleCaps {
	fn write(
		&self,
		now: &mut DeferredNow,
		record: &log::Record,
		log_line_writer: &dyn LogLineWriter,
	) -> std::io::Result<()> {
		let cap = record.module_path().and_then(|path| self.cap_for(path));

		match cap {
			Some(level) if record.level() > level => Ok(()),
			_ => log_line_writer.write(now, record),
		}
	}
}

/// Log to stderr, leveled by `RUST_LOG` (`info` if unset).
/// The HTTP stack is capped even when debugging.
pub fn setup_logger() -> eyre::Result<flexi_logger::LoggerHandle> {
	Ok(flexi_logger::Logger::try_with_env_or_str("info")?
		.format(flexi_logger::colored_default_format)
		.filter(Box::new(ModuleCaps::new(&HTTP_STACK_CAPS)))
		.log_to_stderr()
		.start()?)
}

#[test]
fn longest_prefix_wins() {
	let caps = ModuleCaps::new(&[
		("hyper", LevelFilter::Info),
		("hyper_util::client", LevelFilter::Error),
	]);

	assert_eq!(caps.cap_for("hyper::proto"), Some(LevelFilter::Info));
	assert_eq!(
		caps.cap_for("hyper_util::client::legacy"),
		Some(LevelFilter::Error)
	);
	assert_eq!(caps.cap_for("bindplane_source::job::watch"), None);
}
