/// Whether `value` is a UUID in its canonical hyphenated form
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, any case).
///
/// [`uuid::Uuid::try_parse`] alone would also accept the simple,
/// braced and URN forms, which the API never hands out.
pub fn is_uuid(value: &str) -> bool {
	value.len() == 36 && uuid::Uuid::try_parse(value).is_ok()
}

pub fn format_secret(secret: &str) -> String {
	if secret.is_empty() {
		"\"\"".to_string()
	} else {
		"<redacted>".to_string()
	}
}

pub fn format_secret_option(secret: &Option<String>) -> String {
	match secret {
		Some(secret) => format!("Some({})", format_secret(secret)),
		None => "None".to_string(),
	}
}
