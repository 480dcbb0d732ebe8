use std::collections::HashMap;

use tera::Tera;

use crate::error::AppError;

/// Name of the landing page template
pub const INDEX_TEMPLATE: &str = "index.html";

/// Landing page shipped with the binary, used when the template directory has none
const BUILTIN_INDEX: &str = include_str!("../templates/index.html");

/// Initialize the Tera template engine from `glob`.
///
/// A missing or empty template directory is not an error; the built-in
/// landing page is registered instead.
pub fn init_templates(glob: &str) -> Result<Tera, AppError> {
    let mut tera = Tera::new(glob)?;

    if !tera.get_template_names().any(|name| name == INDEX_TEMPLATE) {
        tracing::debug!(glob, "No index template found, using built-in page");
        tera.add_raw_template(INDEX_TEMPLATE, BUILTIN_INDEX)?;
    }

    tera.register_filter("whole_seconds", whole_seconds_filter);

    Ok(tera)
}

/// Render a number of seconds as whole seconds (e.g. `42.7` -> `"42s"`)
fn whole_seconds_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let secs = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg("whole_seconds filter expects a number"))?;
    Ok(tera::Value::String(format!("{}s", secs.max(0.0).floor() as u64)))
}
