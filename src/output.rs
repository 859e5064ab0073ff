use crate::error::Result;
use serde::Serialize;

/// Render `data` completely before writing, so a failure never leaves a
/// partial document on stdout.
pub fn render<T: Serialize>(data: &T, format: &str) -> Result<String> {
    let rendered = match format {
        "yaml" => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    };
    Ok(rendered)
}

pub fn output_data<T: Serialize>(data: &T, format: &str) -> Result<()> {
    let rendered = render(data, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31mError: {}\x1b[0m", message);
}
