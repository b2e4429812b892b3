//! Version command implementation

use crate::bucket::{RenderOptions, Results, Value};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::render_results;

/// Build-time information about the binary
pub fn version_results() -> Results {
    let mut res = Results::new("version");
    res.set_headers(["tag", "gitCommit", "rustVersion", "architecture"]);
    res.add_content(vec![
        Value::from(env!("CARGO_PKG_VERSION")),
        Value::from(option_env!("KDIG_GIT_COMMIT").unwrap_or("unknown")),
        Value::from(option_env!("KDIG_RUST_VERSION").unwrap_or("unknown")),
        Value::from(std::env::consts::ARCH),
    ]);
    res
}

/// Execute the version command
pub fn run_version(format: OutputFormat, output_width: usize) -> Result<()> {
    let res = version_results();
    print!("{}", render_results(&res, &RenderOptions::bare(output_width), format)?);
    Ok(())
}
