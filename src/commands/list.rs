//! List command implementation

use crate::bucket::{Buckets, RenderOptions, Results, Value};
use crate::cli::{ListArgs, OutputFormat};
use crate::error::Result;
use crate::output::render_results;
use crate::plugins::default_buckets;

/// Table describing the requested buckets, every bucket when none is given.
/// Unknown names are skipped.
pub fn list_results(buckets: &Buckets, tokens: &[String]) -> Results {
    let names: Vec<String> = if tokens.is_empty() {
        buckets.registered().into_iter().map(String::from).collect()
    } else {
        tokens.to_vec()
    };

    let mut res = Results::new("list");
    res.set_headers(["name", "aliases", "description", "sideEffects", "requireClient"]);
    for token in &names {
        let Some(info) = buckets.info(token) else {
            continue;
        };
        res.add_content(vec![
            Value::from(info.name),
            Value::from(info.aliases.iter().map(|a| a.to_string()).collect::<Vec<_>>()),
            Value::from(info.description),
            Value::from(info.side_effects),
            Value::from(info.requires_client),
        ]);
    }
    res
}

/// Execute the ls command
pub fn run_list(args: &ListArgs, format: OutputFormat, output_width: usize) -> Result<()> {
    let buckets = default_buckets()?;
    let res = list_results(&buckets, &args.buckets);
    print!("{}", render_results(&res, &RenderOptions::bare(output_width), format)?);
    Ok(())
}
