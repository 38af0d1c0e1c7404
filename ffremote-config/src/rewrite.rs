//! Path rewriting for incoming argument vectors.
//!
//! The server's filesystem layout rarely matches the client's; rewrite rules
//! map client-side paths (`/mnt/media/...`) onto the server's view
//! (`/srv/media/...`) before the transcoder is launched.

/// Apply every `[from, to]` rule, in order, to one argument. All occurrences
/// are replaced.
fn rewrite_arg(input: &str, rewrites: &[(String, String)]) -> String {
    let mut result = input.to_string();
    for (from, to) in rewrites {
        result = result.replace(from.as_str(), to.as_str());
    }
    result
}

/// Rewrite every argument in a command vector. An empty rule list returns the
/// arguments unchanged.
pub fn rewrite_args(args: &[String], rewrites: &[(String, String)]) -> Vec<String> {
    if rewrites.is_empty() {
        return args.to_vec();
    }
    args.iter().map(|arg| rewrite_arg(arg, rewrites)).collect()
}
