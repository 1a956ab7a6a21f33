//! Command line handling shared by the tutorial binaries.
//!
//! ROS passes remapping arguments (`from:=to`) alongside the program's own
//! positional arguments. The client library consumes the remappings, so the
//! nodes only ever look at what is left over.

/// Drops remapping arguments, keeping the program name at position 0.
pub fn unused_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .filter_map(|(idx, v)| {
            if idx == 0 || !v.contains(":=") {
                Some(v)
            } else {
                None
            }
        })
        .collect()
}

/// Value of the first remapping argument starting with `prefix`.
pub fn find_with_prefix(args: &[String], prefix: &str) -> Option<String> {
    args.iter()
        .skip(1)
        .find(|v| v.starts_with(prefix))
        .map(|v| String::from(v.trim_start_matches(prefix)))
}
