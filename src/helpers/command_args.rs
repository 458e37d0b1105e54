/// Splits a command line into its lowercased command name and raw arguments.
pub fn split_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut words = line.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some((name, words.map(str::to_owned).collect()))
}

/// Positional argument, or an empty string when missing so that form validation reports it.
pub fn find_arg(args: &[String], index: usize) -> &str {
    args.get(index).map(String::as_str).unwrap_or("")
}

/// Everything from `index` on, joined back with single spaces.
pub fn find_rest(args: &[String], index: usize) -> String {
    args.iter().skip(index).map(String::as_str).collect::<Vec<_>>().join(" ")
}
