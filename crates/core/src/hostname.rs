/// Suffixes accepted as-is; anything else gets [`DEFAULT_SUFFIX`] appended.
pub const KNOWN_SUFFIXES: [&str; 4] = [".com", ".org", ".net", ".br"];

pub const DEFAULT_SUFFIX: &str = ".com";

/// Turns free-text user input into the hostname that is actually queried.
///
/// The input is trimmed and lowercased. Inputs that do not end with one of
/// [`KNOWN_SUFFIXES`] get `.com` appended, so `example` and `example.io`
/// become `example.com` and `example.io.com` respectively.
pub fn normalize(input: &str) -> String {
    let mut host = input.trim().to_lowercase();
    if !KNOWN_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        host.push_str(DEFAULT_SUFFIX);
    }
    host
}
