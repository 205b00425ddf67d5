//! Raw argument preprocessing: case normalization and command splitting.

use std::collections::BTreeSet;

/// Lowercase the flag name in every flag token.
///
/// Flag names are matched case-insensitively, values never are. Only the
/// part before `=` is lowercased in `--name=Value`, and only the letter in
/// `-xValue`. A token following one of `takes_value` (normalized spellings
/// such as `--loglevel` or `-l`) is that flag's value and is left alone, as
/// are tokens after a bare `--`.
pub fn normalize<I, S>(args: I, takes_value: &BTreeSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut after_terminator = false;
    let mut is_value = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_terminator || std::mem::take(&mut is_value) {
                return arg;
            }
            if arg == "--" {
                after_terminator = true;
                return arg;
            }
            let token = normalize_token(&arg);
            is_value = takes_value.contains(&token);
            token
        })
        .collect()
}

fn normalize_token(arg: &str) -> String {
    if let Some(long) = arg.strip_prefix("--") {
        return match long.split_once('=') {
            Some((name, value)) => format!("--{}={value}", name.to_lowercase()),
            None => format!("--{}", long.to_lowercase()),
        };
    }
    if let Some(short) = arg.strip_prefix('-') {
        let mut chars = short.chars();
        if let Some(first) = chars.next() {
            return format!("-{}{}", first.to_lowercase(), chars.as_str());
        }
    }
    arg.to_string()
}

/// Split a leading command name off the arguments.
///
/// The first token names a command when it is not empty and is not a flag.
/// Command names are lowercased; the remaining tokens are returned as is.
pub fn split_command(args: &[String]) -> (Option<String>, &[String]) {
    match args.split_first() {
        Some((first, rest)) if !first.is_empty() && !first.starts_with('-') => {
            (Some(first.to_lowercase()), rest)
        }
        _ => (None, args),
    }
}
