//! Player identity helpers

use uuid::Uuid;

/// Issuer identities the enforcement plugin writes for console/automated actions
pub const CONSOLE_ALIASES: [&str; 4] = ["CONSOLE", "Console", "#console#", "LiteBans"];

/// Subject written for punishments of players never seen online
pub const OFFLINE_SUBJECT: &str = "#offline#";

/// True for 32 hex digits, bare or in the 8-4-4-4-12 hyphenated layout
pub fn looks_like_uuid(input: &str) -> bool {
    let hex_only = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());

    match input.len() {
        32 => hex_only(input),
        36 => {
            let groups: Vec<&str> = input.split('-').collect();
            groups.len() == 5
                && groups
                    .iter()
                    .zip([8, 4, 4, 4, 12])
                    .all(|(group, len)| group.len() == len && hex_only(group))
        }
        _ => false,
    }
}

/// Lower-case hyphenated form, as the enforcement tables store it
pub fn normalize_uuid(input: &str) -> Option<String> {
    if !looks_like_uuid(input) {
        return None;
    }
    Uuid::try_parse(input)
        .ok()
        .map(|uuid| uuid.hyphenated().to_string())
}

pub fn undashed_uuid(input: &str) -> String {
    input.replace('-', "")
}

/// Whether an issuer identity denotes the console rather than a person.
///
/// Rows with neither a UUID nor a name were written by the console too.
pub fn is_console_issuer(uuid: Option<&str>, name: Option<&str>) -> bool {
    if uuid.is_none() && name.is_none() {
        return true;
    }
    [uuid, name]
        .into_iter()
        .flatten()
        .any(|value| CONSOLE_ALIASES.contains(&value))
}
