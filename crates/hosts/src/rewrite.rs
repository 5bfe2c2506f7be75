//! Pure line rewrites over the managed region of a hosts file.
//!
//! The region opens after a line containing `#MANAGED` and closes at a line
//! containing `#/MANAGED`. Entries are toggled by adding or removing a single
//! leading `#`.

use std::sync::OnceLock;

use regex::Regex;
use shared::domain::FavoriteSelector;

const MANAGED_START: &str = "#MANAGED";
const MANAGED_END: &str = "#/MANAGED";
const SWAP_TAG: &str = "#SWAP";

struct Patterns {
    favorite: Regex,
    ipv4: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        favorite: Regex::new(r"#FAV\[([A-Za-z0-9_-]*)\]").expect("favorite pattern"),
        ipv4: Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("ipv4 pattern"),
    })
}

fn comment(line: &mut String) {
    if !line.starts_with('#') {
        line.insert(0, '#');
    }
}

fn uncomment(line: &mut String) {
    if line.starts_with('#') {
        line.remove(0);
    }
}

/// Tracks whether successive lines fall inside the managed region.
#[derive(Default)]
struct ManagedRegion {
    inside: bool,
}

impl ManagedRegion {
    /// True when `line` is a non-empty entry inside the region. Marker lines
    /// themselves are never entries.
    fn contains(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if line.contains(MANAGED_END) {
            self.inside = false;
        }
        if line.contains(MANAGED_START) {
            self.inside = true;
            return false;
        }
        self.inside
    }
}

/// Calls `f` on every non-empty line inside the managed region and returns
/// how many lines it changed.
fn for_each_managed(lines: &mut [String], mut f: impl FnMut(&mut String)) -> usize {
    let mut region = ManagedRegion::default();
    let mut changed = 0;
    for line in lines.iter_mut() {
        if !region.contains(line) {
            continue;
        }
        let before = line.clone();
        f(line);
        if *line != before {
            changed += 1;
        }
    }
    changed
}

fn favorite_tag(line: &str) -> Option<&str> {
    patterns()
        .favorite
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map(|name| name.as_str())
}

/// Whether the managed region has at least one entry tagged `#FAV[selector]`.
pub fn has_managed_favorite<S: AsRef<str>>(lines: &[S], selector: &str) -> bool {
    let mut region = ManagedRegion::default();
    lines.iter().any(|line| {
        let line: &str = line.as_ref();
        region.contains(line) && favorite_tag(line) == Some(selector)
    })
}

/// Points every `#SWAP` entry at `box_number` (third octet of the address)
/// and comments out everything else in the managed region.
pub fn apply_swap(lines: &mut [String], box_number: u64) -> usize {
    let ipv4 = &patterns().ipv4;
    for_each_managed(lines, |line| {
        if !line.contains(SWAP_TAG) {
            comment(line);
            return;
        }

        uncomment(line);
        let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(address) = tokens.first() else {
            return;
        };
        if !ipv4.is_match(address) {
            return;
        }
        let mut octets: Vec<String> = address.split('.').map(str::to_string).collect();
        octets[2] = box_number.to_string();
        tokens[0] = octets.join(".");
        *line = tokens.join(" ");
    })
}

/// Enables the entries tagged `#FAV[selector]`, disabling every other entry
/// in the managed region.
pub fn apply_favorite(lines: &mut [String], selector: &str) -> usize {
    for_each_managed(lines, |line| {
        if favorite_tag(line) == Some(selector) {
            uncomment(line);
        } else {
            comment(line);
        }
    })
}

/// Every `#FAV[...]` tag in the file, in file order, first occurrence wins.
pub fn collect_favorites<S: AsRef<str>>(lines: &[S]) -> Vec<FavoriteSelector> {
    let mut favorites: Vec<FavoriteSelector> = Vec::new();
    for name in lines.iter().filter_map(|line| favorite_tag(line.as_ref())) {
        let candidate = FavoriteSelector::from(name);
        if !favorites.contains(&candidate) {
            favorites.push(candidate);
        }
    }
    favorites
}

#[cfg(test)]
#[path = "tests/rewrite_tests.rs"]
mod tests;
