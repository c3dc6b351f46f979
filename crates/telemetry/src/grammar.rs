//! Text shapes shared by every parser.
//!
//! Tool output comes in two shapes: single-record `key<delim>value` lines,
//! and multi-record text where each record starts at a marker line. Parsers
//! compose these instead of splitting strings ad hoc.

/// How a key is separated from its value on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `key: value` (dmidecode, PowerShell `Format-List`, cpuinfo).
    Colon,
    /// `key=value` or `"key" = value` (sysfs uevent, ioreg).
    Equals,
    /// `key value`, split at the first whitespace run (lsusb, printers.conf).
    Whitespace,
    /// `key words   value`, split at the first run of two or more spaces.
    WideGap,
}

impl Delimiter {
    fn split(self, line: &str) -> Option<(&str, &str)> {
        match self {
            Delimiter::Colon => line.split_once(':'),
            Delimiter::Equals => line.split_once('='),
            Delimiter::Whitespace => {
                let line = line.trim_start();
                let end = line.find(char::is_whitespace)?;
                Some((&line[..end], &line[end..]))
            }
            Delimiter::WideGap => {
                let line = line.trim_start();
                let end = line.find("  ")?;
                Some((&line[..end], &line[end..]))
            }
        }
    }
}

/// A block of `key<delim>value` lines.
///
/// Lookups are case-insensitive on the trimmed key, the first matching line
/// wins, and an empty value reads as absent.
#[derive(Debug, Clone, Default)]
pub struct KvLines<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> KvLines<'a> {
    pub fn parse(text: &'a str, delimiter: Delimiter) -> Self {
        Self::from_lines(text.lines(), &[delimiter])
    }

    /// Parses lines, trying each delimiter in order until one splits.
    pub fn from_lines(lines: impl IntoIterator<Item = &'a str>, delimiters: &[Delimiter]) -> Self {
        let pairs = lines
            .into_iter()
            .filter_map(|line| {
                delimiters
                    .iter()
                    .find_map(|d| d.split(line))
                    .map(|(k, v)| (k.trim(), v.trim()))
            })
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { pairs }
    }

    /// Value of the first line whose key equals `key` (ignoring case).
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .filter(|v| !v.is_empty())
    }

    /// Like [`get`](Self::get) but owned, for filling record partials.
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Returns the first key that is present, in the given order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Splits text into records separated by blank lines (PowerShell
/// `Format-List`). Whitespace-only lines count as blank.
pub fn split_blank_lines(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Splits text into records that each begin at a line accepted by
/// `is_start`. Lines before the first marker are dropped; the marker line is
/// kept as the first line of its record.
pub fn split_on_marker<F>(text: &str, is_start: F) -> Vec<Vec<&str>>
where
    F: Fn(&str) -> bool,
{
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if is_start(line) {
            blocks.push(vec![line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }
    blocks
}

/// Lines before the first marker, e.g. a config file header.
pub fn preamble<F>(text: &str, is_start: F) -> Vec<&str>
where
    F: Fn(&str) -> bool,
{
    text.lines().take_while(|line| !is_start(line)).collect()
}

/// Non-empty trimmed lines, for sources that print one value per line.
pub fn value_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
