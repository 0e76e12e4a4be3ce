//! Field extraction from the backend's free-text snapshot lines, e.g.
//!
//! ```text
//! | 14-08-2025 09:20 | NIFTY     | EXP:2025-08-14 | LTP:24850.5 | ATM: 24850 | Straddle:  182.4 | ... | NetOI:  -15230 | VIX:12.31 | NetDEX:  -7615.00| ...
//! ```
//!
//! A line carries one block per tracked expiry; headline fields come from the first one.

const LTP_MARKER: &str = "LTP:";
const EXPIRY_MARKER: &str = "EXP:";
const ATM_MARKER: &str = "ATM:";
const STRADDLE_MARKER: &str = "Straddle:";
const NET_OI_MARKER: &str = "NetOI:";
const VIX_MARKER: &str = "VIX:";
const NET_DEX_MARKER: &str = "NetDEX:";

/// The token right after a marker, delimited by whitespace or `|`.
fn first_token(after_marker: &str) -> &str {
    after_marker
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '|')
        .next()
        .unwrap_or("")
}

/// Longest numeric prefix of `token`, so `24850.5,` still reads as 24850.5.
fn leading_number(token: &str) -> Option<f64> {
    let end = token
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(token.len());
    let candidate = &token[..end];

    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn numbers_after<'a>(line: &'a str, marker: &'a str) -> impl Iterator<Item = f64> + 'a {
    line.split(marker)
        .skip(1)
        .filter_map(|part| leading_number(first_token(part)))
}

fn first_number_after(line: &str, marker: &str) -> Option<f64> {
    line.split(marker)
        .nth(1)
        .and_then(|part| leading_number(first_token(part)))
}

/// First positive price following `LTP:`, or `0.0` when there is none.
pub fn extract_ltp(line: &str) -> f64 {
    numbers_after(line, LTP_MARKER)
        .find(|v| *v > 0.0)
        .unwrap_or(0.0)
}

/// LTP of the most recent snapshot line.
pub fn latest_ltp(lines: &[String]) -> f64 {
    lines.last().map(|line| extract_ltp(line)).unwrap_or(0.0)
}

/// Headline values of one snapshot line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFields {
    pub expiry: Option<String>,
    /// `0.0` when no usable price was found.
    pub ltp: f64,
    pub atm: Option<f64>,
    pub straddle: Option<f64>,
    pub net_oi: Option<f64>,
    pub vix: Option<f64>,
    pub net_dex: Option<f64>,
}

impl SnapshotFields {
    pub fn parse(line: &str) -> Self {
        let expiry = line
            .split(EXPIRY_MARKER)
            .nth(1)
            .map(first_token)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Self {
            expiry,
            ltp: extract_ltp(line),
            atm: first_number_after(line, ATM_MARKER),
            straddle: first_number_after(line, STRADDLE_MARKER),
            net_oi: first_number_after(line, NET_OI_MARKER),
            vix: first_number_after(line, VIX_MARKER),
            net_dex: first_number_after(line, NET_DEX_MARKER),
        }
    }

    pub fn from_latest(lines: &[String]) -> Self {
        lines.last().map(|line| Self::parse(line)).unwrap_or_default()
    }
}
