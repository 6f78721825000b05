//! Signal Parser Service
//!
//! Extracts a [`TradeIntent`] from free-form or semi-structured chat text.
//!
//! Recognized shapes:
//!
//! ```text
//! LONG ETH/USD band=(3450, 3470) SL=3400 lev=20 TF=5m id=abc123
//! Targets: 3500, 3550, 3600, 3650, 3700, 3750
//!
//! SHORT BTC
//! Entry: 64000
//! Stop Loss: 65500
//! TP1: 63500
//! TP2: 63000
//! ...
//! ```
//!
//! Parsing is pure: no I/O, and identical text always yields an identical
//! result.
//!
//! Thousands separators are accepted when unambiguous: `64,000` and
//! `1,250,000` read as single prices, as does `125,000.5`. A bare
//! three-digit run such as `101,102` stays a list of two prices.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::domain::shared::{Price, SignalId, Symbol};
use crate::domain::signal_intake::errors::{ParseError, SignalField};
use crate::domain::signal_intake::value_objects::{
    Entry, TAKE_PROFIT_LEGS, TradeIntent, TradeSide,
};

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        #[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("signal regex is valid"))
        }
    };
}

static_regex!(side_re, r"(?i)\b(long|short|buy|sell)\b");
static_regex!(
    side_symbol_re,
    r"(?i:\b(?:long|short|buy|sell)\b)[\s:#$\-]*([A-Z][A-Z0-9]{1,14}(?:/[A-Z]{2,6})?)\b"
);
static_regex!(
    symbol_field_re,
    r"(?i)\b(?:pair|symbol|coin|ticker)\s*[:=]\s*[#$]?([a-z][a-z0-9]{1,14}(?:/[a-z]{2,6})?)\b"
);
static_regex!(
    band_re,
    r"(?i)\bband\s*[:=]?\s*[(\[]?\s*(\d+(?:\.\d+)?)\s*(?:,|-|–|to|/)\s*(\d+(?:\.\d+)?)"
);
static_regex!(
    market_re,
    r"(?i)(?:\bentry(?:\s+price)?\s*[:=]?|@)[ \t]*(?:market|mkt|cmp)\b(?:[ \t]*(?:@|at|ref|~|:)?[ \t]*(\d+(?:\.\d+)?))?"
);
static_regex!(
    entry_range_re,
    r"(?i)\bentry(?:\s+(?:price|zone|range))?\s*[:=]?[ \t]*(\d+(?:\.\d+)?)(?:[ \t]*(?:-|–|to|,)[ \t]*|[ \t]+)(\d+(?:\.\d+)?)"
);
static_regex!(
    entry_single_re,
    r"(?i)\bentry(?:\s+(?:price|zone|range))?\s*[:=]?[ \t]*(\d+(?:\.\d+)?)"
);
static_regex!(at_price_re, r"@[ \t]*(\d+(?:\.\d+)?)");
static_regex!(
    stop_re,
    r"(?i)\b(?:sl|stop[\s_-]*loss|stoploss|stop)\b\s*[:=@]?\s*(\d+(?:\.\d+)?)"
);
static_regex!(
    tp_numbered_re,
    r"(?i)\b(?:tp|target)[ \t]*(\d{1,2})(?:[ \t]*[:=)\-][ \t]*|[ \t]+)(\d+(?:\.\d+)?)"
);
static_regex!(
    tp_header_re,
    r"(?im)\b(?:targets?|take[ \t_-]*profits?|tps?)\b[ \t]*[:=][ \t]*(.*)$"
);
static_regex!(list_marker_re, r"(?m)(?:^|\s)(?:[-*•]|\d{1,2}[).])(?:\s|$)");
static_regex!(percent_re, r"\d+(?:\.\d+)?[ \t]*%");
static_regex!(number_re, r"\d+(?:\.\d+)?");
static_regex!(
    grouped_number_re,
    r"\b(?:\d{1,2}(?:,\d{3})+|\d{3}(?:,\d{3})+\.\d+)\b"
);
static_regex!(
    leverage_re,
    r"(?i)\blev(?:erage)?\s*[:=]?\s*[x×]?(\d{1,3})[x×]?\b"
);
static_regex!(timeframe_re, r"(?i)\b(?:tf|timeframe)\s*[:=]\s*(\d+[ \t]*[smhdw]?)\b");
static_regex!(
    signal_id_re,
    r"(?i)\b(?:signal[ \t_-]*)?id\s*[:=]\s*([A-Za-z0-9_\-]{1,64})"
);

/// Words that follow a side keyword but are never a symbol.
const RESERVED_WORDS: &[&str] = &[
    "ENTRY", "BAND", "SL", "STOP", "TP", "TPS", "TARGET", "TARGETS", "MARKET", "LEV", "TF",
];

/// Stateless parser from raw signal text to [`TradeIntent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalParser;

impl SignalParser {
    /// Create a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse raw signal text.
    ///
    /// Required fields are checked in order (side, symbol, entry, stop), then
    /// the take-profit count, then price ordering against the side.
    pub fn parse(&self, raw: &str) -> Result<TradeIntent, ParseError> {
        let text = strip_digit_grouping(raw);
        let raw = text.as_ref();
        let side = parse_side(raw).ok_or(ParseError::MissingField {
            field: SignalField::Side,
        })?;
        let symbol = parse_symbol(raw).ok_or(ParseError::MissingField {
            field: SignalField::Symbol,
        })?;
        let entry = parse_entry(raw)?.ok_or(ParseError::MissingField {
            field: SignalField::Entry,
        })?;
        let stop = first_price(stop_re(), raw, "stop")?.ok_or(ParseError::MissingField {
            field: SignalField::Stop,
        })?;

        let targets = parse_take_profits(raw)?;
        let take_profits: [Price; TAKE_PROFIT_LEGS] =
            targets
                .try_into()
                .map_err(|found: Vec<Price>| ParseError::TakeProfitCountMismatch {
                    expected: TAKE_PROFIT_LEGS,
                    found: found.len(),
                })?;

        Ok(TradeIntent::new(symbol, side, entry, stop, take_profits)?
            .with_leverage(parse_leverage(raw))
            .with_timeframe(capture_str(timeframe_re(), raw).map(|tf| tf.replace([' ', '\t'], "")))
            .with_signal_id(capture_str(signal_id_re(), raw).map(SignalId::new)))
    }
}

fn strip_digit_grouping(raw: &str) -> Cow<'_, str> {
    grouped_number_re().replace_all(raw, |caps: &Captures<'_>| caps[0].replace(',', ""))
}

fn parse_side(raw: &str) -> Option<TradeSide> {
    side_re()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| TradeSide::from_keyword(m.as_str()))
}

fn parse_symbol(raw: &str) -> Option<Symbol> {
    if let Some(sym) = capture_str(symbol_field_re(), raw) {
        return Some(Symbol::new(sym));
    }
    side_symbol_re()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|candidate| !RESERVED_WORDS.contains(candidate))
        .map(Symbol::new)
}

fn parse_entry(raw: &str) -> Result<Option<Entry>, ParseError> {
    if let Some(caps) = band_re().captures(raw) {
        let low = price_at(&caps, 1, "entry")?;
        let high = price_at(&caps, 2, "entry")?;
        return Ok(Some(Entry::band(low, high)));
    }
    if let Some(caps) = market_re().captures(raw) {
        // A market entry without a reference price cannot be sized.
        return match caps.get(1) {
            Some(m) => Ok(Some(Entry::market(to_price(m.as_str(), "entry")?))),
            None => Ok(None),
        };
    }
    if let Some(caps) = entry_range_re().captures(raw) {
        let low = price_at(&caps, 1, "entry")?;
        let high = price_at(&caps, 2, "entry")?;
        return Ok(Some(Entry::band(low, high)));
    }
    if let Some(price) = first_price(entry_single_re(), raw, "entry")? {
        return Ok(Some(Entry::limit(price)));
    }
    Ok(first_price(at_price_re(), raw, "entry")?.map(Entry::limit))
}

/// Numbered targets (`TP1: ...`) win; otherwise a `Targets:` list.
fn parse_take_profits(raw: &str) -> Result<Vec<Price>, ParseError> {
    let mut numbered: Vec<(u8, Price)> = Vec::new();
    for caps in tp_numbered_re().captures_iter(raw) {
        let index = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .unwrap_or(u8::MAX);
        numbered.push((index, price_at(&caps, 2, "take_profit")?));
    }
    if !numbered.is_empty() {
        numbered.sort_by_key(|(index, _)| *index);
        return Ok(numbered.into_iter().map(|(_, price)| price).collect());
    }

    let Some(caps) = tp_header_re().captures(raw) else {
        return Ok(Vec::new());
    };
    let (Some(whole), Some(first_line)) = (caps.get(0), caps.get(1)) else {
        return Ok(Vec::new());
    };

    let mut targets = Vec::new();
    let (head, truncated) = cut_at_letter(first_line.as_str());
    collect_numbers(head, &mut targets)?;
    if truncated {
        return Ok(targets);
    }

    for line in raw[whole.end()..].lines().skip(1) {
        let cleaned = strip_list_noise(line);
        if cleaned.trim().is_empty() {
            continue;
        }
        if cleaned.chars().any(|c| c.is_alphabetic()) {
            break;
        }
        collect_numbers(&cleaned, &mut targets)?;
    }
    Ok(targets)
}

/// Text up to the first letter, and whether anything was cut.
fn cut_at_letter(line: &str) -> (String, bool) {
    let cleaned = strip_list_noise(line);
    match cleaned.find(|c: char| c.is_alphabetic()) {
        Some(pos) => (cleaned[..pos].to_string(), true),
        None => (cleaned, false),
    }
}

fn strip_list_noise(line: &str) -> String {
    let without_pct = percent_re().replace_all(line, " ");
    list_marker_re().replace_all(&without_pct, " ").into_owned()
}

fn collect_numbers(text: impl AsRef<str>, out: &mut Vec<Price>) -> Result<(), ParseError> {
    for m in number_re().find_iter(text.as_ref()) {
        out.push(to_price(m.as_str(), "take_profit")?);
    }
    Ok(())
}

fn parse_leverage(raw: &str) -> Option<u32> {
    capture_str(leverage_re(), raw).and_then(|lev| lev.parse().ok())
}

fn capture_str<'a>(re: &Regex, raw: &'a str) -> Option<&'a str> {
    re.captures(raw).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn first_price(re: &Regex, raw: &str, field: &str) -> Result<Option<Price>, ParseError> {
    capture_str(re, raw).map(|s| to_price(s, field)).transpose()
}

fn price_at(caps: &Captures<'_>, group: usize, field: &str) -> Result<Price, ParseError> {
    let token = caps.get(group).map_or("", |m| m.as_str());
    to_price(token, field)
}

fn to_price(token: &str, field: &str) -> Result<Price, ParseError> {
    token
        .parse::<Decimal>()
        .map(Price::new)
        .map_err(|_| ParseError::InvalidNumber {
            field: field.to_string(),
            value: token.to_string(),
        })
}
