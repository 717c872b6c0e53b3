//! Chat styling: color tokens, the rainbow transform, ordinals.
//!
//! Templates use bracketed color names (`{lime}`, `{DarkRed}`, …) which are
//! replaced by the single-character color codes understood by the game chat.
//! Everything here is a pure string transform.

use std::str::FromStr as _;

use strum::{EnumIter, EnumString, IntoStaticStr};

// ─── Colors ──────────────────────────────────────────────────────────────────

/// The closed set of color tokens a template may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatColor {
  Default,
  White,
  DarkRed,
  Green,
  Olive,
  Lime,
  Red,
  Grey,
  Yellow,
  Silver,
  Blue,
  Purple,
  Magenta,
  LightRed,
  LightBlue,
  Gold,
}

impl ChatColor {
  /// Control character the chat renderer interprets as this color.
  pub fn code(self) -> char {
    match self {
      ChatColor::Default | ChatColor::White => '\x01',
      ChatColor::DarkRed => '\x02',
      ChatColor::Green => '\x04',
      ChatColor::Olive => '\x05',
      ChatColor::Lime => '\x06',
      ChatColor::Red => '\x07',
      ChatColor::Grey => '\x08',
      ChatColor::Yellow => '\x09',
      ChatColor::Silver => '\x0A',
      ChatColor::Blue => '\x0B',
      ChatColor::Purple | ChatColor::Magenta => '\x0E',
      ChatColor::LightRed => '\x0F',
      ChatColor::LightBlue => '\x0B',
      ChatColor::Gold => '\x10',
    }
  }

  /// The bracketed form used in templates, e.g. `{darkred}`.
  pub fn token(self) -> String {
    let name: &'static str = self.into();
    format!("{{{name}}}")
  }
}

/// Colors cycled through by [`rainbow`], in order.
pub const RAINBOW_PALETTE: [ChatColor; 6] = [
  ChatColor::Red,
  ChatColor::Gold,
  ChatColor::Lime,
  ChatColor::Blue,
  ChatColor::Magenta,
  ChatColor::Purple,
];

// ─── Transforms ──────────────────────────────────────────────────────────────

/// Replace every known `{color}` token (case-insensitive) with its code.
///
/// Unknown tokens and unbalanced braces are copied through verbatim.
pub fn substitute(template: &str) -> String {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];

    let known = after.find('}').and_then(|close| {
      ChatColor::from_str(&after[..close]).ok().map(|color| (color, close))
    });

    match known {
      Some((color, close)) => {
        out.push(color.code());
        rest = &after[close + 1..];
      }
      None => {
        // Keep scanning right after this brace so `{{lime}` still resolves
        // the inner token.
        out.push('{');
        rest = after;
      }
    }
  }

  out.push_str(rest);
  out
}

/// Prefix each non-space character with the next palette color.
///
/// Spaces are copied as-is and do not advance the cycle.
pub fn rainbow(text: &str) -> String {
  let mut out = String::with_capacity(text.len() * 2);
  let mut index = 0;

  for c in text.chars() {
    if c == ' ' {
      out.push(' ');
      continue;
    }
    out.push(RAINBOW_PALETTE[index % RAINBOW_PALETTE.len()].code());
    out.push(c);
    index += 1;
  }

  out
}

/// `n` with its English ordinal suffix: `1st`, `12th`, `103rd`, …
pub fn ordinal(n: u64) -> String {
  let suffix = if (11..=13).contains(&(n % 100)) {
    "th"
  } else {
    match n % 10 {
      1 => "st",
      2 => "nd",
      3 => "rd",
      _ => "th",
    }
  };
  format!("{n}{suffix}")
}
