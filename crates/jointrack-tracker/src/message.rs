//! The welcome line shown to everyone when a player connects.

use jointrack_core::{
  rank::RankDefinition,
  style::{ChatColor, ordinal, substitute},
};

/// Render `" {prefix} {title} {name} connected for the {Nth} time!"` with
/// chat colors applied.
///
/// The leading space keeps the first color code from being eaten by the
/// chat renderer.
pub fn render_welcome(prefix: &str, rank: &RankDefinition, name: &str, count: u64) -> String {
  let red = ChatColor::Red.code();
  let lime = ChatColor::Lime.code();
  let plain = ChatColor::Default.code();

  format!(
    " {} {} {red}{name} {plain}connected for the {lime}{} {plain}time!",
    substitute(prefix),
    rank.styled_title(),
    ordinal(count),
  )
}
