//! Rank tiers: named brackets of cumulative join counts.
//!
//! A [`RankTable`] is built once from operator configuration and never
//! changes afterwards. Resolution is a linear scan over the tiers sorted by
//! threshold, highest first.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  style::{rainbow, substitute},
};

// ─── Definition ──────────────────────────────────────────────────────────────

/// One tier of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDefinition {
  /// Lowest join count that earns this tier.
  pub min_count:  u64,
  pub title:      String,
  /// Color token for the title, e.g. `{gold}`. Ignored for rainbow tiers.
  #[serde(default = "default_color")]
  pub color:      String,
  #[serde(default)]
  pub is_rainbow: bool,
}

fn default_color() -> String { "{white}".to_owned() }

impl RankDefinition {
  pub fn new(min_count: u64, title: impl Into<String>, color: impl Into<String>) -> Self {
    Self {
      min_count,
      title: title.into(),
      color: color.into(),
      is_rainbow: false,
    }
  }

  pub fn rainbow(min_count: u64, title: impl Into<String>) -> Self {
    Self {
      min_count,
      title: title.into(),
      color: default_color(),
      is_rainbow: true,
    }
  }

  /// The title with chat color codes applied.
  pub fn styled_title(&self) -> String {
    if self.is_rainbow {
      rainbow(&self.title)
    } else {
      substitute(&self.color) + &self.title
    }
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Immutable, threshold-sorted rank ladder.
#[derive(Debug, Clone)]
pub struct RankTable {
  /// Sorted by `min_count`, descending.
  tiers:    Vec<RankDefinition>,
  /// Returned when no tier matches, i.e. the ladder has no floor.
  unranked: RankDefinition,
}

impl RankTable {
  /// Build a table from tiers in configuration order.
  ///
  /// The sort is stable, so among tiers sharing a threshold the one listed
  /// first wins.
  pub fn new(mut tiers: Vec<RankDefinition>) -> Self {
    tiers.sort_by(|a, b| b.min_count.cmp(&a.min_count));
    Self {
      tiers,
      unranked: RankDefinition::new(0, "unranked", "{grey}"),
    }
  }

  /// Parse a JSON array of tiers. `null` is accepted as an empty ladder.
  pub fn from_json(json: &str) -> Result<Self> {
    let tiers: Option<Vec<RankDefinition>> = serde_json::from_str(json)?;
    Ok(Self::new(tiers.unwrap_or_default()))
  }

  /// The ladder written out on first start.
  pub fn default_ladder() -> Vec<RankDefinition> {
    vec![
      RankDefinition::new(0, "KZ Nub", "{grey}"),
      RankDefinition::new(20, "Spacebar Warrior I", "{white}"),
      RankDefinition::new(50, "Spacebar Warrior Elite", "{white}"),
      RankDefinition::new(100, "Pre-Strafe Bot", "{blue}"),
      RankDefinition::new(500, "Bunnyhopper Elite", "{lime}"),
      RankDefinition::new(1000, "Strafe God", "{red}"),
      RankDefinition::new(2500, "Hyperion God", "{darkred}"),
      RankDefinition::rainbow(3000, "Autostrafer"),
    ]
  }

  /// Single-tier table used when the configured ladder cannot be loaded.
  pub fn fallback() -> Self { Self::new(vec![RankDefinition::new(0, "Error", "{grey}")]) }

  /// The highest tier whose threshold does not exceed `count`.
  pub fn resolve(&self, count: u64) -> &RankDefinition {
    self
      .tiers
      .iter()
      .find(|tier| tier.min_count <= count)
      .unwrap_or(&self.unranked)
  }

  /// Tiers in resolution order (highest threshold first).
  pub fn tiers(&self) -> &[RankDefinition] { &self.tiers }
}

impl Default for RankTable {
  fn default() -> Self { Self::new(Self::default_ladder()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::style::{ChatColor, RAINBOW_PALETTE};

  #[test]
  fn resolves_highest_matching_threshold() {
    let table = RankTable::default();
    assert_eq!(table.resolve(0).title, "KZ Nub");
    assert_eq!(table.resolve(19).title, "KZ Nub");
    assert_eq!(table.resolve(20).title, "Spacebar Warrior I");
    assert_eq!(table.resolve(499).title, "Pre-Strafe Bot");
    assert_eq!(table.resolve(2999).title, "Hyperion God");
    assert_eq!(table.resolve(3000).title, "Autostrafer");
    assert_eq!(table.resolve(u64::MAX).title, "Autostrafer");
  }

  #[test]
  fn resolution_never_skips_a_closer_tier() {
    let table = RankTable::default();
    for count in 0..=3500 {
      let tier = table.resolve(count);
      assert!(tier.min_count <= count);
      assert!(
        !table
          .tiers()
          .iter()
          .any(|t| t.min_count <= count && t.min_count > tier.min_count),
        "count {count} resolved to {} but a closer tier exists",
        tier.title
      );
    }
  }

  #[test]
  fn unordered_input_is_sorted_once() {
    let table = RankTable::new(vec![
      RankDefinition::new(100, "high", "{red}"),
      RankDefinition::new(0, "floor", "{grey}"),
      RankDefinition::new(10, "mid", "{blue}"),
    ]);
    let order: Vec<u64> = table.tiers().iter().map(|t| t.min_count).collect();
    assert_eq!(order, vec![100, 10, 0]);
    assert_eq!(table.resolve(50).title, "mid");
  }

  #[test]
  fn equal_thresholds_prefer_first_listed() {
    let table = RankTable::new(vec![
      RankDefinition::new(0, "floor", "{grey}"),
      RankDefinition::new(5, "first", "{red}"),
      RankDefinition::new(5, "second", "{blue}"),
    ]);
    assert_eq!(table.resolve(7).title, "first");
  }

  #[test]
  fn missing_floor_resolves_to_unranked() {
    let table = RankTable::new(vec![RankDefinition::new(10, "ten", "{red}")]);
    assert_eq!(table.resolve(3).title, "unranked");
    assert_eq!(table.resolve(10).title, "ten");

    let empty = RankTable::new(vec![]);
    assert_eq!(empty.resolve(0).title, "unranked");
  }

  #[test]
  fn fallback_is_a_floor() {
    let table = RankTable::fallback();
    assert_eq!(table.resolve(0).title, "Error");
    assert_eq!(table.resolve(12345).title, "Error");
  }

  #[test]
  fn from_json_applies_defaults() {
    let table = RankTable::from_json(
      r#"[
        { "min_count": 0, "title": "Fresh" },
        { "min_count": 5, "title": "Shiny", "is_rainbow": true }
      ]"#,
    )
    .unwrap();
    let floor = table.resolve(1);
    assert_eq!(floor.color, "{white}");
    assert!(!floor.is_rainbow);
    assert!(table.resolve(5).is_rainbow);
  }

  #[test]
  fn from_json_accepts_null() {
    let table = RankTable::from_json("null").unwrap();
    assert!(table.tiers().is_empty());
  }

  #[test]
  fn from_json_rejects_garbage() {
    assert!(RankTable::from_json("{ not json").is_err());
    assert!(RankTable::from_json(r#"[{ "title": "no threshold" }]"#).is_err());
  }

  #[test]
  fn default_ladder_survives_serialization() {
    let json = serde_json::to_string_pretty(&RankTable::default_ladder()).unwrap();
    let reloaded = RankTable::from_json(&json).unwrap();
    let fresh = RankTable::default();
    for count in 0..=3100 {
      assert_eq!(reloaded.resolve(count), fresh.resolve(count));
    }
  }

  #[test]
  fn flat_title_uses_its_color() {
    let tier = RankDefinition::new(0, "Nub", "{grey}");
    assert_eq!(tier.styled_title(), format!("{}Nub", ChatColor::Grey.code()));
  }

  #[test]
  fn rainbow_title_ignores_color() {
    let mut tier = RankDefinition::rainbow(3000, "Auto");
    tier.color = "{darkred}".to_owned();
    let styled = tier.styled_title();
    assert!(styled.starts_with(RAINBOW_PALETTE[0].code()));
    assert!(!styled.contains(ChatColor::DarkRed.code()));
  }
}
