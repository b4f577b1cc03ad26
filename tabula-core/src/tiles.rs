//! Quick-link tiles for the dashboard grid.
//!
//! A tile is a titled group of links, optionally colored and optionally
//! clickable as a whole. Tile links double as named shortcuts: the search
//! bar checks the flattened quick-link map by exact name before falling back
//! to a default web search on submit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One link inside a tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLink {
    pub name: String,
    pub url: String,
    /// Per-link override of the global new-tab flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tab: Option<bool>,
}

impl TileLink {
    /// Whether activating this link opens a new tab, preferring the per-link
    /// setting over the global flag.
    pub fn opens_new_tab(&self, global_new_tab: bool) -> bool {
        self.new_tab.unwrap_or(global_new_tab)
    }
}

/// A titled group of quick links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    /// When set, the tile title itself links here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Accent color as a `#rgb`/`#rrggbb` hex string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub links: Vec<TileLink>,
}

impl Tile {
    /// The tile's accent color, if present and well-formed.
    pub fn valid_color(&self) -> Option<&str> {
        self.color
            .as_deref()
            .filter(|c| is_valid_hex_color(c))
    }
}

/// Accepts `#` followed by exactly 3 or 6 hex digits.
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Flatten every tile link into a name -> url map for search-bar shortcuts.
/// Later duplicates win, matching iteration order.
pub fn quick_links(tiles: &[Tile]) -> HashMap<String, String> {
    let mut links = HashMap::new();
    for tile in tiles {
        for link in &tile.links {
            links.insert(link.name.clone(), link.url.clone());
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tile(name: &str, links: Vec<TileLink>) -> Tile {
        Tile {
            name: name.to_string(),
            url: None,
            color: None,
            links,
        }
    }

    fn link(name: &str, url: &str) -> TileLink {
        TileLink {
            name: name.to_string(),
            url: url.to_string(),
            new_tab: None,
        }
    }

    #[test]
    fn test_hex_color_validation() {
        assert!(is_valid_hex_color("#fff"));
        assert!(is_valid_hex_color("#1A2b3C"));
        assert!(!is_valid_hex_color("fff"));
        assert!(!is_valid_hex_color("#ffff"));
        assert!(!is_valid_hex_color("#ggg"));
        assert!(!is_valid_hex_color("#"));
        assert!(!is_valid_hex_color("tomato"));
    }

    #[test]
    fn test_valid_color_filters_malformed() {
        let mut t = tile("work", vec![]);
        t.color = Some("#abc123".into());
        assert_eq!(t.valid_color(), Some("#abc123"));
        t.color = Some("not-a-color".into());
        assert_eq!(t.valid_color(), None);
    }

    #[test]
    fn test_new_tab_override_beats_global() {
        let mut l = link("mail", "https://mail.example");
        assert!(l.opens_new_tab(true));
        assert!(!l.opens_new_tab(false));
        l.new_tab = Some(false);
        assert!(!l.opens_new_tab(true));
        l.new_tab = Some(true);
        assert!(l.opens_new_tab(false));
    }

    #[test]
    fn test_quick_links_flattens_all_tiles() {
        let tiles = vec![
            tile("work", vec![link("mail", "https://mail.example")]),
            tile(
                "media",
                vec![
                    link("tube", "https://tube.example"),
                    link("radio", "https://radio.example"),
                ],
            ),
        ];
        let links = quick_links(&tiles);
        assert_eq!(links.len(), 3);
        assert_eq!(links["mail"], "https://mail.example");
        assert_eq!(links["radio"], "https://radio.example");
    }
}
