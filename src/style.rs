//! Design styles offered by the decorator.
//!
//! Style names arrive as free text from clients, so parsing is lenient and
//! falls back to [`DesignStyle::Modern`] instead of rejecting the request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignStyle {
    Finnish,
    Swedish,
    Arabic,
    Russian,
    American,
    Modern,
    Traditional,
}

impl DesignStyle {
    /// Every style, in the order clients list them
    pub const ALL: [DesignStyle; 7] = [
        DesignStyle::Finnish,
        DesignStyle::Swedish,
        DesignStyle::Arabic,
        DesignStyle::Russian,
        DesignStyle::American,
        DesignStyle::Modern,
        DesignStyle::Traditional,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DesignStyle::Finnish => "Finnish",
            DesignStyle::Swedish => "Swedish",
            DesignStyle::Arabic => "Arabic",
            DesignStyle::Russian => "Russian",
            DesignStyle::American => "American",
            DesignStyle::Modern => "Modern",
            DesignStyle::Traditional => "Traditional",
        }
    }

    /// Identifier form (`FINNISH`, `MODERN`, ...) accepted alongside the display name
    fn identifier(&self) -> &'static str {
        match self {
            DesignStyle::Finnish => "FINNISH",
            DesignStyle::Swedish => "SWEDISH",
            DesignStyle::Arabic => "ARABIC",
            DesignStyle::Russian => "RUSSIAN",
            DesignStyle::American => "AMERICAN",
            DesignStyle::Modern => "MODERN",
            DesignStyle::Traditional => "TRADITIONAL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DesignStyle::Finnish => "Minimalist, natural wood, clean lines, functional design, light colors",
            DesignStyle::Swedish => "Scandinavian, hygge, neutral tones, cozy textiles, simple elegance",
            DesignStyle::Arabic => "Rich patterns, ornate details, warm colors, geometric designs, luxurious fabrics",
            DesignStyle::Russian => "Classical elegance, rich materials, imperial colors, ornate furniture",
            DesignStyle::American => "Contemporary comfort, mixed materials, bold colors, casual sophistication",
            DesignStyle::Modern => "Clean lines, neutral colors, minimal clutter, sleek furniture",
            DesignStyle::Traditional => "Classic furniture, warm colors, patterned fabrics, timeless appeal",
        }
    }

    /// Elements every variation of this style adds to the room
    pub fn signature_elements(&self) -> [&'static str; 4] {
        match self {
            DesignStyle::Finnish => ["Birch wood accents", "Minimalist lighting fixtures", "Natural textiles", "Clean-lined furniture"],
            DesignStyle::Swedish => ["Cozy throw blankets", "Hygge candles", "Light wood furniture", "Neutral cushions"],
            DesignStyle::Arabic => ["Ornate patterns", "Rich tapestries", "Metallic accents", "Geometric designs"],
            DesignStyle::Russian => ["Imperial-style furniture", "Rich fabrics", "Ornate decorations", "Classical elements"],
            DesignStyle::American => ["Contemporary art", "Mixed textures", "Bold accent pieces", "Functional storage"],
            DesignStyle::Modern | DesignStyle::Traditional => {
                ["Modern accessories", "Clean lines", "Neutral colors", "Functional design"]
            }
        }
    }

    /// Parse a client-supplied style name; unknown names map to `Modern`
    pub fn parse_lenient(input: &str) -> Self {
        let needle = input.trim();
        Self::ALL
            .into_iter()
            .find(|style| {
                style.display_name().eq_ignore_ascii_case(needle)
                    || style.identifier().eq_ignore_ascii_case(needle)
            })
            .unwrap_or(DesignStyle::Modern)
    }
}

impl std::fmt::Display for DesignStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_name_and_identifier() {
        assert_eq!(DesignStyle::parse_lenient("Finnish"), DesignStyle::Finnish);
        assert_eq!(DesignStyle::parse_lenient("swedish"), DesignStyle::Swedish);
        assert_eq!(DesignStyle::parse_lenient("ARABIC"), DesignStyle::Arabic);
        assert_eq!(DesignStyle::parse_lenient("  Traditional "), DesignStyle::Traditional);
    }

    #[test]
    fn test_unknown_style_falls_back_to_modern() {
        assert_eq!(DesignStyle::parse_lenient("Baroque"), DesignStyle::Modern);
        assert_eq!(DesignStyle::parse_lenient(""), DesignStyle::Modern);
    }

    #[test]
    fn test_all_in_display_order() {
        let names: Vec<&str> = DesignStyle::ALL.iter().map(|s| s.display_name()).collect();
        assert_eq!(
            names,
            vec!["Finnish", "Swedish", "Arabic", "Russian", "American", "Modern", "Traditional"]
        );
    }

    #[test]
    fn test_traditional_shares_default_elements() {
        assert_eq!(
            DesignStyle::Traditional.signature_elements(),
            DesignStyle::Modern.signature_elements()
        );
        assert_eq!(DesignStyle::Finnish.signature_elements()[0], "Birch wood accents");
    }
}
