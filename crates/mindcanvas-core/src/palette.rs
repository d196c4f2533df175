//! Node colour swatches and the icon catalog.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

const fn swatch(background: &'static str, text: &'static str, border: &'static str) -> Swatch {
    Swatch {
        background,
        text,
        border,
    }
}

pub const PRIMARY: Swatch = swatch("#2563eb", "#ffffff", "#1d4ed8");
pub const SECONDARY: Swatch = swatch("#334155", "#f1f5f9", "#475569");
pub const ACCENT: Swatch = swatch("#1e3a5f", "#e0f2fe", "#0ea5e9");

/// Theme swatches first, then the fixed colours offered by the style picker.
pub const PALETTE: [Swatch; 16] = [
    PRIMARY,
    SECONDARY,
    ACCENT,
    swatch("#e11d48", "white", "#be123c"),
    swatch("#6366f1", "white", "#4f46e5"),
    swatch("#06b6d4", "white", "#0891b2"),
    swatch("#84cc16", "white", "#65a30d"),
    swatch("#eab308", "white", "#ca8a04"),
    swatch("#f97316", "white", "#ea580c"),
    swatch("#8b5cf6", "white", "#7c3aed"),
    swatch("#ec4899", "white", "#db2777"),
    swatch("#f43f5e", "white", "#e11d48"),
    swatch("#ffffff", "#000000", "#d1d5db"),
    swatch("#f3f4f6", "#111827", "#d1d5db"),
    swatch("#1e293b", "#ffffff", "#0f172a"),
    swatch("#18181b", "#ffffff", "#09090b"),
];

pub const ICONS: [&str; 5] = ["Flag", "Clock", "CheckCircle2", "AlertCircle", "HelpCircle"];

pub fn is_known_icon(name: &str) -> bool {
    ICONS.contains(&name)
}

/// Glyph drawn inside an icon marker.
pub fn icon_glyph(name: &str) -> Option<char> {
    name.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_leads_with_theme_swatches() {
        assert_eq!(PALETTE[..3], [PRIMARY, SECONDARY, ACCENT]);
        assert!(PALETTE.iter().all(|s| s.background.starts_with('#')));
    }

    #[test]
    fn icon_glyph_is_first_letter() {
        assert!(ICONS.iter().all(|name| is_known_icon(name)));
        assert_eq!(icon_glyph("CheckCircle2"), Some('C'));
        assert!(!is_known_icon("Star"));
    }
}
