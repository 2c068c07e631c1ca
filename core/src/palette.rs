//! Deterministic color-per-source mapping for the charts.

use crate::types::LeadSource;
use std::collections::BTreeMap;

/// Qualitative palette. Sources beyond its length wrap around.
pub const PALETTE: [&str; 12] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3",
    "#FF6692", "#B6E880", "#FF97FF", "#FECB52", "#1F77B4", "#8C564B",
];

/// Colors are assigned by sorted source name, so the mapping depends only
/// on the set of sources and never on selection or row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePalette {
    colors: BTreeMap<LeadSource, &'static str>,
}

impl SourcePalette {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LeadSource>,
    {
        let mut names: Vec<LeadSource> = sources.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        let colors = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, PALETTE[i % PALETTE.len()]))
            .collect();
        Self { colors }
    }

    pub fn color_for(&self, source: &str) -> Option<&'static str> {
        self.colors.get(source).copied()
    }

    /// Mapping restricted to `sources`, for the legend of a filtered view.
    pub fn subset<S: AsRef<str>>(&self, sources: &[S]) -> BTreeMap<LeadSource, String> {
        sources
            .iter()
            .filter_map(|s| {
                self.color_for(s.as_ref())
                    .map(|c| (s.as_ref().to_string(), c.to_string()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_ignores_input_order() {
        let a = SourcePalette::new(["Roku", "Google", "VOXR"]);
        let b = SourcePalette::new(["VOXR", "Roku", "Google"]);
        assert_eq!(a, b);
        assert_eq!(a.color_for("Google"), Some(PALETTE[0]));
        assert_eq!(a.color_for("Missing"), None);
    }

    #[test]
    fn wraps_past_palette_length() {
        let names: Vec<String> = (0..PALETTE.len() + 2).map(|i| format!("src-{i:02}")).collect();
        let palette = SourcePalette::new(names.clone());
        assert_eq!(palette.len(), PALETTE.len() + 2);
        assert_eq!(palette.color_for(&names[PALETTE.len()]), Some(PALETTE[0]));
    }
}
