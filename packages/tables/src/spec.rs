//! Locators for the comment-embedded tables.

use player_stats_tables_models::TableKind;

/// Where to find one kind of table in a profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Which table this locator finds.
    pub kind: TableKind,
    /// Text that identifies the comment wrapping the table.
    pub marker: &'static str,
    /// `id` attribute of the `<table>` inside that comment.
    pub table_id: &'static str,
}

impl TableSpec {
    /// Season totals table.
    pub const TOTALS: Self = Self {
        kind: TableKind::Totals,
        marker: r#"id="div_totals""#,
        table_id: "totals",
    };

    /// Advanced metrics table.
    pub const ADVANCED: Self = Self {
        kind: TableKind::Advanced,
        marker: r#"id="div_advanced""#,
        table_id: "advanced",
    };

    /// All built-in locators.
    pub const BUILTIN: &[Self] = &[Self::TOTALS, Self::ADVANCED];

    /// Returns the built-in locator for `kind`.
    #[must_use]
    pub const fn builtin(kind: TableKind) -> Self {
        match kind {
            TableKind::Totals => Self::TOTALS,
            TableKind::Advanced => Self::ADVANCED,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn every_kind_has_a_builtin_locator() {
        for kind in TableKind::iter() {
            let spec = TableSpec::builtin(kind);
            assert_eq!(spec.kind, kind);
            assert!(spec.marker.contains(spec.table_id));
            assert!(TableSpec::BUILTIN.contains(&spec));
        }
    }
}
