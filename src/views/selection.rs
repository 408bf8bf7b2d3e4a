//! View selection: the closed set of sidebar choices and their render parameters.

use crate::data::columns;

/// Row cap applied by the heat map renderer.
pub const HEATMAP_ROW_CAP: usize = 40_000;

/// Sidebar choice. `None` is the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ViewSelection {
    #[default]
    None,
    Heatmap,
    Countplot,
    DayOfWeek,
    PremisesType,
    PoliceDivision,
    ReportedYear,
    ReportedMonth,
    HoodId,
    Offence,
}

/// Bar direction of a count chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories along x, counts up.
    Vertical,
    /// Categories along y, counts right.
    Horizontal,
}

/// How the bars of a count chart are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColors {
    /// One color for every bar.
    Uniform,
    /// Each bar takes the next palette color.
    PerCategory,
}

/// Everything a count chart needs besides the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSpec {
    pub title: &'static str,
    pub column: &'static str,
    pub orientation: Orientation,
    pub colors: BarColors,
}

/// Render parameters resolved from a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSpec {
    Nothing,
    HeatMap { row_cap: usize },
    Count(CountSpec),
}

impl ViewSelection {
    /// Order shown in the sidebar.
    pub const ALL: [ViewSelection; 10] = [
        ViewSelection::None,
        ViewSelection::Heatmap,
        ViewSelection::Countplot,
        ViewSelection::DayOfWeek,
        ViewSelection::PremisesType,
        ViewSelection::PoliceDivision,
        ViewSelection::ReportedYear,
        ViewSelection::ReportedMonth,
        ViewSelection::HoodId,
        ViewSelection::Offence,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewSelection::None => "None",
            ViewSelection::Heatmap => "Heatmap",
            ViewSelection::Countplot => "Countplot",
            ViewSelection::DayOfWeek => "DayofWeek",
            ViewSelection::PremisesType => "Premises Type",
            ViewSelection::PoliceDivision => "Police Division",
            ViewSelection::ReportedYear => "Reported Year",
            ViewSelection::ReportedMonth => "Reported Month",
            ViewSelection::HoodId => "Hood_ID",
            ViewSelection::Offence => "Offence",
        }
    }

    pub fn spec(self) -> ViewSpec {
        use BarColors::{PerCategory, Uniform};
        use Orientation::{Horizontal, Vertical};

        let count = |column, orientation, colors| {
            ViewSpec::Count(CountSpec {
                title: self.label(),
                column,
                orientation,
                colors,
            })
        };

        match self {
            ViewSelection::None => ViewSpec::Nothing,
            ViewSelection::Heatmap => ViewSpec::HeatMap {
                row_cap: HEATMAP_ROW_CAP,
            },
            ViewSelection::Countplot => count(columns::MCI, Vertical, Uniform),
            ViewSelection::DayOfWeek => count(columns::DAY_OF_WEEK, Horizontal, Uniform),
            ViewSelection::PremisesType => count(columns::PREMISES_TYPE, Horizontal, Uniform),
            ViewSelection::PoliceDivision => count(columns::DIVISION, Vertical, Uniform),
            ViewSelection::ReportedYear => count(columns::REPORTED_YEAR, Horizontal, Uniform),
            ViewSelection::ReportedMonth => count(columns::REPORTED_MONTH, Horizontal, Uniform),
            ViewSelection::HoodId => count(columns::HOOD_ID, Horizontal, PerCategory),
            ViewSelection::Offence => count(columns::OFFENCE, Horizontal, PerCategory),
        }
    }
}

impl std::fmt::Display for ViewSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(ViewSelection::default(), ViewSelection::None);
        assert_eq!(ViewSelection::None.spec(), ViewSpec::Nothing);
    }

    #[test]
    fn test_every_count_view_names_a_distinct_column() {
        let mut seen = std::collections::HashSet::new();
        for selection in ViewSelection::ALL {
            if let ViewSpec::Count(spec) = selection.spec() {
                assert!(seen.insert(spec.column), "{} reused", spec.column);
                assert_eq!(spec.title, selection.label());
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_orientation_follows_chart_layout() {
        let ViewSpec::Count(mci) = ViewSelection::Countplot.spec() else {
            panic!("Countplot must be a count view");
        };
        assert_eq!(mci.column, columns::MCI);
        assert_eq!(mci.orientation, Orientation::Vertical);

        let ViewSpec::Count(month) = ViewSelection::ReportedMonth.spec() else {
            panic!("Reported Month must be a count view");
        };
        assert_eq!(month.orientation, Orientation::Horizontal);
    }

    #[test]
    fn test_only_high_cardinality_views_color_each_bar() {
        for selection in ViewSelection::ALL {
            if let ViewSpec::Count(spec) = selection.spec() {
                let expected = match selection {
                    ViewSelection::HoodId | ViewSelection::Offence => BarColors::PerCategory,
                    _ => BarColors::Uniform,
                };
                assert_eq!(spec.colors, expected, "{selection}");
            }
        }
    }

    #[test]
    fn test_heatmap_cap() {
        assert_eq!(
            ViewSelection::Heatmap.spec(),
            ViewSpec::HeatMap { row_cap: 40_000 }
        );
    }
}
