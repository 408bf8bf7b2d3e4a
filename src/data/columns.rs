//! Column names of the Toronto MCI incident table.

pub const LONGITUDE: &str = "X";
pub const LATITUDE: &str = "Y";
pub const REPORTED_DATE: &str = "reporteddate";
pub const MCI: &str = "MCI";
pub const DAY_OF_WEEK: &str = "reporteddayofweek";
pub const PREMISES_TYPE: &str = "premisetype";
pub const DIVISION: &str = "Division";
pub const REPORTED_YEAR: &str = "reportedyear";
pub const REPORTED_MONTH: &str = "reportedmonth";
pub const OFFENCE: &str = "offence";
pub const HOOD_ID: &str = "Hood_ID";

// Derived at load time
pub const DAY: &str = "Day";
pub const MONTH: &str = "Month";
pub const HOUR: &str = "Hour";
