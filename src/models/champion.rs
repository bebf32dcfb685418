//! Champion statistics as served by `/api/champions/stats`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend path of the tier list
pub const CHAMPION_STATS_PATH: &str = "/api/champions/stats";

/// One tier-list row
///
/// Rates may be missing in the backend data; they display as `0.00`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionStats {
    pub id: u64,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub pickrate: Option<f64>,
    #[serde(default)]
    pub winrate: Option<f64>,
    #[serde(default)]
    pub banrate: Option<f64>,
    #[serde(default)]
    pub matches: Option<u32>,
}

impl ChampionStats {
    /// Case-insensitive substring match on name or role.
    ///
    /// `query` is expected trimmed and lower-cased.
    fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query) || self.role.to_lowercase().contains(query)
    }
}

impl fmt::Display for ChampionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matches = self
            .matches
            .map(|m| m.to_string())
            .unwrap_or_default();
        write!(
            f,
            "{:<16} {:<10} {:>7.2} {:>7.2} {:>7.2} {:>8}",
            self.name,
            self.role,
            self.pickrate.unwrap_or(0.0),
            self.winrate.unwrap_or(0.0),
            self.banrate.unwrap_or(0.0),
            matches
        )
    }
}

/// Keeps the rows whose name or role contains `query`.
///
/// The query is trimmed and compared case-insensitively; an empty query keeps
/// every row.
pub fn filter_rows<'a>(rows: &'a [ChampionStats], query: &str) -> Vec<&'a ChampionStats> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return rows.iter().collect();
    }
    rows.iter().filter(|row| row.matches_query(&query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ChampionStats> {
        serde_json::from_str(
            r#"[
                {"id": 1, "name": "Ahri", "role": "Mid", "pickrate": 8.5, "winrate": 51.2, "banrate": 3.1, "matches": 1200},
                {"id": 2, "name": "Thresh", "role": "Support", "pickrate": 11.0, "winrate": 49.8, "banrate": 2.0, "matches": 1800},
                {"id": 3, "name": "Garen", "role": "Top", "pickrate": null, "winrate": null, "banrate": null, "matches": null}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_with_missing_rates() {
        let row: ChampionStats =
            serde_json::from_str(r#"{"id": 9, "name": "Zed", "role": "Mid"}"#).unwrap();
        assert!(row.pickrate.is_none());
        assert!(row.matches.is_none());
    }

    #[test]
    fn test_filter_by_name() {
        let rows = rows();
        let found = filter_rows(&rows, "ahr");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ahri");
    }

    #[test]
    fn test_filter_by_role_case_insensitive() {
        let rows = rows();
        let found = filter_rows(&rows, "  SUPP ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Thresh");
    }

    #[test]
    fn test_empty_query_keeps_all() {
        let rows = rows();
        assert_eq!(filter_rows(&rows, "   ").len(), 3);
    }

    #[test]
    fn test_display_defaults_missing_rates() {
        let rows = rows();
        let line = rows[2].to_string();
        assert!(line.starts_with("Garen"));
        assert!(line.contains("0.00"));
    }
}
