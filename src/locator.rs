//! Station picker: narrows the station directory down to one city.

use crate::model::Station;

/// Result of a station-name search within a city.
#[derive(Debug, Clone, PartialEq)]
pub enum StationSearch {
    /// No query was given; all stations of the city.
    All(Vec<Station>),
    /// Stations whose name contains the query.
    Matched(Vec<Station>),
    /// The query matched nothing, so all stations of the city are kept.
    NoMatch(Vec<Station>),
}

impl StationSearch {
    pub fn stations(&self) -> &[Station] {
        match self {
            StationSearch::All(s) | StationSearch::Matched(s) | StationSearch::NoMatch(s) => s,
        }
    }

    pub fn into_stations(self) -> Vec<Station> {
        match self {
            StationSearch::All(s) | StationSearch::Matched(s) | StationSearch::NoMatch(s) => s,
        }
    }
}

/// Stations located in `city` (case-insensitive exact match), sorted by name.
///
/// Stations with an end date are dropped unless `include_inactive` is set.
pub fn stations_in_city(stations: &[Station], city: &str, include_inactive: bool) -> Vec<Station> {
    let city = city.trim().to_lowercase();
    let mut out: Vec<Station> = stations
        .iter()
        .filter(|s| s.city.to_lowercase() == city)
        .filter(|s| include_inactive || s.is_active())
        .cloned()
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Filters `stations` by a case-insensitive substring of the name.
pub fn search_stations(stations: Vec<Station>, query: Option<&str>) -> StationSearch {
    let query = match query.map(|q| q.trim().to_lowercase()) {
        Some(q) if !q.is_empty() => q,
        _ => return StationSearch::All(stations),
    };

    let matched: Vec<Station> = stations
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&query))
        .cloned()
        .collect();

    if matched.is_empty() {
        StationSearch::NoMatch(stations)
    } else {
        StationSearch::Matched(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn station(id: &str, name: &str, city: &str, active_to: Option<NaiveDate>) -> Station {
        Station {
            id: id.into(),
            code: format!("DE{id}"),
            name: name.into(),
            city: city.into(),
            active_from: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            active_to,
        }
    }

    fn directory() -> Vec<Station> {
        vec![
            station("1", "Berlin Wedding", "Berlin", None),
            station("2", "Berlin Neukölln", "Berlin", None),
            station("3", "Berlin Alt", "Berlin", NaiveDate::from_ymd_opt(2005, 1, 1)),
            station("4", "München Stachus", "München", None),
        ]
    }

    #[test]
    fn test_city_match_is_case_insensitive() {
        let found = stations_in_city(&directory(), "berlin", false);
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let found = stations_in_city(&directory(), "MÜNCHEN", false);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_inactive_stations_excluded_by_default() {
        assert_eq!(stations_in_city(&directory(), "Berlin", false).len(), 2);
        assert_eq!(stations_in_city(&directory(), "Berlin", true).len(), 3);
    }

    #[test]
    fn test_unknown_city_is_empty() {
        assert!(stations_in_city(&directory(), "Köln", true).is_empty());
    }

    #[test]
    fn test_search_matches_substring() {
        let berlin = stations_in_city(&directory(), "Berlin", false);
        let result = search_stations(berlin, Some("wedd"));
        assert!(matches!(result, StationSearch::Matched(_)));
        assert_eq!(result.stations().len(), 1);
        assert_eq!(result.stations()[0].id, "1");
    }

    #[test]
    fn test_search_without_match_keeps_all() {
        let berlin = stations_in_city(&directory(), "Berlin", false);
        let result = search_stations(berlin, Some("spandau"));
        assert!(matches!(result, StationSearch::NoMatch(_)));
        assert_eq!(result.into_stations().len(), 2);
    }

    #[test]
    fn test_empty_query_returns_all() {
        let berlin = stations_in_city(&directory(), "Berlin", false);
        assert!(matches!(search_stations(berlin.clone(), None), StationSearch::All(_)));
        assert!(matches!(search_stations(berlin, Some("  ")), StationSearch::All(_)));
    }
}
