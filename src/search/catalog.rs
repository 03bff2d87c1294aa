//! Built-in catalog of known places
//!
//! Serves as the offline fallback for the search client and as the data
//! behind the demo gateway server.

use crate::coord::{haversine_km, Coordinate};
use crate::search::{LocationSuggestion, SuggestionKind};

struct KnownPlace {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    latitude: f64,
    longitude: f64,
    kind: SuggestionKind,
}

const KNOWN_PLACES: &[KnownPlace] = &[
    KnownPlace {
        id: "kumasi_central_market",
        name: "Kejetia Central Market",
        address: "Kejetia, Kumasi, Ashanti Region, Ghana",
        latitude: 6.6961,
        longitude: -1.6243,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "atonsu_unity_oil",
        name: "Atonsu Unity Oil",
        address: "Atonsu-Agogo Road, Atonsu, Kumasi, Ghana",
        latitude: 6.6528,
        longitude: -1.5962,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "atonsu_lake_road",
        name: "Atonsu Lake Road",
        address: "Lake Road, Atonsu, Kumasi, Ghana",
        latitude: 6.6489,
        longitude: -1.5921,
        kind: SuggestionKind::Route,
    },
    KnownPlace {
        id: "knust_campus",
        name: "KNUST Campus",
        address: "University Post Office, Kumasi, Ghana",
        latitude: 6.6734,
        longitude: -1.5714,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "ayeduase_gate",
        name: "Ayeduase Gate",
        address: "Ayeduase, Kumasi, Ghana",
        latitude: 6.6695,
        longitude: -1.5602,
        kind: SuggestionKind::Geocode,
    },
    KnownPlace {
        id: "adum_shopping_center",
        name: "Adum Shopping Center",
        address: "Adum, Kumasi, Ashanti Region, Ghana",
        latitude: 6.6885,
        longitude: -1.6244,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "kumasi_mall",
        name: "Kumasi City Mall",
        address: "Lake Road, Asokwa, Kumasi, Ghana",
        latitude: 6.6745,
        longitude: -1.6060,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "asokwa_interchange",
        name: "Asokwa Interchange",
        address: "Accra-Kumasi Highway, Asokwa, Kumasi, Ghana",
        latitude: 6.6682,
        longitude: -1.6005,
        kind: SuggestionKind::Route,
    },
    KnownPlace {
        id: "tech_junction",
        name: "Tech Junction",
        address: "Accra-Kumasi Highway, Bomso, Kumasi, Ghana",
        latitude: 6.6838,
        longitude: -1.5771,
        kind: SuggestionKind::Geocode,
    },
    KnownPlace {
        id: "bantama_high_street",
        name: "Bantama High Street",
        address: "12 High Street, Bantama, Kumasi, Ghana",
        latitude: 6.7059,
        longitude: -1.6377,
        kind: SuggestionKind::StreetAddress,
    },
    KnownPlace {
        id: "suame_magazine",
        name: "Suame Magazine",
        address: "Suame, Kumasi, Ashanti Region, Ghana",
        latitude: 6.7214,
        longitude: -1.6290,
        kind: SuggestionKind::Geocode,
    },
    KnownPlace {
        id: "kotei_recycling_point",
        name: "Kotei Recycling Point",
        address: "Kotei, Kumasi, Ghana",
        latitude: 6.6612,
        longitude: -1.5535,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "ahodwo_roundabout",
        name: "Ahodwo Roundabout",
        address: "Ahodwo, Kumasi, Ghana",
        latitude: 6.6690,
        longitude: -1.6186,
        kind: SuggestionKind::Route,
    },
    KnownPlace {
        id: "oforikrom_market",
        name: "Oforikrom Market",
        address: "Oforikrom, Kumasi, Ghana",
        latitude: 6.6826,
        longitude: -1.5912,
        kind: SuggestionKind::Establishment,
    },
    KnownPlace {
        id: "santasi_roundabout",
        name: "Santasi Roundabout",
        address: "Santasi, Kumasi, Ghana",
        latitude: 6.6858,
        longitude: -1.6584,
        kind: SuggestionKind::Route,
    },
    KnownPlace {
        id: "accra_mall",
        name: "Accra Mall",
        address: "Tetteh Quarshie Interchange, Accra, Ghana",
        latitude: 5.6226,
        longitude: -0.1731,
        kind: SuggestionKind::Establishment,
    },
];

impl KnownPlace {
    fn to_suggestion(&self) -> LocationSuggestion {
        LocationSuggestion {
            id: self.id.to_string(),
            name: self.name.to_string(),
            address: self.address.to_string(),
            coordinate: Some(Coordinate::new(self.latitude, self.longitude)),
            kind: self.kind,
        }
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Every catalog entry, in catalog order
pub fn all() -> Vec<LocationSuggestion> {
    KNOWN_PLACES.iter().map(KnownPlace::to_suggestion).collect()
}

/// Case-insensitive substring search over name and address
///
/// With a bias coordinate, matches are ordered nearest first; otherwise
/// catalog order is kept. At most `limit` results are returned.
pub fn search(query: &str, bias: Option<Coordinate>, limit: usize) -> Vec<LocationSuggestion> {
    let needle = query.trim().to_lowercase();

    let mut matches: Vec<LocationSuggestion> = KNOWN_PLACES
        .iter()
        .map(KnownPlace::to_suggestion)
        .filter(|s| s.matches(&needle))
        .collect();

    if let Some(bias) = bias {
        matches.sort_by(|a, b| {
            let da = a.coordinate.map(|c| haversine_km(c, bias)).unwrap_or(f64::MAX);
            let db = b.coordinate.map(|c| haversine_km(c, bias)).unwrap_or(f64::MAX);
            da.total_cmp(&db)
        });
    }

    matches.truncate(limit);
    matches
}

/// Look up a single entry by id
pub fn find(id: &str) -> Option<LocationSuggestion> {
    KNOWN_PLACES
        .iter()
        .find(|p| p.id == id)
        .map(KnownPlace::to_suggestion)
}

/// Nearest entry within `radius_km` of `coordinate`
pub fn nearest(coordinate: Coordinate, radius_km: f64) -> Option<LocationSuggestion> {
    KNOWN_PLACES
        .iter()
        .map(|p| (p, haversine_km(p.coordinate(), coordinate)))
        .filter(|(_, d)| *d <= radius_km)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(p, _)| p.to_suggestion())
}
