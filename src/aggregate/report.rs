//! CRStates-compatible availability report.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::topology::snapshot::Snapshot;

/// Availability of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}

/// Availability of one delivery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryServiceState {
    #[serde(rename = "disabledLocations")]
    pub disabled_locations: Vec<String>,

    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}

/// The `/crstates` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub caches: BTreeMap<String, CacheState>,

    #[serde(rename = "deliveryServices")]
    pub delivery_services: BTreeMap<String, DeliveryServiceState>,
}

impl AvailabilityReport {
    pub fn is_available(&self, cache: &str) -> Option<bool> {
        self.caches.get(cache).map(|c| c.is_available)
    }
}

/// Roll cache verdicts up to delivery services.
///
/// A service is available when any cache assigned to it is. Cache groups
/// holding assigned caches but no available one are listed as disabled.
/// Caches missing from `caches` (offline, mids) do not count.
pub fn rollup_delivery_services(
    snapshot: &Snapshot,
    caches: &BTreeMap<String, CacheState>,
) -> BTreeMap<String, DeliveryServiceState> {
    let mut rollup = BTreeMap::new();

    for ds in snapshot.delivery_services() {
        let mut is_available = false;
        let mut groups_seen = BTreeSet::new();
        let mut groups_up = BTreeSet::new();

        let assigned = snapshot
            .servers()
            .filter(|s| s.delivery_services.iter().any(|d| d == ds))
            .filter_map(|s| caches.get(&s.name).map(|state| (s, state.is_available)));

        for (server, available) in assigned {
            is_available |= available;
            if let Some(group) = &server.cache_group {
                groups_seen.insert(group.as_str());
                if available {
                    groups_up.insert(group.as_str());
                }
            }
        }

        let disabled_locations = groups_seen
            .difference(&groups_up)
            .map(|g| g.to_string())
            .collect();

        rollup.insert(
            ds.clone(),
            DeliveryServiceState {
                disabled_locations,
                is_available,
            },
        );
    }

    rollup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::loader::parse_crconfig;

    fn snapshot() -> Snapshot {
        let doc = parse_crconfig(
            r#"{
                "contentServers": {
                    "a1": {"cacheGroup": "east", "deliveryServices": {"video": []}},
                    "a2": {"cacheGroup": "east", "deliveryServices": {"video": [], "images": []}},
                    "b1": {"cacheGroup": "west", "deliveryServices": {"video": []}},
                    "c1": {"cacheGroup": "north", "deliveryServices": {"images": []}}
                },
                "deliveryServices": {"video": {}, "images": {}, "empty": {}}
            }"#,
        )
        .unwrap();
        Snapshot::from_crconfig(doc, "a1")
    }

    fn states(entries: &[(&str, bool)]) -> BTreeMap<String, CacheState> {
        entries
            .iter()
            .map(|(n, a)| (n.to_string(), CacheState { is_available: *a }))
            .collect()
    }

    #[test]
    fn test_rollup() {
        let caches = states(&[("a1", false), ("a2", true), ("b1", false), ("c1", false)]);
        let rollup = rollup_delivery_services(&snapshot(), &caches);

        let video = &rollup["video"];
        assert!(video.is_available);
        assert_eq!(video.disabled_locations, vec!["west".to_string()]);

        let images = &rollup["images"];
        assert!(images.is_available);
        assert_eq!(images.disabled_locations, vec!["north".to_string()]);

        let empty = &rollup["empty"];
        assert!(!empty.is_available);
        assert!(empty.disabled_locations.is_empty());
    }

    #[test]
    fn test_caches_left_out_of_report_do_not_count() {
        let caches = states(&[("a1", false)]);
        let rollup = rollup_delivery_services(&snapshot(), &caches);
        assert!(!rollup["video"].is_available);
        assert_eq!(rollup["video"].disabled_locations, vec!["east".to_string()]);
        assert!(rollup["images"].disabled_locations.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let mut report = AvailabilityReport::default();
        report.caches.insert("edge1".into(), CacheState { is_available: true });
        report.delivery_services.insert(
            "video".into(),
            DeliveryServiceState {
                disabled_locations: vec![],
                is_available: true,
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "caches": {"edge1": {"isAvailable": true}},
                "deliveryServices": {"video": {"disabledLocations": [], "isAvailable": true}}
            })
        );
    }
}
