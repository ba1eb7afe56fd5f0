// ── Route batch builder ──
//
// Pure partitioning of a route topology into per-mapping-type endpoint
// batches. Nothing in here calls the backend; `Reservation` forwards the
// batches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{DeviceRecord, EndpointBatch, MappingType, RouteDescriptor};

/// Restricts which batchable mapping types a builder pass includes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RouteTypeFilter {
    Bi,
    Uni,
    All,
}

impl RouteTypeFilter {
    pub fn includes(self, mapping_type: MappingType) -> bool {
        match self {
            Self::Bi => mapping_type == MappingType::Bi,
            Self::Uni => mapping_type == MappingType::Uni,
            Self::All => mapping_type.is_batchable(),
        }
    }
}

/// Which end of a route decides whether it belongs to a device set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EvaluateBy {
    Source,
    Target,
    #[default]
    Either,
}

/// Non-empty endpoint batches keyed by mapping type. Iterates `Bi` before
/// `Uni`.
pub type RouteBatches = BTreeMap<MappingType, EndpointBatch>;

/// Partition `topology` into BI and UNI endpoint batches.
///
/// `Cable` and `Other` routes are never included. Within a batch, pairs
/// keep topology order. Empty batches are left out of the result, so an
/// empty map means there is nothing to send.
pub fn build_batches<'a, I>(topology: I, type_filter: Option<RouteTypeFilter>) -> RouteBatches
where
    I: IntoIterator<Item = &'a RouteDescriptor>,
{
    let filter = type_filter.unwrap_or(RouteTypeFilter::All);
    let mut batches = RouteBatches::new();
    for route in topology {
        if filter.includes(route.mapping_type) {
            batches
                .entry(route.mapping_type)
                .or_default()
                .push_route(route);
        }
    }
    batches
}

/// Every route's endpoints in one batch, regardless of mapping type.
///
/// Used for the untyped "disconnect everything" call.
pub fn build_disconnect_batch<'a, I>(topology: I) -> EndpointBatch
where
    I: IntoIterator<Item = &'a RouteDescriptor>,
{
    topology.into_iter().collect()
}

/// Routes touching at least one of `devices`.
///
/// A route's device is the first segment of its source or target path;
/// `evaluate_by` picks which end(s) are checked. Ids are compared exactly.
pub fn select_routes_for_devices<'a, I>(
    topology: I,
    devices: &[DeviceRecord],
    evaluate_by: EvaluateBy,
) -> Vec<&'a RouteDescriptor>
where
    I: IntoIterator<Item = &'a RouteDescriptor>,
{
    let owned_by = |device: &str| devices.iter().any(|d| d.id == device);
    topology
        .into_iter()
        .filter(|route| {
            let source = owned_by(route.source.device());
            let target = owned_by(route.target.device());
            match evaluate_by {
                EvaluateBy::Source => source,
                EvaluateBy::Target => target,
                EvaluateBy::Either => source || target,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn route(source: &str, target: &str, mapping_type: MappingType) -> RouteDescriptor {
        RouteDescriptor::new(source, target, mapping_type)
    }

    fn mixed_topology() -> Vec<RouteDescriptor> {
        vec![
            route("A/1", "B/1", MappingType::Bi),
            route("A/2", "C/1", MappingType::Uni),
            route("D/1", "E/1", MappingType::Cable),
            route("B/2", "C/2", MappingType::Bi),
            route("E/2", "F/1", MappingType::Other),
        ]
    }

    #[test]
    fn batches_have_even_length_and_skip_cables() {
        let topology = mixed_topology();
        let batches = build_batches(&topology, None);

        assert_eq!(batches.len(), 2);
        for batch in batches.values() {
            assert_eq!(batch.len() % 2, 0);
            assert!(batch.endpoints().iter().all(|e| e.device() != "D"));
        }
        let pair_total: usize = batches.values().map(EndpointBatch::pair_count).sum();
        assert_eq!(pair_total, 3);
    }

    #[test]
    fn bi_batch_keeps_topology_order() {
        let topology = mixed_topology();
        let batches = build_batches(&topology, None);

        assert_eq!(
            batches[&MappingType::Bi].to_wire(),
            ["A/1", "B/1", "B/2", "C/2"]
        );
        assert_eq!(batches[&MappingType::Uni].to_wire(), ["A/2", "C/1"]);
    }

    #[test]
    fn type_filter_limits_keys() {
        let topology = mixed_topology();

        let bi = build_batches(&topology, Some(RouteTypeFilter::Bi));
        assert_eq!(bi.keys().copied().collect::<Vec<_>>(), [MappingType::Bi]);

        let uni = build_batches(&topology, Some(RouteTypeFilter::Uni));
        assert_eq!(uni.keys().copied().collect::<Vec<_>>(), [MappingType::Uni]);

        let all = build_batches(&topology, Some(RouteTypeFilter::All));
        assert_eq!(all, build_batches(&topology, None));
    }

    #[test]
    fn empty_batches_are_omitted() {
        let topology = vec![route("A/1", "B/1", MappingType::Cable)];
        assert!(build_batches(&topology, None).is_empty());

        let only_bi = vec![route("A/1", "B/1", MappingType::Bi)];
        assert!(build_batches(&only_bi, Some(RouteTypeFilter::Uni)).is_empty());
    }

    #[test]
    fn disconnect_batch_includes_every_route() {
        let topology = mixed_topology();
        let batch = build_disconnect_batch(&topology);

        assert_eq!(batch.pair_count(), topology.len());
        assert_eq!(batch.endpoints()[4].as_str(), "D/1");
    }

    #[test]
    fn device_selection_respects_evaluate_by() {
        let topology = mixed_topology();
        let devices = [DeviceRecord::unresolved("C")];

        let either = select_routes_for_devices(&topology, &devices, EvaluateBy::Either);
        assert_eq!(either.len(), 2);

        let source = select_routes_for_devices(&topology, &devices, EvaluateBy::Source);
        assert!(source.is_empty());

        let target = select_routes_for_devices(&topology, &devices, EvaluateBy::Target);
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn device_selection_then_batches_partitions_by_type() {
        let topology = mixed_topology();
        let devices = [DeviceRecord::unresolved("A")];

        let selected = select_routes_for_devices(&topology, &devices, EvaluateBy::Either);
        let batches = build_batches(selected, None);

        assert_eq!(batches[&MappingType::Bi].to_wire(), ["A/1", "B/1"]);
        assert_eq!(batches[&MappingType::Uni].to_wire(), ["A/2", "C/1"]);
    }

    #[test]
    fn filter_parses_from_cli_strings() {
        assert_eq!("BI".parse::<RouteTypeFilter>().ok(), Some(RouteTypeFilter::Bi));
        assert_eq!("either".parse::<EvaluateBy>().ok(), Some(EvaluateBy::Either));
    }
}
