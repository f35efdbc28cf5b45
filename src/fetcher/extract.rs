//! Decoding API payloads into snapshots

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::bindings::{CollectionLayout, SnapshotBinding};
use crate::errors::{MonitorError, MonitorResult};
use crate::types::{is_valid_address, EntityRecord, Snapshot};
use crate::utils::parse_percentage;

/// Reads a number given either as a JSON number or numeric text.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_percentage(s),
        _ => None,
    }
}

/// Looks up `field` on the payload, then under a nested `data` object.
pub fn find_collection<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    payload
        .get(field)
        .or_else(|| payload.get("data").and_then(|data| data.get(field)))
}

fn identity(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn observable(record: &Map<String, Value>, fields: &[&str]) -> f64 {
    // First non-zero field wins, so a zero primary falls back to the next one.
    fields
        .iter()
        .filter_map(|field| record.get(*field).and_then(numeric))
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

fn build_record(id: String, record: &Map<String, Value>, binding: &SnapshotBinding) -> EntityRecord {
    let mut entity = EntityRecord::new(id, observable(record, binding.value_fields));

    if let Some(name) = record.get("name").and_then(Value::as_str) {
        entity = entity.with_name(name);
    }

    let address = record
        .get("address")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| is_valid_address(&entity.id).then(|| entity.id.clone()));
    if let Some(address) = address {
        entity = entity.with_address(address);
    }

    for field in binding.detail_fields {
        if let Some(value) = record.get(*field).filter(|v| !v.is_null()) {
            entity = entity.with_detail(field, value.clone());
        }
    }
    entity
}

fn parse_error(binding: &SnapshotBinding, expected: &str) -> MonitorError {
    MonitorError::DataParsing {
        context: format!(
            "'{}' from {} is not {}",
            binding.collection_field,
            binding.endpoint.template(),
            expected
        ),
        source: anyhow::anyhow!("unexpected payload shape"),
    }
}

/// Decodes a normalized payload according to `binding`.
///
/// A missing collection is an empty snapshot. Records without an identity are
/// skipped; a collection of the wrong JSON type fails the whole extraction.
pub fn extract_snapshot(payload: &Value, binding: &SnapshotBinding) -> MonitorResult<Snapshot> {
    match binding.layout {
        CollectionLayout::Scalar => {
            let value = find_collection(payload, binding.collection_field)
                .or(Some(payload))
                .and_then(numeric);
            if value.is_none() {
                warn!(
                    field = binding.collection_field,
                    "Scalar field missing or not numeric, treating as 0"
                );
            }
            Ok(Snapshot::Scalar(value.unwrap_or(0.0)))
        }
        CollectionLayout::Array => {
            let items = match find_collection(payload, binding.collection_field) {
                None | Some(Value::Null) => return Ok(Snapshot::Entities(Vec::new())),
                Some(Value::Array(items)) => items,
                Some(_) => return Err(parse_error(binding, "an array")),
            };

            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let Some(object) = item.as_object() else {
                    debug!(index, "Skipping non-object record");
                    continue;
                };
                let Some(id) = object.get(binding.identity_field).and_then(identity) else {
                    debug!(index, field = binding.identity_field, "Skipping record without identity");
                    continue;
                };
                records.push(build_record(id, object, binding));
            }
            Ok(Snapshot::Entities(records))
        }
        CollectionLayout::Keyed => {
            let map = match find_collection(payload, binding.collection_field) {
                Some(Value::Object(map)) => map,
                Some(Value::Null) | None => match payload.get("data").unwrap_or(payload) {
                    Value::Object(map) => map,
                    _ => return Ok(Snapshot::Entities(Vec::new())),
                },
                Some(_) => return Err(parse_error(binding, "an object")),
            };

            let records = map
                .iter()
                .filter_map(|(key, value)| {
                    value
                        .as_object()
                        .map(|object| build_record(key.clone(), object, binding))
                })
                .collect();
            Ok(Snapshot::Entities(records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::binding_for;
    use crate::types::MonitorType;
    use serde_json::json;

    #[test]
    fn reads_pool_tvl_with_fallback_field() {
        let payload = json!({"poolData": [
            {"id": "3pool", "name": "3pool", "address": "0xbEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7", "usdTotal": 150.0},
            {"id": "meta", "usdTotal": 0, "usdTotalExcludingBasePool": 42.5},
            {"id": "empty"},
            {"name": "no identity", "usdTotal": 1.0}
        ]});
        let snapshot = extract_snapshot(&payload, &binding_for(MonitorType::PoolTvlChanged)).unwrap();
        let Snapshot::Entities(records) = snapshot else { panic!("expected entities") };

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, 150.0);
        assert_eq!(records[0].name.as_deref(), Some("3pool"));
        assert_eq!(records[1].value, 42.5);
        assert_eq!(records[2].value, 0.0);
    }

    #[test]
    fn finds_collection_under_nested_data() {
        let payload = json!({"success": false, "data": {"pools": [{"address": "0xabc", "volumeUSD": "1200.5"}]}});
        let snapshot = extract_snapshot(&payload, &binding_for(MonitorType::LargeVolumeAlert)).unwrap();
        assert_eq!(
            snapshot,
            Snapshot::Entities(vec![EntityRecord::new("0xabc", 1200.5).with_address("0xabc")])
        );
    }

    #[test]
    fn missing_collection_is_empty() {
        let snapshot = extract_snapshot(&json!({}), &binding_for(MonitorType::NewLendingVault)).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn wrong_collection_type_fails() {
        let payload = json!({"gauges": "nope"});
        let err = extract_snapshot(&payload, &binding_for(MonitorType::GaugeRewardsChanged)).unwrap_err();
        assert!(matches!(err, MonitorError::DataParsing { .. }));
    }

    #[test]
    fn reads_keyed_gauges() {
        let payload = json!({"gauges": {
            "0x1111111111111111111111111111111111111111": {"name": "g1", "poolAddress": "0xp1", "type": "stable", "side_chain": false},
            "meta": 5
        }});
        let snapshot = extract_snapshot(&payload, &binding_for(MonitorType::NewGaugeCreated)).unwrap();
        let Snapshot::Entities(records) = snapshot else { panic!("expected entities") };

        assert_eq!(records.len(), 1);
        let gauge = &records[0];
        assert_eq!(gauge.address.as_deref(), Some("0x1111111111111111111111111111111111111111"));
        assert_eq!(gauge.details["type"], "stable");
        assert_eq!(gauge.details["side_chain"], false);
    }

    #[test]
    fn reads_keyed_gauges_without_wrapper() {
        let payload = json!({"0x2222222222222222222222222222222222222222": {"name": "g2"}});
        let snapshot = extract_snapshot(&payload, &binding_for(MonitorType::NewGaugeCreated)).unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn reads_scalar_supply_from_text() {
        let binding = binding_for(MonitorType::CrvusdSupplyChanged);
        let snapshot = extract_snapshot(&json!({"crvusdTotalSupply": "123456.78"}), &binding).unwrap();
        assert_eq!(snapshot, Snapshot::Scalar(123456.78));

        let snapshot = extract_snapshot(&json!({}), &binding).unwrap();
        assert_eq!(snapshot, Snapshot::Scalar(0.0));
    }
}
