use log::{debug, error, warn};

use super::{NodeKind, NodeMap, NodeMapError, PropertyValue};

/// Guarded write of a single feature.
///
/// Returns `Ok(false)` when the write was skipped: the node is not
/// implemented, not available, not writable, the enumeration entry is
/// unknown, the value does not fit the node type, or a float is NaN or
/// infinite. Numeric values outside the node's range are clamped to the
/// nearest bound before writing.
/// Errors raised by the node map itself are propagated.
pub fn set_property<N, V>(node_map: &mut N, name: &str, value: V) -> Result<bool, NodeMapError>
where
    N: NodeMap + ?Sized,
    V: Into<PropertyValue>,
{
    let value = value.into();

    let Some(info) = node_map.node(name) else {
        error!("Feature '{}' is not implemented on this camera", name);
        return Ok(false);
    };
    if !info.access.is_available() {
        warn!("Feature '{}' is not available", name);
        return Ok(false);
    }
    if !info.access.is_writable() {
        warn!("Feature '{}' is not writable", name);
        return Ok(false);
    }

    let written = match (info.kind, value) {
        (NodeKind::Boolean, PropertyValue::Bool(v)) => {
            node_map.set_bool(name, v)?;
            PropertyValue::Bool(v)
        }
        (NodeKind::Integer, PropertyValue::Int(v)) => {
            let (min, max) = node_map.int_range(name)?;
            let v = clamp_to_range(name, v, min, max);
            node_map.set_int(name, v)?;
            PropertyValue::Int(v)
        }
        (NodeKind::Float, PropertyValue::Float(v)) => {
            if !v.is_finite() {
                warn!("Feature '{}' cannot take non-finite value {}", name, v);
                return Ok(false);
            }
            let (min, max) = node_map.float_range(name)?;
            let v = clamp_to_range(name, v, min, max);
            node_map.set_float(name, v)?;
            PropertyValue::Float(v)
        }
        (NodeKind::Float, PropertyValue::Int(v)) => {
            let (min, max) = node_map.float_range(name)?;
            let v = clamp_to_range(name, v as f64, min, max);
            node_map.set_float(name, v)?;
            PropertyValue::Float(v)
        }
        (NodeKind::Enumeration, PropertyValue::Enum(entry)) => {
            let entries = node_map.enum_entries(name)?;
            if !entries.iter().any(|e| e == &entry) {
                warn!(
                    "Entry '{}' is not available for feature '{}' (available: {})",
                    entry,
                    name,
                    entries.join(", ")
                );
                return Ok(false);
            }
            node_map.set_enum(name, &entry)?;
            PropertyValue::Enum(entry)
        }
        (kind, value) => {
            warn!(
                "Feature '{}' is a {} node and cannot take value {}",
                name, kind, value
            );
            return Ok(false);
        }
    };

    debug!("{} set to {}", name, written);
    Ok(true)
}

fn clamp_to_range<T>(name: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value < min {
        warn!(
            "Desired {} value {} is below the minimum {}, setting to minimum",
            name, value, min
        );
        min
    } else if value > max {
        warn!(
            "Desired {} value {} is above the maximum {}, setting to maximum",
            name, value, max
        );
        max
    } else {
        value
    }
}
