//! Simulated node map for running without camera hardware.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AccessMode, NodeInfo, NodeKind, NodeMap, NodeMapError, PropertyValue};

/// Nodes that lock while `TriggerMode` is `On`.
const TRIGGER_LOCKED_NODES: &[&str] = &["TriggerSource", "TriggerSelector", "TriggerActivation"];

/// One successful write, in the order it reached the node map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeWrite {
    pub name: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone)]
enum NodeValue {
    Bool(bool),
    Int { value: i64, min: i64, max: i64 },
    Float { value: f64, min: f64, max: f64 },
    Enum { value: String, entries: Vec<String> },
}

impl NodeValue {
    fn kind(&self) -> NodeKind {
        match self {
            NodeValue::Bool(_) => NodeKind::Boolean,
            NodeValue::Int { .. } => NodeKind::Integer,
            NodeValue::Float { .. } => NodeKind::Float,
            NodeValue::Enum { .. } => NodeKind::Enumeration,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    access: AccessMode,
    value: NodeValue,
}

/// A node map held in memory.
///
/// Besides plain typed nodes it models the two couplings camera
/// configuration has to respect: with a sensor size set, `Width + OffsetX`
/// and `Height + OffsetY` may not exceed the sensor, and the trigger source,
/// selector and activation are read-only while `TriggerMode` is `On`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeMap {
    nodes: BTreeMap<String, Node>,
    sensor: Option<(i64, i64)>,
    failures: BTreeMap<String, String>,
    writes: Vec<NodeWrite>,
}

impl InMemoryNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node map of a Flea3 color camera (FL3-U3-13E4C, 1280x1024).
    pub fn flea3_color() -> Self {
        Self::flea3_common()
            .with_enum(
                "PixelFormat",
                "BayerBG8",
                &["Mono8", "Mono16", "BayerBG8", "BayerBG16", "RGB8Packed", "YUV422Packed"],
            )
            .with_bool("SharpeningEnable", false)
            .with_bool("SharpeningAuto", false)
            .with_float("Sharpening", 1.0, 0.0, 4.0)
            .with_float("SharpeningThreshold", 0.1, 0.0, 0.25)
            .with_bool("SaturationEnable", false)
            .with_float("Saturation", 100.0, 0.0, 400.0)
            .with_enum("BalanceWhiteAuto", "Continuous", &["Off", "Once", "Continuous"])
    }

    /// Node map of a Flea3 monochrome camera (FL3-U3-13E4M, 1280x1024).
    ///
    /// Sharpening, saturation and white balance exist in the XML but are
    /// not available on the mono sensor.
    pub fn flea3_mono() -> Self {
        Self::flea3_common()
            .with_enum("PixelFormat", "Mono8", &["Mono8", "Mono16"])
            .with_bool("SharpeningEnable", false)
            .with_access("SharpeningEnable", AccessMode::NotAvailable)
            .with_bool("SaturationEnable", false)
            .with_access("SaturationEnable", AccessMode::NotAvailable)
            .with_enum("BalanceWhiteAuto", "Off", &["Off"])
            .with_access("BalanceWhiteAuto", AccessMode::NotAvailable)
    }

    fn flea3_common() -> Self {
        const AUTO: &[&str] = &["Off", "Once", "Continuous"];
        const LINES: &[&str] = &["Line0", "Line1", "Line2", "Line3"];

        Self::new()
            .with_sensor(1280, 1024)
            .with_bool("AcquisitionFrameRateEnabled", false)
            .with_enum("AcquisitionFrameRateAuto", "Continuous", &["Off", "Continuous"])
            .with_float("AcquisitionFrameRate", 60.0, 1.0, 60.0)
            .with_int("Width", 1280, 8, 1280)
            .with_int("Height", 1024, 2, 1024)
            .with_int("OffsetX", 0, 0, 1272)
            .with_int("OffsetY", 0, 0, 1022)
            .with_enum("TriggerMode", "Off", &["Off", "On"])
            .with_enum("TriggerSource", "Software", &["Software", "Line0", "Line1", "Line2", "Line3"])
            .with_enum("TriggerSelector", "FrameStart", &["FrameStart", "ExposureActive"])
            .with_enum("TriggerActivation", "RisingEdge", &["RisingEdge", "FallingEdge"])
            .with_enum("LineSelector", "Line0", LINES)
            .with_enum("LineMode", "Input", &["Input", "Output"])
            .with_enum("ExposureMode", "Timed", &["Timed", "TriggerWidth"])
            .with_enum("ExposureAuto", "Continuous", AUTO)
            .with_float("ExposureTime", 16_000.0, 5.0, 3_200_000.0)
            .with_float("AutoExposureTimeUpperLimit", 16_000.0, 5.0, 3_200_000.0)
            .with_enum("GainAuto", "Continuous", AUTO)
            .with_float("Gain", 0.0, 0.0, 24.0)
            .with_float("BlackLevel", 0.0, 0.0, 12.48)
            .with_bool("GammaEnabled", false)
            .with_float("Gamma", 1.0, 0.5, 4.0)
    }

    /// Couples `Width`/`OffsetX` and `Height`/`OffsetY` to a sensor size.
    pub fn with_sensor(mut self, width: i64, height: i64) -> Self {
        self.sensor = Some((width, height));
        self
    }

    pub fn with_bool(self, name: &str, value: bool) -> Self {
        self.with_node(name, NodeValue::Bool(value))
    }

    pub fn with_int(self, name: &str, value: i64, min: i64, max: i64) -> Self {
        self.with_node(name, NodeValue::Int { value, min, max })
    }

    pub fn with_float(self, name: &str, value: f64, min: f64, max: f64) -> Self {
        self.with_node(name, NodeValue::Float { value, min, max })
    }

    pub fn with_enum(self, name: &str, value: &str, entries: &[&str]) -> Self {
        let entries = entries.iter().map(|e| (*e).to_owned()).collect();
        self.with_node(
            name,
            NodeValue::Enum {
                value: value.to_owned(),
                entries,
            },
        )
    }

    /// Overrides the access mode of an existing node.
    pub fn with_access(mut self, name: &str, access: AccessMode) -> Self {
        if let Some(node) = self.nodes.get_mut(name) {
            node.access = access;
        }
        self
    }

    /// Makes every write to `name` fail with a vendor error.
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_owned(), message.to_owned());
        self
    }

    fn with_node(mut self, name: &str, value: NodeValue) -> Self {
        self.nodes.insert(
            name.to_owned(),
            Node {
                access: AccessMode::ReadWrite,
                value,
            },
        );
        self
    }

    pub fn writes(&self) -> &[NodeWrite] {
        &self.writes
    }

    /// Names of the written nodes, in write order.
    pub fn written_names(&self) -> Vec<&str> {
        self.writes.iter().map(|w| w.name.as_str()).collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Current value of every readable node.
    pub fn snapshot(&self) -> BTreeMap<String, PropertyValue> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.access.is_readable())
            .map(|(name, node)| {
                let value = match &node.value {
                    NodeValue::Bool(v) => PropertyValue::Bool(*v),
                    NodeValue::Int { value, .. } => PropertyValue::Int(*value),
                    NodeValue::Float { value, .. } => PropertyValue::Float(*value),
                    NodeValue::Enum { value, .. } => PropertyValue::Enum(value.clone()),
                };
                (name.clone(), value)
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Result<&Node, NodeMapError> {
        self.nodes
            .get(name)
            .ok_or_else(|| NodeMapError::NotFound(name.to_owned()))
    }

    fn int_value(&self, name: &str) -> Option<i64> {
        match self.nodes.get(name).map(|n| &n.value) {
            Some(NodeValue::Int { value, .. }) => Some(*value),
            _ => None,
        }
    }

    fn trigger_enabled(&self) -> bool {
        matches!(
            self.nodes.get("TriggerMode").map(|n| &n.value),
            Some(NodeValue::Enum { value, .. }) if value == "On"
        )
    }

    /// Effective range of an integer node, narrowed by the sensor coupling.
    fn effective_int_range(&self, name: &str, min: i64, max: i64) -> (i64, i64) {
        let Some((sensor_w, sensor_h)) = self.sensor else {
            return (min, max);
        };
        let partner = |other: &str, sensor: i64| {
            self.int_value(other)
                .map_or(max, |v| max.min(sensor - v))
        };
        let max = match name {
            "Width" => partner("OffsetX", sensor_w),
            "Height" => partner("OffsetY", sensor_h),
            "OffsetX" => partner("Width", sensor_w),
            "OffsetY" => partner("Height", sensor_h),
            _ => max,
        };
        (min, max)
    }

    fn check_readable(&self, name: &str) -> Result<&Node, NodeMapError> {
        let node = self.lookup(name)?;
        if !node.access.is_readable() {
            return Err(NodeMapError::vendor(name, "Node is not readable"));
        }
        Ok(node)
    }

    fn write(
        &mut self,
        name: &str,
        value: PropertyValue,
        kind: NodeKind,
    ) -> Result<&mut NodeValue, NodeMapError> {
        if let Some(message) = self.failures.get(name) {
            return Err(NodeMapError::vendor(name, message.clone()));
        }
        let info = self
            .node(name)
            .ok_or_else(|| NodeMapError::NotFound(name.to_owned()))?;
        if info.kind != kind {
            return Err(mismatch(name, kind));
        }
        if !info.access.is_writable() {
            return Err(NodeMapError::vendor(name, "Node is not writable"));
        }
        self.writes.push(NodeWrite {
            name: name.to_owned(),
            value,
        });
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| NodeMapError::NotFound(name.to_owned()))?;
        Ok(&mut node.value)
    }
}

fn out_of_range<T: std::fmt::Display>(name: &str, value: T, min: T, max: T) -> NodeMapError {
    NodeMapError::vendor(
        name,
        format!("Value {} is out of range [{}, {}]", value, min, max),
    )
}

impl NodeMap for InMemoryNodeMap {
    fn node(&self, name: &str) -> Option<NodeInfo> {
        let node = self.nodes.get(name)?;
        let mut access = node.access;
        if access == AccessMode::ReadWrite
            && TRIGGER_LOCKED_NODES.contains(&name)
            && self.trigger_enabled()
        {
            access = AccessMode::ReadOnly;
        }
        Some(NodeInfo {
            kind: node.value.kind(),
            access,
        })
    }

    fn get_bool(&self, name: &str) -> Result<bool, NodeMapError> {
        match &self.check_readable(name)?.value {
            NodeValue::Bool(v) => Ok(*v),
            _ => Err(mismatch(name, NodeKind::Boolean)),
        }
    }

    fn get_int(&self, name: &str) -> Result<i64, NodeMapError> {
        match &self.check_readable(name)?.value {
            NodeValue::Int { value, .. } => Ok(*value),
            _ => Err(mismatch(name, NodeKind::Integer)),
        }
    }

    fn get_float(&self, name: &str) -> Result<f64, NodeMapError> {
        match &self.check_readable(name)?.value {
            NodeValue::Float { value, .. } => Ok(*value),
            _ => Err(mismatch(name, NodeKind::Float)),
        }
    }

    fn get_enum(&self, name: &str) -> Result<String, NodeMapError> {
        match &self.check_readable(name)?.value {
            NodeValue::Enum { value, .. } => Ok(value.clone()),
            _ => Err(mismatch(name, NodeKind::Enumeration)),
        }
    }

    fn int_range(&self, name: &str) -> Result<(i64, i64), NodeMapError> {
        match &self.lookup(name)?.value {
            NodeValue::Int { min, max, .. } => Ok(self.effective_int_range(name, *min, *max)),
            _ => Err(mismatch(name, NodeKind::Integer)),
        }
    }

    fn float_range(&self, name: &str) -> Result<(f64, f64), NodeMapError> {
        match &self.lookup(name)?.value {
            NodeValue::Float { min, max, .. } => Ok((*min, *max)),
            _ => Err(mismatch(name, NodeKind::Float)),
        }
    }

    fn enum_entries(&self, name: &str) -> Result<Vec<String>, NodeMapError> {
        match &self.lookup(name)?.value {
            NodeValue::Enum { entries, .. } => Ok(entries.clone()),
            _ => Err(mismatch(name, NodeKind::Enumeration)),
        }
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), NodeMapError> {
        if let NodeValue::Bool(v) = self.write(name, value.into(), NodeKind::Boolean)? {
            *v = value;
        }
        Ok(())
    }

    fn set_int(&mut self, name: &str, value: i64) -> Result<(), NodeMapError> {
        let (min, max) = self.int_range(name)?;
        if value < min || value > max {
            return Err(out_of_range(name, value, min, max));
        }
        if let NodeValue::Int { value: v, .. } = self.write(name, value.into(), NodeKind::Integer)? {
            *v = value;
        }
        Ok(())
    }

    fn set_float(&mut self, name: &str, value: f64) -> Result<(), NodeMapError> {
        let (min, max) = self.float_range(name)?;
        if value < min || value > max {
            return Err(out_of_range(name, value, min, max));
        }
        if let NodeValue::Float { value: v, .. } = self.write(name, value.into(), NodeKind::Float)? {
            *v = value;
        }
        Ok(())
    }

    fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), NodeMapError> {
        if !self.enum_entries(name)?.iter().any(|e| e == entry) {
            return Err(NodeMapError::vendor(
                name,
                format!("Entry '{}' is not available", entry),
            ));
        }
        if let NodeValue::Enum { value, .. } = self.write(name, entry.into(), NodeKind::Enumeration)? {
            *value = entry.to_owned();
        }
        Ok(())
    }
}

fn mismatch(name: &str, expected: NodeKind) -> NodeMapError {
    NodeMapError::TypeMismatch {
        name: name.to_owned(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flea3_presets_gate_color_features() {
        let color = InMemoryNodeMap::flea3_color();
        let mono = InMemoryNodeMap::flea3_mono();

        for name in ["SharpeningEnable", "SaturationEnable", "BalanceWhiteAuto"] {
            assert!(color.is_available(name), "{} should be available", name);
            assert!(!mono.is_available(name), "{} should not be available", name);
        }
        assert!(mono.is_available("Gain"));
        assert!(!mono.is_available("LineSource"));
    }

    #[test]
    fn test_sensor_couples_width_and_offset() {
        let mut nm = InMemoryNodeMap::flea3_color();
        nm.set_int("Width", 640).unwrap();
        nm.set_int("OffsetX", 640).unwrap();

        assert_eq!(nm.int_range("Width"), Ok((8, 640)));
        assert!(nm.set_int("Width", 1280).is_err());

        nm.set_int("OffsetX", 0).unwrap();
        assert_eq!(nm.int_range("Width"), Ok((8, 1280)));
        nm.set_int("Width", 1280).unwrap();
        assert_eq!(nm.int_range("OffsetX"), Ok((0, 0)));
    }

    #[test]
    fn test_trigger_settings_lock_while_triggering() {
        let mut nm = InMemoryNodeMap::flea3_color();
        nm.set_enum("TriggerMode", "On").unwrap();

        let info = nm.node("TriggerSource").unwrap();
        assert_eq!(info.access, AccessMode::ReadOnly);
        assert!(nm.set_enum("TriggerSource", "Line0").is_err());

        nm.set_enum("TriggerMode", "Off").unwrap();
        nm.set_enum("TriggerSource", "Line0").unwrap();
        assert_eq!(nm.get_enum("TriggerSource"), Ok("Line0".to_string()));
    }

    #[test]
    fn test_writes_are_recorded_in_order() {
        let mut nm = InMemoryNodeMap::flea3_color();
        nm.set_bool("GammaEnabled", true).unwrap();
        nm.set_float("Gamma", 2.2).unwrap();

        assert_eq!(nm.written_names(), vec!["GammaEnabled", "Gamma"]);
        assert_eq!(nm.writes()[1].value, PropertyValue::Float(2.2));

        nm.clear_writes();
        assert!(nm.writes().is_empty());
    }

    #[test]
    fn test_rejected_writes_are_not_recorded() {
        let mut nm = InMemoryNodeMap::flea3_color().with_failure("Gain", "device busy");
        assert!(nm.set_float("Gain", 1.0).is_err());
        assert!(nm.set_float("Gamma", 10.0).is_err());
        assert!(matches!(
            nm.set_int("Gamma", 1),
            Err(NodeMapError::TypeMismatch { .. })
        ));
        assert!(nm.set_enum("GainAuto", "Sometimes").is_err());
        assert!(nm.writes().is_empty());
    }

    #[test]
    fn test_snapshot_skips_unreadable_nodes() {
        let nm = InMemoryNodeMap::flea3_mono();
        let snapshot = nm.snapshot();
        assert_eq!(snapshot.get("Width"), Some(&PropertyValue::Int(1280)));
        assert!(!snapshot.contains_key("SaturationEnable"));
    }
}
