//! Device identity and the MQTT topics derived from it.
//!
//! Both topics are built once at startup into fixed-capacity strings and
//! never change for the lifetime of the process:
//! - `<id>/sensors`: climate, light and potentiometer readings
//! - `<id>/geosensors`: simulated location + geofence status

use core::fmt::Write;

/// Maximum topic length (bytes) accepted by the publisher.
pub const MAX_TOPIC_LEN: usize = 64;

pub type TopicString = heapless::String<MAX_TOPIC_LEN>;

/// Immutable identity of this node.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    id: TopicString,
    sensors_topic: TopicString,
    geo_topic: TopicString,
}

impl DeviceIdentity {
    /// Build the identity and both topics.  Ids that do not fit are
    /// truncated; `SystemConfig::validate` rejects them up front.
    pub fn new(id: &str) -> Self {
        let mut this = Self {
            id: TopicString::new(),
            sensors_topic: TopicString::new(),
            geo_topic: TopicString::new(),
        };
        let _ = write!(this.id, "{}", id);
        let _ = write!(this.sensors_topic, "{}/sensors", id);
        let _ = write!(this.geo_topic, "{}/geosensors", id);
        this
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sensors_topic(&self) -> &str {
        &self.sensors_topic
    }

    pub fn geo_topic(&self) -> &str {
        &self.geo_topic
    }
}
