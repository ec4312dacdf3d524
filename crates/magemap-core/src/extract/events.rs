//! Event configuration (`events.xml`).

use super::{ConfigExtractor, RecordBatch};
use crate::config::ExtractorConfig;
use crate::tree::Element;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub name: String,
    pub source: String,
    pub area: Option<String>,
}

/// An observer registered on an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverRecord {
    pub event_name: String,
    pub observer_name: String,
    pub observer_class: Option<String>,
    pub method: String,
    pub disabled: bool,
    pub shared: bool,
    pub source: String,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventsConfig {
    pub events: Vec<EventRecord>,
    pub observers: Vec<ObserverRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventsStats {
    pub events: usize,
    pub observers: usize,
    pub total: usize,
}

impl EventsConfig {
    pub fn stats(&self) -> EventsStats {
        EventsStats {
            events: self.events.len(),
            observers: self.observers.len(),
            total: self.events.len() + self.observers.len(),
        }
    }

    /// Enabled observers of an event, in declaration order.
    pub fn observers_for(&self, event_name: &str) -> Vec<&ObserverRecord> {
        self.observers
            .iter()
            .filter(|o| o.event_name == event_name && !o.disabled)
            .collect()
    }

    /// Distinct event names in first-seen order.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for event in &self.events {
            if !names.contains(&event.name.as_str()) {
                names.push(&event.name);
            }
        }
        names
    }
}

impl RecordBatch for EventsConfig {
    fn tag_area(&mut self, area: &str) {
        for event in &mut self.events {
            event.area = Some(area.to_string());
        }
        for observer in &mut self.observers {
            observer.area = Some(area.to_string());
        }
    }

    fn append(&mut self, other: Self) {
        self.events.extend(other.events);
        self.observers.extend(other.observers);
    }
}

/// Extractor for `events.xml`.
#[derive(Debug, Clone)]
pub struct EventsExtractor {
    default_method: String,
}

impl EventsExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            default_method: config.default_observer_method.clone(),
        }
    }
}

impl ConfigExtractor for EventsExtractor {
    type Output = EventsConfig;

    fn file_name(&self) -> &'static str {
        "events.xml"
    }

    fn extract(&self, root: &Element, source: &str) -> EventsConfig {
        let mut results = EventsConfig::default();

        for event in root.one_or_many("event") {
            let event_name = match event.attr("name") {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };

            results.events.push(EventRecord {
                name: event_name.to_string(),
                source: source.to_string(),
                area: None,
            });

            for observer in event.one_or_many("observer") {
                results.observers.push(ObserverRecord {
                    event_name: event_name.to_string(),
                    observer_name: observer.attr_or_empty("name"),
                    observer_class: observer.attr("instance").map(str::to_string),
                    method: observer
                        .attr("method")
                        .unwrap_or(&self.default_method)
                        .to_string(),
                    disabled: observer.flag("disabled"),
                    shared: observer.attr("shared") != Some("false"),
                    source: source.to_string(),
                    area: None,
                });
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;
    use std::path::Path;

    const EVENTS_XML: &str = r#"<?xml version="1.0"?>
<config>
    <event name="customer_save_after">
        <observer name="sync" instance="Vendor\Observer\Sync"/>
        <observer name="audit" instance="Vendor\Observer\Audit" method="log" shared="false"/>
    </event>
    <event name="customer_delete_after">
        <observer name="cleanup" instance="Vendor\Observer\Cleanup" disabled="true"/>
    </event>
    <event>
        <observer name="orphan" instance="Vendor\Orphan"/>
    </event>
    <event name="customer_save_after"/>
</config>"#;

    fn extract() -> EventsConfig {
        let root = parse_document(EVENTS_XML, Path::new("etc/events.xml")).unwrap();
        EventsExtractor::new(&ExtractorConfig::default()).extract(&root, "etc/events.xml")
    }

    #[test]
    fn test_unnamed_events_are_skipped() {
        let events = extract();
        assert_eq!(events.events.len(), 3);
        assert!(events.observers.iter().all(|o| o.observer_name != "orphan"));
    }

    #[test]
    fn test_observer_defaults() {
        let events = extract();
        let sync = &events.observers[0];
        assert_eq!(sync.method, "execute");
        assert!(sync.shared);
        assert!(!sync.disabled);

        let audit = &events.observers[1];
        assert_eq!(audit.method, "log");
        assert!(!audit.shared);

        assert!(events.observers[2].disabled);
    }

    #[test]
    fn test_configured_default_method() {
        let root = parse_document(
            r#"<config><event name="e"><observer name="o" instance="X"/></event></config>"#,
            Path::new("events.xml"),
        )
        .unwrap();
        let config = ExtractorConfig {
            default_observer_method: "handle".to_string(),
            ..Default::default()
        };
        let events = EventsExtractor::new(&config).extract(&root, "events.xml");
        assert_eq!(events.observers[0].method, "handle");
    }

    #[test]
    fn test_observers_for_skips_disabled() {
        let events = extract();
        assert_eq!(events.observers_for("customer_save_after").len(), 2);
        assert!(events.observers_for("customer_delete_after").is_empty());
    }

    #[test]
    fn test_event_names_are_unique() {
        let events = extract();
        assert_eq!(
            events.event_names(),
            ["customer_save_after", "customer_delete_after"]
        );
    }
}
