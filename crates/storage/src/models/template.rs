use super::event::{Comparison, EventType};
use super::point_table::PointTable;

/// Static event preset offered when creating an event.
#[derive(Debug, Clone, Copy)]
pub struct EventTemplate {
    pub name: &'static str,
    pub event_type: EventType,
    pub unit: &'static str,
    pub max_per_class: i32,
    pub has_preliminary: bool,
}

impl EventTemplate {
    pub fn comparison(&self) -> Comparison {
        self.event_type.default_comparison()
    }

    pub fn point_table(&self) -> PointTable {
        PointTable::standard()
    }
}

pub const EVENT_TEMPLATES: &[EventTemplate] = &[
    EventTemplate { name: "100m", event_type: EventType::Track, unit: "seconds", max_per_class: 3, has_preliminary: true },
    EventTemplate { name: "200m", event_type: EventType::Track, unit: "seconds", max_per_class: 3, has_preliminary: true },
    EventTemplate { name: "400m", event_type: EventType::Track, unit: "seconds", max_per_class: 2, has_preliminary: false },
    EventTemplate { name: "800m", event_type: EventType::Track, unit: "seconds", max_per_class: 2, has_preliminary: false },
    EventTemplate { name: "1500m", event_type: EventType::Track, unit: "seconds", max_per_class: 2, has_preliminary: false },
    EventTemplate { name: "Long jump", event_type: EventType::Field, unit: "meters", max_per_class: 3, has_preliminary: false },
    EventTemplate { name: "High jump", event_type: EventType::Field, unit: "meters", max_per_class: 2, has_preliminary: false },
    EventTemplate { name: "Shot put", event_type: EventType::Field, unit: "meters", max_per_class: 2, has_preliminary: false },
    EventTemplate { name: "4x100m relay", event_type: EventType::Relay, unit: "seconds", max_per_class: 1, has_preliminary: false },
];

pub fn find_template(name: &str) -> Option<&'static EventTemplate> {
    EVENT_TEMPLATES
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
}
