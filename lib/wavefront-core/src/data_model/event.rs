//! Events.

use indexmap::IndexMap;

const DETAILS_ANNOTATION: &str = "details";
const TYPE_ANNOTATION: &str = "type";
const SEVERITY_ANNOTATION: &str = "severity";

/// A discrete event, such as a deployment or an alert firing.
///
/// Events span a time range. Passing an end time of zero marks the event as instantaneous, which the encoders turn into
/// a one-millisecond event.
///
/// Start and end times may be given in either seconds or milliseconds since the Unix epoch: the encoders treat any value
/// small enough to be a plausible seconds-resolution timestamp as seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    name: String,
    start_millis: i64,
    end_millis: i64,
    source: String,
    tags: IndexMap<String, String>,
    annotations: IndexMap<String, String>,
}

impl Event {
    /// Creates a new `Event` with the given name and time range.
    pub fn new(name: impl Into<String>, start_millis: i64, end_millis: i64) -> Self {
        Self {
            name: name.into(),
            start_millis,
            end_millis,
            ..Default::default()
        }
    }

    /// Returns the name of the event.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the start time of the event, as given.
    pub fn start_millis(&self) -> i64 {
        self.start_millis
    }

    /// Returns the end time of the event, as given.
    pub fn end_millis(&self) -> i64 {
        self.end_millis
    }

    /// Returns the source (host) of the event.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the tags of the event, in insertion order.
    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    /// Returns the annotations of the event, in insertion order.
    pub fn annotations(&self) -> &IndexMap<String, String> {
        &self.annotations
    }

    /// Sets the name of the event.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the name of the event.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets the start time of the event.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_start_millis(mut self, start_millis: i64) -> Self {
        self.start_millis = start_millis;
        self
    }

    /// Sets the end time of the event.
    ///
    /// Zero marks the event as instantaneous.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_end_millis(mut self, end_millis: i64) -> Self {
        self.end_millis = end_millis;
        self
    }

    /// Sets the source (host) of the event.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the source (host) of the event.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Adds a tag, replacing any existing tag with the same key.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_tag(key, value);
        self
    }

    /// Adds a tag, replacing any existing tag with the same key.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Adds an annotation, replacing any existing annotation with the same key.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_annotation(key, value);
        self
    }

    /// Adds an annotation, replacing any existing annotation with the same key.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(key.into(), value.into());
    }

    /// Sets the `details` annotation.
    pub fn details(self, details: impl Into<String>) -> Self {
        self.annotate(DETAILS_ANNOTATION, details)
    }

    /// Sets the `type` annotation.
    pub fn event_type(self, event_type: impl Into<String>) -> Self {
        self.annotate(TYPE_ANNOTATION, event_type)
    }

    /// Sets the `severity` annotation.
    pub fn severity(self, severity: impl Into<String>) -> Self {
        self.annotate(SEVERITY_ANNOTATION, severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_steps_apply_in_order() {
        let event = Event::new("deploy", 1533531013, 0)
            .with_source("web01")
            .details("rolled out v2")
            .severity("info")
            .event_type("deployment")
            .severity("warn")
            .with_tag("env", "prod");

        assert_eq!(event.name(), "deploy");
        assert_eq!(event.source(), "web01");

        let annotations = event.annotations().iter().collect::<Vec<_>>();
        assert_eq!(
            annotations,
            vec![
                (&"details".to_string(), &"rolled out v2".to_string()),
                (&"severity".to_string(), &"warn".to_string()),
                (&"type".to_string(), &"deployment".to_string()),
            ]
        );
        assert_eq!(event.tags().get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn setters_mutate_in_place() {
        let mut event = Event::new("old", 1, 2);
        event.set_name("new");
        event.set_source("db01");
        event.set_annotation("custom", "value");

        assert_eq!(event.name(), "new");
        assert_eq!(event.source(), "db01");
        assert_eq!(event.annotations().len(), 1);
        assert_eq!(event.start_millis(), 1);
        assert_eq!(event.end_millis(), 2);
    }
}
