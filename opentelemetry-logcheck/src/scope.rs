use crate::value::Dynamic;
use opentelemetry::InstrumentationScope;
use opentelemetry_chanlog::ExportedLog;
use opentelemetry_sdk::logs::SdkLogRecord;
use opentelemetry_sdk::Resource;
use std::borrow::Cow;

/// A named set of attributes that can be scanned lazily, in the order
/// defined by its owner.
pub trait AttributeScope {
    /// Iterates over `(name, raw value)` pairs.
    fn attributes(&self) -> Box<dyn Iterator<Item = (Cow<'_, str>, Dynamic)> + '_>;
}

impl<S: AttributeScope + ?Sized> AttributeScope for &S {
    fn attributes(&self) -> Box<dyn Iterator<Item = (Cow<'_, str>, Dynamic)> + '_> {
        (**self).attributes()
    }
}

impl AttributeScope for [(&str, Dynamic)] {
    fn attributes(&self) -> Box<dyn Iterator<Item = (Cow<'_, str>, Dynamic)> + '_> {
        Box::new(
            self.iter()
                .map(|(name, value)| (Cow::Borrowed(*name), value.clone())),
        )
    }
}

impl<const N: usize> AttributeScope for [(&str, Dynamic); N] {
    fn attributes(&self) -> Box<dyn Iterator<Item = (Cow<'_, str>, Dynamic)> + '_> {
        self.as_slice().attributes()
    }
}

/// The attribute scopes of an exported log.
#[derive(Debug, Clone, Copy)]
pub enum LogScope<'a> {
    /// Attributes of the resource that produced the log.
    Resource(&'a Resource),
    /// Attributes of the instrumentation scope of the logger.
    Instrumentation(&'a InstrumentationScope),
    /// Attributes of the log record itself.
    Record(&'a SdkLogRecord),
}

impl AttributeScope for LogScope<'_> {
    fn attributes(&self) -> Box<dyn Iterator<Item = (Cow<'_, str>, Dynamic)> + '_> {
        match *self {
            LogScope::Resource(resource) => Box::new(
                resource
                    .iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), Dynamic::from(value))),
            ),
            LogScope::Instrumentation(scope) => Box::new(
                scope
                    .attributes()
                    .map(|kv| (Cow::Borrowed(kv.key.as_str()), Dynamic::from(&kv.value))),
            ),
            LogScope::Record(record) => Box::new(
                record
                    .attributes_iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), Dynamic::from(value))),
            ),
        }
    }
}

/// Returns the scopes of `log` in the order attribute predicates are
/// resolved against them: resource, instrumentation scope, record.
pub fn log_scopes(log: &ExportedLog) -> [LogScope<'_>; 3] {
    [
        LogScope::Resource(&log.resource),
        LogScope::Instrumentation(&log.instrumentation),
        LogScope::Record(&log.record),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::KeyValue;

    fn names(scope: &dyn AttributeScope) -> Vec<String> {
        scope.attributes().map(|(name, _)| name.into_owned()).collect()
    }

    #[test]
    fn resource_scope() {
        let resource = Resource::builder_empty()
            .with_attributes([KeyValue::new("service.name", "test")])
            .build();
        let scope = LogScope::Resource(&resource);
        let attributes: Vec<_> = scope.attributes().collect();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].0, "service.name");
        assert_eq!(attributes[0].1, Dynamic::from("test"));
    }

    #[test]
    fn instrumentation_scope() {
        let scope = InstrumentationScope::builder("test")
            .with_attributes([KeyValue::new("a", 1_i64), KeyValue::new("b", true)])
            .build();
        assert_eq!(names(&LogScope::Instrumentation(&scope)), ["a", "b"]);
    }

    #[test]
    fn literal_scopes() {
        let scope = [("foo", Dynamic::from("bar")), ("baz", Dynamic::Nil)];
        assert_eq!(names(&scope), ["foo", "baz"]);
        assert_eq!(names(&&scope[..1]), ["foo"]);
    }
}
