//! Type code to record factory lookup.
//!
//! During import the leading tag of each line selects the layout of the
//! record it belongs to. The registry maps that code to a function that
//! builds a blank record of the right shape.

use std::collections::HashMap;
use std::fmt;

use crate::config::Config;
use crate::error::Result;
use crate::layout::RecordLayout;
use crate::record::Record;
use crate::standard;

/// Builds a blank record for one record type.
pub type Factory = Box<dyn Fn(&Config) -> Result<Record> + Send + Sync>;

/// Map from record type code to factory.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<u16, Factory>,
}

impl Registry {
    /// An empty registry; every record type is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing the header (0001) and trailer (9999) records.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(standard::HEADER, standard::header);
        registry.register(standard::TRAILER, standard::trailer);
        registry
    }

    /// Registers `factory` for `record_type`, replacing an earlier one.
    pub fn register<F>(&mut self, record_type: u16, factory: F)
    where
        F: Fn(&Config) -> Result<Record> + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(record_type, Box::new(factory))
            .is_some()
        {
            tracing::debug!(record_type, "replacing registered layout");
        }
    }

    /// Registers a parsed layout definition.
    pub fn register_layout(&mut self, layout: RecordLayout) {
        let record_type = layout.record_type;
        self.register(record_type, move |config| layout.build(config));
    }

    /// Registers a parsed layout after building it once with `config`, so
    /// overlapping or malformed fields fail here instead of on import.
    pub fn register_layout_checked(&mut self, layout: RecordLayout, config: &Config) -> Result<()> {
        layout.build(config)?;
        self.register_layout(layout);
        Ok(())
    }

    pub fn contains(&self, record_type: u16) -> bool {
        self.factories.contains_key(&record_type)
    }

    pub fn lookup(&self, record_type: u16) -> Option<&Factory> {
        self.factories.get(&record_type)
    }

    /// Builds a blank record, or `None` if the type is not registered.
    pub fn build(&self, record_type: u16, config: &Config) -> Option<Result<Record>> {
        self.lookup(record_type).map(|factory| factory(config))
    }

    /// Registered type codes in ascending order.
    pub fn record_types(&self) -> Vec<u16> {
        let mut types: Vec<u16> = self.factories.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("record_types", &self.record_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard();
        assert_eq!(registry.record_types(), vec![1, 9999]);
        let header = registry.build(1, &Config::default()).unwrap().unwrap();
        assert_eq!(header.record_type(), 1);
        assert!(header.contains(standard::ORG_NUMBER));
        assert!(registry.build(100, &Config::default()).is_none());
    }

    #[test]
    fn test_register_closure() {
        let mut registry = Registry::new();
        registry.register(100, |config| {
            let mut record = Record::new(100, config)?;
            record.add(Field::alphanumeric("Name1", 44, 30))?;
            Ok(record)
        });
        assert!(registry.contains(100));
        let record = registry.build(100, &Config::default()).unwrap().unwrap();
        assert!(record.contains("Name1"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        registry.register(100, |config| Record::new(100, config));
        registry.register(100, |config| Record::with_segments(100, 2, config));
        let record = registry.build(100, &Config::default()).unwrap().unwrap();
        assert_eq!(record.segment_count(), 2);
    }

    #[test]
    fn test_register_layout_checked() {
        let config = Config::default();
        let mut registry = Registry::new();
        let layouts = crate::layout::parse_layouts(
            "RECORD 0100\n| ALPHA \"Name1\" 44,30\nRECORD 0200\n| ALPHA \"Name1\" 44,30\n| ALPHA \"Bumm\" 50,4",
        )
        .unwrap();
        let mut layouts = layouts.into_iter();

        registry
            .register_layout_checked(layouts.next().unwrap(), &config)
            .unwrap();
        assert!(registry.contains(100));

        let err = registry
            .register_layout_checked(layouts.next().unwrap(), &config)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Overlap { .. }));
        assert!(!registry.contains(200));
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
