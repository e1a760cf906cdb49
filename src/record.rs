use crate::Price;

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Named plot values for one bar, as handed to a chart renderer.
///
/// Every field the indicator plots is present, in a fixed order. A `None`
/// value is a gap: the renderer must not draw it, interpolate it, or treat
/// it as zero. Serializes to a map with `null` for gaps.
///
/// ```
/// use quantedge_sessions::{Ib, IbConfig, Record};
///
/// let ib = Ib::new(IbConfig::default());
/// let record = ib.record();
///
/// assert_eq!(record.len(), 6);
/// assert!(record.contains("ibHigh"));
/// assert_eq!(record.get("ibHigh"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Option<Price>)>,
    color: Option<&'static str>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            color: None,
        }
    }

    #[must_use]
    pub(crate) fn with(mut self, name: &'static str, value: Option<Price>) -> Self {
        self.fields.push((name, value));
        self
    }

    #[must_use]
    pub(crate) fn with_color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    /// Value of `name`, or `None` if it is a gap or not a field of this
    /// record.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Price> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| *value)
    }

    /// Whether `name` is a field of this record, gap or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }

    /// Fields in plot order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<Price>)> + '_ {
        self.fields.iter().copied()
    }

    /// Color tag, for records that carry one.
    #[must_use]
    pub fn color(&self) -> Option<&'static str> {
        self.color
    }

    /// Number of fields, gaps included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.fields.len() + usize::from(self.color.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if let Some(color) = self.color {
            map.serialize_entry("color", color)?;
        }
        map.end()
    }
}
