use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

/// Embed accent colour as a 24-bit RGB integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[display("#{_0:06X}")]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Critical alerts
    pub const RED: Self = Self(0xE74C3C);
    /// Recoveries and confirmations
    pub const GREEN: Self = Self(0x2ECC71);
    /// Warnings
    pub const ORANGE: Self = Self(0xE67E22);
    /// Informational
    pub const BLUE: Self = Self(0x3498DB);
    /// Lookup failures
    pub const DARK_RED: Self = Self(0x992D22);
    /// Upgrades
    pub const GOLD: Self = Self(0xF1C40F);
    /// Governance
    pub const PURPLE: Self = Self(0x9B59B6);
}

/// A titled value inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field label
    pub name: String,
    /// Field body
    pub value: String,
    /// Whether the field may share a row with its neighbours
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Footer {
    text: String,
}

/// Structured chat message, serialised as a Discord embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: Color,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Start a message with a title and accent colour.
    pub fn new(title: impl Into<String>, color: Color) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
            timestamp: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field { name: name.into(), value: value.into(), inline });
        self
    }

    /// Set the footer text.
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(Footer { text: text.into() });
        self
    }

    /// Set the timestamp.
    pub const fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Replace the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description, if set
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Accent colour
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Value of the first field called `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}
