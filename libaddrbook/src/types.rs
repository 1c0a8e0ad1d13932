//! Core data types for Addrbook

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AddrbookError, Result};

/// Server-assigned address identifier
pub type AddressId = i64;

/// A postal address as stored by the remote service
///
/// Addresses are only ever produced by the service (list or create
/// responses); the client has no way to mint an `id` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Second display line: `"city, state zip"`
    pub fn locality(&self) -> String {
        format!("{}, {} {}", self.city, self.state, self.zip)
    }

    /// True when the record carries exactly the fields of `draft`
    pub fn matches_draft(&self, draft: &AddressDraft) -> bool {
        self.name == draft.name
            && self.street == draft.street
            && self.city == draft.city
            && self.state == draft.state
            && self.zip == draft.zip
    }
}

/// Unsaved address input, the request body of a create call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDraft {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressDraft {
    /// Read a single field
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::Name => &self.name,
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Zip => &self.zip,
        }
    }

    /// Replace a single field, leaving the others untouched
    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AddressField::Name => self.name = value,
            AddressField::Street => self.street = value,
            AddressField::City => self.city = value,
            AddressField::State => self.state = value,
            AddressField::Zip => self.zip = value,
        }
    }

    /// Fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<AddressField> {
        AddressField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// All five fields carry a value
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fail with `InvalidInput` naming the empty fields
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
        Err(AddrbookError::InvalidInput(format!(
            "Missing required fields: {}",
            labels.join(", ")
        )))
    }

    /// No field carries a value
    pub fn is_empty(&self) -> bool {
        AddressField::ALL
            .into_iter()
            .all(|field| self.get(field).is_empty())
    }
}

/// The five user-editable address fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressField {
    Name,
    Street,
    City,
    State,
    Zip,
}

impl AddressField {
    /// Fields in form order
    pub const ALL: [AddressField; 5] = [
        AddressField::Name,
        AddressField::Street,
        AddressField::City,
        AddressField::State,
        AddressField::Zip,
    ];

    /// Wire name of the field
    pub fn key(self) -> &'static str {
        match self {
            AddressField::Name => "name",
            AddressField::Street => "street",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::Zip => "zip",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            AddressField::Name => "Full Name",
            AddressField::Street => "Street Address",
            AddressField::City => "City",
            AddressField::State => "State",
            AddressField::Zip => "ZIP Code",
        }
    }

    /// Example input shown while the field is empty
    pub fn placeholder(self) -> &'static str {
        match self {
            AddressField::Name => "John Doe",
            AddressField::Street => "123 Main St",
            AddressField::City => "New York",
            AddressField::State => "NY",
            AddressField::Zip => "10001",
        }
    }

    /// Next field in form order, `None` after the last one
    pub fn next(self) -> Option<AddressField> {
        let pos = Self::ALL.iter().position(|f| *f == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    /// Previous field in form order, `None` before the first one
    pub fn prev(self) -> Option<AddressField> {
        let pos = Self::ALL.iter().position(|f| *f == self)?;
        pos.checked_sub(1).map(|p| Self::ALL[p])
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
