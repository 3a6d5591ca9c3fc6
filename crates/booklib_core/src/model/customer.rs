//! Customer domain model.
//!
//! # Responsibility
//! - Define the canonical library customer record.
//! - Own field-level validation rules shared by constructors, the serde
//!   boundary and repository write paths.
//!
//! # Invariants
//! - `id` is assigned by the store only; a record built in memory is
//!   transient until committed.
//! - Text fields are non-blank and bounded by their column widths.
//! - `age` stays within `AGE_MIN..=AGE_MAX`.
//! - Field content is never interpreted; SQL or markup text is plain data.

use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key.
pub type CustomerId = i64;

pub const NAME_MAX_CHARS: usize = 64;
pub const CITY_MAX_CHARS: usize = 64;
pub const PESEL_MAX_CHARS: usize = 64;
pub const STREET_MAX_CHARS: usize = 128;
pub const APP_NO_MAX_CHARS: usize = 10;
pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 150;

/// Addressable customer field, used by validation errors and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Name,
    City,
    Age,
    Pesel,
    Street,
    AppNo,
}

impl CustomerField {
    pub const ALL: [CustomerField; 6] = [
        CustomerField::Name,
        CustomerField::City,
        CustomerField::Age,
        CustomerField::Pesel,
        CustomerField::Street,
        CustomerField::AppNo,
    ];

    /// Column name in the `customers` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Age => "age",
            Self::Pesel => "pesel",
            Self::Street => "street",
            Self::AppNo => "app_no",
        }
    }

    /// Field name on the serialized wire shape.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::AppNo => "appNo",
            other => other.column(),
        }
    }

    /// Parses a wire or column name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == value || field.column() == value)
    }

    fn max_chars(self) -> Option<usize> {
        match self {
            Self::Name => Some(NAME_MAX_CHARS),
            Self::City => Some(CITY_MAX_CHARS),
            Self::Age => None,
            Self::Pesel => Some(PESEL_MAX_CHARS),
            Self::Street => Some(STREET_MAX_CHARS),
            Self::AppNo => Some(APP_NO_MAX_CHARS),
        }
    }
}

impl Display for CustomerField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Validation failure for customer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerValidationError {
    BlankField(CustomerField),
    FieldTooLong {
        field: CustomerField,
        max_chars: usize,
        actual_chars: usize,
    },
    AgeOutOfRange {
        age: i64,
    },
}

impl CustomerValidationError {
    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankField(_) => "blank_field",
            Self::FieldTooLong { .. } => "field_too_long",
            Self::AgeOutOfRange { .. } => "age_out_of_range",
        }
    }
}

impl Display for CustomerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} exceeds {max_chars} characters (got {actual_chars})"
            ),
            Self::AgeOutOfRange { age } => {
                write!(f, "age ({age}) must be within {AGE_MIN}..={AGE_MAX}")
            }
        }
    }
}

impl Error for CustomerValidationError {}

/// One library customer.
///
/// Serialized with `appNo` as the application-number key. Deserialization
/// goes through [`CustomerDraft`] and always yields a transient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerDraft")]
pub struct Customer {
    id: Option<CustomerId>,
    pub name: String,
    pub city: String,
    pub age: i64,
    pub pesel: String,
    pub street: String,
    #[serde(rename = "appNo")]
    pub app_no: String,
}

/// Wire input for a customer that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub city: String,
    pub age: i64,
    pub pesel: String,
    pub street: String,
    #[serde(rename = "appNo")]
    pub app_no: String,
}

impl TryFrom<CustomerDraft> for Customer {
    type Error = CustomerValidationError;

    fn try_from(draft: CustomerDraft) -> Result<Self, Self::Error> {
        Customer::new(
            draft.name,
            draft.city,
            draft.age,
            draft.pesel,
            draft.street,
            draft.app_no,
        )
    }
}

impl Customer {
    /// Builds a transient customer from all six required values.
    ///
    /// Emits one `customer_new` debug event with field sizes only.
    ///
    /// # Errors
    /// - Any text field is blank or longer than its column width.
    /// - `age` is outside `AGE_MIN..=AGE_MAX`.
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        age: i64,
        pesel: impl Into<String>,
        street: impl Into<String>,
        app_no: impl Into<String>,
    ) -> Result<Self, CustomerValidationError> {
        let customer = Self {
            id: None,
            name: name.into(),
            city: city.into(),
            age,
            pesel: pesel.into(),
            street: street.into(),
            app_no: app_no.into(),
        };

        if let Err(err) = customer.validate() {
            debug!(
                "event=customer_new module=model status=rejected error_code={} error={}",
                err.code(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=customer_new module=model status=ok name_chars={} city_chars={} age={} pesel_chars={} street_chars={} app_no_chars={}",
            customer.name.chars().count(),
            customer.city.chars().count(),
            customer.age,
            customer.pesel.chars().count(),
            customer.street.chars().count(),
            customer.app_no.chars().count()
        );
        Ok(customer)
    }

    /// Rebuilds a stored record from its row values.
    ///
    /// Persisted rows are re-validated so corrupt data is reported, not masked.
    pub(crate) fn from_stored(
        id: CustomerId,
        draft: CustomerDraft,
    ) -> Result<Self, CustomerValidationError> {
        let customer = Self {
            id: Some(id),
            name: draft.name,
            city: draft.city,
            age: draft.age,
            pesel: draft.pesel,
            street: draft.street,
            app_no: draft.app_no,
        };
        customer.validate()?;
        Ok(customer)
    }

    /// Marks a freshly inserted record with its store-assigned id.
    pub(crate) fn with_assigned_id(mut self, id: CustomerId) -> Self {
        self.id = Some(id);
        self
    }

    /// Store-assigned id, `None` while the record is transient.
    pub fn id(&self) -> Option<CustomerId> {
        self.id
    }

    /// Whether this record has been committed to a store.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks every field against the customer rules.
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        validate_text(CustomerField::Name, &self.name)?;
        validate_text(CustomerField::City, &self.city)?;
        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            return Err(CustomerValidationError::AgeOutOfRange { age: self.age });
        }
        validate_text(CustomerField::Pesel, &self.pesel)?;
        validate_text(CustomerField::Street, &self.street)?;
        validate_text(CustomerField::AppNo, &self.app_no)?;
        Ok(())
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(
            f,
            "Customer(ID: {id}, Name: {}, City: {}, Age: {}, Pesel: {}, Street: {}, AppNo: {})",
            self.name, self.city, self.age, self.pesel, self.street, self.app_no
        )
    }
}

fn validate_text(field: CustomerField, value: &str) -> Result<(), CustomerValidationError> {
    if value.trim().is_empty() {
        return Err(CustomerValidationError::BlankField(field));
    }

    if let Some(max_chars) = field.max_chars() {
        let actual_chars = value.chars().count();
        if actual_chars > max_chars {
            return Err(CustomerValidationError::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            });
        }
    }

    Ok(())
}
