use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to another record as returned by the store.
///
/// Lookup fields come back either as the bare id or as an object carrying the
/// id and the display name of the referenced record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordRef {
    Id(i64),
    Lookup {
        #[serde(rename = "Id")]
        id: i64,
        #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl RecordRef {
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Lookup { id, .. } => *id,
        }
    }
}

impl From<i64> for RecordRef {
    fn from(value: i64) -> Self {
        Self::Id(value)
    }
}

/// Update payload: the record id plus the fields to write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Update<T> {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: T,
}

pub mod query {
    use super::*;

    /// Parameters of a fetch (and get-by-id) request.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct FetchParams {
        pub fields: Vec<FieldSpec>,
        #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
        pub conditions: Vec<Condition>,
        #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
        pub order_by: Vec<OrderBy>,
        #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
        pub paging: Option<Paging>,
    }

    impl FetchParams {
        /// Select the given field names.
        pub fn fields(names: &[&str]) -> Self {
            Self {
                fields: names.iter().map(|name| FieldSpec::new(name)).collect(),
                ..Default::default()
            }
        }

        pub fn filter(mut self, condition: Condition) -> Self {
            self.conditions.push(condition);
            self
        }

        pub fn order_by(mut self, field_name: &str, sort: SortType) -> Self {
            self.order_by.push(OrderBy {
                field_name: field_name.to_string(),
                sort,
            });
            self
        }

        pub fn paging(mut self, limit: u64, offset: u64) -> Self {
            self.paging = Some(Paging { limit, offset });
            self
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldSpec {
        pub field: FieldName,
    }

    impl FieldSpec {
        pub fn new(name: &str) -> Self {
            Self {
                field: FieldName {
                    name: name.to_string(),
                },
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldName {
        #[serde(rename = "Name")]
        pub name: String,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Operator {
        EqualTo,
        GreaterThanOrEqualTo,
        LessThanOrEqualTo,
        ExactMatch,
    }

    /// Refines `ExactMatch` on date fields.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum SubOperator {
        Day,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Condition {
        #[serde(rename = "FieldName")]
        pub field_name: String,
        #[serde(rename = "Operator")]
        pub operator: Operator,
        #[serde(rename = "SubOperator", default, skip_serializing_if = "Option::is_none")]
        pub sub_operator: Option<SubOperator>,
        #[serde(rename = "Values")]
        pub values: Vec<Value>,
    }

    impl Condition {
        pub fn new(field_name: &str, operator: Operator, value: Value) -> Self {
            Self {
                field_name: field_name.to_string(),
                operator,
                sub_operator: None,
                values: vec![value],
            }
        }

        pub fn equal_to(field_name: &str, value: impl Into<Value>) -> Self {
            Self::new(field_name, Operator::EqualTo, value.into())
        }

        /// Match a date field on the calendar day of `day` (`YYYY-MM-DD`).
        pub fn same_day(field_name: &str, day: &str) -> Self {
            Self {
                sub_operator: Some(SubOperator::Day),
                ..Self::new(field_name, Operator::ExactMatch, Value::from(day))
            }
        }
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum SortType {
        #[default]
        Asc,
        Desc,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OrderBy {
        #[serde(rename = "fieldName")]
        pub field_name: String,
        #[serde(rename = "sorttype")]
        pub sort: SortType,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Paging {
        pub limit: u64,
        pub offset: u64,
    }
}

pub mod response {
    use super::*;

    /// Envelope of fetch and get-by-id responses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Envelope<T> {
        pub success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        #[serde(default = "Option::default")]
        pub data: Option<T>,
    }

    /// Envelope of create/update/delete responses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WriteResponse<T> {
        pub success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        #[serde(default = "Option::default")]
        pub results: Option<Vec<RecordResult<T>>>,
    }

    /// Outcome for one record of a write request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordResult<T> {
        pub success: bool,
        #[serde(default = "Option::default")]
        pub data: Option<T>,
        #[serde(default)]
        pub errors: Vec<FieldError>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }

    impl<T> RecordResult<T> {
        pub fn ok(data: T) -> Self {
            Self {
                success: true,
                data: Some(data),
                errors: Vec::new(),
                message: None,
            }
        }

        pub fn failed(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
            Self {
                success: false,
                data: None,
                errors,
                message: Some(message.into()),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldError {
        #[serde(rename = "fieldLabel")]
        pub field_label: String,
        pub message: String,
    }

    /// Body of create and update requests. `T` is the record sequence,
    /// borrowed when sending and owned when receiving.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WriteRequest<T> {
        pub records: T,
    }

    /// Body of delete requests.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteRequest {
        #[serde(rename = "RecordIds")]
        pub record_ids: Vec<i64>,
    }
}

pub mod crop {
    use super::*;

    pub const TABLE: &str = "crop";

    pub const FIELDS: &[&str] = &[
        "Name",
        "variety",
        "field_location",
        "planting_date",
        "expected_harvest_date",
        "status",
        "farm_id",
    ];

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Crop {
        #[serde(rename = "Id")]
        pub id: i64,
        #[serde(rename = "Name", default)]
        pub name: Option<String>,
        #[serde(default)]
        pub variety: Option<String>,
        #[serde(default)]
        pub field_location: Option<String>,
        #[serde(default)]
        pub planting_date: Option<String>,
        #[serde(default)]
        pub expected_harvest_date: Option<String>,
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub farm_id: Option<RecordRef>,
    }

    /// Writable crop fields.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CropFields {
        #[serde(rename = "Name")]
        pub name: String,
        pub variety: Option<String>,
        pub field_location: Option<String>,
        pub planting_date: Option<String>,
        pub expected_harvest_date: Option<String>,
        pub status: Option<String>,
        pub farm_id: i64,
    }
}

pub mod expense {
    use super::*;

    pub const TABLE: &str = "expense";

    pub const FIELDS: &[&str] = &["Name", "farm_id", "amount", "category", "description", "date"];

    /// Expense row as stored.
    ///
    /// `amount`, `category` and `date` are kept as raw JSON so that a
    /// malformed value surfaces as a validation error in the engine instead
    /// of failing the whole fetch.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        #[serde(rename = "Id")]
        pub id: i64,
        #[serde(rename = "Name", default)]
        pub name: Option<String>,
        #[serde(default)]
        pub farm_id: Option<RecordRef>,
        #[serde(default)]
        pub amount: Option<Value>,
        #[serde(default)]
        pub category: Option<Value>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub date: Option<Value>,
    }

    /// Writable expense fields.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseFields {
        #[serde(rename = "Name")]
        pub name: String,
        pub farm_id: i64,
        pub amount: f64,
        pub category: String,
        pub description: String,
        pub date: String,
    }
}

pub mod task {
    use super::*;

    pub const TABLE: &str = "task";

    pub const FIELDS: &[&str] = &[
        "title",
        "description",
        "due_date",
        "priority",
        "completed",
        "farm_id",
        "crop_id",
    ];

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Task {
        #[serde(rename = "Id")]
        pub id: i64,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub due_date: Option<String>,
        #[serde(default)]
        pub priority: Option<String>,
        #[serde(default)]
        pub completed: Option<bool>,
        #[serde(default)]
        pub farm_id: Option<RecordRef>,
        #[serde(default)]
        pub crop_id: Option<RecordRef>,
    }

    /// Writable task fields.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TaskFields {
        pub title: String,
        pub description: Option<String>,
        pub due_date: String,
        pub priority: Option<String>,
        pub completed: bool,
        pub farm_id: i64,
        pub crop_id: Option<i64>,
    }
}

pub mod weather {
    use super::*;

    pub const TABLE: &str = "weather";

    pub const FIELDS: &[&str] = &[
        "date",
        "high",
        "low",
        "condition",
        "precipitation",
        "humidity",
        "wind_speed",
    ];

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Weather {
        #[serde(rename = "Id")]
        pub id: i64,
        #[serde(default)]
        pub date: Option<String>,
        #[serde(default)]
        pub high: Option<f64>,
        #[serde(default)]
        pub low: Option<f64>,
        #[serde(default)]
        pub condition: Option<String>,
        #[serde(default)]
        pub precipitation: Option<f64>,
        #[serde(default)]
        pub humidity: Option<f64>,
        #[serde(default)]
        pub wind_speed: Option<f64>,
    }
}
