use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equals,
    NotEqual,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Between,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    #[serde(rename = "search_attribute")]
    pub attribute: String,
    #[serde(rename = "search_type")]
    pub comparator: Comparator,
    #[serde(rename = "search_value")]
    pub value: Value,
}

impl Condition {
    #[must_use]
    pub fn new(attribute: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            comparator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionGroup {
    pub operator: GroupOperator,
    pub conditions: Vec<ConditionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Condition(Condition),
    Group(ConditionGroup),
}

impl From<Condition> for ConditionNode {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

impl From<ConditionGroup> for ConditionNode {
    fn from(group: ConditionGroup) -> Self {
        Self::Group(group)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub attribute: String,
    pub descending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<SortSpec>>,
}

impl SortSpec {
    #[must_use]
    pub fn new(attribute: impl Into<String>, descending: bool) -> Self {
        Self {
            attribute: attribute.into(),
            descending,
            next: None,
        }
    }

    #[must_use]
    pub fn with_next(mut self, next: SortSpec) -> Self {
        self.next = Some(Box::new(next));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchOptions {
    pub operator: Option<GroupOperator>,
    pub sort: Option<SortSpec>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub attributes: Option<Vec<String>>,
}

impl SearchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageOptions {
    pub attributes: Option<Vec<String>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn window(limit: u64, offset: u64) -> Self {
        Self {
            attributes: None,
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    DescribeAll,
    SearchById {
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
        table: String,
        ids: Vec<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        get_attributes: Option<Vec<String>>,
    },
    SearchByValue {
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
        table: String,
        search_attribute: String,
        search_value: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        get_attributes: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
    },
    SearchByConditions {
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
        table: String,
        conditions: Vec<ConditionNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        operator: Option<GroupOperator>,
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sort: Option<SortSpec>,
        #[serde(skip_serializing_if = "Option::is_none")]
        get_attributes: Option<Vec<String>>,
    },
    SystemInformation {
        #[serde(skip_serializing_if = "Option::is_none")]
        attributes: Option<Vec<String>>,
    },
}

impl OperationRequest {
    #[must_use]
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::DescribeAll => "describe_all",
            Self::SearchById { .. } => "search_by_id",
            Self::SearchByValue { .. } => "search_by_value",
            Self::SearchByConditions { .. } => "search_by_conditions",
            Self::SystemInformation { .. } => "system_information",
        }
    }
}
