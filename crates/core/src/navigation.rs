use serde_json::Value;

use crate::schema_model::DataRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    pub attribute: String,
    pub value: Value,
}

impl TableFilter {
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Connect,
    Dashboard,
    Database {
        database: String,
    },
    Table {
        database: String,
        table: String,
        filter: Option<TableFilter>,
    },
    Record {
        database: String,
        table: String,
        record: DataRow,
    },
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    root: Screen,
    rest: Vec<Screen>,
}

impl NavigationStack {
    #[must_use]
    pub fn new(root: Screen) -> Self {
        Self {
            root,
            rest: Vec::new(),
        }
    }

    #[must_use]
    pub fn current(&self) -> &Screen {
        self.rest.last().unwrap_or(&self.root)
    }

    #[must_use]
    pub fn root(&self) -> &Screen {
        &self.root
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.rest.len()
    }

    #[must_use]
    pub fn can_pop(&self) -> bool {
        !self.rest.is_empty()
    }

    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        std::iter::once(&self.root).chain(self.rest.iter())
    }

    pub fn push(&mut self, screen: Screen) {
        self.rest.push(screen);
    }

    pub fn pop(&mut self) -> bool {
        self.rest.pop().is_some()
    }

    pub fn reset(&mut self) {
        self.rest.clear();
    }
}
