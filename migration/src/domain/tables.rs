use hub_common::{
    APPROVED_FIELD_NAME, CATEGORIES_TABLE, CATEGORY_ID_FIELD_NAME, CATEGORY_NAME_MAX_CHARS,
    CREATED_FIELD_NAME, DESCRIPTION_FIELD_NAME, ID_FIELD_NAME, NAME_FIELD_NAME,
    RESOURCE_ID_FIELD_NAME, RESOURCE_TAGS_TABLE, RESOURCE_TITLE_MAX_CHARS,
    RESOURCE_TYPE_FIELD_NAME, RESOURCES_TABLE, ResourceStatus, ResourceType, STATUS_FIELD_NAME,
    SUBMITTED_BY_FIELD_NAME, TAG_ID_FIELD_NAME, TAG_NAME_MAX_CHARS, TAGS_TABLE, TITLE_FIELD_NAME,
    URL_FIELD_NAME, VOTE_SCORE_FIELD_NAME,
};

/// Represents table in a database, used for ddl generation
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub checks: Vec<CheckConstraint>,
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    pub indexes: Vec<Index>,
}

/// Represents one column in the database table
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub column_type: String,
    pub not_null: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

/// Column value must be one of a closed list of text values
#[derive(Debug, Clone)]
pub struct CheckConstraint {
    pub column_name: String,
    pub allowed_values: Vec<&'static str>,
}

/// What happens to referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
    Restrict,
}

impl OnDelete {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

/// Represents foreign key constraint in the database table
#[derive(Debug, Clone)]
pub struct ForeignKeyConstraint {
    pub table_name: String,
    pub column_name: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
    pub on_delete: OnDelete,
}

/// Represents an index in the database table
#[derive(Debug, Clone)]
pub struct Index {
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Table {
    pub fn new<T: Into<String>>(name: T, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            checks: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn check(mut self, check: CheckConstraint) -> Self {
        self.checks.push(check);
        self
    }

    pub fn foreign_key<T: Into<String>>(
        mut self,
        column_name: T,
        referenced_table_name: T,
        on_delete: OnDelete,
    ) -> Self {
        let foreign_key = ForeignKeyConstraint {
            table_name: self.name.clone(),
            column_name: column_name.into(),
            referenced_table_name: referenced_table_name.into(),
            referenced_column_name: ID_FIELD_NAME.to_string(),
            on_delete,
        };
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn index(mut self, columns: Vec<&str>) -> Self {
        let index = Index {
            table_name: self.name.clone(),
            columns: columns.into_iter().map(str::to_string).collect(),
            unique: false,
        };
        self.indexes.push(index);
        self
    }
}

impl Column {
    pub fn new<T: Into<String>>(name: T, column_type: T) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            not_null: false,
            unique: false,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key<T: Into<String>>(name: T, column_type: T) -> Self {
        Self {
            primary_key: true,
            ..Self::new(name, column_type)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

impl CheckConstraint {
    pub fn one_of<T: Into<String>>(column_name: T, allowed_values: Vec<&'static str>) -> Self {
        Self {
            column_name: column_name.into(),
            allowed_values,
        }
    }
}

fn created_at() -> Column {
    Column::new(CREATED_FIELD_NAME, "TIMESTAMPTZ")
        .not_null()
        .default_value("now()")
}

/// Tables of the resource directory, ordered so that every referenced table
/// is created before the tables pointing at it.
pub fn directory_tables() -> Vec<Table> {
    let categories = Table::new(
        CATEGORIES_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, "BIGSERIAL"),
            Column::new(NAME_FIELD_NAME.to_string(), format!("VARCHAR({})", CATEGORY_NAME_MAX_CHARS))
                .not_null()
                .unique(),
            Column::new(DESCRIPTION_FIELD_NAME, "TEXT"),
            created_at(),
        ],
    );

    let tags = Table::new(
        TAGS_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, "BIGSERIAL"),
            Column::new(NAME_FIELD_NAME.to_string(), format!("VARCHAR({})", TAG_NAME_MAX_CHARS))
                .not_null()
                .unique(),
            created_at(),
        ],
    );

    let resource_types = ResourceType::ALL.iter().map(ResourceType::as_str).collect();
    let statuses = ResourceStatus::ALL.iter().map(ResourceStatus::as_str).collect();

    // Deleting a category leaves its resources in place, uncategorised.
    let resources = Table::new(
        RESOURCES_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, "BIGSERIAL"),
            Column::new(TITLE_FIELD_NAME.to_string(), format!("VARCHAR({})", RESOURCE_TITLE_MAX_CHARS))
                .not_null(),
            Column::new(DESCRIPTION_FIELD_NAME, "TEXT"),
            Column::new(URL_FIELD_NAME, "TEXT"),
            Column::new(RESOURCE_TYPE_FIELD_NAME, "VARCHAR(20)").not_null(),
            Column::new(CATEGORY_ID_FIELD_NAME, "BIGINT"),
            Column::new(STATUS_FIELD_NAME, "VARCHAR(20)")
                .not_null()
                .default_value(format!("'{}'", ResourceStatus::Pending)),
            Column::new(VOTE_SCORE_FIELD_NAME, "INTEGER")
                .not_null()
                .default_value("0"),
            Column::new(SUBMITTED_BY_FIELD_NAME, "VARCHAR(255)"),
            created_at(),
            Column::new(APPROVED_FIELD_NAME, "TIMESTAMPTZ"),
        ],
    )
    .check(CheckConstraint::one_of(RESOURCE_TYPE_FIELD_NAME, resource_types))
    .check(CheckConstraint::one_of(STATUS_FIELD_NAME, statuses))
    .foreign_key(CATEGORY_ID_FIELD_NAME, CATEGORIES_TABLE, OnDelete::SetNull)
    .index(vec![STATUS_FIELD_NAME])
    .index(vec![CREATED_FIELD_NAME])
    .index(vec![CATEGORY_ID_FIELD_NAME]);

    let resource_tags = Table::new(
        RESOURCE_TAGS_TABLE,
        vec![
            Column::primary_key(RESOURCE_ID_FIELD_NAME, "BIGINT"),
            Column::primary_key(TAG_ID_FIELD_NAME, "BIGINT"),
        ],
    )
    .foreign_key(RESOURCE_ID_FIELD_NAME, RESOURCES_TABLE, OnDelete::Cascade)
    .foreign_key(TAG_ID_FIELD_NAME, TAGS_TABLE, OnDelete::Cascade)
    .index(vec![TAG_ID_FIELD_NAME]);

    vec![categories, tags, resources, resource_tags]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table<'a>(tables: &'a [Table], name: &str) -> &'a Table {
        tables.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn referenced_tables_come_first() {
        let tables = directory_tables();
        let position = |name: &str| tables.iter().position(|t| t.name == name).unwrap();

        for t in tables.iter() {
            for fk in t.foreign_keys.iter() {
                assert!(position(&fk.referenced_table_name) < position(&t.name));
            }
        }
    }

    #[test]
    fn association_has_composite_key_and_cascades() {
        let tables = directory_tables();
        let resource_tags = table(&tables, RESOURCE_TAGS_TABLE);

        let keys: Vec<_> = resource_tags
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(keys, vec![RESOURCE_ID_FIELD_NAME, TAG_ID_FIELD_NAME]);
        assert!(resource_tags
            .foreign_keys
            .iter()
            .all(|fk| fk.on_delete == OnDelete::Cascade));
    }

    #[test]
    fn resources_constrain_type_and_status() {
        let tables = directory_tables();
        let resources = table(&tables, RESOURCES_TABLE);

        let status = resources
            .checks
            .iter()
            .find(|c| c.column_name == STATUS_FIELD_NAME)
            .unwrap();
        assert_eq!(status.allowed_values, vec!["pending", "approved", "rejected"]);

        let kinds = resources
            .checks
            .iter()
            .find(|c| c.column_name == RESOURCE_TYPE_FIELD_NAME)
            .unwrap();
        assert_eq!(kinds.allowed_values.len(), 9);
        assert!(kinds.allowed_values.contains(&"tv_series"));

        let category = &resources.foreign_keys[0];
        assert_eq!(category.on_delete, OnDelete::SetNull);
    }
}
