use std::borrow::Cow;

/// Table in the FROM or JOIN part of a query
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    pub name: &'a str,
    pub alias: &'static str,
}

impl<'a> Table<'a> {
    /// Quoted table name with alias
    pub fn qualified(&self) -> String {
        format!("\"{}\" AS \"{}\"", self.name, self.alias)
    }

    pub fn column(&self, name: &'a str) -> Column<'a> {
        Column {
            qualifier: self.alias,
            name,
        }
    }
}

/// Represents one column in the database table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub qualifier: &'static str,
    pub name: &'a str,
}

impl<'a> Column<'a> {
    /// Get qualified column name
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.qualifier, self.name)
    }
}

/// Column reference which can be either borrowed or owned
pub type ColumnRef<'a> = Cow<'a, Column<'a>>;

/// Quotes an unqualified identifier
pub fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_quoted() {
        let table = Table {
            name: "resources",
            alias: "r",
        };

        assert_eq!(table.qualified(), "\"resources\" AS \"r\"");
        assert_eq!(table.column("title").qualified(), "\"r\".\"title\"");
        assert_eq!(quoted("vote_score"), "\"vote_score\"");
    }
}
