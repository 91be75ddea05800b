//! SQL dialects and their DDL strategy tables.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::ast::BaseType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported dialect: {0} (expected mysql, mariadb, postgresql or h2)")]
pub struct UnsupportedDialect(pub String);

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// MySQL 8
    #[default]
    MySQL,
    /// MariaDB
    MariaDB,
    /// PostgreSQL
    PostgreSQL,
    /// H2 in MySQL compatibility mode
    H2,
}

/// How a dialect spells an auto-increment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    /// Keep the declared type, append the keyword.
    Modifier(&'static str),
    /// Replace the declared type with a serial pseudo-type.
    Serial {
        int: &'static str,
        bigint: &'static str,
    },
}

/// Everything the emitter needs to know about one dialect.
#[derive(Debug)]
pub struct DialectSpec {
    pub name: &'static str,
    pub orm_dialect: &'static str,
    pub auto_increment: AutoIncrement,
    /// Applied only when the column carries no length or precision.
    pub substitutions: &'static [(BaseType, &'static str)],
    /// `ON UPDATE <expr>` allowed in a column clause
    pub column_on_update: bool,
}

static MYSQL: DialectSpec = DialectSpec {
    name: "mysql",
    orm_dialect: "org.hibernate.dialect.MySQL8Dialect",
    auto_increment: AutoIncrement::Modifier("AUTO_INCREMENT"),
    substitutions: &[],
    column_on_update: true,
};

static MARIADB: DialectSpec = DialectSpec {
    name: "mariadb",
    orm_dialect: "org.hibernate.dialect.MariaDBDialect",
    auto_increment: AutoIncrement::Modifier("AUTO_INCREMENT"),
    substitutions: &[],
    column_on_update: true,
};

static POSTGRESQL: DialectSpec = DialectSpec {
    name: "postgresql",
    orm_dialect: "org.hibernate.dialect.PostgreSQLDialect",
    auto_increment: AutoIncrement::Serial {
        int: "SERIAL",
        bigint: "BIGSERIAL",
    },
    substitutions: &[
        (BaseType::LongText, "TEXT"),
        (BaseType::DateTime, "TIMESTAMP"),
    ],
    column_on_update: false,
};

static H2: DialectSpec = DialectSpec {
    name: "h2",
    orm_dialect: "org.hibernate.dialect.H2Dialect",
    auto_increment: AutoIncrement::Modifier("AUTO_INCREMENT"),
    substitutions: &[(BaseType::Text, "LONGTEXT")],
    column_on_update: false,
};

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::MySQL,
        Dialect::MariaDB,
        Dialect::PostgreSQL,
        Dialect::H2,
    ];

    pub fn spec(self) -> &'static DialectSpec {
        match self {
            Self::MySQL => &MYSQL,
            Self::MariaDB => &MARIADB,
            Self::PostgreSQL => &POSTGRESQL,
            Self::H2 => &H2,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Dialect-specific spelling of `base`, if it differs from the canonical name.
    pub fn substitute(self, base: BaseType) -> Option<&'static str> {
        self.spec()
            .substitutions
            .iter()
            .find(|(from, _)| *from == base)
            .map(|(_, to)| *to)
    }
}

impl FromStr for Dialect {
    type Err = UnsupportedDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Self::MySQL),
            "mariadb" => Ok(Self::MariaDB),
            "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "h2" => Ok(Self::H2),
            _ => Err(UnsupportedDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
