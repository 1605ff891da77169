use lazy_static::lazy_static;
use regex::Regex;

use crate::core::{MigrateError, Result};

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
}

/// Rejects names that would need quoting in generated DDL.
pub fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(MigrateError::InvalidIdentifier(name.to_string()))
    }
}

/// Conventional index name: `ix_<table>_<col1>_<col2>...`
pub fn index_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let mut name = format!("ix_{}", table);
    for column in columns {
        name.push('_');
        name.push_str(column.as_ref());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_convention() {
        assert_eq!(index_name("spell", &["name"]), "ix_spell_name");
        assert_eq!(index_name("spell", &["created_at"]), "ix_spell_created_at");
        assert_eq!(index_name("character", &["party_id", "name"]), "ix_character_party_id_name");
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("json_data").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("1st_level").is_err());
        assert!(validate_identifier("spell; DROP TABLE spell").is_err());
        assert!(validate_identifier("").is_err());
    }
}
