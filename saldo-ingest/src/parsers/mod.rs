//! Bank-specific statement parsers. Each is a pure function from document
//! text to a [`crate::types::ParsedStatement`].

pub mod generic_csv;
pub mod generic_line;
pub mod ing_csv;
pub mod sabadell_credit;
pub mod sabadell_debit;

/// Split one delimited line into trimmed fields. Accepts comma and tab
/// delimiters in the same document; double quotes group a field and are
/// dropped from it.
pub(crate) fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' | '\t' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_quotes_and_tabs() {
        assert_eq!(
            split_fields(r#"05/03/2024,"COMPRA, TARJ",-12,50"#),
            vec!["05/03/2024", "COMPRA, TARJ", "-12", "50"]
        );
        assert_eq!(
            split_fields("06/11/2025\tRECIBO LUZ\t-39,89 €\t100,00 €"),
            vec!["06/11/2025", "RECIBO LUZ", "-39,89 €", "100,00 €"]
        );
    }
}
