/// Render rows as CSV text. Fields containing commas, quotes or newlines
/// are quoted, with embedded quotes doubled.
pub fn to_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();

    let write_row = |out: &mut String, fields: &[String]| {
        let line = fields
            .iter()
            .map(|field| escape_csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    };

    let header_row: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_row(&mut out, &header_row);

    for row in rows {
        write_row(&mut out, row);
    }

    out
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        let csv = to_csv(
            &["id", "email"],
            &[vec!["1".into(), "a@example.com".into()]],
        );
        assert_eq!(csv, "id,email\n1,a@example.com\n");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        let csv = to_csv(
            &["name"],
            &[vec!["Paints \"R\" Us, Ltd".into()]],
        );
        assert_eq!(csv, "name\n\"Paints \"\"R\"\" Us, Ltd\"\n");
    }

    #[test]
    fn empty_row_set_still_emits_the_header() {
        let csv = to_csv(&["id", "name"], &[]);
        assert_eq!(csv, "id,name\n");
    }
}
