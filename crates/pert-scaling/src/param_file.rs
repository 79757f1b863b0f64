//! Tab-delimited scaling-parameter file parsing (spec.md §4.3).
//!
//! Format: the header's first two columns are `name` and `parameters`; the
//! `parameters` column holds a comma-separated list of reals. Parsing is
//! tolerant by design — malformed rows are skipped with a `tracing::warn!`
//! rather than aborting the whole file, matching the original loader's
//! per-row recoverable-error style (`original_source/src/utils/utilities.cxx`).

use crate::error::{ScalingError, ScalingResult};

/// One parsed parameter-file row: a node name and its comma-separated reals.
#[derive(Clone, PartialEq, Debug)]
pub struct ParamRow {
    pub name: String,
    pub parameters: Vec<f64>,
}

/// Parse the full contents of a scaling-parameter TSV file.
///
/// Fails only on a malformed header; individual bad rows are skipped (with
/// a logged warning) rather than aborting the parse.
pub fn parse_param_file(contents: &str) -> ScalingResult<Vec<ParamRow>> {
    let mut lines = contents.lines();
    let header = lines.next().unwrap_or("");
    let columns: Vec<&str> = header.split('\t').collect();
    if columns.len() < 2 || columns[0] != "name" || columns[1] != "parameters" {
        return Err(ScalingError::BadHeader(header.to_string()));
    }

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row_number = i + 1; // 0 is the header
        let fields: Vec<&str> = line.split('\t').collect();
        let name = match fields.first() {
            Some(n) => n.to_string(),
            None => {
                tracing::warn!(row = row_number, "scaling parameter row has no name column, skipping");
                continue;
            }
        };
        let params_field = match fields.get(1) {
            Some(p) => *p,
            None => {
                tracing::warn!(row = row_number, node = %name, "scaling parameter row has no parameters column, skipping");
                continue;
            }
        };

        let mut parameters = Vec::new();
        let mut malformed = false;
        for token in params_field.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<f64>() {
                Ok(v) => parameters.push(v),
                Err(_) => {
                    tracing::warn!(row = row_number, node = %name, value = %token, "could not parse scaling parameter, skipping row");
                    malformed = true;
                    break;
                }
            }
        }
        if malformed {
            continue;
        }
        rows.push(ParamRow { name, parameters });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rows() {
        let tsv = "name\tparameters\nA\t1.0,2.0,3.0\nB\t4,5,6\n";
        let rows = parse_param_file(tsv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].parameters, vec![1.0, 2.0, 3.0]);
        assert_eq!(rows[1].parameters, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn rejects_bad_header() {
        let tsv = "node\tvalues\nA\t1.0\n";
        assert!(parse_param_file(tsv).is_err());
    }

    #[test]
    fn skips_malformed_rows_without_failing() {
        let tsv = "name\tparameters\nA\t1.0,notanumber\nB\t1.0,2.0,3.0\n";
        let rows = parse_param_file(tsv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "B");
    }

    #[test]
    fn skips_blank_lines() {
        let tsv = "name\tparameters\nA\t1.0,2.0,3.0\n\nB\t4.0,5.0,6.0\n";
        let rows = parse_param_file(tsv).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
