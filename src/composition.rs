//! Allen interval algebra composition table and the rules generated from it.
//!
//! The table is tab-separated text: a header row (discarded), then one row per
//! relation. Column 0 holds the row relation's code; columns 1..=13 hold the
//! composed relations for the column relations in
//! [`AllenRelation::COLUMN_ORDER`], each cell wrapped in parentheses, e.g.
//! `(pmoFD)`. Every relation has exactly one row. Only empty lines are
//! skipped. Every non-empty cell becomes one composition rule.
//!
//! The standard table ships with the crate, see [`CompositionTable::allen`].

use std::path::Path;

use crate::allen::AllenRelation;
use crate::error::{RuleResult, TableError, TableResult};
use crate::pattern::{Pattern, VariablePool};
use crate::rule::{Rule, RuleBuilder};

/// The standard Allen composition table.
pub const ALLEN_TABLE: &str = include_str!("../data/composition_table.txt");

/// Columns per data row: the row code plus 13 cells.
pub const COLUMNS: usize = 14;

/// One cell of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionCell {
    pub row: AllenRelation,
    pub column: AllenRelation,
    /// Composed relations in the cell's left-to-right order. May be empty.
    pub outputs: Vec<AllenRelation>,
}

/// A parsed, immutable composition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionTable {
    cells: Vec<CompositionCell>,
}

impl CompositionTable {
    /// Parse a table from its text form.
    pub fn parse(text: &str) -> TableResult<Self> {
        let mut lines = text.lines().enumerate();
        if lines.next().is_none() {
            return Err(TableError::MissingHeader);
        }

        let mut cells = Vec::new();
        let mut rows: Vec<AllenRelation> = Vec::with_capacity(AllenRelation::COLUMN_ORDER.len());
        for (index, raw) in lines {
            let line_no = index + 1;
            let line = raw.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() != COLUMNS {
                return Err(TableError::ColumnCount {
                    line: line_no,
                    expected: COLUMNS,
                    found: columns.len(),
                });
            }

            let row = parse_row_code(columns[0], line_no)?;
            if rows.contains(&row) {
                return Err(TableError::DuplicateRow {
                    code: row.code(),
                    line: line_no,
                });
            }
            rows.push(row);
            for (column, cell) in AllenRelation::COLUMN_ORDER.iter().zip(&columns[1..]) {
                cells.push(CompositionCell {
                    row,
                    column: *column,
                    outputs: parse_cell(cell, line_no)?,
                });
            }
        }

        let missing: String = AllenRelation::COLUMN_ORDER
            .iter()
            .filter(|r| !rows.contains(r))
            .map(|r| r.code())
            .collect();
        if !missing.is_empty() {
            return Err(TableError::MissingRows { missing });
        }

        tracing::debug!(cells = cells.len(), "parsed composition table");
        Ok(Self { cells })
    }

    /// Read and parse a table file.
    pub fn load(path: &Path) -> TableResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// The bundled standard table.
    pub fn allen() -> TableResult<Self> {
        Self::parse(ALLEN_TABLE)
    }

    pub fn cells(&self) -> &[CompositionCell] {
        &self.cells
    }

    /// The composed relations for `row ∘ column`, if the table has that cell.
    pub fn get(&self, row: AllenRelation, column: AllenRelation) -> Option<&[AllenRelation]> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
            .map(|c| c.outputs.as_slice())
    }

    /// One composition rule per non-empty cell, in table order.
    pub fn rules(&self, variables: &mut VariablePool) -> RuleResult<Vec<Rule>> {
        self.cells
            .iter()
            .filter(|cell| !cell.outputs.is_empty())
            .map(|cell| composition_rule(variables, cell.row, cell.column, &cell.outputs))
            .collect()
    }
}

fn parse_row_code(raw: &str, line: usize) -> TableResult<AllenRelation> {
    let code = raw.trim();
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => AllenRelation::from_code(c).ok_or_else(|| TableError::UnknownCode {
            code: code.to_string(),
            line,
        }),
        _ => Err(TableError::UnknownCode {
            code: code.to_string(),
            line,
        }),
    }
}

fn parse_cell(raw: &str, line: usize) -> TableResult<Vec<AllenRelation>> {
    raw.trim()
        .trim_matches(['(', ')'])
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            AllenRelation::from_code(c).ok_or_else(|| TableError::UnknownCode {
                code: c.to_string(),
                line,
            })
        })
        .collect()
}

/// `R1(A, B)` and `R2(A, B)` yield one link `Rk(A, B)` per composed relation.
///
/// Composition rules carry no formula: they only assert which relations
/// co-occur.
pub fn composition_rule(
    variables: &mut VariablePool,
    first: AllenRelation,
    second: AllenRelation,
    outputs: &[AllenRelation],
) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();

    let output_names: Vec<&str> = outputs.iter().map(|r| r.link_type().name()).collect();
    RuleBuilder::new()
        .named(format!(
            "TemporalCompositionRule ({}).({}) = ({})",
            first.link_type(),
            second.link_type(),
            output_names.join(" ")
        ))
        .input(Pattern::over(first.link_type(), &[a, b]))
        .input(Pattern::over(second.link_type(), &[a, b]))
        .outputs(outputs.iter().map(|r| Pattern::over(r.link_type(), &[a, b])))
        .build()
}

/// Build the composition rules of a parsed table.
pub fn create_composition_rules(
    variables: &mut VariablePool,
    table: &CompositionTable,
) -> RuleResult<Vec<Rule>> {
    table.rules(variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomType;

    fn header() -> String {
        let codes: Vec<String> = AllenRelation::COLUMN_ORDER
            .iter()
            .map(|r| r.code().to_string())
            .collect();
        format!("\t{}", codes.join("\t"))
    }

    #[test]
    fn bundled_table_is_complete() {
        let table = CompositionTable::allen().unwrap();
        assert_eq!(table.cells().len(), 169);
        assert!(table.cells().iter().all(|c| !c.outputs.is_empty()));
    }

    #[test]
    fn equals_row_is_identity() {
        let table = CompositionTable::allen().unwrap();
        for r in AllenRelation::COLUMN_ORDER {
            assert_eq!(table.get(AllenRelation::Equals, r), Some(&[r][..]));
        }
    }

    #[test]
    fn before_meets_composes_to_before() {
        let table = CompositionTable::allen().unwrap();
        assert_eq!(
            table.get(AllenRelation::Before, AllenRelation::Meets),
            Some(&[AllenRelation::Before][..])
        );
        assert_eq!(
            table.get(AllenRelation::Before, AllenRelation::After).map(<[_]>::len),
            Some(13)
        );
    }

    #[test]
    fn rule_per_cell_with_outputs_in_order() {
        let table = CompositionTable::allen().unwrap();
        let mut pool = VariablePool::new();
        let rules = table.rules(&mut pool).unwrap();
        assert_eq!(rules.len(), 169);

        for (rule, cell) in rules.iter().zip(table.cells()) {
            let types: Vec<AtomType> = rule.outputs().iter().map(|p| p.link_type).collect();
            let expected: Vec<AtomType> = cell.outputs.iter().map(|r| r.link_type()).collect();
            assert_eq!(types, expected);
            assert!(rule.formula().is_none());
        }
    }

    #[test]
    fn p_m_cell_yields_before_rule() {
        let table = CompositionTable::allen().unwrap();
        let mut pool = VariablePool::new();
        let rules = table.rules(&mut pool).unwrap();
        let rule = rules
            .iter()
            .find(|r| r.name() == "TemporalCompositionRule (BeforeLink).(MeetsLink) = (BeforeLink)")
            .unwrap();
        let inputs: Vec<AtomType> = rule.inputs().iter().map(|p| p.link_type).collect();
        assert_eq!(inputs, vec![AtomType::BeforeLink, AtomType::MeetsLink]);
        assert_eq!(rule.outputs().len(), 1);
        assert_eq!(rule.outputs()[0].link_type, AtomType::BeforeLink);
    }

    /// The bundled table with every cell of every row but `p` emptied.
    fn sparse_table() -> String {
        ALLEN_TABLE
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 || line.starts_with('p') {
                    line.to_string()
                } else {
                    let code = line.split('\t').next().unwrap_or_default();
                    format!("{code}{}", "\t()".repeat(13))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_cells_are_skipped() {
        let table = CompositionTable::parse(&sparse_table()).unwrap();
        assert_eq!(table.cells().len(), 169);
        assert_eq!(table.get(AllenRelation::Meets, AllenRelation::Before), Some(&[][..]));
        let mut pool = VariablePool::new();
        assert_eq!(table.rules(&mut pool).unwrap().len(), 13);
    }

    #[test]
    fn duplicate_row_is_fatal() {
        let p_row = ALLEN_TABLE.lines().find(|l| l.starts_with('p')).unwrap();
        let text = format!("{}\n{p_row}\n", ALLEN_TABLE.trim_end());
        let err = CompositionTable::parse(&text).unwrap_err();
        assert!(matches!(err, TableError::DuplicateRow { code: 'p', line: 15 }));
    }

    #[test]
    fn missing_rows_are_fatal() {
        let text: String = ALLEN_TABLE
            .lines()
            .filter(|l| !l.starts_with('P') && !l.starts_with('e'))
            .collect::<Vec<_>>()
            .join("\n");
        let err = CompositionTable::parse(&text).unwrap_err();
        assert!(matches!(err, TableError::MissingRows { ref missing } if missing == "eP"));
    }

    #[test]
    fn whitespace_row_is_not_skipped() {
        let text = format!("{}\n{}\n", ALLEN_TABLE.trim_end(), "\t".repeat(13));
        let err = CompositionTable::parse(&text).unwrap_err();
        assert!(matches!(err, TableError::UnknownCode { ref code, line: 15 } if code.is_empty()));
    }

    #[test]
    fn unknown_cell_code_is_fatal() {
        let mut text = header();
        text.push_str("\np\t(px)");
        text.push_str(&"\t(p)".repeat(12));
        let err = CompositionTable::parse(&text).unwrap_err();
        assert!(matches!(err, TableError::UnknownCode { ref code, line: 2 } if code == "x"));
    }

    #[test]
    fn unknown_row_code_is_fatal() {
        let mut text = header();
        text.push_str("\nq");
        text.push_str(&"\t(p)".repeat(13));
        assert!(matches!(
            CompositionTable::parse(&text),
            Err(TableError::UnknownCode { .. })
        ));
    }

    #[test]
    fn wrong_column_count_is_fatal() {
        let mut text = header();
        text.push_str("\np\t(p)\t(p)");
        assert!(matches!(
            CompositionTable::parse(&text),
            Err(TableError::ColumnCount {
                found: 3,
                expected: 14,
                ..
            })
        ));
    }

    #[test]
    fn empty_text_has_no_header() {
        assert!(matches!(
            CompositionTable::parse(""),
            Err(TableError::MissingHeader)
        ));
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let text = ALLEN_TABLE.replace('\n', "\r\n") + "\r\n\r\n";
        let table = CompositionTable::parse(&text).unwrap();
        assert_eq!(table, CompositionTable::allen().unwrap());
    }
}
