use std::fmt::{self, Write};

use crate::dfa::Dfa;
use crate::nfa::{Label, Nfa};

const CELL_WIDTH: usize = 8;

/// Which automaton a table shows. Callers find blocks by title substring, so
/// the DFA title must not contain `最小化`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Nfa,
    Dfa,
    MinDfa,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Nfa, Kind::Dfa, Kind::MinDfa];

    pub fn title(self) -> &'static str {
        match self {
            Kind::Nfa => "NFA状态转换表",
            Kind::Dfa => "DFA状态转换表",
            Kind::MinDfa => "最小化DFA状态转换表",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub struct Row {
    pub id: usize,
    pub cells: Vec<String>,
    pub accepting: bool,
    pub initial: bool,
}

/// Anything that can be laid out as a state-transition table.
pub trait TransitionTable {
    fn columns(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Row>;
}

/// Column header for a literal. A space or a literal `ε` is quoted so it can't
/// be mistaken for padding or for the epsilon column.
fn symbol(c: char) -> String {
    match c {
        ' ' | 'ε' => format!("'{}'", c),
        c if c.is_whitespace() || c.is_control() => c.escape_default().collect(),
        c => c.to_string(),
    }
}

fn target_set(targets: &[usize]) -> String {
    if targets.is_empty() {
        return "-".to_owned();
    }
    targets.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",")
}

/// The epsilon column comes first, then the symbols in ascending order.
impl TransitionTable for Nfa {
    fn columns(&self) -> Vec<String> {
        let mut cols = vec!["ε".to_owned()];
        cols.extend(self.alphabet().symbols().map(symbol));
        cols
    }

    fn rows(&self) -> Vec<Row> {
        let mut labels = vec![Label::Epsilon];
        labels.extend(self.alphabet().symbols().map(Label::Symbol));
        self.states
            .iter()
            .enumerate()
            .map(|(id, state)| Row {
                id,
                cells: labels.iter().map(|&l| target_set(&state.targets(l))).collect(),
                accepting: id == self.accept,
                initial: id == self.start,
            })
            .collect()
    }
}

impl TransitionTable for Dfa {
    fn columns(&self) -> Vec<String> {
        self.alphabet.symbols().map(symbol).collect()
    }

    fn rows(&self) -> Vec<Row> {
        self.states
            .iter()
            .enumerate()
            .map(|(id, state)| Row {
                id,
                cells: self
                    .alphabet
                    .symbols()
                    .map(|c| state.by_char.get(&c).map_or_else(|| "-".to_owned(), |t| t.to_string()))
                    .collect(),
                accepting: state.accepting,
                initial: id == 0,
            })
            .collect()
    }
}

/// Lays out one table block, newline terminated and free of blank lines.
pub fn render<T: TransitionTable + ?Sized>(automaton: &T, kind: Kind) -> String {
    let columns = automaton.columns();
    let rows = automaton.rows();
    let id_width = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(0);
    let state_width = id_width.max(6) + 2;

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}:", kind.title());
    let _ = write!(out, "{:>w$}", "State", w = state_width);
    for col in &columns {
        let _ = write!(out, "{:>w$}", col, w = CELL_WIDTH);
    }
    out.push_str("  Accept?\n");
    out.push_str(&"-".repeat(state_width + columns.len() * CELL_WIDTH + 8));
    out.push('\n');
    for row in &rows {
        let _ = write!(out, "{:>w$}", row.id, w = state_width);
        for cell in &row.cells {
            let _ = write!(out, "{:>w$}", cell, w = CELL_WIDTH);
        }
        out.push_str(if row.accepting { "  Yes" } else { "  No" });
        if row.initial {
            out.push_str(" (Initial)");
        }
        out.push('\n');
    }
    out
}
