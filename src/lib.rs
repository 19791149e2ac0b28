//! Compiles classical regular expressions (literals, concatenation, `|`, `*`,
//! `+`, `?` and grouping) to an NFA by Thompson construction, determinizes it
//! by subset construction and minimizes the result by partition refinement.
//! Each automaton can be rendered as a textual state-transition table.

use std::fmt;
use std::thread;

use log::debug;

pub use dfa::{Dfa, State};
pub use nfa::{Label, Nfa};
pub use regex::{Alphabet, ParseError, Regex};
pub use table::{render, Kind, TransitionTable};

pub mod dfa;
pub mod nfa;
pub mod regex;
pub mod table;

/// Every stage of the pipeline for one expression.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub regex: Regex,
    pub alphabet: Alphabet,
    pub nfa: Nfa,
    pub dfa: Dfa,
    pub min_dfa: Dfa,
}

impl Compilation {
    pub fn new(expression: &str) -> Result<Compilation, ParseError> {
        let regex: Regex = expression.parse()?;
        let alphabet = regex.alphabet();
        let nfa = Nfa::from_regex(&regex);
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let min_dfa = dfa.minimize();
        debug!(
            "compiled {:?}: nfa {} / dfa {} / min {} states",
            expression,
            nfa.len(),
            dfa.len(),
            min_dfa.len()
        );
        Ok(Compilation { regex, alphabet, nfa, dfa, min_dfa })
    }

    pub fn table(&self, kind: Kind) -> String {
        match kind {
            Kind::Nfa => render(&self.nfa, kind),
            Kind::Dfa => render(&self.dfa, kind),
            Kind::MinDfa => render(&self.min_dfa, kind),
        }
    }

    /// The selected tables in the given order, separated by one blank line.
    pub fn render(&self, kinds: &[Kind]) -> String {
        kinds
            .iter()
            .map(|&k| self.table(k))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs each input through the minimized DFA, one line per input. The
    /// alphabet is listed first, in the order its symbols appear in the
    /// expression.
    pub fn check<S: AsRef<str>>(&self, inputs: &[S]) -> String {
        let mut out = String::from("匹配结果:\n字母表:");
        for &c in self.alphabet.in_order_of_appearance() {
            out.push_str(&format!(" {:?}", c));
        }
        out.push('\n');
        for input in inputs {
            let input = input.as_ref();
            let verdict = if self.min_dfa.accepts(input) { "accept" } else { "reject" };
            out.push_str(&format!("{:?}: {}\n", input, verdict));
        }
        out
    }
}

/// Parses `expression` and renders its NFA, DFA and minimized DFA tables.
pub fn compile(expression: &str) -> Result<String, ParseError> {
    Ok(Compilation::new(expression)?.render(&Kind::ALL))
}

/// Result for one line of a multi-expression input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// 1-based line number in the original input.
    pub line: usize,
    pub expression: String,
    pub result: Result<String, ParseError>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "正则表达式 {}: {}", self.line, self.expression)?;
        match self.result {
            Ok(ref tables) => write!(f, "{}", tables),
            Err(ref e) => writeln!(f, "错误：{}", e),
        }
    }
}

/// Strips surrounding whitespace, except a trailing character that a
/// backslash escapes.
fn trim_expression(line: &str) -> &str {
    let start = line.trim_start();
    let end = start.trim_end();
    let backslashes = end.chars().rev().take_while(|&c| c == '\\').count();
    match start[end.len()..].chars().next() {
        Some(c) if backslashes % 2 == 1 => &start[..end.len() + c.len_utf8()],
        _ => end,
    }
}

/// Compiles every non-blank line on its own thread, at most as many at a time
/// as the machine runs in parallel. Outcomes come back in input order and a
/// failing line does not affect the others.
pub fn compile_lines(input: &str, kinds: &[Kind]) -> Vec<Outcome> {
    let width = thread::available_parallelism().map_or(1, |n| n.get());
    compile_lines_in_waves(input, kinds, width)
}

fn compile_lines_in_waves(input: &str, kinds: &[Kind], width: usize) -> Vec<Outcome> {
    let jobs: Vec<(usize, String)> = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, trim_expression(line).to_owned()))
        .filter(|(_, expression)| !expression.is_empty())
        .collect();

    let mut outcomes = Vec::with_capacity(jobs.len());
    for wave in jobs.chunks(width.max(1)) {
        let threads: Vec<_> = wave
            .iter()
            .cloned()
            .map(|(line, expression)| {
                let kinds = kinds.to_vec();
                thread::spawn(move || {
                    let result = Compilation::new(&expression).map(|c| c.render(&kinds));
                    Outcome { line, expression, result }
                })
            })
            .collect();
        debug!("compile_lines: wave of {}", threads.len());
        outcomes.extend(
            threads
                .into_iter()
                .map(|t| t.join().unwrap_or_else(|e| std::panic::resume_unwind(e))),
        );
    }
    outcomes
}
