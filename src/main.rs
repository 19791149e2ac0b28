use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use regexp_to_dfa::{compile_lines, Compilation, Kind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Table {
    Nfa,
    Dfa,
    MinDfa,
}

impl From<Table> for Kind {
    fn from(t: Table) -> Kind {
        match t {
            Table::Nfa => Kind::Nfa,
            Table::Dfa => Kind::Dfa,
            Table::MinDfa => Kind::MinDfa,
        }
    }
}

/// Prints the NFA, DFA and minimized DFA transition tables of a regular
/// expression.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The regular expression to compile.
    #[arg(required_unless_present = "batch", allow_hyphen_values = true)]
    regexp: Option<String>,

    /// Read one expression per line from stdin instead.
    #[arg(short, long, conflicts_with = "regexp")]
    batch: bool,

    /// Only print the selected tables.
    #[arg(short, long, value_enum)]
    table: Vec<Table>,

    /// Report whether the minimized DFA accepts this string.
    #[arg(short, long, conflicts_with = "batch")]
    check: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let kinds: Vec<Kind> = if args.table.is_empty() {
        Kind::ALL.to_vec()
    } else {
        args.table.iter().map(|&t| t.into()).collect()
    };

    if args.batch {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading expressions from stdin")?;
        let outcomes = compile_lines(&input, &kinds);
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let text: Vec<String> = outcomes.iter().map(|o| o.to_string()).collect();
        print!("{}", text.join("\n"));
        if failed > 0 {
            bail!("{} of {} expressions failed", failed, outcomes.len());
        }
        return Ok(());
    }

    let regexp = args.regexp.unwrap_or_default();
    let compilation = Compilation::new(&regexp)?;
    print!("{}", compilation.render(&kinds));
    if !args.check.is_empty() {
        print!("\n{}", compilation.check(&args.check));
    }
    Ok(())
}
