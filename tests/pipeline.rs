use regexp_to_dfa::{compile, compile_lines, Compilation, Kind, ParseError};

/// Splits output into blocks the way the desktop front end does.
fn block<'a>(output: &'a str, title: &str, exclude: Option<&str>) -> Option<&'a str> {
    output
        .split("\n\n")
        .find(|p| p.contains(title) && exclude.map_or(true, |e| !p.contains(e)))
}

#[test]
fn front_end_can_locate_each_table() {
    let out = compile("(a|b)*abb").unwrap();
    let nfa = block(&out, "NFA状态转换表", None).unwrap();
    let dfa = block(&out, "DFA状态转换表", Some("最小化")).unwrap();
    let min = block(&out, "最小化DFA状态转换表", None).unwrap();
    assert!(nfa.contains('ε'));
    assert!(!dfa.contains('ε'));
    assert_ne!(dfa, min);
}

#[test]
fn classic_example_minimizes_to_four_states() {
    let c = Compilation::new("(a|b)*abb").unwrap();
    // Every subset has both transitions, so no dead state is added.
    assert!(c.dfa.states.iter().all(|s| !s.members.is_empty()));
    assert_eq!(c.dfa.len(), 5);
    assert_eq!(c.min_dfa.len(), 4);
    assert_eq!(c.min_dfa.states[0].members, vec![0, 2]);
    assert!(c.min_dfa.states[3].accepting);
    assert_eq!(c.min_dfa.states.iter().filter(|s| s.accepting).count(), 1);
}

#[test]
fn failures_stay_on_their_own_line() {
    let outcomes = compile_lines("a*b\n(a|b\nab|ac", &Kind::ALL);
    assert_eq!(outcomes.len(), 3);

    let first = outcomes[0].result.as_ref().unwrap();
    assert_eq!(first.split("\n\n").count(), 3);
    assert_eq!(outcomes[1].result, Err(ParseError::UnmatchedParen(0)));
    let third = outcomes[2].result.as_ref().unwrap();
    assert_eq!(third.split("\n\n").count(), 3);
    assert_eq!(*third, compile("ab|ac").unwrap());
}

#[test]
fn minimized_numbering_follows_dfa_order() {
    let c = Compilation::new("ab|ac").unwrap();
    let members: Vec<Vec<usize>> = c.min_dfa.states.iter().map(|s| s.members.clone()).collect();
    assert_eq!(members, vec![vec![0], vec![1], vec![2, 3], vec![4]]);
}
