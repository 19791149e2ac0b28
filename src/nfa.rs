use bit_set::BitSet;
use log::debug;
use crate::regex::Regex::*;
use crate::regex::{Alphabet, Regex};

/// Edge label of an NFA transition.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub enum Label {
    Epsilon,
    Symbol(char),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    /// Outgoing transitions in insertion order.
    pub transitions: Vec<(Label, usize)>,
}

impl State {
    /// Targets reachable from this state on `label`, ascending.
    pub fn targets(&self, label: Label) -> Vec<usize> {
        let mut v: Vec<usize> = self
            .transitions
            .iter()
            .filter(|&&(l, _)| l == label)
            .map(|&(_, t)| t)
            .collect();
        v.sort_unstable();
        v.dedup();
        v
    }
}

/// An NFA with epsilon transitions, one start state and one accept state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub states: Vec<State>,
    pub start: usize,
    pub accept: usize,
}

/// The two dangling ends of a partially built automaton.
#[derive(Copy, Clone, Debug)]
struct Fragment {
    input: usize,
    output: usize,
}

struct Builder {
    states: Vec<State>,
}

impl Builder {
    fn add_state(&mut self) -> usize {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn edge(&mut self, from: usize, label: Label, to: usize) {
        self.states[from].transitions.push((label, to));
    }

    fn single(&mut self, label: Label) -> Fragment {
        let s0 = self.add_state();
        let s1 = self.add_state();
        self.edge(s0, label, s1);
        Fragment { input: s0, output: s1 }
    }

    fn construct(&mut self, re: &Regex) -> Fragment {
        match *re {
            Epsilon => self.single(Label::Epsilon),
            Literal(c) => self.single(Label::Symbol(c)),
            Concat(ref l, ref r) => {
                let l = self.construct(l);
                let r = self.construct(r);
                self.edge(l.output, Label::Epsilon, r.input);
                Fragment { input: l.input, output: r.output }
            }
            Union(ref l, ref r) => {
                let s0 = self.add_state();
                let s1 = self.add_state();
                let l = self.construct(l);
                let r = self.construct(r);
                self.edge(s0, Label::Epsilon, l.input);
                self.edge(s0, Label::Epsilon, r.input);
                self.edge(l.output, Label::Epsilon, s1);
                self.edge(r.output, Label::Epsilon, s1);
                Fragment { input: s0, output: s1 }
            }
            Star(ref x) | Plus(ref x) | Optional(ref x) => {
                let s0 = self.add_state();
                let s1 = self.add_state();
                let x_frag = self.construct(x);
                self.edge(s0, Label::Epsilon, x_frag.input);
                if !matches!(*re, Plus(_)) {
                    self.edge(s0, Label::Epsilon, s1);
                }
                if !matches!(*re, Optional(_)) {
                    self.edge(x_frag.output, Label::Epsilon, x_frag.input);
                }
                self.edge(x_frag.output, Label::Epsilon, s1);
                Fragment { input: s0, output: s1 }
            }
        }
    }
}

impl Nfa {
    /// Thompson construction. A composite allocates its own start and accept
    /// states before building its children, so the start state is always 0
    /// and a composite's accept state is 1.
    pub fn from_regex(re: &Regex) -> Nfa {
        let mut builder = Builder { states: Vec::new() };
        let frag = builder.construct(re);
        debug!("nfa: {} states, start {}, accept {}", builder.states.len(), frag.input, frag.output);
        Nfa {
            states: builder.states,
            start: frag.input,
            accept: frag.output,
        }
    }

    /// Symbols labelling at least one transition.
    pub fn alphabet(&self) -> Alphabet {
        self.states
            .iter()
            .flat_map(|s| s.transitions.iter())
            .filter_map(|&(label, _)| match label {
                Label::Symbol(c) => Some(c),
                Label::Epsilon => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All states reachable from `set` using only epsilon transitions,
    /// including the members of `set` themselves.
    pub fn epsilon_closure(&self, set: &BitSet) -> BitSet {
        let mut closure = set.clone();
        let mut stack: Vec<usize> = set.iter().collect();
        while let Some(state) = stack.pop() {
            for &(label, next) in &self.states[state].transitions {
                if label == Label::Epsilon && closure.insert(next) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// States reachable from any member of `set` by one `c` transition.
    pub fn step(&self, set: &BitSet, c: char) -> BitSet {
        let mut out = BitSet::with_capacity(self.len());
        for state in set.iter() {
            for &(label, next) in &self.states[state].transitions {
                if label == Label::Symbol(c) {
                    out.insert(next);
                }
            }
        }
        out
    }

    pub fn start_set(&self) -> BitSet {
        let mut set = BitSet::with_capacity(self.len());
        set.insert(self.start);
        self.epsilon_closure(&set)
    }

    /// Simulates the automaton on `input`.
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.start_set();
        for c in input.chars() {
            current = self.epsilon_closure(&self.step(&current, c));
            if current.is_empty() {
                return false;
            }
        }
        current.contains(self.accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfa(s: &str) -> Nfa {
        Nfa::from_regex(&s.parse::<Regex>().unwrap())
    }

    #[test]
    fn literal_fragment() {
        let n = nfa("a");
        assert_eq!(n.len(), 2);
        assert_eq!((n.start, n.accept), (0, 1));
        assert_eq!(n.states[0].transitions, vec![(Label::Symbol('a'), 1)]);
        assert!(n.states[1].transitions.is_empty());
    }

    #[test]
    fn star_fragment_numbering() {
        let n = nfa("a*");
        assert_eq!(n.len(), 4);
        assert_eq!((n.start, n.accept), (0, 1));
        assert_eq!(n.states[0].targets(Label::Epsilon), vec![1, 2]);
        assert!(n.states[1].transitions.is_empty());
        assert_eq!(n.states[2].transitions, vec![(Label::Symbol('a'), 3)]);
        assert_eq!(n.states[3].targets(Label::Epsilon), vec![1, 2]);
    }

    #[test]
    fn plus_has_no_skip_edge() {
        let n = nfa("a+");
        assert_eq!(n.states[0].transitions, vec![(Label::Epsilon, 2)]);
        assert!(!n.accepts(""));
        assert!(n.accepts("aaa"));
    }

    #[test]
    fn optional_has_no_loop() {
        let n = nfa("a?");
        assert_eq!(n.states[3].transitions, vec![(Label::Epsilon, 1)]);
        assert!(n.accepts(""));
        assert!(n.accepts("a"));
        assert!(!n.accepts("aa"));
    }

    #[test]
    fn union_numbering() {
        let n = nfa("a|b");
        assert_eq!(n.len(), 6);
        assert_eq!(n.states[0].targets(Label::Epsilon), vec![2, 4]);
        assert_eq!(n.states[2].targets(Label::Symbol('a')), vec![3]);
        assert_eq!(n.states[3].targets(Label::Epsilon), vec![1]);
        assert_eq!(n.states[5].targets(Label::Epsilon), vec![1]);
        assert_eq!(n.accept, 1);
    }

    #[test]
    fn nested_composites_put_their_ends_first() {
        let n = nfa("(a|b)*c");
        // star 0/1, union 2/3, a 4/5, b 6/7, then c 8/9
        assert_eq!(n.len(), 10);
        assert_eq!((n.start, n.accept), (0, 9));
        assert_eq!(n.states[0].targets(Label::Epsilon), vec![1, 2]);
        assert_eq!(n.states[2].targets(Label::Epsilon), vec![4, 6]);
        assert_eq!(n.states[3].targets(Label::Epsilon), vec![1, 2]);
        assert_eq!(n.states[1].targets(Label::Epsilon), vec![8]);
        assert_eq!(n.states[8].targets(Label::Symbol('c')), vec![9]);
    }

    #[test]
    fn concat_links_fragments() {
        let n = nfa("ab");
        assert_eq!(n.len(), 4);
        assert_eq!(n.states[1].transitions, vec![(Label::Epsilon, 2)]);
        assert!(n.accepts("ab"));
        assert!(!n.accepts("a"));
        assert!(!n.accepts("abb"));
    }

    #[test]
    fn empty_expression() {
        let n = nfa("");
        assert_eq!(n.len(), 2);
        assert!(n.accepts(""));
        assert!(!n.accepts("a"));
    }

    #[test]
    fn closure_includes_self() {
        let n = nfa("a*b");
        let closure = n.start_set();
        assert!(closure.contains(0));
        assert!(closure.contains(1));
        assert!(closure.contains(2));
        assert!(closure.contains(4));
        assert!(!closure.contains(3));
    }

    #[test]
    fn accepts_a_star_b() {
        let n = nfa("a*b");
        for s in ["b", "ab", "aab", "aaab"] {
            assert!(n.accepts(s), "{}", s);
        }
        for s in ["", "a", "ba"] {
            assert!(!n.accepts(s), "{}", s);
        }
    }
}
