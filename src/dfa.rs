use bit_set::BitSet;
use log::{debug, trace};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};

use crate::nfa::Nfa;
use crate::regex::Alphabet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub by_char: BTreeMap<char, usize>,
    pub accepting: bool,
    /// The ids this state stands for: NFA states for a determinized
    /// automaton, DFA states for a minimized one. Sorted ascending.
    pub members: Vec<usize>,
}

/// A deterministic automaton. State 0 is the start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub states: Vec<State>,
    pub alphabet: Alphabet,
}

impl Dfa {
    /// Subset construction.
    ///
    /// States are numbered in the order they are discovered by a FIFO worklist
    /// that tries symbols in ascending order. If some state is missing a
    /// transition, a single non-accepting dead state is appended last and every
    /// missing transition goes there.
    pub fn from_nfa(nfa: &Nfa, alphabet: &Alphabet) -> Dfa {
        fn index(worklist: &mut (BTreeMap<BitSet, usize>, VecDeque<BitSet>), set: BitSet) -> usize {
            let next_index = worklist.0.len();
            match worklist.0.entry(set) {
                Entry::Vacant(view) => {
                    worklist.1.push_back(view.key().clone());
                    view.insert(next_index);
                    next_index
                }
                Entry::Occupied(view) => *view.get(),
            }
        }

        let mut result = Dfa { states: Vec::new(), alphabet: alphabet.clone() };
        let mut worklist = (BTreeMap::new(), VecDeque::new());

        index(&mut worklist, nfa.start_set());

        while let Some(set) = worklist.1.pop_front() {
            let mut by_char = BTreeMap::new();
            for c in alphabet.symbols() {
                let next = nfa.epsilon_closure(&nfa.step(&set, c));
                if next.is_empty() {
                    continue;
                }
                let ix = index(&mut worklist, next);
                trace!("dfa: {} --{}--> {}", result.states.len(), c, ix);
                by_char.insert(c, ix);
            }
            result.states.push(State {
                by_char,
                accepting: set.contains(nfa.accept),
                members: set.iter().collect(),
            });
        }

        result.complete();
        debug!("dfa: {} states", result.states.len());
        result
    }

    /// Routes every missing transition to a shared dead state.
    fn complete(&mut self) {
        let symbols: Vec<char> = self.alphabet.symbols().collect();
        let partial = self
            .states
            .iter()
            .any(|s| symbols.iter().any(|c| !s.by_char.contains_key(c)));
        if !partial {
            return;
        }
        let dead = self.states.len();
        for state in &mut self.states {
            for &c in &symbols {
                state.by_char.entry(c).or_insert(dead);
            }
        }
        self.states.push(State {
            by_char: symbols.iter().map(|&c| (c, dead)).collect(),
            accepting: false,
            members: Vec::new(),
        });
        trace!("dfa: dead state {}", dead);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn accepts(&self, input: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let mut state = 0;
        for c in input.chars() {
            match self.states[state].by_char.get(&c) {
                Some(&next) => state = next,
                None => return false,
            }
        }
        self.states[state].accepting
    }

    /// States reachable from the start state.
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.states.len()];
        if self.states.is_empty() {
            return seen;
        }
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(s) = stack.pop() {
            for &t in self.states[s].by_char.values() {
                if !seen[t] {
                    seen[t] = true;
                    stack.push(t);
                }
            }
        }
        seen
    }

    /// Partition refinement.
    ///
    /// Unreachable states are dropped, the rest start out split into accepting
    /// and non-accepting blocks. Each pass splits blocks whose members disagree
    /// on the block reached by some symbol (no transition counts as its own
    /// target) until a pass splits nothing. Blocks are numbered in order of
    /// their smallest member, so the start state stays 0.
    pub fn minimize(&self) -> Dfa {
        let reachable = self.reachable();
        let live: Vec<usize> = (0..self.states.len()).filter(|&s| reachable[s]).collect();
        let symbols: Vec<char> = self.alphabet.symbols().collect();
        let mut block_of = vec![0; self.states.len()];

        let initial = live.iter().map(|&s| (0, vec![Some(self.states[s].accepting as usize)]));
        let mut count = renumber(&live, initial.collect(), &mut block_of);
        trace!("minimize: {} initial blocks over {} live states", count, live.len());

        loop {
            let signatures: Vec<Signature> = live
                .iter()
                .map(|&s| {
                    let targets: Vec<Option<usize>> = symbols
                        .iter()
                        .map(|c| self.states[s].by_char.get(c).map(|&t| block_of[t]))
                        .collect();
                    (block_of[s], targets)
                })
                .collect();
            let next = renumber(&live, signatures, &mut block_of);
            trace!("minimize: {} -> {} blocks", count, next);
            if next == count {
                break;
            }
            count = next;
        }

        let mut states: Vec<State> = (0..count)
            .map(|_| State { by_char: BTreeMap::new(), accepting: false, members: Vec::new() })
            .collect();
        for &s in &live {
            let block = &mut states[block_of[s]];
            if block.members.is_empty() {
                block.accepting = self.states[s].accepting;
                block.by_char = self.states[s]
                    .by_char
                    .iter()
                    .map(|(&c, &t)| (c, block_of[t]))
                    .collect();
            }
            block.members.push(s);
        }

        debug!("minimize: {} -> {} states", self.states.len(), states.len());
        Dfa { states, alphabet: self.alphabet.clone() }
    }
}

type Signature = (usize, Vec<Option<usize>>);

/// Assigns block ids by first appearance of each signature, walking states
/// in ascending order. Returns the number of blocks.
fn renumber(live: &[usize], signatures: Vec<Signature>, block_of: &mut [usize]) -> usize {
    let mut ids = BTreeMap::new();
    for (&s, sig) in live.iter().zip(signatures) {
        let next = ids.len();
        block_of[s] = *ids.entry(sig).or_insert(next);
    }
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::Regex;

    fn dfa(s: &str) -> Dfa {
        let re: Regex = s.parse().unwrap();
        Dfa::from_nfa(&Nfa::from_regex(&re), &re.alphabet())
    }

    fn state(by_char: &[(char, usize)], accepting: bool) -> State {
        State { by_char: by_char.iter().copied().collect(), accepting, members: Vec::new() }
    }

    #[test]
    fn start_is_closure_of_nfa_start() {
        let d = dfa("a*b");
        assert_eq!(d.states[0].members, vec![0, 1, 2, 4]);
        assert!(!d.states[0].accepting);
    }

    #[test]
    fn discovery_order() {
        let d = dfa("a*b");
        // 0 -a-> 1, 0 -b-> 2, then the dead state.
        assert_eq!(d.states[0].by_char[&'a'], 1);
        assert_eq!(d.states[0].by_char[&'b'], 2);
        assert_eq!(d.states[1].members, vec![1, 2, 3, 4]);
        assert_eq!(d.states[2].members, vec![5]);
        assert!(d.states[2].accepting);
        assert_eq!(d.len(), 4);
        assert!(d.states[3].members.is_empty());
        assert!(d.states[3].by_char.values().all(|&t| t == 3));
    }

    #[test]
    fn total_without_dead_state() {
        let d = dfa("(a|b)*");
        assert!(d.states.iter().all(|s| !s.members.is_empty()));
        assert!(d.states.iter().all(|s| s.by_char.len() == 2));
    }

    #[test]
    fn empty_alphabet() {
        let d = dfa("()");
        assert_eq!(d.len(), 1);
        assert!(d.states[0].accepting);
        assert!(d.accepts(""));
        assert!(!d.accepts("a"));
    }

    #[test]
    fn minimize_plus() {
        let m = dfa("(a|b)+").minimize();
        assert_eq!(m.len(), 2);
        assert!(!m.states[0].accepting);
        assert!(m.states[1].accepting);
        assert!(!m.accepts(""));
        assert!(m.accepts("abba"));
    }

    #[test]
    fn minimize_shared_suffix() {
        let d = dfa("ab|ac");
        let m = d.minimize();
        assert_eq!(m.len(), 4);
        assert!(m.len() <= d.len());
        assert_eq!(m.states[2].members, vec![2, 3]);
    }

    #[test]
    fn minimize_prunes_unreachable() {
        let d = Dfa {
            states: vec![
                state(&[('a', 1)], false),
                state(&[('a', 1)], true),
                state(&[('a', 0)], true),
            ],
            alphabet: "a".chars().collect(),
        };
        let m = d.minimize();
        assert_eq!(m.len(), 2);
        assert_eq!(m.states[1].members, vec![1]);
    }

    #[test]
    fn minimize_missing_transition_is_own_class() {
        let d = Dfa {
            states: vec![
                state(&[('a', 1), ('b', 2)], false),
                state(&[('a', 3)], false),
                state(&[], false),
                state(&[], true),
            ],
            alphabet: "ab".chars().collect(),
        };
        let m = d.minimize();
        // 1 reaches acceptance, 0 and 2 do not but differ on 'a'.
        assert_eq!(m.len(), 4);
        assert_eq!(m.states[0].members, vec![0]);
    }

    #[test]
    fn minimize_is_idempotent() {
        for re in ["a*b", "(a|b)*abb", "ab|ac", "(ab)*|a?", ""] {
            let m = dfa(re).minimize();
            let mm = m.minimize();
            assert_eq!(m.len(), mm.len(), "{}", re);
            for (a, b) in m.states.iter().zip(&mm.states) {
                assert_eq!((&a.by_char, a.accepting), (&b.by_char, b.accepting), "{}", re);
            }
        }
    }
}
