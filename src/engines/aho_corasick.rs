//! Multi-pattern automaton: an arena-of-nodes Aho-Corasick trie with
//! BFS-built failure links and a scan-time failure-chain output walk, chosen
//! over precomputing a full output closure per node to keep memory
//! proportional to the trie rather than to its transitive output sets.

use std::collections::VecDeque;

use super::{lower, Accept, AcceptState, Engine};
use crate::params::SearchParams;
use crate::result::MatchResult;

const ALPHABET: usize = 256;

#[derive(Clone, Debug)]
struct Node {
    /// Dense transition table; `None` means "no explicit edge", resolved at
    /// scan time by walking failure links.
    trans: Box<[Option<u32>; ALPHABET]>,
    fail: u32,
    /// Pattern indices whose terminal state is this node.
    outputs: Vec<u32>,
}

impl Node {
    fn new() -> Self {
        Self {
            trans: Box::new([None; ALPHABET]),
            fail: 0,
            outputs: Vec::new(),
        }
    }
}

/// A built automaton, ready to scan. Node 0 is always the root, whose
/// failure link is itself.
#[derive(Clone, Debug)]
pub struct AhoCorasickAutomaton {
    nodes: Vec<Node>,
    pattern_lens: Vec<usize>,
    case_sensitive: bool,
    empty_pattern_indices: Vec<u32>,
}

impl AhoCorasickAutomaton {
    /// Builds the trie then its failure links.
    pub fn build(patterns: &[Vec<u8>], case_sensitive: bool) -> Self {
        let mut nodes = vec![Node::new()];
        let mut pattern_lens = Vec::with_capacity(patterns.len());
        let mut empty_pattern_indices = Vec::new();

        for (idx, pattern) in patterns.iter().enumerate() {
            pattern_lens.push(pattern.len());
            if pattern.is_empty() {
                empty_pattern_indices.push(idx as u32);
                continue;
            }

            let mut cur = 0u32;
            for &raw in pattern {
                let b = if case_sensitive { raw } else { lower(raw) };
                cur = match nodes[cur as usize].trans[b as usize] {
                    Some(next) => next,
                    None => {
                        nodes.push(Node::new());
                        let next = (nodes.len() - 1) as u32;
                        nodes[cur as usize].trans[b as usize] = Some(next);
                        next
                    }
                };
            }
            nodes[cur as usize].outputs.push(idx as u32);
        }

        build_failure_links(&mut nodes);

        Self {
            nodes,
            pattern_lens,
            case_sensitive,
            empty_pattern_indices,
        }
    }

    pub fn has_empty_pattern(&self) -> bool {
        !self.empty_pattern_indices.is_empty()
    }
}

fn build_failure_links(nodes: &mut [Node]) {
    let mut queue = VecDeque::new();

    for b in 0..ALPHABET {
        if let Some(child) = nodes[0].trans[b] {
            nodes[child as usize].fail = 0;
            queue.push_back(child);
        }
    }

    while let Some(q) = queue.pop_front() {
        for b in 0..ALPHABET {
            let Some(child) = nodes[q as usize].trans[b] else {
                continue;
            };
            let mut f = nodes[q as usize].fail;
            let resolved = loop {
                if let Some(t) = nodes[f as usize].trans[b] {
                    break t;
                }
                if f == 0 {
                    break 0;
                }
                f = nodes[f as usize].fail;
            };
            nodes[child as usize].fail = resolved;
            queue.push_back(child);
        }
    }
}

/// The engine value the selector hands out when two or more literal patterns
/// are in play; it holds nothing of its own, reading the prebuilt automaton
/// off `SearchParams`.
pub struct AcScan;

impl Engine for AcScan {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let Some(automaton) = params.automaton() else {
            return 0;
        };
        let mut state = AcceptState::new(params);

        if buf.is_empty() {
            if automaton.has_empty_pattern() {
                if let Accept::CountedAndDone = state.accept(buf, 0, 0, result.as_deref_mut()) {
                    return state.count;
                }
            }
            return state.count;
        }

        let mut q = 0u32;
        let mut i = 0usize;
        while i < buf.len() {
            let c = if automaton.case_sensitive {
                buf[i]
            } else {
                lower(buf[i])
            };

            while q != 0 && automaton.nodes[q as usize].trans[c as usize].is_none() {
                q = automaton.nodes[q as usize].fail;
            }
            if let Some(next) = automaton.nodes[q as usize].trans[c as usize] {
                q = next;
            }

            let end = i + 1;
            let mut o = q;
            let mut rejected_for_line = false;
            let mut reject_start = 0usize;
            'outputs: while o != 0 {
                for &idx in &automaton.nodes[o as usize].outputs {
                    let plen = automaton.pattern_lens[idx as usize];
                    let start = end - plen;
                    match state.accept(buf, start, end, result.as_deref_mut()) {
                        Accept::CountedAndDone => return state.count,
                        Accept::Rejected if state.count_lines_mode => {
                            rejected_for_line = true;
                            reject_start = start;
                            break 'outputs;
                        }
                        _ => {}
                    }
                }
                o = automaton.nodes[o as usize].fail;
            }

            if rejected_for_line {
                i = state.line_skip_cursor(buf, reject_start);
                q = 0;
            } else {
                i += 1;
            }
        }
        state.count
    }
}
