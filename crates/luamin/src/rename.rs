// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Synthetic short-name assignment for local bindings.
//!
//! Names come from a shortest-first sequence (single letters, then
//! two-character names, and so on) and are assigned per scope: every
//! scope restarts the sequence, so two sibling functions can both call
//! their first local `a`. What a scope may use is limited by an avoid
//! set carried down the tree: names assigned by ancestor scopes (a
//! nested scope must not shadow an upvalue it can still see), every
//! global the chunk references, the well-known host globals, and any
//! names the caller asked to preserve.
//!
//! Within one scope, bindings are ordered most-used first so the
//! heaviest names get the shortest replacements.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::builtins::{is_reserved_word, LUA_STD_GLOBALS, STORMWORKS_GLOBALS};
use crate::minifier::MinifyOptions;
use crate::scope::{Analysis, BindingId, ScopeId};

/// Iterator over valid short Lua names: `a`..`z`, `A`..`Z`, `_`, then
/// two-character names with digits allowed after the first character.
/// Reserved words are skipped.
pub struct NameGen {
    // Little-endian digit indices; the first position cycles fastest.
    indices: Vec<usize>,
}

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const REST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789";

impl NameGen {
    /// Creates a generator positioned before the first name.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    fn advance(&mut self) {
        if self.indices.is_empty() {
            self.indices.push(0);
            return;
        }

        self.indices[0] += 1;
        if self.indices[0] < FIRST_CHARS.len() {
            return;
        }
        self.indices[0] = 0;

        for i in 1..self.indices.len() {
            self.indices[i] += 1;
            if self.indices[i] < REST_CHARS.len() {
                return;
            }
            self.indices[i] = 0;
        }
        self.indices.push(1);
    }
}

impl Default for NameGen {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for NameGen {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            self.advance();
            let mut name = String::with_capacity(self.indices.len());
            name.push(FIRST_CHARS[self.indices[0]] as char);
            for &i in &self.indices[1..] {
                name.push(REST_CHARS[i] as char);
            }
            if !is_reserved_word(&name) {
                return Some(name);
            }
        }
    }
}

/// Assigns a replacement name to every renameable binding.
///
/// Returns a table indexed by [`BindingId`]; `None` means the binding
/// keeps its original spelling.
pub fn assign_names(analysis: &Analysis, options: &MinifyOptions) -> Vec<Option<String>> {
    let mut assigner = Assigner {
        analysis,
        options,
        renames: vec![None; analysis.bindings.len()],
        avoid: base_avoid_set(analysis, options),
    };
    assigner.visit(0);
    assigner.renames
}

fn base_avoid_set(analysis: &Analysis, options: &MinifyOptions) -> HashSet<String> {
    let mut avoid: HashSet<String> = analysis.globals.iter().cloned().collect();
    avoid.extend(LUA_STD_GLOBALS.iter().map(|s| s.to_string()));
    avoid.extend(STORMWORKS_GLOBALS.iter().map(|s| s.to_string()));
    avoid.extend(options.preserve.iter().cloned());
    avoid.extend(options.extra_globals.iter().cloned());
    avoid
}

struct Assigner<'a> {
    analysis: &'a Analysis,
    options: &'a MinifyOptions,
    renames: Vec<Option<String>>,
    avoid: HashSet<String>,
}

impl<'a> Assigner<'a> {
    fn visit(&mut self, scope: ScopeId) {
        let mut order: Vec<BindingId> = self.analysis.scopes[scope].bindings.clone();
        order.sort_by_key(|&id| Reverse(self.analysis.bindings[id].sites.len()));

        let mut gen = NameGen::new();
        // Names this scope added to the avoid set; removed on the way
        // back up so sibling scopes can reuse them.
        let mut added_here: Vec<String> = Vec::new();

        for id in order {
            let binding = &self.analysis.bindings[id];
            let keep = !binding.renameable
                || !self.options.rename_locals
                || self.options.preserve.contains(&binding.name);

            if keep {
                // A kept name still blocks synthetic reuse underneath it.
                if self.avoid.insert(binding.name.clone()) {
                    added_here.push(binding.name.clone());
                }
                continue;
            }

            let name = gen
                .by_ref()
                .find(|candidate| !self.avoid.contains(candidate))
                .expect("name sequence is unbounded");
            self.renames[id] = Some(name.clone());
            if self.avoid.insert(name.clone()) {
                added_here.push(name);
            }
        }

        let children = self.analysis.scopes[scope].children.clone();
        for child in children {
            self.visit(child);
        }

        for name in added_here {
            self.avoid.remove(&name);
        }
    }
}
