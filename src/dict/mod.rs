//! The paraphrase dictionary index.

mod token;
mod trie;

pub use token::{TokenId, TokenTable};
pub use trie::PhraseTrie;

use crate::error::{ParattiError, ParattiResult};

/// A phrase: an ordered sequence of interned tokens.
pub type Phrase = Vec<TokenId>;

/// A mutually-paraphrastic group of phrases, and the dictionary index built
/// over all groups.
///
/// Construction interns every token via a shared `TokenTable`, inserts every
/// phrase into a `PhraseTrie` keyed to its group id, and records the group's
/// member list so that `siblings_of` is an O(1) slice lookup after an O(depth)
/// trie descent. A phrase that is a prefix of another phrase is perfectly
/// legal (common in paraphrase dictionaries — e.g. "血液検査" is a prefix of
/// "血液検査結果"), so lookups are by exact phrase, never general prefix
/// matching, except for the builder's deliberate prefix scan in
/// `PaRattice::phrases_matching`.
pub struct PaRattice {
    tokens: TokenTable,
    trie: PhraseTrie,
    groups: Vec<Vec<Phrase>>,
}

impl PaRattice {
    /// Ingest a paraphrase dictionary: a collection of groups, each a set of
    /// phrases, each phrase an ordered sequence of byte-string tokens.
    ///
    /// Rejects empty phrases (`ParattiError::InputError`). A phrase that
    /// appears in two different input groups causes those groups to be
    /// merged into one (see DESIGN.md Open Questions for why merging was
    /// chosen over rejection).
    pub fn new(dict: &[Vec<Vec<Vec<u8>>>]) -> ParattiResult<Self> {
        let mut tokens = TokenTable::new();
        let mut trie = PhraseTrie::new();
        // group id -> member phrases, indexed as we merge duplicate-phrase
        // groups together (see merge loop below).
        let mut groups: Vec<Vec<Phrase>> = Vec::new();

        for group in dict {
            if group.is_empty() {
                continue;
            }
            let mut phrases = Vec::with_capacity(group.len());
            let mut merge_into: Option<usize> = None;

            for phrase_tokens in group {
                if phrase_tokens.is_empty() {
                    return Err(ParattiError::InputError(
                        "empty phrase in paraphrase dictionary".into(),
                    ));
                }
                let phrase: Phrase = phrase_tokens
                    .iter()
                    .map(|tok| tokens.intern(tok))
                    .collect();
                if let Some(existing_group) = trie.lookup(&phrase) {
                    merge_into = Some(merge_into.unwrap_or(existing_group as usize));
                }
                phrases.push(phrase);
            }

            let group_id = merge_into.unwrap_or(groups.len());
            if group_id == groups.len() {
                groups.push(Vec::new());
            }
            for phrase in &phrases {
                trie.insert(phrase, group_id as u32);
            }
            groups[group_id].extend(phrases);
        }

        Ok(Self {
            tokens,
            trie,
            groups,
        })
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Look up the id of an already-interned token by its bytes, without
    /// inserting. A word that never appears in any dictionary phrase has no
    /// id here and therefore cannot be part of any match — used by the
    /// builder to translate the input word sequence into this dictionary's
    /// id space without mutating it — `PaRattice` stays read-only after
    /// construction.
    pub fn token_id(&self, bytes: &[u8]) -> Option<TokenId> {
        self.tokens.get(bytes)
    }

    /// Every phrase paraphrastic to `phrase` (siblings in its group, minus
    /// `phrase` itself). Empty if `phrase` is not in the dictionary, or is
    /// the only member of its group.
    pub fn siblings_of(&self, phrase: &[TokenId]) -> Vec<&Phrase> {
        match self.trie.lookup(phrase) {
            Some(group_id) => self.groups[group_id as usize]
                .iter()
                .filter(|p| p.as_slice() != phrase)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every `(end, phrase)` such that `words[start..end]` is a dictionary
    /// phrase, used by the builder to seed and extend the expansion queue
    /// (§4.2 steps 2 and 3).
    pub fn phrases_matching<'a>(
        &'a self,
        words: &'a [TokenId],
        start: usize,
    ) -> impl Iterator<Item = (usize, &'a Phrase)> + 'a {
        self.trie.matches_from(words, start).map(move |(end, group)| {
            let phrase = self.groups[group as usize]
                .iter()
                .find(|p| p.as_slice() == &words[start..end])
                .expect("trie match must correspond to an indexed phrase");
            (end, phrase)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_bytes(groups: &[&[&[&str]]]) -> Vec<Vec<Vec<Vec<u8>>>> {
        groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|phrase| phrase.iter().map(|tok| tok.as_bytes().to_vec()).collect())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn rejects_empty_phrase() {
        let dict = vec![vec![vec![]]];
        assert!(PaRattice::new(&dict).is_err());
    }

    #[test]
    fn siblings_exclude_self() {
        let dict = dict_bytes(&[&[&["a"], &["b"], &["c"]]]);
        let pr = PaRattice::new(&dict).unwrap();
        let a = vec![pr.tokens().get(b"a").unwrap()];
        let siblings = pr.siblings_of(&a);
        assert_eq!(siblings.len(), 2);
    }

    #[test]
    fn singleton_group_has_no_siblings() {
        let dict = dict_bytes(&[&[&["solo"]]]);
        let pr = PaRattice::new(&dict).unwrap();
        let solo = vec![pr.tokens().get(b"solo").unwrap()];
        assert!(pr.siblings_of(&solo).is_empty());
    }

    #[test]
    fn duplicate_phrase_across_groups_merges() {
        let dict = dict_bytes(&[&[&["x"], &["y"]], &[&["x"], &["z"]]]);
        let pr = PaRattice::new(&dict).unwrap();
        let x = vec![pr.tokens().get(b"x").unwrap()];
        let siblings: Vec<String> = pr
            .siblings_of(&x)
            .iter()
            .map(|p| {
                p.iter()
                    .map(|&t| String::from_utf8_lossy(pr.tokens().bytes(t)).into_owned())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect();
        assert_eq!(siblings.len(), 2);
        assert!(siblings.contains(&"y".to_string()));
        assert!(siblings.contains(&"z".to_string()));
    }

    #[test]
    fn phrases_matching_finds_prefixes() {
        let dict = dict_bytes(&[&[&["a", "b"]], &[&["a", "b", "c"]]]);
        let pr = PaRattice::new(&dict).unwrap();
        let words: Vec<TokenId> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| pr.tokens().get(t.as_bytes()).unwrap())
            .collect();
        let matches: Vec<usize> = pr.phrases_matching(&words, 0).map(|(end, _)| end).collect();
        assert_eq!(matches, vec![2, 3]);
    }
}
