//! Topological archive: a content-addressed genome-to-identifier mapping
//! persisted as text (§4.7). Each record is two lines — `key <genome>`
//! followed by `id <identifier>`, with blank lines and `#`-prefixed comment
//! lines allowed between records — and the identifier may itself be a
//! comma-separated alias list (e.g. `sra, ABW`, §8 scenario 2). The first
//! non-blank line, if it reads `Made by CrystalNets.jl v<X.Y.Z>`, stamps the
//! archive as produced by this convention; its absence marks the archive
//! "external" (§4.7), meaning its genomes must be re-derived by
//! `recanonicalize` before the identifiers can be trusted.

use crate::analysis::canonical::canonicalize;
use crate::analysis::genome::Genome;
use crate::error::NetError;
use std::collections::HashMap;
use std::str::FromStr;

/// Version stamped on archives this build writes.
pub const STAMP_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Default)]
pub struct Archive {
    by_genome: HashMap<String, String>,
    pub is_external: bool,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, NetError> {
        let mut archive = Archive::new();
        let mut first_nonblank_seen = false;
        let mut pending_key: Option<String> = None;

        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if !first_nonblank_seen {
                first_nonblank_seen = true;
                if line.strip_prefix("Made by CrystalNets.jl v").is_some() {
                    archive.is_external = false;
                    continue;
                }
                archive.is_external = true;
            }

            if line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("key ") {
                if pending_key.is_some() {
                    return Err(NetError::Parse {
                        line: line_no + 1,
                        message: "`key` line without a preceding record's `id` line".to_string(),
                    });
                }
                pending_key = Some(rest.trim().to_string());
                continue;
            }

            if let Some(rest) = line.strip_prefix("id ") {
                let genome_text = pending_key.take().ok_or_else(|| NetError::Parse {
                    line: line_no + 1,
                    message: "`id` line without a preceding `key` line".to_string(),
                })?;
                let identifier = rest.trim().to_string();
                Genome::from_str(&genome_text).map_err(|_| NetError::Parse {
                    line: line_no + 1,
                    message: "unparsable genome text".to_string(),
                })?;
                archive.insert(&genome_text, &identifier)?;
                continue;
            }

            return Err(NetError::Parse {
                line: line_no + 1,
                message: format!("expected a `key` or `id` record line, found `{line}`"),
            });
        }

        if pending_key.is_some() {
            return Err(NetError::Parse {
                line: text.lines().count(),
                message: "archive ends with a `key` line missing its `id`".to_string(),
            });
        }

        Ok(archive)
    }

    /// Inserts a genome/identifier pair. Re-inserting the same pair is
    /// idempotent; binding a genome already registered under a *different*
    /// identifier is rejected as a conflict (§4.7) — use `merge_alias` to
    /// combine names deliberately.
    pub fn insert(&mut self, genome_text: &str, identifier: &str) -> Result<(), NetError> {
        let key = genome_text.trim().to_string();
        match self.by_genome.get(&key) {
            Some(existing) if existing == identifier => Ok(()),
            Some(existing) => Err(NetError::ArchiveFormat(format!(
                "genome already registered under `{existing}`, refusing to also bind `{identifier}`"
            ))),
            None => {
                self.by_genome.insert(key, identifier.to_string());
                Ok(())
            }
        }
    }

    /// Merges `identifier` into the alias list already bound to
    /// `genome_text`, concatenating with `", "` (§4.7), without raising a
    /// conflict. If the genome is not yet known, binds it directly.
    pub fn merge_alias(&mut self, genome_text: &str, identifier: &str) {
        let key = genome_text.trim().to_string();
        match self.by_genome.get_mut(&key) {
            Some(existing) => {
                if !existing.split(',').map(str::trim).any(|name| name == identifier) {
                    existing.push_str(", ");
                    existing.push_str(identifier);
                }
            }
            None => {
                self.by_genome.insert(key, identifier.to_string());
            }
        }
    }

    /// The identifier string bound to `genome_text`, as stored — a plain
    /// name or a comma-separated alias list (§8 scenario 2's `sra, ABW`).
    pub fn lookup(&self, genome_text: &str) -> Option<&str> {
        self.by_genome.get(genome_text.trim()).map(String::as_str)
    }

    /// The genome text whose identifier (or one of its aliases) is `name`.
    pub fn reverse_lookup(&self, name: &str) -> Option<&str> {
        self.by_genome
            .iter()
            .find(|(_, identifier)| identifier.split(',').map(str::trim).any(|n| n == name))
            .map(|(genome, _)| genome.as_str())
    }

    /// The other names aliased to `name`'s entry, if any.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        self.by_genome
            .values()
            .find(|identifier| identifier.split(',').map(str::trim).any(|n| n == name))
            .map(|identifier| {
                identifier
                    .split(',')
                    .map(str::trim)
                    .filter(|n| *n != name)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Re-derives every stored genome by parsing it back into a periodic
    /// graph and recomputing its canonical form, re-keying the archive under
    /// the recomputed genome while keeping the original identifier (§4.7:
    /// "external" archives — ones without this build's version stamp — may
    /// use a different canonicalization convention and must be re-derived
    /// before their keys can be trusted).
    pub fn recanonicalize(&mut self) -> Result<(), NetError> {
        let stored = std::mem::take(&mut self.by_genome);
        for (genome_text, identifier) in stored {
            let parsed = Genome::from_str(&genome_text)
                .map_err(|_| NetError::ArchiveFormat(format!("unparsable stored genome `{genome_text}`")))?;
            let canonical = canonicalize(&parsed.to_graph())?;
            let recomputed: Genome = canonical.into();
            self.by_genome.insert(recomputed.to_string(), identifier);
        }
        self.is_external = false;
        Ok(())
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Made by CrystalNets.jl v{STAMP_VERSION}\n"));
        let mut entries: Vec<(&String, &String)> = self.by_genome.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        for (genome, identifier) in entries {
            out.push_str("key ");
            out.push_str(genome);
            out.push('\n');
            out.push_str("id ");
            out.push_str(identifier);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIA: &str = "3 1 1 1 0 0 1 1 0 1 0 1 1 0 0 1";

    #[test]
    fn looks_up_an_inserted_genome() {
        let mut archive = Archive::new();
        archive.insert(DIA, "dia").unwrap();
        assert_eq!(archive.lookup(DIA), Some("dia"));
        assert_eq!(archive.reverse_lookup("dia"), Some(DIA));
    }

    #[test]
    fn rejects_a_conflicting_rebind() {
        let mut archive = Archive::new();
        archive.insert(DIA, "dia").unwrap();
        assert!(archive.insert(DIA, "dia-b").is_err());
    }

    #[test]
    fn round_trips_through_its_text_format() {
        let mut archive = Archive::new();
        archive.insert(DIA, "dia").unwrap();
        let text = archive.serialize();
        let reloaded = Archive::parse(&text).unwrap();
        assert_eq!(reloaded.lookup(DIA), Some("dia"));
        assert!(!reloaded.is_external, "an archive we just wrote is never external");
    }

    #[test]
    fn an_archive_with_no_version_stamp_is_flagged_external() {
        let archive = Archive::parse(&format!("key {DIA}\nid dia\n")).unwrap();
        assert!(archive.is_external);
    }

    #[test]
    fn a_compound_identifier_parses_and_prints_as_one_record() {
        // §8 scenario 2: ABW.cif resolves to the compound identifier
        // `sra, ABW`, which the archive must store and report verbatim.
        let text = format!("Made by CrystalNets.jl v0.1.0\nkey {DIA}\nid sra, ABW\n");
        let archive = Archive::parse(&text).unwrap();
        assert_eq!(archive.lookup(DIA), Some("sra, ABW"));
        assert!(!archive.is_external);
    }

    #[test]
    fn merge_alias_never_conflicts() {
        let mut archive = Archive::new();
        archive.insert(DIA, "dia").unwrap();
        archive.merge_alias(DIA, "cristobalite-like");
        assert_eq!(archive.lookup(DIA), Some("dia, cristobalite-like"));
        assert_eq!(archive.aliases_of("dia"), vec!["cristobalite-like".to_string()]);
    }

    #[test]
    fn an_external_archive_is_recanonicalized_to_this_builds_convention() {
        // An archive read without this build's stamp is "external" (§4.7):
        // its key may not already be in this build's canonical form, so
        // `recanonicalize` must re-derive it from the graph the key encodes,
        // not just re-stamp the text as-is.
        let text = format!("key {DIA}\nid dia\n");
        let mut archive = Archive::parse(&text).unwrap();
        assert!(archive.is_external);

        let expected: Genome = canonicalize(&Genome::from_str(DIA).unwrap().to_graph()).unwrap().into();

        archive.recanonicalize().unwrap();
        assert!(!archive.is_external);
        assert_eq!(archive.lookup(&expected.to_string()), Some("dia"));
    }
}
