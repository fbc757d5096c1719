use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::AssemblyAccession;
use crate::error::FilterError;

static ACCESSION_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\baccession\s*=\s*("?)(GC[FA]_[0-9]{9}\.[0-9]+)\b("?)"#)
        .expect("accession clause pattern")
});
static BARE_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\baccession\s*=").expect("bare clause pattern"));

/// One `accession=<ID>` clause exactly as written in the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub verbatim: String,
    pub span: Range<usize>,
}

/// Every assembly accession clause found in a filter, keyed by accession.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessionOccurrences {
    entries: BTreeMap<AssemblyAccession, Vec<Occurrence>>,
}

impl AccessionOccurrences {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct accessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_occurrences(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn accessions(&self) -> impl Iterator<Item = &AssemblyAccession> {
        self.entries.keys()
    }

    pub fn occurrences(&self, accession: &AssemblyAccession) -> &[Occurrence] {
        self.entries
            .get(accession)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssemblyAccession, &[Occurrence])> {
        self.entries
            .iter()
            .map(|(accession, occurrences)| (accession, occurrences.as_slice()))
    }

    /// Assembly search query matching every distinct accession.
    pub fn resolver_query(&self) -> String {
        self.entries
            .keys()
            .map(|accession| format!(r#"assembly_set_accession="{accession}""#))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    fn push(&mut self, accession: AssemblyAccession, occurrence: Occurrence) {
        self.entries.entry(accession).or_default().push(occurrence);
    }
}

/// Scans `filter` for assembly accession clauses.
///
/// Fails when any `accession=` clause does not carry a well-formed GCA/GCF accession, so a
/// typo never reaches the network.
pub fn extract_accessions(filter: &str) -> Result<AccessionOccurrences, FilterError> {
    let mut occurrences = AccessionOccurrences::default();
    let mut valid = 0usize;
    for captures in ACCESSION_CLAUSE_RE.captures_iter(filter) {
        let Some(clause) = captures.get(0) else {
            continue;
        };
        let accession: AssemblyAccession = captures[2].parse()?;
        occurrences.push(
            accession,
            Occurrence {
                verbatim: clause.as_str().to_string(),
                span: clause.range(),
            },
        );
        valid += 1;
    }

    let found = BARE_CLAUSE_RE.find_iter(filter).count();
    if found != valid {
        return Err(FilterError::MalformedAccession { found, valid });
    }
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn acc(value: &str) -> AssemblyAccession {
        value.parse().unwrap()
    }

    #[test]
    fn collects_repeated_accession_under_one_key() {
        let filter = r#"accession=GCA_009859065.2 OR (tax_id=1 AND accession = "GCA_009859065.2")"#;
        let found = extract_accessions(filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.total_occurrences(), 2);
        let occurrences = found.occurrences(&acc("GCA_009859065.2"));
        assert_eq!(occurrences[0].verbatim, "accession=GCA_009859065.2");
        assert_eq!(occurrences[1].verbatim, r#"accession = "GCA_009859065.2""#);
        assert_eq!(&filter[occurrences[1].span.clone()], occurrences[1].verbatim);
    }

    #[test]
    fn ignores_other_accession_fields() {
        let found =
            extract_accessions(r#"sample_accession="SAMN1" AND study_accession=PRJNA1"#).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn no_accessions_yields_empty_map() {
        let found = extract_accessions("tax_id=7165 AND library_layout=SINGLE").unwrap();
        assert!(found.is_empty());
        assert_eq!(found.resolver_query(), "");
    }

    #[test]
    fn malformed_accession_fails() {
        let err = extract_accessions("accession=GCA_12.3").unwrap_err();
        assert_matches!(err, FilterError::MalformedAccession { found: 1, valid: 0 });
    }

    #[test]
    fn one_bad_clause_among_good_ones_fails() {
        let err = extract_accessions("accession=GCF_000005845.2 OR accession=SRR014966")
            .unwrap_err();
        assert_matches!(err, FilterError::MalformedAccession { found: 2, valid: 1 });
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        assert!(extract_accessions("accession=GCA_009859065.2x").is_err());
    }

    #[test]
    fn non_ascii_digits_are_malformed() {
        let err = extract_accessions("accession=GCA_٠٠٩٨٥٩٠٦٥.2").unwrap_err();
        assert_matches!(err, FilterError::MalformedAccession { found: 1, valid: 0 });
    }

    #[test]
    fn lower_case_clause_is_normalized() {
        let found = extract_accessions("Accession=gcf_000005845.2").unwrap();
        let occurrences = found.occurrences(&acc("GCF_000005845.2"));
        assert_eq!(occurrences[0].verbatim, "Accession=gcf_000005845.2");
    }

    #[test]
    fn resolver_query_joins_distinct_accessions() {
        let found = extract_accessions(
            "accession=GCF_000005845.2 AND accession=GCA_009859065.2 OR accession=GCF_000005845.2",
        )
        .unwrap();
        assert_eq!(
            found.resolver_query(),
            r#"assembly_set_accession="GCA_009859065.2" OR assembly_set_accession="GCF_000005845.2""#
        );
    }
}
