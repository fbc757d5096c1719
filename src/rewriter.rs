use std::ops::Range;

use crate::accession::AccessionOccurrences;
use crate::domain::NO_SAMPLE_CLAUSE;
use crate::resolver::ResolvedSampleSet;

/// `(sample_accession="S1" OR sample_accession="S2" ...)`
pub fn sample_disjunction(samples: &[String]) -> String {
    let clauses = samples
        .iter()
        .map(|sample| format!(r#"sample_accession="{sample}""#))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({clauses})")
}

/// Replaces every assembly accession clause of `filter` with the samples it resolved to,
/// or with the `NO_SAMPLE` sentinel when it resolved to none.
///
/// Occurrences are replaced at the span they were found at, and only while the text there
/// still equals the captured clause. Everything else in the filter is copied as is.
pub fn rewrite_filter(
    filter: &str,
    occurrences: &AccessionOccurrences,
    resolved: &ResolvedSampleSet,
) -> String {
    let mut replacements: Vec<(Range<usize>, String)> = Vec::new();
    for (accession, found) in occurrences.iter() {
        let clause = match resolved.samples_for(accession) {
            Some(samples) => sample_disjunction(samples),
            None => NO_SAMPLE_CLAUSE.to_string(),
        };
        for occurrence in found {
            if filter.get(occurrence.span.clone()) == Some(occurrence.verbatim.as_str()) {
                replacements.push((occurrence.span.clone(), clause.clone()));
            }
        }
    }
    replacements.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(filter.len());
    let mut last = 0;
    for (span, clause) in replacements {
        out.push_str(&filter[last..span.start]);
        out.push_str(&clause);
        last = span.end;
    }
    out.push_str(&filter[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accession::extract_accessions;
    use crate::domain::AssemblySampleRow;

    fn resolved(rows: &[(&str, &str)]) -> ResolvedSampleSet {
        let rows = rows
            .iter()
            .map(|(assembly, sample)| AssemblySampleRow {
                assembly_set_accession: assembly.to_string(),
                sample_accession: sample.to_string(),
            })
            .collect::<Vec<_>>();
        ResolvedSampleSet::from_rows(&rows)
    }

    #[test]
    fn single_accession_becomes_sample_disjunction() {
        let filter = "accession=GCA_009859065.2";
        let occurrences = extract_accessions(filter).unwrap();
        let samples = resolved(&[
            ("GCA_009859065.2", "SAMN09946140"),
            ("GCA_009859065.2", "SAMN09946145"),
        ]);
        assert_eq!(
            rewrite_filter(filter, &occurrences, &samples),
            r#"(sample_accession="SAMN09946140" OR sample_accession="SAMN09946145")"#
        );
    }

    #[test]
    fn unresolved_accession_uses_sentinel() {
        let filter = "accession=GCA_009859065.2 AND accession=GCF_009859065.2";
        let occurrences = extract_accessions(filter).unwrap();
        let samples = resolved(&[
            ("GCA_009859065.2", "SAMN09946140"),
            ("GCA_009859065.2", "SAMN0994555"),
        ]);
        assert_eq!(
            rewrite_filter(filter, &occurrences, &samples),
            r#"(sample_accession="SAMN09946140" OR sample_accession="SAMN0994555") AND sample_accession="NO_SAMPLE""#
        );
    }

    #[test]
    fn every_occurrence_gets_the_same_clause() {
        let filter = r#"(accession=GCF_000005845.2 AND tax_id=562) OR accession="GCF_000005845.2""#;
        let occurrences = extract_accessions(filter).unwrap();
        let samples = resolved(&[("GCF_000005845.2", "SAMN1")]);
        assert_eq!(
            rewrite_filter(filter, &occurrences, &samples),
            r#"((sample_accession="SAMN1") AND tax_id=562) OR (sample_accession="SAMN1")"#
        );
    }

    #[test]
    fn prefix_of_longer_version_is_not_touched() {
        let filter = "accession=GCA_009859065.2 OR accession=GCA_009859065.23";
        let occurrences = extract_accessions(filter).unwrap();
        let samples = resolved(&[("GCA_009859065.2", "SAMN1"), ("GCA_009859065.23", "SAMN2")]);
        assert_eq!(
            rewrite_filter(filter, &occurrences, &samples),
            r#"(sample_accession="SAMN1") OR (sample_accession="SAMN2")"#
        );
    }

    #[test]
    fn filter_without_accessions_is_unchanged() {
        let filter = r#"tax_id=7165 AND scientific_name="Anopheles gambiae""#;
        let occurrences = extract_accessions(filter).unwrap();
        assert_eq!(
            rewrite_filter(filter, &occurrences, &ResolvedSampleSet::default()),
            filter
        );
    }
}
