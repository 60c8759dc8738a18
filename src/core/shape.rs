use crate::core::error::{ReportError, Result};
use crate::core::model::{Direction, Layout, Metrics, Report, ReportRow, SampleRecord, Sides};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

impl Layout {
    pub fn transform(self, records: &[SampleRecord]) -> Result<Report> {
        let mut rows = match self {
            Layout::Flat => flat(records),
            Layout::Pivot => pivot(&keyed(records))?,
            Layout::OuterJoin => outer_join(&keyed(records)),
        };
        // Stable: equal ids keep input order.
        rows.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));
        debug!(
            layout = self.as_str(),
            records = records.len(),
            rows = rows.len(),
            "shaped report"
        );
        Ok(Report { layout: self, rows })
    }
}

/// A record that carries a base id and a direction.
struct Keyed<'a> {
    base: &'a str,
    direction: Direction,
    metrics: Metrics,
}

fn keyed(records: &[SampleRecord]) -> Vec<Keyed<'_>> {
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        match (&r.base_id, r.direction) {
            (Some(base), Some(direction)) => out.push(Keyed {
                base,
                direction,
                metrics: r.metrics,
            }),
            _ => warn!(
                sample_id = %r.sample_id,
                "no R1/R2 marker in sample id; row left out of paired report"
            ),
        }
    }
    out
}

fn flat(records: &[SampleRecord]) -> Vec<ReportRow> {
    records
        .iter()
        .map(|r| ReportRow {
            sample_id: r.sample_id.clone(),
            sides: Sides::Single(r.metrics),
        })
        .collect()
}

fn pivot(records: &[Keyed<'_>]) -> Result<Vec<ReportRow>> {
    let mut groups: BTreeMap<&str, [Option<Metrics>; 2]> = BTreeMap::new();
    for r in records {
        let slot = &mut groups.entry(r.base).or_default()[slot_of(r.direction)];
        if slot.is_some() {
            return Err(ReportError::Validation(format!(
                "duplicate {} entry for sample '{}'",
                r.direction.as_str(),
                r.base
            )));
        }
        *slot = Some(r.metrics);
    }
    Ok(groups
        .into_iter()
        .map(|(base, [r1, r2])| ReportRow {
            sample_id: base.to_string(),
            sides: Sides::Paired { r1, r2 },
        })
        .collect())
}

fn outer_join(records: &[Keyed<'_>]) -> Vec<ReportRow> {
    let (left, right): (Vec<&Keyed<'_>>, Vec<&Keyed<'_>>) =
        records.iter().partition(|r| r.direction == Direction::R1);

    let mut right_by_key: BTreeMap<&str, Vec<Metrics>> = BTreeMap::new();
    for r in &right {
        right_by_key.entry(r.base).or_default().push(r.metrics);
    }

    let left_keys: BTreeSet<&str> = left.iter().map(|l| l.base).collect();
    let mut rows = Vec::with_capacity(left.len().max(right.len()));
    for l in &left {
        match right_by_key.get(l.base) {
            Some(matches) => {
                for m in matches {
                    rows.push(paired(l.base, Some(l.metrics), Some(*m)));
                }
            }
            None => rows.push(paired(l.base, Some(l.metrics), None)),
        }
    }
    for r in right.iter().filter(|r| !left_keys.contains(r.base)) {
        rows.push(paired(r.base, None, Some(r.metrics)));
    }
    rows
}

fn paired(base: &str, r1: Option<Metrics>, r2: Option<Metrics>) -> ReportRow {
    ReportRow {
        sample_id: base.to_string(),
        sides: Sides::Paired { r1, r2 },
    }
}

fn slot_of(direction: Direction) -> usize {
    match direction {
        Direction::R1 => 0,
        Direction::R2 => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::IdSplitter;

    fn metrics(reads: u64) -> Metrics {
        Metrics {
            reads,
            mean_len: 150.0,
            q20_pct: 95.0,
            q30_pct: 90.0,
            gc_pct: 45.0,
        }
    }

    fn rec(id: &str, reads: u64) -> SampleRecord {
        let splitter = IdSplitter::new('_').unwrap();
        let split = splitter.split(id);
        SampleRecord {
            sample_id: id.to_string(),
            base_id: split.map(|(b, _)| b.to_string()),
            direction: split.map(|(_, d)| d),
            metrics: metrics(reads),
        }
    }

    fn ids(report: &Report) -> Vec<&str> {
        report.rows.iter().map(|r| r.sample_id.as_str()).collect()
    }

    #[test]
    fn flat_sorts_by_full_id() {
        let recs = vec![rec("B_R1_001", 1), rec("A_R2_001", 2), rec("A_R1_001", 3)];
        let report = Layout::Flat.transform(&recs).unwrap();
        assert_eq!(ids(&report), vec!["A_R1_001", "A_R2_001", "B_R1_001"]);
        assert_eq!(report.rows[0].sides, Sides::Single(metrics(3)));
    }

    #[test]
    fn flat_keeps_rows_without_marker_and_is_stable() {
        let recs = vec![rec("S", 1), rec("A", 2), rec("S", 3)];
        let report = Layout::Flat.transform(&recs).unwrap();
        assert_eq!(ids(&report), vec!["A", "S", "S"]);
        assert_eq!(report.rows[1].sides, Sides::Single(metrics(1)));
        assert_eq!(report.rows[2].sides, Sides::Single(metrics(3)));
    }

    #[test]
    fn outer_join_pairs_r1_and_r2() {
        let recs = vec![rec("SampleA_R1_001", 100), rec("SampleA_R2_001", 110)];
        let report = Layout::OuterJoin.transform(&recs).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].sample_id, "SampleA");
        assert_eq!(
            report.rows[0].sides,
            Sides::Paired {
                r1: Some(metrics(100)),
                r2: Some(metrics(110))
            }
        );
    }

    #[test]
    fn outer_join_keeps_one_sided_samples() {
        let recs = vec![
            rec("C_R2_001", 1),
            rec("A_R1_001", 2),
            rec("B_R1_001", 3),
            rec("B_R2_001", 4),
        ];
        let report = Layout::OuterJoin.transform(&recs).unwrap();
        assert_eq!(ids(&report), vec!["A", "B", "C"]);
        assert_eq!(
            report.rows[0].sides,
            Sides::Paired {
                r1: Some(metrics(2)),
                r2: None
            }
        );
        assert_eq!(
            report.rows[2].sides,
            Sides::Paired {
                r1: None,
                r2: Some(metrics(1))
            }
        );
        let r1 = recs.iter().filter(|r| r.direction == Some(Direction::R1)).count();
        let r2 = recs.len() - r1;
        assert!(report.rows.len() >= r1.max(r2));
    }

    #[test]
    fn outer_join_duplicates_join_many_to_many_in_input_order() {
        let recs = vec![rec("A_R1_001", 1), rec("A_R1_002", 2), rec("A_R2_001", 3)];
        let report = Layout::OuterJoin.transform(&recs).unwrap();
        assert_eq!(ids(&report), vec!["A", "A"]);
        assert_eq!(
            report.rows[0].sides,
            Sides::Paired {
                r1: Some(metrics(1)),
                r2: Some(metrics(3))
            }
        );
        assert_eq!(
            report.rows[1].sides,
            Sides::Paired {
                r1: Some(metrics(2)),
                r2: Some(metrics(3))
            }
        );
    }

    #[test]
    fn paired_layouts_drop_rows_without_marker() {
        let recs = vec![rec("Undetermined", 1), rec("A_R1_001", 2)];
        for layout in [Layout::Pivot, Layout::OuterJoin] {
            let report = layout.transform(&recs).unwrap();
            assert_eq!(ids(&report), vec!["A"]);
        }
    }

    #[test]
    fn pivot_groups_by_base_id() {
        let recs = vec![rec("B_R2_001", 1), rec("A_R1_001", 2), rec("B_R1_001", 3)];
        let report = Layout::Pivot.transform(&recs).unwrap();
        assert_eq!(ids(&report), vec!["A", "B"]);
        assert_eq!(
            report.rows[1].sides,
            Sides::Paired {
                r1: Some(metrics(3)),
                r2: Some(metrics(1))
            }
        );
    }

    #[test]
    fn pivot_rejects_duplicate_direction() {
        let recs = vec![rec("A_R1_001", 1), rec("A_R1_002", 2)];
        let err = Layout::Pivot.transform(&recs).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn transforms_are_repeatable() {
        let recs = vec![
            rec("C_R2_001", 1),
            rec("A_R1_001", 2),
            rec("B_R1_001", 3),
            rec("A_R2_001", 4),
        ];
        for layout in [Layout::Flat, Layout::Pivot, Layout::OuterJoin] {
            let first = layout.transform(&recs).unwrap();
            let second = layout.transform(&recs).unwrap();
            assert_eq!(first, second);
        }
    }
}
