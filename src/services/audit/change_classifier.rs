// Change Classifier
// Projects alignment ops onto per-unit change records.

use crate::error::{AuditError, AuditResult};
use crate::models::{AlignmentOp, ChangeKind, ChangeRecord, OpKind, UnitRef};
use tracing::error;

/// Check that `ops` partition `[0, source_len)` and `[0, target_len)` in order,
/// and that every op's span lengths agree with its kind.
pub fn validate_ops(ops: &[AlignmentOp], source_len: usize, target_len: usize) -> AuditResult<()> {
    let (mut next_source, mut next_target) = (0usize, 0usize);

    for (idx, op) in ops.iter().enumerate() {
        if op.source.end < op.source.start || op.target.end < op.target.start {
            return Err(violation(format!("op {} has a negative span: {:?}", idx, op)));
        }
        if op.source.start != next_source || op.target.start != next_target {
            return Err(violation(format!(
                "op {} starts at ({}, {}) but previous op ended at ({}, {})",
                idx, op.source.start, op.target.start, next_source, next_target
            )));
        }

        let (k, l) = (op.source.len(), op.target.len());
        let consistent = match op.kind {
            OpKind::Equal => k == l && k > 0,
            OpKind::Replace => k > 0 && l > 0,
            OpKind::Delete => k > 0 && l == 0,
            OpKind::Insert => k == 0 && l > 0,
        };
        if !consistent {
            return Err(violation(format!(
                "op {} {:?} spans {} source / {} target units",
                idx, op.kind, k, l
            )));
        }

        next_source = op.source.end;
        next_target = op.target.end;
    }

    if next_source != source_len || next_target != target_len {
        return Err(violation(format!(
            "ops cover ({}, {}) of ({}, {}) units",
            next_source, next_target, source_len, target_len
        )));
    }
    Ok(())
}

fn violation(message: String) -> AuditError {
    error!(detail = %message, "classifier.contract_violation");
    AuditError::ContractViolation(message)
}

/// Turn validated ops into change records, one per unit (or unit pair).
///
/// Replace blocks pair units positionally; surplus source units become `Removed`
/// and surplus target units become `Added`.
pub fn classify<S: AsRef<str>>(
    ops: &[AlignmentOp],
    source: &[S],
    target: &[S],
) -> AuditResult<Vec<ChangeRecord>> {
    validate_ops(ops, source.len(), target.len())?;

    let unit = |units: &[S], index: usize| UnitRef {
        index,
        text: units[index].as_ref().to_string(),
    };

    let mut records = Vec::with_capacity(source.len().max(target.len()));
    for op in ops {
        let (k, l) = (op.source.len(), op.target.len());
        for offset in 0..k.max(l) {
            let s = (offset < k).then(|| unit(source, op.source.start + offset));
            let t = (offset < l).then(|| unit(target, op.target.start + offset));
            let kind = match (op.kind, &s, &t) {
                (OpKind::Equal, _, _) => ChangeKind::Unchanged,
                (_, Some(_), Some(_)) => ChangeKind::Modified,
                (_, Some(_), None) => ChangeKind::Removed,
                _ => ChangeKind::Added,
            };
            let position = s
                .as_ref()
                .map(|u| u.index)
                .or_else(|| t.as_ref().map(|u| u.index))
                .unwrap_or(op.source.start);
            records.push(ChangeRecord {
                kind,
                source: s,
                target: t,
                position,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{count_kind, Span};
    use crate::services::audit::aligner::align;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_equal_and_modified() {
        let a = vec!["The cat sat.", "The dog ran."];
        let b = vec!["The cat sat.", "The dog ran quickly."];
        let records = classify(&align(&a, &b), &a, &b).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ChangeKind::Unchanged);
        assert_eq!(records[1].kind, ChangeKind::Modified);
        assert_eq!(records[1].source_text(), Some("The dog ran."));
        assert_eq!(records[1].target_text(), Some("The dog ran quickly."));
        assert_eq!(records[1].position, 1);
    }

    #[test]
    fn test_replace_overflow_degrades_to_add_and_remove() {
        let a = vec!["x", "y", "z"];
        let b = vec!["p"];
        let ops = vec![AlignmentOp::replace(Span::new(0, 3), Span::new(0, 1))];
        let records = classify(&ops, &a, &b).unwrap();
        let kinds: Vec<ChangeKind> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Modified, ChangeKind::Removed, ChangeKind::Removed]);
        assert_eq!(records[2].position, 2);

        let ops = vec![AlignmentOp::replace(Span::new(0, 1), Span::new(0, 3))];
        let records = classify(&ops, &b, &a).unwrap();
        let kinds: Vec<ChangeKind> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Modified, ChangeKind::Added, ChangeKind::Added]);
        assert_eq!(records[2].target_text(), Some("z"));
    }

    #[test]
    fn test_empty_target_is_all_removed() {
        let a = vec!["one", "two", "three"];
        let b: Vec<&str> = vec![];
        let records = classify(&align(&a, &b), &a, &b).unwrap();
        assert_eq!(count_kind(&records, ChangeKind::Removed), 3);
        assert!(records.iter().all(|r| r.target.is_none()));
    }

    #[test]
    fn test_insert_position_uses_target_index() {
        let a: Vec<&str> = vec![];
        let b = vec!["new", "words"];
        let records = classify(&align(&a, &b), &a, &b).unwrap();
        assert_eq!(records[1].kind, ChangeKind::Added);
        assert_eq!(records[1].position, 1);
    }

    #[test]
    fn test_gap_between_ops_is_contract_violation() {
        let a = vec!["a", "b"];
        let ops = vec![
            AlignmentOp::equal(Span::new(0, 1), Span::new(0, 1)),
            AlignmentOp::equal(Span::new(2, 2), Span::new(1, 1)),
        ];
        assert!(matches!(classify(&ops, &a, &a), Err(AuditError::ContractViolation(_))));
    }

    #[test]
    fn test_incomplete_cover_is_contract_violation() {
        let a = vec!["a", "b"];
        let ops = vec![AlignmentOp::equal(Span::new(0, 1), Span::new(0, 1))];
        assert!(matches!(classify(&ops, &a, &a), Err(AuditError::ContractViolation(_))));
    }

    #[test]
    fn test_negative_span_is_contract_violation() {
        let a = vec!["a"];
        let ops = vec![AlignmentOp::delete(Span::new(1, 0), 0)];
        assert!(matches!(
            validate_ops(&ops, 1, 0),
            Err(AuditError::ContractViolation(_))
        ));
        assert!(classify(&ops, &a, &[] as &[&str]).is_err());
    }

    #[test]
    fn test_unequal_equal_op_is_contract_violation() {
        let a = vec!["a", "b"];
        let b = vec!["a"];
        let ops = vec![AlignmentOp::equal(Span::new(0, 2), Span::new(0, 1))];
        assert!(matches!(classify(&ops, &a, &b), Err(AuditError::ContractViolation(_))));
    }
}
