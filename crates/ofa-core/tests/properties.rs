//! Property tests for the row-preserving join and the Pareto flag.

use ofa_core::{SourceSet, fuse, pareto_flags};
use ofa_model::{PipelineConfig, SourceKind};
use polars::prelude::*;
use proptest::prelude::*;

fn codes(ids: &[u8]) -> Vec<String> {
    ids.iter().map(|id| format!("S{id}")).collect()
}

fn inventory(ids: &[u8]) -> DataFrame {
    let site_ids: Vec<i64> = ids.iter().map(|id| i64::from(*id)).collect();
    df! {
        "code oci id" => site_ids,
        "code oci" => codes(ids),
        "autre code" => codes(ids),
        "mois" => vec!["2023-03"; ids.len()],
    }
    .unwrap()
}

fn right(kind: SourceKind, ids: &[u8]) -> DataFrame {
    let payload: Vec<f64> = (0..ids.len()).map(|i| i as f64).collect();
    match kind {
        SourceKind::Revenue | SourceKind::TrafficV2 => {
            let site_ids: Vec<i64> = ids.iter().map(|id| i64::from(*id)).collect();
            df! { "id_site" => site_ids, "payload" => payload }.unwrap()
        }
        SourceKind::TowerOperatorCost => df! {
            "site id ihs" => codes(ids),
            "mois" => vec!["2023-03"; ids.len()],
            "payload" => payload,
        }
        .unwrap(),
        SourceKind::CoLocationCost => df! { "code site" => codes(ids), "payload" => payload }.unwrap(),
        _ => df! { "code_site" => codes(ids), "payload" => payload }.unwrap(),
    }
}

proptest! {
    #[test]
    fn fusion_preserves_inventory_rows(
        left in prop::collection::vec(0u8..20, 0..25),
        others in prop::collection::vec(prop::collection::vec(0u8..20, 0..25), 7),
    ) {
        let mut sources = SourceSet::new().with(SourceKind::Inventory, inventory(&left));
        for (kind, ids) in SourceKind::JOIN_ORDER.into_iter().zip(&others) {
            sources.insert(kind, right(kind, ids));
        }

        let fused = fuse(&sources, &PipelineConfig::default()).unwrap();
        prop_assert_eq!(fused.height(), left.len());

        let order: Vec<Option<String>> = fused
            .frame
            .column("code oci")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        let expected: Vec<Option<String>> = codes(&left).into_iter().map(Some).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn pareto_flags_dominate_unflagged_rows(
        revenue in prop::collection::vec(prop::option::of(0.0f64..1e7), 0..40),
        share in 0.05f64..=1.0,
    ) {
        let flags = pareto_flags(&revenue, share);
        prop_assert_eq!(flags.len(), revenue.len());

        for (i, flagged) in flags.iter().enumerate() {
            for (j, other) in flags.iter().enumerate() {
                if *flagged && !*other
                    && let (Some(a), Some(b)) = (revenue[i], revenue[j])
                {
                    prop_assert!(a >= b, "flagged {a} below unflagged {b}");
                }
            }
        }

        let total: f64 = revenue.iter().flatten().sum();
        if total > 0.0 {
            prop_assert!(flags.iter().any(|flag| *flag));
        }
        // missing revenue ranks last, once the whole total is behind it
        for (value, flag) in revenue.iter().zip(&flags) {
            if value.is_none() && total > 0.0 {
                prop_assert!(!flag);
            }
        }
    }
}
