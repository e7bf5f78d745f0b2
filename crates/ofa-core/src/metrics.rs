//! Derived KPIs.
//!
//! Every formula is a row-wise expression except the Pareto flag, the
//! traffic-weighted call success and NUR, which normalize against the whole
//! table.
//!
//! # Undefined values
//!
//! A ratio is null when either side is null and `NaN` when the denominator is
//! zero. Classifications never compare an undefined input: they fall through
//! to their "undefined" label instead (see [`derive_metrics`]).

use ofa_common::any_to_f64;
use ofa_model::{
    CommercialSegment, Period, ProfitabilityLevel, ProfitabilitySegment, Recommendation, Result,
    Rules, SegmentRules, ThresholdSet,
};
use polars::prelude::*;

const TECHNOLOGIES: [&str; 3] = ["2g", "3g", "4g"];

const SECONDS_PER_DAY: f64 = 86_400.0;
const NUR_SCALE: f64 = 100_000.0;

/// Appends every derived column to the projected table.
///
/// Undefined inputs classify as: `segment` null, `segmentation_rentabilite`
/// `Unknown`, `recommandation` technical, `rentable` and
/// `niveau_rentabilite` null.
pub fn derive_metrics(
    projected: &DataFrame,
    rules: &Rules,
    thresholds: &ThresholdSet,
    period: Period,
) -> Result<DataFrame> {
    let base = projected
        .clone()
        .lazy()
        .with_columns([
            tech_sum("trafic_voix_{t}").alias("trafic_voix_total"),
            tech_sum("trafic_data_{t}").alias("trafic_data_total"),
            (col("ca_voix") + col("ca_data")).alias("ca_total"),
        ])
        .with_columns([commercial_segment(&rules.segment)])
        .collect()?;

    let flags = pareto_flags(&revenue_values(&base)?, rules.pareto_share);
    let mut with_pareto = base;
    with_pareto.with_column(Column::new("pareto".into(), flags))?;

    let enriched = with_pareto
        .lazy()
        .with_columns([
            tech_sum("cellules_{t}_congestionnees").alias("cellules_congestionnees_total"),
            tech_sum("cellules_congestionne_v2_{t}").alias("cellules_congestionnees_total_v2"),
            tech_sum("cellules_{t}").alias("cellules_total"),
            tech_sum("cellules_v2_{t}").alias("cellules_total_v2"),
        ])
        .with_columns(congestion_rates("cellules_{t}_congestionnees", "cellules_{t}", ""))
        .with_columns(congestion_rates(
            "cellules_congestionne_v2_{t}",
            "cellules_v2_{t}",
            "_v2",
        ))
        .with_columns([
            recommendation("taux_congestion_total", rules.recommendation_threshold)
                .alias("recommandation"),
            recommendation("taux_congestion_total_v2", rules.recommendation_threshold)
                .alias("recommandation_v2"),
            ratio(col("ca_total"), col("parc_global")).alias("arpu"),
        ])
        .with_columns([
            profitability_segment("taux_congestion_4g", rules).alias("segmentation_rentabilite"),
            profitability_segment("taux_congestion_4g_v2", rules)
                .alias("segmentation_rentabilite_v2"),
            weighted_cssr("avg_cssr_cs_2g", "trafic_voix_2g").alias("cssr_pondere_trafic_2g"),
            weighted_cssr("avg_cssr_cs_3g", "trafic_voix_3g").alias("cssr_pondere_trafic_3g"),
            weighted_cssr("avg_cssr_cs_2g", "trafic_voix_v2_2g")
                .alias("cssr_pondere_trafic_2g_v2"),
            weighted_cssr("avg_cssr_cs_3g", "trafic_voix_v2_3g")
                .alias("cssr_pondere_trafic_3g_v2"),
        ])
        .with_columns(profit_and_loss_costs(thresholds))
        .with_columns([
            (col("opex_itn") + col("interco") + col("impot") + col("frais_dist")).alias("opex"),
        ])
        .with_columns([
            (col("opex") - col("opex_itn")).alias("autre_opex"),
            (col("ca_total") - col("opex")).alias("ebitda"),
        ])
        .with_columns([ratio(col("ebitda"), col("ca_total")).alias("marge_ca")])
        .with_columns([
            profitable(thresholds.seuil_rentabilite).alias("rentable"),
            profitability_level(thresholds.seuil_rentabilite).alias("niveau_rentabilite"),
        ])
        .with_columns(nur(period.days_in_month()))
        .with_columns([
            tech_sum("nur_{t}").alias("nur_total"),
            tech_sum("nur_{t}_v2").alias("nur_total_v2"),
        ])
        .collect()?;

    Ok(enriched)
}

/// `n / d`, null if either side is null, `NaN` if `d` is zero.
pub fn ratio(numerator: Expr, denominator: Expr) -> Expr {
    when(
        numerator
            .clone()
            .is_not_null()
            .and(denominator.clone().eq(lit(0.0))),
    )
    .then(lit(f64::NAN))
    .otherwise(numerator / denominator)
}

/// Not null and not `NaN`.
fn defined(expr: Expr) -> Expr {
    expr.clone().is_not_null().and(expr.is_not_nan())
}

/// Sum over the technologies of a column pattern, `{t}` standing for `2g`, `3g`, `4g`.
///
/// A null term makes the sum null.
fn tech_sum(pattern: &str) -> Expr {
    TECHNOLOGIES
        .iter()
        .map(|tech| col(pattern.replace("{t}", tech)))
        .reduce(|acc, next| acc + next)
        .unwrap_or_else(|| lit(0.0))
}

/// Per-technology congestion rates followed by their sum, `{t}` as in [`tech_sum`].
fn congestion_rates(congested: &str, cells: &str, suffix: &str) -> Vec<Expr> {
    let rates: Vec<Expr> = TECHNOLOGIES
        .iter()
        .map(|tech| {
            ratio(
                col(congested.replace("{t}", tech)),
                col(cells.replace("{t}", tech)),
            )
        })
        .collect();
    let total = rates
        .iter()
        .cloned()
        .reduce(|acc, next| acc + next)
        .unwrap_or_else(|| lit(0.0))
        .alias(format!("taux_congestion_total{suffix}"));

    let mut exprs: Vec<Expr> = rates
        .into_iter()
        .zip(TECHNOLOGIES)
        .map(|(rate, tech)| rate.alias(format!("taux_congestion_{tech}{suffix}")))
        .collect();
    exprs.push(total);
    exprs
}

fn matches_any(value: Expr, aliases: &[String]) -> Expr {
    aliases
        .iter()
        .map(|alias| value.clone().eq(lit(alias.to_lowercase())))
        .reduce(|acc, next| acc.or(next))
        .unwrap_or_else(|| lit(false))
}

/// PREMIUM / NORMAL / A DEVELOPER from geography and total revenue.
///
/// Rows outside both geographies, or without revenue, stay null.
fn commercial_segment(rules: &SegmentRules) -> Expr {
    let place = col("localisation").str().to_lowercase();
    let capital = matches_any(place.clone(), &rules.capital_aliases);
    let interior = matches_any(place, &rules.interior_aliases);
    let revenue = col("ca_total");

    let tier = |lower: Option<f64>, upper: Option<f64>| {
        let mut cond = lit(true);
        if let Some(lower) = lower {
            cond = cond.and(revenue.clone().gt_eq(lit(lower)));
        }
        if let Some(upper) = upper {
            cond = cond.and(revenue.clone().lt(lit(upper)));
        }
        cond
    };

    let (cap, int) = (rules.capital, rules.interior);
    let premium = capital
        .clone()
        .and(tier(Some(cap.premium), None))
        .or(interior.clone().and(tier(Some(int.premium), None)));
    let normal = capital
        .clone()
        .and(tier(Some(cap.normal), Some(cap.premium)))
        .or(interior.clone().and(tier(Some(int.normal), Some(int.premium))));
    let develop = capital
        .and(tier(None, Some(cap.normal)))
        .or(interior.and(tier(None, Some(int.normal))));

    let known = defined(col("ca_total"));
    when(known.clone().and(premium))
        .then(lit(CommercialSegment::Premium.label()))
        .when(known.clone().and(normal))
        .then(lit(CommercialSegment::Normal.label()))
        .when(known.and(develop))
        .then(lit(CommercialSegment::ToDevelop.label()))
        .otherwise(lit(NULL).cast(DataType::String))
        .alias("segment")
}

fn revenue_values(df: &DataFrame) -> Result<Vec<Option<f64>>> {
    let column = df.column("ca_total")?;
    let mut values = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        values.push(any_to_f64(column.get(idx)?).filter(|v| !v.is_nan()));
    }
    Ok(values)
}

/// Pareto membership of each row, in input order.
///
/// Rows are ranked by revenue, highest first, ties kept in input order and
/// missing revenue last. A row is flagged while the revenue of the rows
/// ranked before it stays strictly below `share` of the total.
pub fn pareto_flags(revenue: &[Option<f64>], share: f64) -> Vec<bool> {
    let mut order: Vec<usize> = (0..revenue.len()).collect();
    order.sort_by(|&a, &b| match (revenue[a], revenue[b]) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    // ranking order: the last running sum equals the total
    let total: f64 = order.iter().map(|&idx| revenue[idx].unwrap_or(0.0)).sum();
    let cutoff = share * total;
    let mut flags = vec![false; revenue.len()];
    let mut before = 0.0;
    for idx in order {
        flags[idx] = revenue[idx].is_some() && before < cutoff;
        before += revenue[idx].unwrap_or(0.0);
    }
    flags
}

fn recommendation(total_rate: &str, threshold: f64) -> Expr {
    let rate = col(total_rate);
    when(defined(rate.clone()).and(rate.lt_eq(lit(threshold))))
        .then(lit(Recommendation::Commercial.label()))
        .otherwise(lit(Recommendation::Technical.label()))
}

fn profitability_segment(congestion_4g: &str, rules: &Rules) -> Expr {
    let arpu = col("arpu");
    let rate = col(congestion_4g);
    let high_arpu = arpu.clone().gt_eq(lit(rules.profitability.arpu_threshold));
    let congested = rate
        .clone()
        .gt_eq(lit(rules.profitability.congestion_4g_threshold));
    let label = |high, cong| lit(ProfitabilitySegment::classify(high, cong).label());

    when(defined(arpu).not().or(defined(rate).not()))
        .then(lit(ProfitabilitySegment::Unknown.label()))
        .when(high_arpu.clone().and(congested.clone()))
        .then(label(true, true))
        .when(high_arpu)
        .then(label(true, false))
        .when(congested)
        .then(label(false, true))
        .otherwise(label(false, false))
}

/// Call success weighted by the row's share of the table's voice traffic.
fn weighted_cssr(cssr: &str, traffic: &str) -> Expr {
    ratio(col(cssr) * col(traffic), col(traffic).sum()) / lit(100.0)
}

fn profit_and_loss_costs(thresholds: &ThresholdSet) -> Vec<Expr> {
    vec![
        (col("ca_voix") * lit(thresholds.intercos)).alias("interco"),
        (col("ca_total") * lit(thresholds.impot)).alias("impot"),
        (col("ca_total") * lit(thresholds.frais_distribution)).alias("frais_dist"),
    ]
}

fn profitable(threshold: f64) -> Expr {
    let margin = col("marge_ca");
    when(defined(margin.clone()))
        .then(margin.gt(lit(threshold)))
        .otherwise(lit(NULL).cast(DataType::Boolean))
}

fn profitability_level(threshold: f64) -> Expr {
    let margin = col("marge_ca");
    when(defined(margin.clone()).not())
        .then(lit(NULL).cast(DataType::String))
        .when(margin.clone().lt_eq(lit(0.0)))
        .then(lit(ProfitabilityLevel::Negative.label()))
        .when(margin.gt_eq(lit(threshold)))
        .then(lit(ProfitabilityLevel::Profitable.label()))
        .otherwise(lit(ProfitabilityLevel::Unprofitable.label()))
}

/// Network unavailability ratio per technology, against the table-wide cell count.
///
/// The v1 ratios come first, then the v2 ones.
fn nur(days_in_month: u32) -> Vec<Expr> {
    let period_seconds = SECONDS_PER_DAY * f64::from(days_in_month);
    let mut exprs = Vec::with_capacity(6);
    for (cells, suffix) in [("cellules_{t}", ""), ("cellules_v2_{t}", "_v2")] {
        for tech in TECHNOLOGIES {
            let unavailable = lit(NUR_SCALE)
                * col(format!("nbrecellule_{tech}"))
                * col(format!("delaycellule_{tech}"));
            exprs.push(
                ratio(
                    unavailable,
                    lit(period_seconds) * col(cells.replace("{t}", tech)).sum(),
                )
                .alias(format!("nur_{tech}{suffix}")),
            );
        }
    }
    exprs
}
