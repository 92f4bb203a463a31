//! Rule-based advisory insights.
//!
//! Rules live in the [`RULES`] table as `(predicate, template, priority)`
//! entries. Every rule is evaluated once, in table order, and the results are
//! stable-sorted by priority so equal-priority insights keep table order.

use crate::config::InsightThresholds;
use crate::metrics::KpiSet;
use crate::revenue::RevenueSummary;
use crate::utils::format_amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Success,
    Warning,
    Error,
}

/// Declared low to high so the derived `Ord` ranks `High` greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryInsight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub category: String,
    pub title: String,
    pub message: String,
    pub recommendation: String,
    pub priority: Priority,
}

/// Everything a rule may look at. Rules see no clock and no other state.
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub kpis: &'a KpiSet,
    pub revenue: &'a RevenueSummary,
    pub thresholds: &'a InsightThresholds,
}

/// Text produced by a rule template.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightText {
    pub title: String,
    pub message: String,
    pub recommendation: String,
}

pub struct InsightRule {
    pub name: &'static str,
    pub kind: InsightType,
    pub category: &'static str,
    pub priority: Priority,
    pub predicate: fn(&InsightContext<'_>) -> bool,
    pub template: fn(&InsightContext<'_>) -> InsightText,
}

impl InsightRule {
    pub fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<AdvisoryInsight> {
        if !(self.predicate)(ctx) {
            return None;
        }

        let text = (self.template)(ctx);
        Some(AdvisoryInsight {
            kind: self.kind,
            category: self.category.to_string(),
            title: text.title,
            message: text.message,
            recommendation: text.recommendation,
            priority: self.priority,
        })
    }
}

/// The profitability pair is mutually exclusive: `net_result > 0` selects
/// exactly one of the first two rules.
pub const RULES: &[InsightRule] = &[
    InsightRule {
        name: "profitability",
        kind: InsightType::Success,
        category: "Profitability",
        priority: Priority::Low,
        predicate: is_profitable,
        template: profitability_template,
    },
    InsightRule {
        name: "loss",
        kind: InsightType::Error,
        category: "Profitability",
        priority: Priority::High,
        predicate: is_not_profitable,
        template: loss_template,
    },
    InsightRule {
        name: "cost_ratio",
        kind: InsightType::Warning,
        category: "Cost Management",
        priority: Priority::High,
        predicate: expense_ratio_exceeded,
        template: cost_ratio_template,
    },
    InsightRule {
        name: "collection",
        kind: InsightType::Warning,
        category: "Collections",
        priority: Priority::Medium,
        predicate: collection_rate_low,
        template: collection_template,
    },
];

pub fn generate_insights(kpis: &KpiSet, revenue: &RevenueSummary) -> Vec<AdvisoryInsight> {
    generate_insights_with(kpis, revenue, &InsightThresholds::default())
}

pub fn generate_insights_with(
    kpis: &KpiSet,
    revenue: &RevenueSummary,
    thresholds: &InsightThresholds,
) -> Vec<AdvisoryInsight> {
    let ctx = InsightContext {
        kpis,
        revenue,
        thresholds,
    };

    let mut insights: Vec<AdvisoryInsight> =
        RULES.iter().filter_map(|rule| rule.evaluate(&ctx)).collect();
    insights.sort_by(|a, b| b.priority.cmp(&a.priority));
    insights
}

pub fn rule(name: &str) -> Option<&'static InsightRule> {
    RULES.iter().find(|rule| rule.name == name)
}

fn is_profitable(ctx: &InsightContext<'_>) -> bool {
    ctx.kpis.net_result > 0.0
}

// Break-even (net_result == 0) lands here.
fn is_not_profitable(ctx: &InsightContext<'_>) -> bool {
    !is_profitable(ctx)
}

fn expense_ratio_exceeded(ctx: &InsightContext<'_>) -> bool {
    ctx.kpis.expense_ratio > ctx.thresholds.expense_ratio_warning
}

fn collection_rate_low(ctx: &InsightContext<'_>) -> bool {
    ctx.kpis.collection_rate < ctx.thresholds.collection_rate_warning
}

fn profitability_template(ctx: &InsightContext<'_>) -> InsightText {
    let kpis = ctx.kpis;
    let (title, recommendation) = if kpis.profit_margin >= ctx.thresholds.strong_margin {
        (
            "Strong Profitability",
            "Reinvest part of the surplus in service capacity and keep the current cost controls in place.".to_string(),
        )
    } else if kpis.profit_margin >= ctx.thresholds.healthy_margin {
        (
            "Healthy Profitability",
            format!(
                "Review the largest expense categories to lift the margin above {:.0}%.",
                ctx.thresholds.strong_margin
            ),
        )
    } else {
        (
            "Modest Profitability",
            "Margins are thin: renegotiate supplier pricing and review staffing levels against patient volume.".to_string(),
        )
    };

    InsightText {
        title: title.to_string(),
        message: format!(
            "Net profit of {} on revenue of {} ({:.1}% margin, {:.1}% ROI).",
            format_amount(kpis.net_result),
            format_amount(kpis.total_revenue),
            kpis.profit_margin,
            kpis.roi
        ),
        recommendation,
    }
}

fn loss_template(ctx: &InsightContext<'_>) -> InsightText {
    let kpis = ctx.kpis;
    InsightText {
        title: "Operating at a Loss".to_string(),
        message: format!(
            "Expenses of {} exceed revenue of {}, a net loss of {}.",
            format_amount(kpis.total_expenses),
            format_amount(kpis.total_revenue),
            format_amount(-kpis.net_result)
        ),
        recommendation: "Cut discretionary spending and inventory overstock, and raise revenue through pricing review and faster collections.".to_string(),
    }
}

fn cost_ratio_template(ctx: &InsightContext<'_>) -> InsightText {
    InsightText {
        title: "High Expense Ratio".to_string(),
        message: format!(
            "Expenses consume {:.1}% of revenue, above the {:.0}% threshold.",
            ctx.kpis.expense_ratio, ctx.thresholds.expense_ratio_warning
        ),
        recommendation: "Audit payroll and inventory purchasing for savings; align staffing with demand.".to_string(),
    }
}

fn collection_template(ctx: &InsightContext<'_>) -> InsightText {
    let mut recommendation =
        "Follow up on unpaid and partially paid invoices and tighten payment terms.".to_string();
    if let Some((method, _)) = ctx
        .revenue
        .by_method
        .iter()
        .filter(|(_, group)| group.outstanding() > 0.0)
        .max_by(|a, b| a.1.outstanding().total_cmp(&b.1.outstanding()))
    {
        recommendation.push_str(&format!(" Most of the outstanding balance is on {} payments.", method));
    }

    InsightText {
        title: "Low Collection Rate".to_string(),
        message: format!(
            "Only {:.1}% of invoiced revenue has been collected; {} is outstanding.",
            ctx.kpis.collection_rate,
            format_amount(ctx.revenue.total_outstanding)
        ),
        recommendation,
    }
}
