//! Summary command: category totals and monthly trend

use std::path::Path;

use anyhow::Result;
use spendcast_core::{
    aggregate_monthly, cash_flow, category_payment_totals, category_totals, CashFlowSummary,
    CategoryPaymentTotal, CategoryTotal, MonthTotal, MonthlyCategoryTotal,
};

use super::{format_amount, load_clean_dataset, print_json, truncate};

pub fn cmd_summary(file: &Path, json: bool) -> Result<()> {
    let dataset = load_clean_dataset(file)?;
    let totals = category_totals(&dataset);
    let temporal = aggregate_monthly(&dataset);
    let by_payment = category_payment_totals(&dataset);
    let flow = cash_flow(&dataset);

    if json {
        return print_json(&serde_json::json!({
            "category_totals": totals,
            "category_payment_totals": by_payment,
            "cash_flow": flow,
            "monthly_by_category": temporal.category_rows(),
            "monthly_totals": temporal.month_totals(),
        }));
    }

    println!();
    println!("📊 Spending Summary");
    println!("   File: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    print_category_totals(&totals);
    print_optional_breakdowns(by_payment.as_deref(), flow.as_ref());

    println!();
    println!("📈 Monthly Trend");
    println!("   ─────────────────────────────────────────────────────────────");
    if !dataset.has_date_column() {
        println!("   Add a 'Date' column to enable trend and forecast analysis.");
        return Ok(());
    }
    print_month_totals(&temporal.month_totals());

    println!();
    print_monthly_by_category(&temporal.category_rows());
    Ok(())
}

pub(crate) fn print_category_totals(totals: &[CategoryTotal]) {
    if totals.is_empty() {
        println!("   No spending found.");
        return;
    }

    let total: f64 = totals.iter().map(|t| t.amount).sum();
    println!("   Total: {}", format_amount(total));
    println!();
    println!(
        "   {:25} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼──────────────┼────────┼───────");
    for t in totals {
        println!(
            "   {:25} │ {:>12} │ {:>5.1}% │ {:>5}",
            truncate(&t.category, 25),
            format_amount(t.amount),
            t.percentage,
            t.transaction_count
        );
    }
}

pub(crate) fn print_month_totals(months: &[MonthTotal]) {
    if months.is_empty() {
        println!("   No dated rows found.");
        return;
    }

    println!("   {:8} │ {:>12}", "Month", "Amount");
    println!("   ─────────┼─────────────");
    for m in months {
        println!("   {:8} │ {:>12}", m.month.to_string(), format_amount(m.amount));
    }

    let total: f64 = months.iter().map(|m| m.amount).sum();
    println!("   ─────────┼─────────────");
    println!(
        "   {:8} │ {:>12}",
        "Average",
        format_amount(total / months.len() as f64)
    );
}

fn print_monthly_by_category(rows: &[MonthlyCategoryTotal]) {
    if rows.is_empty() {
        return;
    }

    println!("   {:8} │ {:25} │ {:>12}", "Month", "Category", "Amount");
    println!("   ─────────┼───────────────────────────┼─────────────");
    for row in rows {
        println!(
            "   {:8} │ {:25} │ {:>12}",
            row.month.to_string(),
            truncate(&row.category, 25),
            format_amount(row.amount)
        );
    }
}

/// Payment method and income/expense sections, when the source has those columns
pub(crate) fn print_optional_breakdowns(
    by_payment: Option<&[CategoryPaymentTotal]>,
    flow: Option<&CashFlowSummary>,
) {
    if let Some(rows) = by_payment {
        println!();
        println!("💳 Spending by Payment Method");
        println!("   ─────────────────────────────────────────────────────────────");
        print_category_payment_totals(rows);
    }
    if let Some(flow) = flow {
        println!();
        println!("💰 Income and Expenses");
        println!("   ─────────────────────────────────────────────────────────────");
        print_cash_flow(flow);
    }
}

fn print_category_payment_totals(rows: &[CategoryPaymentTotal]) {
    if rows.is_empty() {
        println!("   No rows with a payment method.");
        return;
    }

    println!(
        "   {:20} │ {:18} │ {:>12} │ {:>5}",
        "Category", "Payment Method", "Amount", "Count"
    );
    println!("   ─────────────────────┼────────────────────┼──────────────┼───────");
    for row in rows {
        println!(
            "   {:20} │ {:18} │ {:>12} │ {:>5}",
            truncate(&row.category, 20),
            truncate(&row.payment_method, 18),
            format_amount(row.amount),
            row.transaction_count
        );
    }
}

fn print_cash_flow(flow: &CashFlowSummary) {
    println!(
        "   Total income:    {:>14} ({} rows)",
        format_amount(flow.total_income),
        flow.income_rows
    );
    println!(
        "   Total expenses:  {:>14} ({} rows)",
        format_amount(flow.total_expenses),
        flow.expense_rows
    );
    let marker = if flow.profit < 0.0 { "📉" } else { "📈" };
    println!("   {} Profit:       {:>14}", marker, format_amount(flow.profit));
}
