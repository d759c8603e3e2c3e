use usage_core::{
    AnalyticsSummary, ModelMetrics, PlanUsage, UsageAnalyticsBundle, UsageBucket,
    format_currency, format_number, format_percentage,
};

pub fn print_bundle(bundle: &UsageAnalyticsBundle, plan: Option<&PlanUsage>) {
    println!(
        "Usage from {} to {}",
        bundle.date_range.start, bundle.date_range.end
    );
    println!();
    print_summary(&bundle.summary);
    if let Some(plan) = plan {
        println!();
        print_plan(plan);
    }
    println!();
    print_models(&bundle.models);
}

fn print_summary(summary: &AnalyticsSummary) {
    println!("Calls            {}", summary.total_calls);
    println!("Tokens           {}", format_number(summary.total_tokens as f64, 1));
    println!("API cost         {}", format_currency(Some(summary.real_api_cost)));
    println!("Cursor charges   {}", format_currency(Some(summary.cursor_charges)));
    println!(
        "Savings          {} ({})",
        format_currency(Some(summary.savings)),
        format_percentage(Some(summary.savings_percentage))
    );
    println!("Daily average    {}", format_currency(Some(summary.daily_average)));
    println!("Projected month  {}", format_currency(Some(summary.projected_monthly)));
    if summary.anomalies > 0 {
        println!("Large requests   {}", summary.anomalies);
    }
}

fn print_plan(plan: &PlanUsage) {
    println!(
        "Plan {}: {} of {} ({}), {} left",
        plan.plan,
        format_currency(Some(plan.total_usage)),
        format_currency(Some(plan.limit)),
        format_percentage(Some(plan.percentage)),
        format_currency(Some(plan.remaining))
    );
    println!(
        "{} days until renewal, {} days until the limit at the current pace",
        plan.days_remaining, plan.days_until_limit
    );
}

fn print_models(models: &[ModelMetrics]) {
    println!(
        "{:<32} {:<14} {:>7} {:>9} {:>10} {:>10} {:>8}",
        "MODEL", "FAMILY", "CALLS", "TOKENS", "API COST", "CHARGED", "SAVED"
    );
    for model in models {
        let badges = model
            .badges
            .iter()
            .map(|badge| badge.label())
            .collect::<Vec<_>>()
            .join(" ");
        let name = if badges.is_empty() {
            model.model.clone()
        } else {
            format!("{} [{}]", model.model, badges)
        };
        println!(
            "{:<32} {:<14} {:>7} {:>9} {:>10} {:>10} {:>8}",
            name,
            model.family.label(),
            model.calls,
            format_number(model.tokens as f64, 1),
            format_currency(Some(model.real_api_cost)),
            format_currency(Some(model.your_cost)),
            format_percentage(Some(model.savings_percentage))
        );
    }
}

pub fn print_buckets(buckets: &[UsageBucket]) {
    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>8} {:>10}",
        "PERIOD", "TOKENS", "INPUT", "OUTPUT", "CALLS", "CHARGED"
    );
    for bucket in buckets {
        println!(
            "{:<18} {:>10} {:>10} {:>10} {:>8} {:>10}",
            bucket.time,
            format_number(bucket.total_tokens as f64, 1),
            format_number(bucket.input_tokens as f64, 1),
            format_number(bucket.output_tokens as f64, 1),
            bucket.requests,
            format_currency(Some(bucket.cursor_charges))
        );
    }
}
