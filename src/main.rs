// City Budget - Command line interface
// Budgets, comparisons and salary checks against a price catalog

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_budget::affordability::{equivalent_salary, evaluate_offer, AffordabilityTier};
use city_budget::input::{parse_amount, parse_quantity};
use city_budget::{
    compare_selected, compute_budget, compute_monthly_budget, emi, tier, AppConfig, City,
    ComputedBudget, DeepLink, Demographic, DiffDirection, OfferEvaluation, PriceCatalog,
    ProfileKey, SelectionState, ShareState, ViewMode,
};

/// City Budget - cost of living and salary affordability for Indian cities
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Price catalog (.csv or .json), overrides config and environment
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Print machine-readable JSON instead of a report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog cities
    Cities,

    /// Monthly or yearly budget for one city
    Budget {
        #[arg(long)]
        city: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Compare 2 to 5 cities
    Compare {
        /// City slug, repeat for each city
        #[arg(long = "city", required = true)]
        cities: Vec<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Affordability tier of a monthly salary in one city
    Afford {
        #[arg(long)]
        city: String,
        #[arg(long, value_parser = parse_amount)]
        salary: f64,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Salary in one city that matches a salary in another
    Equivalent {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Current monthly salary in the `from` city
        #[arg(long, value_parser = parse_amount)]
        salary: f64,
        /// Monthly offer in the `to` city
        #[arg(long, value_parser = parse_amount)]
        offer: Option<f64>,
        /// Count the same accommodation item in both cities
        #[arg(long, value_name = "ITEM")]
        same_accommodation: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Loan EMI
    Emi {
        #[arg(long, value_parser = parse_amount)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
    },

    /// Encode or decode share links
    Share {
        #[command(subcommand)]
        action: ShareCommand,
    },

    /// Budget for the city named by a deep link query
    Deeplink {
        /// e.g. "city=pune&profile=student&centre=0"
        query: String,
    },
}

#[derive(Subcommand, Debug)]
enum ShareCommand {
    /// Build a share query string
    Encode {
        #[arg(long = "city", required = true)]
        cities: Vec<String>,
        /// Monthly salary per city, in city order
        #[arg(long = "salary", value_parser = parse_amount)]
        salaries: Vec<f64>,
        /// Accommodation per city as slug=item
        #[arg(long = "acc", value_name = "SLUG=ITEM")]
        accommodation: Vec<String>,
        #[arg(long)]
        yearly: bool,
    },
    /// Decode a share query string
    Decode { query: String },
}

/// Flags shared by every command that builds a selection
#[derive(Args, Debug, Clone, Default)]
struct SelectionArgs {
    /// student | professional | couple | family
    #[arg(long)]
    profile: Option<String>,

    /// Use outskirts accommodation instead of city centre
    #[arg(long)]
    outskirts: bool,

    /// Accommodation item for every city
    #[arg(long, value_name = "ITEM")]
    accommodation: Option<String>,

    #[arg(long)]
    yearly: bool,

    /// Drop non-vegetarian items
    #[arg(long)]
    veg: bool,

    /// m | f
    #[arg(long)]
    demographic: Option<String>,

    #[arg(long, value_name = "ITEM")]
    exclude: Vec<String>,

    /// Opt into an optional item
    #[arg(long, value_name = "ITEM")]
    include: Vec<String>,

    /// Quantity edit as item=n
    #[arg(long, value_name = "ITEM=N")]
    qty: Vec<String>,

    /// Price override as item=price, applied in every city
    #[arg(long, value_name = "ITEM=PRICE")]
    price: Vec<String>,
}

/// JSON output envelope
#[derive(Serialize)]
struct Report<T: Serialize> {
    generated_at: DateTime<Utc>,
    data: T,
}

#[derive(Serialize)]
struct AffordReport {
    city_slug: String,
    salary: f64,
    monthly_cost: f64,
    tier: AffordabilityTier,
    label: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct EquivalentReport {
    from_slug: String,
    to_slug: String,
    salary: f64,
    equivalent_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offer: Option<OfferEvaluation>,
}

#[derive(Serialize)]
struct ShareReport {
    query: String,
    state: ShareState,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.catalog.clone() {
        config.catalog_path = path;
    }
    debug!(?config, "resolved configuration");

    match &cli.command {
        Command::Emi {
            principal,
            rate,
            years,
        } => run_emi(&cli, *principal, *rate, *years),
        Command::Share { action } => run_share(&cli, &config, action),
        command => {
            let catalog = PriceCatalog::load(&config.catalog_path)?;
            run_with_catalog(&cli, &config, &catalog, command)
        }
    }
}

fn run_with_catalog(
    cli: &Cli,
    config: &AppConfig,
    catalog: &PriceCatalog,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Cities => run_cities(cli, catalog),
        Command::Budget { city, selection } => {
            let selection = build_selection(config, &[city.as_str()], selection)?;
            let city = find_city(catalog, city)?;
            let budget = compute_budget(city, &selection);
            if cli.json {
                return print_json(&budget);
            }
            print_budget(city, &selection, &budget);
            Ok(())
        }
        Command::Compare { cities, selection } => {
            let selection = build_selection(config, cities, selection)?;
            run_compare(cli, catalog, &selection)
        }
        Command::Afford {
            city,
            salary,
            selection,
        } => {
            let selection = build_selection(config, &[city.as_str()], selection)?;
            let monthly_cost = compute_monthly_budget(find_city(catalog, city)?, &selection).total;
            let level = tier(*salary, monthly_cost);
            let report = AffordReport {
                city_slug: city.clone(),
                salary: *salary,
                monthly_cost,
                tier: level,
                label: level.label(),
                description: level.description(),
            };
            if cli.json {
                return print_json(&report);
            }

            println!("💰 Affordability - {}", city);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("  Salary:        {}", rupees(report.salary));
            println!("  Monthly cost:  {}", rupees(report.monthly_cost));
            println!("\n  {} - {}", report.label, report.description);
            Ok(())
        }
        Command::Equivalent {
            from,
            to,
            salary,
            offer,
            same_accommodation,
            selection,
        } => {
            let selection = build_selection(config, &pair_slugs(from, to), selection)?;
            let city_a = find_city(catalog, from)?;
            let city_b = find_city(catalog, to)?;

            let report = EquivalentReport {
                from_slug: from.clone(),
                to_slug: to.clone(),
                salary: *salary,
                equivalent_salary: equivalent_salary(
                    *salary,
                    city_a,
                    city_b,
                    same_accommodation.as_deref(),
                    &selection,
                ),
                offer: offer.map(|o| evaluate_offer(*salary, city_a, o, city_b, &selection)),
            };
            if cli.json {
                return print_json(&report);
            }
            print_equivalent(&report);
            Ok(())
        }
        Command::Deeplink { query } => {
            let link = DeepLink::parse(query);
            let selection = link
                .to_selection(config.default_profile)
                .ok_or_else(|| anyhow!("deep link does not name a city: '{}'", query))?;
            let city = find_city(catalog, &selection.city_slugs[0])?;
            let budget = compute_budget(city, &selection);
            if cli.json {
                return print_json(&budget);
            }
            print_budget(city, &selection, &budget);
            Ok(())
        }
        Command::Emi { .. } | Command::Share { .. } => Ok(()),
    }
}

// ============================================================================
// SELECTION FLAGS
// ============================================================================

fn build_selection<S: AsRef<str>>(
    config: &AppConfig,
    slugs: &[S],
    args: &SelectionArgs,
) -> Result<SelectionState> {
    let profile = match &args.profile {
        Some(value) => ProfileKey::parse(value)
            .ok_or_else(|| anyhow!("unknown profile '{}'", value))?,
        None => config.default_profile,
    };

    let mut selection = SelectionState::new(profile, slugs)?;
    selection.use_centre(!args.outskirts);
    selection.set_view_mode(if args.yearly {
        ViewMode::Yearly
    } else {
        config.default_view_mode
    });
    selection.set_veg_only(args.veg);

    if let Some(value) = &args.demographic {
        let demographic =
            Demographic::parse(value).ok_or_else(|| anyhow!("unknown demographic '{}'", value))?;
        selection.set_demographic(Some(demographic));
    }
    if let Some(item) = &args.accommodation {
        for slug in slugs {
            selection.set_accommodation(slug.as_ref(), item);
        }
    }
    for item in &args.include {
        selection.include_item(item);
    }
    for item in &args.exclude {
        selection.exclude_item(item);
    }
    for pair in &args.qty {
        let (item, qty) = split_pair(pair)?;
        let qty = parse_quantity(qty).with_context(|| format!("bad quantity in '{}'", pair))?;
        selection.set_quantity(item, i64::from(qty));
    }
    for pair in &args.price {
        let (item, price) = split_pair(pair)?;
        let price = parse_amount(price).with_context(|| format!("bad price in '{}'", pair))?;
        for slug in slugs {
            selection.set_price_override(slug.as_ref(), item, price);
        }
    }

    Ok(selection)
}

/// A move within one city is costed against a single-city selection
fn pair_slugs<'a>(from: &'a str, to: &'a str) -> Vec<&'a str> {
    if from == to {
        vec![from]
    } else {
        vec![from, to]
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.rsplit_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", pair))
}

fn find_city<'a>(catalog: &'a PriceCatalog, slug: &str) -> Result<&'a City> {
    catalog.get(slug).ok_or_else(|| {
        anyhow!(
            "unknown city '{}' (available: {})",
            slug,
            catalog.slugs().join(", ")
        )
    })
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_cities(cli: &Cli, catalog: &PriceCatalog) -> Result<()> {
    if cli.json {
        return print_json(catalog.cities());
    }

    println!("🏙️  Cities in catalog: {}", catalog.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for city in catalog.cities() {
        println!("  {:<16} {:<20} {:>3} prices", city.slug, city.name, city.entries.len());
    }
    Ok(())
}

fn run_compare(cli: &Cli, catalog: &PriceCatalog, selection: &SelectionState) -> Result<()> {
    let result = compare_selected(catalog, selection)?;
    if cli.json {
        return print_json(&result);
    }

    println!(
        "⚖️  Comparing {} cities ({})",
        result.per_city.len(),
        selection.view_mode.as_str()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for delta in &result.deltas {
        let marker = if delta.city_slug == result.cheapest_slug {
            "✓ cheapest"
        } else if delta.city_slug == result.costliest_slug {
            "▲ costliest"
        } else {
            ""
        };
        println!(
            "  {:<16} {:>14}  +{:>3}%  {}",
            delta.city_slug,
            rupees(delta.total),
            delta.percent_above_cheapest,
            marker
        );
    }
    println!("\n  Spread: {}%", result.spread_percent);

    if let Some(diffs) = &result.item_diffs {
        println!("\n📋 Item differences");
        for diff in diffs {
            let arrow = match diff.direction {
                DiffDirection::Same => "=",
                DiffDirection::Costlier => "↑",
                DiffDirection::Cheaper => "↓",
            };
            println!(
                "  {:<40} {:>10} {:>10}  {} {}%",
                diff.item,
                rupees(diff.price1),
                rupees(diff.price2),
                arrow,
                diff.diff_percent.abs()
            );
        }
    }

    if !result.housing.is_empty() {
        println!("\n🏦 Buying a 2BHK");
        for estimate in &result.housing {
            println!(
                "  {:<16} price {:>14}  EMI {:>10}/month",
                estimate.city_slug,
                rupees(estimate.property_price),
                rupees(estimate.emi.emi)
            );
        }
    }
    Ok(())
}

fn run_emi(cli: &Cli, principal: f64, rate: f64, years: u32) -> Result<()> {
    let breakdown = emi(principal, rate, years);
    if cli.json {
        return print_json(&breakdown);
    }

    println!("🏦 EMI for {} at {}% over {} years", rupees(principal), rate, years);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Monthly EMI:     {}", rupees(breakdown.emi));
    println!("  Total interest:  {}", rupees(breakdown.total_interest));
    println!("  Total payable:   {}", rupees(breakdown.total_amount));
    Ok(())
}

fn run_share(cli: &Cli, config: &AppConfig, action: &ShareCommand) -> Result<()> {
    let state = match action {
        ShareCommand::Encode {
            cities,
            salaries,
            accommodation,
            yearly,
        } => {
            let mut selection = SelectionState::new(config.default_profile, cities)?;
            for pair in accommodation {
                let (slug, item) = split_pair(pair)?;
                if !cities.iter().any(|c| c == slug) {
                    bail!("accommodation given for unselected city '{}'", slug);
                }
                selection.set_accommodation(slug, item);
            }
            if *yearly {
                selection.set_view_mode(ViewMode::Yearly);
            }
            ShareState::from_selection(&selection, salaries)
        }
        ShareCommand::Decode { query } => ShareState::decode(query),
    };

    let report = ShareReport {
        query: state.encode(),
        state,
    };
    if cli.json {
        return print_json(&report);
    }

    println!("🔗 {}", report.query);
    for (idx, city) in report.state.cities.iter().enumerate() {
        print!("  {}. {}", idx + 1, city.slug);
        if let Some(acc) = &city.accommodation {
            print!("  [{}]", acc);
        }
        if let Some(salary) = city.salary {
            print!("  salary {}", rupees(salary));
        }
        println!();
    }
    println!("  View: {}", report.state.view_mode.as_str());
    Ok(())
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_json<T: Serialize>(data: T) -> Result<()> {
    let report = Report {
        generated_at: Utc::now(),
        data,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(())
}

fn print_budget(city: &City, selection: &SelectionState, budget: &ComputedBudget) {
    println!(
        "📊 {} - {} budget ({})",
        city.name,
        selection.view_mode.as_str(),
        selection.profile_config().label
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Accommodation: {}", selection.accommodation_for(&city.slug));
    println!();
    for (group, amount) in &budget.by_group {
        println!("  {:<16} {:>14}", group.as_str(), rupees(*amount));
    }
    println!("  {:<16} {:>14}", "TOTAL", rupees(budget.total));

    println!("\n📋 Items");
    for item in &budget.items {
        let edited = if item.overridden { " *" } else { "" };
        println!(
            "  {:<40} {:>4} × {:>8} = {:>12}{}",
            item.item,
            item.quantity,
            rupees(item.unit_price),
            rupees(item.amount),
            edited
        );
    }
}

fn print_equivalent(report: &EquivalentReport) {
    println!("🔁 Salary equivalence: {} → {}", report.from_slug, report.to_slug);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  {} in {} ≈ {} in {}",
        rupees(report.salary),
        report.from_slug,
        rupees(report.equivalent_salary),
        report.to_slug
    );

    if let Some(offer) = &report.offer {
        println!("\n💼 Offer");
        println!(
            "  Gap:      {} ({:+}%)",
            rupees(offer.offer_gap),
            offer.offer_gap_percent
        );
        println!(
            "  Tier:     {} → {}",
            offer.tier_now.label(),
            offer.tier_after.label()
        );
        println!(
            "  Savings:  {} → {} per month",
            rupees(offer.monthly_savings_now),
            rupees(offer.monthly_savings_after)
        );
        if offer.worth_it {
            println!("\n  ✅ The offer matches or beats your current standard of living");
        } else {
            println!("\n  ❌ The offer falls short of your current standard of living");
        }
    }
}

/// Whole rupees with Indian digit grouping: ₹12,34,567
fn rupees(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            parts.push(right);
            rest = left;
        }
        parts.push(rest);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    format!("{}₹{}", sign, grouped)
}
