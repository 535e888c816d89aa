use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use survey_compare::data::loader;
use survey_compare::data::model::{ProductId, QuestionId};
use survey_compare::{AggregateFilter, DataBrowser, QuestionGroup};

/// Rank survey questions by how much the products' answers diverge.
#[derive(Debug, Parser)]
#[command(name = "survey-compare", version)]
struct Cli {
    /// Dataset JSON (products, questions, categories, businessStats, aggregates).
    dataset: PathBuf,

    /// Replace the dataset's aggregates with rows from this CSV.
    #[arg(long)]
    aggregates: Option<PathBuf>,

    /// Keep only aggregates of this product.
    #[arg(long)]
    product: Option<u64>,

    /// Keep only aggregates of this question.
    #[arg(long)]
    question: Option<u64>,

    /// Keep only aggregates of this company segment.
    #[arg(long)]
    segment: Option<String>,

    /// Print at most this many questions.
    #[arg(long)]
    limit: Option<usize>,

    /// Report dangling product/question/category references.
    #[arg(long)]
    validate: bool,

    /// Emit the ranked groups as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut dataset = loader::load_file(&cli.dataset)?;
    if let Some(path) = &cli.aggregates {
        dataset.aggregates = loader::load_aggregates_csv(path)?;
    }

    let browser = DataBrowser::new(dataset);

    if cli.validate {
        let warnings = browser.validate();
        eprintln!("{} integrity warning(s)", warnings.len());
        for w in &warnings {
            eprintln!("  {w}");
        }
    }

    let mut filter = AggregateFilter::new();
    if let Some(id) = cli.product {
        filter = filter.product(ProductId(id));
    }
    if let Some(id) = cli.question {
        filter = filter.question(QuestionId(id));
    }
    if let Some(segment) = cli.segment {
        filter = filter.segment(segment);
    }
    let view = if filter.is_empty() {
        browser
    } else {
        browser.filtered(&filter)
    };

    let mut groups = view.groups();
    if let Some(limit) = cli.limit {
        groups.truncate(limit);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print_table(&view, &groups);
    }
    Ok(())
}

fn print_table(view: &DataBrowser, groups: &[QuestionGroup]) {
    let products: Vec<&str> = view.products().iter().map(|p| p.name.as_str()).collect();
    println!("{:<40} {:>24}  {:>8} {:>9}", "question", products.join(" / "), "diff", "sort");

    for group in groups {
        let normals: Vec<String> = group
            .normals
            .iter()
            .map(|n| n.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")))
            .collect();
        let category = group
            .question
            .category_id
            .and_then(|id| view.category_name(id))
            .unwrap_or("");
        let text = format!("{} [{category}]", group.question.text_template);
        println!(
            "{:<40} {:>24}  {:>8.3} {:>9.3}",
            text,
            normals.join(" / "),
            group.diff,
            group.sort
        );
    }
}
