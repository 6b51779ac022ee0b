use std::{env, path::PathBuf};

use sqlqube::{
    Aggregation, Condition, Connective, Operator, QubeConfig, Query, QueryBuilder, Schema, SqlType,
    TableView, View, ViewRef, ViewsRelation,
};

fn usage() {
    eprintln!("Usage: library [config.toml]");
    eprintln!("Example: RUST_LOG=debug cargo run --example library -- sqlqube.toml");
}

fn relate(a: &ViewRef, col_a: &str, b: &ViewRef, col_b: &str) -> anyhow::Result<ViewsRelation> {
    Ok(ViewsRelation::between(a.attribute(col_a)?, b.attribute(col_b)?)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.len() > 1 {
        usage();
        std::process::exit(1);
    }
    let config = match args.pop() {
        Some(path) => QubeConfig::from_file(PathBuf::from(path))?,
        None => QubeConfig::load_default(),
    };
    let aliases = config.alias_allocator()?;

    let books = View::from(
        TableView::new("Books", "BOOKS")
            .with_attribute("title", SqlType::VARCHAR)
            .with_attribute("author", SqlType::VARCHAR)
            .with_attribute("publisher", SqlType::INTEGER)
            .with_attribute("year", SqlType::VARCHAR)
            .with_attribute("category", SqlType::INTEGER),
    )
    .into_ref();
    let publishers = View::from(
        TableView::new("Publishers", "PUBLISHERS")
            .with_attribute("id", SqlType::INTEGER)
            .with_attribute("name", SqlType::VARCHAR)
            .with_attribute("city", SqlType::INTEGER),
    )
    .into_ref();
    let cities = View::from(
        TableView::new("Cities", "CITIES")
            .with_attribute("id", SqlType::INTEGER)
            .with_named_attribute("city_name", "city", SqlType::VARCHAR),
    )
    .into_ref();
    let categories = View::from(
        TableView::new("Categories", "CATEGORIES")
            .with_attribute("id", SqlType::INTEGER)
            .with_attribute("category_name", SqlType::VARCHAR),
    )
    .into_ref();

    let mut schema = Schema::new();
    schema.add_root(books.clone())?;
    schema.add_view(
        publishers.clone(),
        relate(&books, "publisher", &publishers, "id")?,
    )?;
    schema.add_view(cities.clone(), relate(&publishers, "city", &cities, "id")?)?;
    schema.add_view(
        categories.clone(),
        relate(&books, "category", &categories, "id")?,
    )?;

    // Authors per publisher and category.
    let mut authors = QueryBuilder::with_aliases(&schema, &aliases)
        .with_options(config.build_options());
    authors.add(
        books
            .attribute("author")?
            .select()
            .with_aggregate(Aggregation::CountDistinct)
            .with_alias_name("Authors")
            .build(),
    )?;
    authors.add(books.attribute("publisher")?.select().with_group_by(true).build())?;
    authors.add(
        categories
            .attribute("category_name")?
            .select()
            .with_visible(false)
            .with_condition(Condition::new(Connective::And, Operator::Like))
            .build(),
    )?;
    authors.add(
        books
            .attribute("year")?
            .select()
            .with_visible(false)
            .with_condition(
                Condition::new(Connective::And, Operator::Ge).and(Operator::Le),
            )
            .build(),
    )?;
    let authors = authors.create_view("Authors")?;
    print_query("authors", &authors.query()?);
    println!("-- nested source\n{}\n", authors.source()?);

    let authors = View::from(authors).into_ref();
    schema.add_view(
        authors.clone(),
        relate(&authors, "publisher", &publishers, "id")?,
    )?;

    // Publishers with their city and the number of authors they print.
    let mut report = QueryBuilder::with_aliases(&schema, &aliases)
        .with_options(config.build_options());
    report.add(publishers.attribute("name")?.select().with_order_by(true).build())?;
    report.add(
        authors
            .attribute("Authors")?
            .select()
            .with_condition(Condition::new(Connective::And, Operator::Ge))
            .build(),
    )?;
    report.add_outer(cities.attribute("city_name")?.select().build())?;
    let query = report.build()?;

    print_query("report", &query);
    println!("{}", query.to_json()?);
    Ok(())
}

fn print_query(label: &str, query: &Query) {
    println!("-- {label}\n{}", query.statement());
    for param in query.params() {
        println!("--   {} -> {:?}", param.attribute.db_name(), param.positions);
    }
    println!();
}
