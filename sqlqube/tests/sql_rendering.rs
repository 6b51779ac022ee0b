//! SQL rendering tests for aggregations, placeholder numbering and nested
//! sources.

use sqlqube::{
    Aggregation, AliasAllocator, Condition, Connective, Operator, QueryBuilder, Schema, SqlType,
    TableView, View, ViewRef, ViewsRelation,
};

struct Shop {
    schema: Schema,
    orders: ViewRef,
    customers: ViewRef,
}

fn shop() -> Shop {
    let orders = View::from(
        TableView::new("Orders", "sales.orders")
            .with_attribute("id", SqlType::INTEGER)
            .with_attribute("customer_id", SqlType::INTEGER)
            .with_named_attribute("amt", "amount", SqlType::DECIMAL)
            .with_attribute("status", SqlType::VARCHAR),
    )
    .into_ref();
    let customers = View::from(
        TableView::new("Customers", "sales.customers")
            .with_attribute("id", SqlType::INTEGER)
            .with_attribute("region", SqlType::VARCHAR),
    )
    .into_ref();

    let mut schema = Schema::new();
    schema.add_root(orders.clone()).unwrap();
    let relation = ViewsRelation::between(
        orders.attribute("customer_id").unwrap(),
        customers.attribute("id").unwrap(),
    )
    .unwrap();
    schema.add_view(customers.clone(), relation).unwrap();

    Shop {
        schema,
        orders,
        customers,
    }
}

#[test]
fn every_aggregation_renders_around_the_column() {
    let cases = [
        (Aggregation::Count, "COUNT(A.id)"),
        (Aggregation::CountDistinct, "COUNT(DISTINCT A.id)"),
        (Aggregation::Sum, "SUM(A.id)"),
        (Aggregation::Avg, "AVG(A.id)"),
        (Aggregation::Min, "MIN(A.id)"),
        (Aggregation::Max, "MAX(A.id)"),
    ];
    let shop = shop();
    for (aggregation, expected) in cases {
        let aliases = AliasAllocator::new();
        let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
        builder
            .add(
                shop.orders
                    .attribute("id")
                    .unwrap()
                    .select()
                    .with_aggregate(aggregation)
                    .build(),
            )
            .unwrap();
        let query = builder.build().unwrap();
        assert_eq!(
            query.statement(),
            format!("SELECT {expected} FROM sales.orders A")
        );
    }
}

#[test]
fn aggregated_column_types() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    let customers_region = shop.customers.attribute("region").unwrap();
    builder
        .add(customers_region.select().with_group_by(true).build())
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("id")
                .unwrap()
                .select()
                .with_aggregate(Aggregation::Count)
                .with_alias_name("orders")
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("amt")
                .unwrap()
                .select()
                .with_aggregate(Aggregation::Avg)
                .with_alias_name("avg_amount")
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("amt")
                .unwrap()
                .select()
                .with_aggregate(Aggregation::Max)
                .with_alias_name("max_amount")
                .build(),
        )
        .unwrap();

    let view = builder.create_view("Regions").unwrap();
    assert_eq!(
        view.render(true).unwrap(),
        "SELECT A.region, COUNT(B.id) as orders, AVG(B.amt) as avg_amount, \
         MAX(B.amt) as max_amount FROM sales.customers A\n\
         JOIN sales.orders B ON A.id = B.customer_id GROUP BY A.region"
    );

    let types: Vec<(String, SqlType)> = view
        .attributes()
        .into_iter()
        .map(|a| (a.db_name().to_string(), a.sql_type()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("region".to_string(), SqlType::VARCHAR),
            ("orders".to_string(), SqlType::INTEGER),
            ("avg_amount".to_string(), SqlType::DOUBLE),
            ("max_amount".to_string(), SqlType::DECIMAL),
        ]
    );
}

#[test]
fn named_table_attribute_keeps_its_user_name() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    builder
        .add(shop.orders.attribute("amt").unwrap().select().build())
        .unwrap();
    let view = builder.create_view("Amounts").unwrap();

    assert_eq!(
        view.render(true).unwrap(),
        "SELECT A.amt as amount FROM sales.orders A"
    );
    assert_eq!(view.attribute_names(), vec!["amount".to_string()]);
}

#[test]
fn placeholders_number_across_attributes() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    builder
        .add(
            shop.orders
                .attribute("status")
                .unwrap()
                .select()
                .with_condition(
                    Condition::new(Connective::And, Operator::Eq).or(Operator::Eq),
                )
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("amt")
                .unwrap()
                .select()
                .with_visible(false)
                .with_condition(
                    Condition::new(Connective::And, Operator::Ge).and(Operator::Lt),
                )
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.customers
                .attribute("region")
                .unwrap()
                .select()
                .with_condition(Condition::new(Connective::Not, Operator::Like))
                .build(),
        )
        .unwrap();

    let query = builder.build().unwrap();
    assert_eq!(
        query.statement(),
        "SELECT A.status, B.region FROM sales.orders A\n\
         JOIN sales.customers B ON A.customer_id = B.id \
         WHERE A.status = ? OR A.status = ? AND A.amt >= ? AND A.amt < ? NOT B.region LIKE ?"
    );
    assert_eq!(query.placeholder_count(), 5);
    assert_eq!(query.statement().matches('?').count(), 5);
    assert_eq!(query.positions("status"), vec![1, 2]);
    assert_eq!(query.positions("amount"), vec![3, 4]);
    assert_eq!(query.positions("region"), vec![5]);
    assert!(query.positions("id").is_empty());

    let names: Vec<&str> = query
        .select_attributes()
        .iter()
        .map(|a| a.db_name())
        .collect();
    assert_eq!(names, vec!["status", "region"]);
}

#[test]
fn same_column_filtered_twice_binds_every_position() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    builder
        .add(
            shop.orders
                .attribute("id")
                .unwrap()
                .select()
                .with_condition(Condition::new(Connective::And, Operator::Ge))
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("status")
                .unwrap()
                .select()
                .with_visible(false)
                .with_condition(Condition::new(Connective::And, Operator::Eq))
                .build(),
        )
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("id")
                .unwrap()
                .select()
                .with_visible(false)
                .with_condition(Condition::new(Connective::And, Operator::Le))
                .build(),
        )
        .unwrap();

    let query = builder.build().unwrap();
    assert_eq!(
        query.statement(),
        "SELECT A.id FROM sales.orders A WHERE A.id >= ? AND A.status = ? AND A.id <= ?"
    );
    assert_eq!(query.params().len(), 3);
    assert_eq!(query.positions("id"), vec![1, 3]);
    assert_eq!(query.positions("status"), vec![2]);
    assert_eq!(query.placeholder_count(), 3);
}

#[test]
fn source_has_no_placeholders() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    builder
        .add(
            shop.orders
                .attribute("status")
                .unwrap()
                .select()
                .with_condition(Condition::new(Connective::And, Operator::Eq))
                .with_order_by(true)
                .build(),
        )
        .unwrap();
    let view = builder.create_view("Statuses").unwrap();

    let source = view.source().unwrap();
    assert_eq!(source, "(SELECT A.status FROM sales.orders A ORDER BY A.status)");
    assert!(!source.contains('?'));
    assert_eq!(View::from(view).source().unwrap(), source);
}

#[test]
fn nested_source_is_embedded_verbatim() {
    let mut shop = shop();
    let aliases = AliasAllocator::new();

    let mut inner = QueryBuilder::with_aliases(&shop.schema, &aliases);
    inner
        .add(
            shop.orders
                .attribute("customer_id")
                .unwrap()
                .select()
                .with_group_by(true)
                .build(),
        )
        .unwrap();
    inner
        .add(
            shop.orders
                .attribute("amt")
                .unwrap()
                .select()
                .with_aggregate(Aggregation::Sum)
                .with_alias_name("total")
                .build(),
        )
        .unwrap();
    let totals = View::from(inner.create_view("Totals").unwrap()).into_ref();
    let nested = totals.source().unwrap();
    assert_eq!(
        nested,
        "(SELECT A.customer_id, SUM(A.amt) as total FROM sales.orders A GROUP BY A.customer_id)"
    );

    let relation = ViewsRelation::between(
        totals.attribute("customer_id").unwrap(),
        shop.customers.attribute("id").unwrap(),
    )
    .unwrap();
    shop.schema.add_view(totals.clone(), relation).unwrap();

    let mut outer = QueryBuilder::with_aliases(&shop.schema, &aliases);
    outer
        .add(shop.customers.attribute("region").unwrap().select().build())
        .unwrap();
    outer
        .add(
            totals
                .attribute("total")
                .unwrap()
                .select()
                .with_condition(Condition::new(Connective::And, Operator::Gt))
                .build(),
        )
        .unwrap();
    let query = outer.build().unwrap();

    assert_eq!(
        query.statement(),
        format!(
            "SELECT B.region, C.total FROM sales.customers B\n\
             JOIN {nested} C ON B.id = C.customer_id WHERE C.total > ?"
        )
    );
    assert_eq!(query.positions("total"), vec![1]);
}

#[test]
fn hidden_attribute_is_not_exposed() {
    let shop = shop();
    let aliases = AliasAllocator::new();
    let mut builder = QueryBuilder::with_aliases(&shop.schema, &aliases);
    builder
        .add(shop.orders.attribute("id").unwrap().select().build())
        .unwrap();
    builder
        .add(
            shop.orders
                .attribute("status")
                .unwrap()
                .select()
                .with_visible(false)
                .with_condition(Condition::new(Connective::And, Operator::Eq))
                .build(),
        )
        .unwrap();
    let view = View::from(builder.create_view("Ids").unwrap());

    assert_eq!(view.attribute_names(), vec!["id".to_string()]);
    assert!(view.attribute("status").is_err());
    let id = view.attribute("id").unwrap();
    assert_eq!(id.view(), view.id());
    assert_eq!(id.view_name(), "Ids");
    assert_eq!(id.full_name(), "Ids.id");
    assert!(view.as_query().is_some());
    assert!(view.as_table().is_none());
}
